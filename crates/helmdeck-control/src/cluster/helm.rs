//! kubectl/helm command-line backend.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ConsoleError, ConsoleResult};

use super::{ClusterBackend, CommandOutput, ReleaseSpec};

/// Backend that drives the cluster through the kubectl and helm binaries.
#[derive(Debug, Clone)]
pub struct HelmBackend {
    kubectl_bin: PathBuf,
    helm_bin: PathBuf,
}

impl Default for HelmBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmBackend {
    /// Create a backend using `kubectl` and `helm` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kubectl_bin: PathBuf::from("kubectl"),
            helm_bin: PathBuf::from("helm"),
        }
    }

    /// Override the binaries, for pointing at pinned tool versions.
    #[must_use]
    pub fn with_binaries(kubectl: impl Into<PathBuf>, helm: impl Into<PathBuf>) -> Self {
        Self {
            kubectl_bin: kubectl.into(),
            helm_bin: helm.into(),
        }
    }

    /// Run a command to completion and capture its output.
    ///
    /// Only a failure to spawn or wait is an error; the process's own exit
    /// status is reported through [`CommandOutput`].
    async fn run(&self, program: &Path, args: &[OsString]) -> ConsoleResult<CommandOutput> {
        debug!(program = %program.display(), ?args, "running cluster command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                ConsoleError::cluster(format!("failed to run {}: {e}", program.display()))
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn kubeconfig_arg(kubeconfig: &Path) -> OsString {
        let mut arg = OsString::from("--kubeconfig=");
        arg.push(kubeconfig);
        arg
    }
}

#[async_trait]
impl ClusterBackend for HelmBackend {
    async fn namespace_exists(&self, namespace: &str, kubeconfig: &Path) -> ConsoleResult<bool> {
        let args = vec![
            Self::kubeconfig_arg(kubeconfig),
            OsString::from("get"),
            OsString::from("namespace"),
            OsString::from(namespace),
            OsString::from("--no-headers"),
        ];
        let output = self.run(&self.kubectl_bin, &args).await?;
        Ok(output.success)
    }

    async fn create_namespace(&self, namespace: &str, kubeconfig: &Path) -> ConsoleResult<()> {
        let args = vec![
            Self::kubeconfig_arg(kubeconfig),
            OsString::from("create"),
            OsString::from("namespace"),
            OsString::from(namespace),
        ];
        let output = self.run(&self.kubectl_bin, &args).await?;
        if !output.success {
            return Err(ConsoleError::cluster(format!(
                "failed to create namespace {namespace}: {}",
                output.stderr.trim()
            )));
        }
        Ok(())
    }

    async fn release_exists(&self, namespace: &str, release: &str) -> ConsoleResult<bool> {
        let args = vec![
            OsString::from("-n"),
            OsString::from(namespace),
            OsString::from("ls"),
            OsString::from("--filter"),
            OsString::from(release),
            OsString::from("--output"),
            OsString::from("json"),
        ];
        let output = self.run(&self.helm_bin, &args).await?;
        if !output.success {
            return Err(ConsoleError::cluster(format!(
                "helm ls failed: {}",
                output.stderr.trim()
            )));
        }
        parse_release_listing(&output.stdout)
    }

    async fn install(&self, spec: &ReleaseSpec) -> ConsoleResult<CommandOutput> {
        self.run(&self.helm_bin, &release_args("install", spec))
            .await
    }

    async fn upgrade(&self, spec: &ReleaseSpec) -> ConsoleResult<CommandOutput> {
        self.run(&self.helm_bin, &release_args("upgrade", spec))
            .await
    }
}

/// Build `helm -n NS install|upgrade RELEASE -f VALUES CHART` arguments.
fn release_args(subcommand: &str, spec: &ReleaseSpec) -> Vec<OsString> {
    vec![
        OsString::from("-n"),
        OsString::from(&spec.namespace),
        OsString::from(subcommand),
        OsString::from(&spec.release),
        OsString::from("-f"),
        spec.values_file.as_os_str().to_owned(),
        spec.chart_path.as_os_str().to_owned(),
    ]
}

/// Interpret `helm ls --output json`: a non-empty array means the release
/// exists. Unparseable output is an error so the caller's fail-open policy
/// decides, rather than guessing here.
fn parse_release_listing(stdout: &str) -> ConsoleResult<bool> {
    let listing: serde_json::Value = serde_json::from_str(stdout.trim())
        .map_err(|e| ConsoleError::cluster(format!("unparseable helm ls output: {e}")))?;
    match listing.as_array() {
        Some(entries) => Ok(!entries.is_empty()),
        None => Err(ConsoleError::cluster(
            "helm ls output was not a JSON array".to_owned(),
        )),
    }
}
