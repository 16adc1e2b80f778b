//! Cluster capability surface.
//!
//! This module abstracts the cluster-facing operations the reconciler needs:
//! namespace existence and creation, release existence, and the install and
//! upgrade invocations of the deployment tool. The primary implementation
//! shells out to kubectl and helm.

mod helm;

pub use helm::HelmBackend;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendType, ClusterConfig};
use crate::error::{ConsoleError, ConsoleResult};

/// Identifies a release and the inputs needed to install or upgrade it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSpec {
    /// Target namespace.
    pub namespace: String,
    /// Release name.
    pub release: String,
    /// Values file passed to the deployment tool.
    pub values_file: PathBuf,
    /// Path to the chart.
    pub chart_path: PathBuf,
}

/// Captured result of a deployment tool invocation.
///
/// A non-zero exit is data, not an error: `success` is false and `stderr`
/// carries the tool's own report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl CommandOutput {
    /// A successful invocation with the given output.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed invocation with the given error output.
    #[must_use]
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Trait for cluster backend implementations.
///
/// All calls are blocking from the reconciler's point of view: there is one
/// serialized operator workflow, no timeouts and no retries.
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    /// Check whether a namespace exists.
    async fn namespace_exists(&self, namespace: &str, kubeconfig: &Path) -> ConsoleResult<bool>;

    /// Create a namespace.
    async fn create_namespace(&self, namespace: &str, kubeconfig: &Path) -> ConsoleResult<()>;

    /// Check whether a release exists in a namespace.
    async fn release_exists(&self, namespace: &str, release: &str) -> ConsoleResult<bool>;

    /// Install a new release.
    async fn install(&self, spec: &ReleaseSpec) -> ConsoleResult<CommandOutput>;

    /// Upgrade an existing release.
    async fn upgrade(&self, spec: &ReleaseSpec) -> ConsoleResult<CommandOutput>;
}

/// Create a backend from configuration.
#[must_use]
pub fn create_backend(config: &ClusterConfig) -> Arc<dyn ClusterBackend> {
    match config.backend {
        BackendType::Helm => Arc::new(HelmBackend::new()),
        BackendType::Mock => Arc::new(MockCluster::default()),
    }
}

/// Mock backend for testing.
///
/// Holds a scripted view of the cluster and records every mutating call so
/// tests can assert on what the reconciler did.
#[derive(Debug, Default)]
pub struct MockCluster {
    state: std::sync::RwLock<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    namespaces: HashSet<String>,
    releases: HashSet<(String, String)>,
    fail_release_queries: bool,
    install_result: Option<CommandOutput>,
    upgrade_result: Option<CommandOutput>,
    created_namespaces: Vec<String>,
    installs: Vec<ReleaseSpec>,
    upgrades: Vec<ReleaseSpec>,
}

impl MockCluster {
    /// Script an existing namespace.
    #[must_use]
    pub fn with_namespace(self, namespace: impl Into<String>) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.namespaces.insert(namespace.into());
        }
        self
    }

    /// Script an existing release.
    #[must_use]
    pub fn with_release(self, namespace: impl Into<String>, release: impl Into<String>) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.releases.insert((namespace.into(), release.into()));
        }
        self
    }

    /// Make every release-existence query fail.
    #[must_use]
    pub fn with_failing_release_queries(self) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.fail_release_queries = true;
        }
        self
    }

    /// Script the result of the next install invocations.
    #[must_use]
    pub fn with_install_result(self, result: CommandOutput) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.install_result = Some(result);
        }
        self
    }

    /// Script the result of the next upgrade invocations.
    #[must_use]
    pub fn with_upgrade_result(self, result: CommandOutput) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.upgrade_result = Some(result);
        }
        self
    }

    /// Namespaces created so far.
    pub fn created_namespaces(&self) -> ConsoleResult<Vec<String>> {
        let state = self.read()?;
        Ok(state.created_namespaces.clone())
    }

    /// Install invocations recorded so far.
    pub fn installs(&self) -> ConsoleResult<Vec<ReleaseSpec>> {
        let state = self.read()?;
        Ok(state.installs.clone())
    }

    /// Upgrade invocations recorded so far.
    pub fn upgrades(&self) -> ConsoleResult<Vec<ReleaseSpec>> {
        let state = self.read()?;
        Ok(state.upgrades.clone())
    }

    fn read(&self) -> ConsoleResult<std::sync::RwLockReadGuard<'_, MockState>> {
        self.state
            .read()
            .map_err(|_| ConsoleError::internal("lock poisoned"))
    }

    fn write(&self) -> ConsoleResult<std::sync::RwLockWriteGuard<'_, MockState>> {
        self.state
            .write()
            .map_err(|_| ConsoleError::internal("lock poisoned"))
    }
}

#[async_trait]
impl ClusterBackend for MockCluster {
    async fn namespace_exists(&self, namespace: &str, _kubeconfig: &Path) -> ConsoleResult<bool> {
        let state = self.read()?;
        Ok(state.namespaces.contains(namespace))
    }

    async fn create_namespace(&self, namespace: &str, _kubeconfig: &Path) -> ConsoleResult<()> {
        let mut state = self.write()?;
        state.namespaces.insert(namespace.to_owned());
        state.created_namespaces.push(namespace.to_owned());
        Ok(())
    }

    async fn release_exists(&self, namespace: &str, release: &str) -> ConsoleResult<bool> {
        let state = self.read()?;
        if state.fail_release_queries {
            return Err(ConsoleError::cluster("release query failed"));
        }
        Ok(state
            .releases
            .contains(&(namespace.to_owned(), release.to_owned())))
    }

    async fn install(&self, spec: &ReleaseSpec) -> ConsoleResult<CommandOutput> {
        let mut state = self.write()?;
        state.installs.push(spec.clone());
        state
            .releases
            .insert((spec.namespace.clone(), spec.release.clone()));
        Ok(state
            .install_result
            .clone()
            .unwrap_or_else(|| CommandOutput::ok("installed")))
    }

    async fn upgrade(&self, spec: &ReleaseSpec) -> ConsoleResult<CommandOutput> {
        let mut state = self.write()?;
        state.upgrades.push(spec.clone());
        Ok(state
            .upgrade_result
            .clone()
            .unwrap_or_else(|| CommandOutput::ok("upgraded")))
    }
}
