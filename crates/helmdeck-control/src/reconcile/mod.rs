//! Deployment reconciliation.
//!
//! One reconciliation runs the sequence: check the namespace (creating it
//! best-effort if absent), check whether the release already exists, persist
//! the edited values, then either install or stop and ask the operator to
//! confirm an upgrade. Confirmation arrives as a separate
//! [`Reconciler::upgrade`] call carrying the handle of the values persisted
//! by the earlier reconciliation; an existing release is never mutated in the
//! same pass that discovered it.

use std::path::PathBuf;
use std::sync::Arc;

use helmdeck_values::ConfigDocument;
use tracing::{debug, info, warn};

use crate::cluster::{ClusterBackend, CommandOutput, ReleaseSpec};
use crate::error::ConsoleResult;
use crate::workfile::{ValuesFile, ValuesWorkdir};

/// A submitted deployment request.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Target namespace.
    pub namespace: String,
    /// Release name.
    pub release: String,
    /// Path to the chart.
    pub chart_path: PathBuf,
    /// kubeconfig for namespace operations.
    pub kubeconfig: PathBuf,
    /// The edited values document.
    pub values: ConfigDocument,
}

/// A confirmed upgrade request.
///
/// Carries no values: the upgrade applies the values persisted by the
/// reconciliation that reported [`DeployOutcome::ReleaseExists`].
#[derive(Debug, Clone)]
pub struct UpgradeRequest {
    /// Target namespace.
    pub namespace: String,
    /// Release name.
    pub release: String,
    /// Path to the chart.
    pub chart_path: PathBuf,
}

/// Outcome of a reconciliation or upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// A missing namespace was created.
    NamespaceCreated {
        /// The created namespace.
        namespace: String,
    },

    /// The release already exists; the operator must confirm the upgrade.
    ReleaseExists {
        /// Confirmation prompt for the operator.
        message: String,
    },

    /// A fresh install completed with exit status zero.
    Install {
        /// Captured standard output of the tool.
        output: String,
    },

    /// An upgrade completed with exit status zero.
    Upgrade {
        /// Captured standard output of the tool.
        output: String,
    },

    /// The deployment tool exited non-zero.
    Error {
        /// Captured standard error of the tool.
        detail: String,
    },
}

/// Maps a failed existence query to "absent".
///
/// Existence checks fail open: a query error must never abort the
/// reconciliation, it only steers it towards creating what seems to be
/// missing. The swallowing is deliberate and logged.
pub fn assume_absent_on_error(result: ConsoleResult<bool>) -> bool {
    match result {
        Ok(exists) => exists,
        Err(e) => {
            warn!(error = %e, "existence query failed, assuming absent");
            false
        }
    }
}

/// Drives deployment requests against the cluster.
pub struct Reconciler {
    cluster: Arc<dyn ClusterBackend>,
    workdir: ValuesWorkdir,
}

impl Reconciler {
    /// Create a reconciler over the given backend and working location.
    #[must_use]
    pub fn new(cluster: Arc<dyn ClusterBackend>, workdir: ValuesWorkdir) -> Self {
        Self { cluster, workdir }
    }

    /// Run one reconciliation pass for a submitted request.
    ///
    /// The edited values are persisted on every branch, because a later
    /// confirmed upgrade reads them too; the returned [`ValuesFile`] is the
    /// handle that upgrade must be given. Only infrastructure failures (an
    /// unwritable working file, an unspawnable tool) surface as `Err`.
    pub async fn reconcile(
        &self,
        request: &DeployRequest,
    ) -> ConsoleResult<(DeployOutcome, ValuesFile)> {
        self.ensure_namespace(&request.namespace, &request.kubeconfig)
            .await;

        let exists = assume_absent_on_error(
            self.cluster
                .release_exists(&request.namespace, &request.release)
                .await,
        );

        let values_file = self.workdir.persist(&request.values)?;

        if exists {
            info!(
                release = %request.release,
                namespace = %request.namespace,
                "release exists, awaiting upgrade confirmation"
            );
            let message = format!(
                "The release '{}' already exists in namespace '{}'. Do you want to upgrade?",
                request.release, request.namespace
            );
            return Ok((DeployOutcome::ReleaseExists { message }, values_file));
        }

        let spec = ReleaseSpec {
            namespace: request.namespace.clone(),
            release: request.release.clone(),
            values_file: values_file.path().to_owned(),
            chart_path: request.chart_path.clone(),
        };

        info!(release = %spec.release, namespace = %spec.namespace, "installing release");
        let output = self.cluster.install(&spec).await?;
        let outcome = install_outcome(output);
        Ok((outcome, values_file))
    }

    /// Apply a confirmed upgrade using previously persisted values.
    pub async fn upgrade(
        &self,
        request: &UpgradeRequest,
        values: &ValuesFile,
    ) -> ConsoleResult<DeployOutcome> {
        let spec = ReleaseSpec {
            namespace: request.namespace.clone(),
            release: request.release.clone(),
            values_file: values.path().to_owned(),
            chart_path: request.chart_path.clone(),
        };

        info!(release = %spec.release, namespace = %spec.namespace, "upgrading release");
        let output = self.cluster.upgrade(&spec).await?;
        Ok(upgrade_outcome(output))
    }

    /// Create the namespace if it does not exist.
    ///
    /// Creation is best effort: a failure is logged distinctly and the
    /// reconciliation continues, leaving the install itself to surface a
    /// real problem with the cluster.
    async fn ensure_namespace(&self, namespace: &str, kubeconfig: &std::path::Path) {
        let exists = assume_absent_on_error(
            self.cluster.namespace_exists(namespace, kubeconfig).await,
        );
        if exists {
            debug!(namespace = %namespace, "namespace present");
            return;
        }

        match self.cluster.create_namespace(namespace, kubeconfig).await {
            Ok(()) => info!(namespace = %namespace, "namespace created"),
            Err(e) => warn!(
                namespace = %namespace,
                error = %e,
                "namespace creation failed, continuing without it"
            ),
        }
    }
}

fn install_outcome(output: CommandOutput) -> DeployOutcome {
    if output.success {
        DeployOutcome::Install {
            output: output.stdout,
        }
    } else {
        DeployOutcome::Error {
            detail: output.stderr,
        }
    }
}

fn upgrade_outcome(output: CommandOutput) -> DeployOutcome {
    if output.success {
        DeployOutcome::Upgrade {
            output: output.stdout,
        }
    } else {
        DeployOutcome::Error {
            detail: output.stderr,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cluster::MockCluster;
    use crate::error::ConsoleError;

    fn request(values_yaml: &str) -> DeployRequest {
        DeployRequest {
            namespace: "core".to_owned(),
            release: "5gcore".to_owned(),
            chart_path: PathBuf::from("/opt/opensource-5g-core/helm-chart"),
            kubeconfig: PathBuf::from("/etc/kubernetes/admin.conf"),
            values: ConfigDocument::from_yaml_str(values_yaml).unwrap(),
        }
    }

    fn reconciler(mock: MockCluster, dir: &tempfile::TempDir) -> (Reconciler, Arc<MockCluster>) {
        let mock = Arc::new(mock);
        let workdir = ValuesWorkdir::new(dir.path().join("updated_values.yaml"));
        let reconciler = Reconciler::new(Arc::clone(&mock) as Arc<dyn ClusterBackend>, workdir);
        (reconciler, mock)
    }

    #[tokio::test]
    async fn fresh_release_is_installed() {
        let dir = tempfile::tempdir().unwrap();
        let (reconciler, mock) = reconciler(MockCluster::default().with_namespace("core"), &dir);

        let (outcome, _values) = reconciler
            .reconcile(&request("amf:\n  replicas: 1\n"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DeployOutcome::Install {
                output: "installed".to_owned()
            }
        );
        let installs = mock.installs().unwrap();
        assert_eq!(installs.len(), 1);
        assert_eq!(installs[0].release, "5gcore");
        assert!(mock.created_namespaces().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_namespace_is_created_once_before_install() {
        let dir = tempfile::tempdir().unwrap();
        let (reconciler, mock) = reconciler(MockCluster::default(), &dir);

        reconciler
            .reconcile(&request("amf:\n  replicas: 1\n"))
            .await
            .unwrap();

        assert_eq!(mock.created_namespaces().unwrap(), ["core"]);
        assert_eq!(mock.installs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn existing_release_short_circuits_to_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let (reconciler, mock) = reconciler(
            MockCluster::default()
                .with_namespace("core")
                .with_release("core", "5gcore"),
            &dir,
        );

        let (outcome, values) = reconciler
            .reconcile(&request("amf:\n  replicas: 3\n"))
            .await
            .unwrap();

        match outcome {
            DeployOutcome::ReleaseExists { message } => {
                assert!(message.contains("5gcore"));
                assert!(message.contains("core"));
            }
            other => panic!("expected ReleaseExists, got {other:?}"),
        }
        // No install, but the values were still persisted for the upgrade.
        assert!(mock.installs().unwrap().is_empty());
        assert!(values.path().exists());
    }

    #[tokio::test]
    async fn failed_release_query_fails_open_to_install() {
        let dir = tempfile::tempdir().unwrap();
        let (reconciler, mock) = reconciler(
            MockCluster::default()
                .with_namespace("core")
                .with_failing_release_queries(),
            &dir,
        );

        let (outcome, _values) = reconciler
            .reconcile(&request("amf:\n  replicas: 1\n"))
            .await
            .unwrap();

        assert!(matches!(outcome, DeployOutcome::Install { .. }));
        assert_eq!(mock.installs().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_install_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let (reconciler, _mock) = reconciler(
            MockCluster::default()
                .with_namespace("core")
                .with_install_result(CommandOutput::failed("chart not found")),
            &dir,
        );

        let (outcome, _values) = reconciler
            .reconcile(&request("amf:\n  replicas: 1\n"))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DeployOutcome::Error {
                detail: "chart not found".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn upgrade_reuses_the_persisted_values() {
        let dir = tempfile::tempdir().unwrap();
        let (reconciler, mock) = reconciler(
            MockCluster::default()
                .with_namespace("core")
                .with_release("core", "5gcore"),
            &dir,
        );

        let (_, values) = reconciler
            .reconcile(&request("amf:\n  replicas: 3\n"))
            .await
            .unwrap();

        let upgrade = UpgradeRequest {
            namespace: "core".to_owned(),
            release: "5gcore".to_owned(),
            chart_path: PathBuf::from("/opt/opensource-5g-core/helm-chart"),
        };
        let outcome = reconciler.upgrade(&upgrade, &values).await.unwrap();

        assert_eq!(
            outcome,
            DeployOutcome::Upgrade {
                output: "upgraded".to_owned()
            }
        );
        let upgrades = mock.upgrades().unwrap();
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades[0].values_file, values.path());
    }

    #[tokio::test]
    async fn failed_upgrade_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let (reconciler, _mock) = reconciler(
            MockCluster::default()
                .with_namespace("core")
                .with_upgrade_result(CommandOutput::failed("no deployed releases")),
            &dir,
        );

        let (_, values) = reconciler
            .reconcile(&request("amf:\n  replicas: 1\n"))
            .await
            .unwrap();

        let upgrade = UpgradeRequest {
            namespace: "core".to_owned(),
            release: "5gcore".to_owned(),
            chart_path: PathBuf::from("/opt/opensource-5g-core/helm-chart"),
        };
        let outcome = reconciler.upgrade(&upgrade, &values).await.unwrap();
        assert_eq!(
            outcome,
            DeployOutcome::Error {
                detail: "no deployed releases".to_owned()
            }
        );
    }

    #[test]
    fn assume_absent_on_error_maps_errors_to_false() {
        assert!(assume_absent_on_error(Ok(true)));
        assert!(!assume_absent_on_error(Ok(false)));
        assert!(!assume_absent_on_error(Err(ConsoleError::cluster(
            "query failed"
        ))));
    }
}
