//! Configuration for helmdeck-control.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{ConsoleError, ConsoleResult};

/// Top-level configuration for the console service.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConsoleConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// File locations used by the console.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Helm deployment defaults.
    #[serde(default)]
    pub helm: HelmConfig,

    /// Cluster backend configuration.
    #[serde(default)]
    pub cluster: ClusterConfig,
}

impl ConsoleConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `helmdeck.toml` in the current directory (if present)
    /// 3. Environment variables with `HELMDECK_` prefix
    pub fn load() -> ConsoleResult<Self> {
        Figment::new()
            .merge(Toml::file("helmdeck.toml"))
            .merge(Env::prefixed("HELMDECK_").split("__"))
            .extract()
            .map_err(|e| ConsoleError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> ConsoleResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("HELMDECK_").split("__"))
            .extract()
            .map_err(|e| ConsoleError::Config(e.to_string()))
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5001)
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// File locations used by the console.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// The source values document presented for editing.
    #[serde(default = "default_values_file")]
    pub values_file: PathBuf,

    /// The working file that edited values are persisted to before every
    /// install or upgrade. Overwritten, never appended.
    #[serde(default = "default_working_file")]
    pub working_file: PathBuf,
}

fn default_values_file() -> PathBuf {
    PathBuf::from("values.yaml")
}

fn default_working_file() -> PathBuf {
    PathBuf::from("updated_values.yaml")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            values_file: default_values_file(),
            working_file: default_working_file(),
        }
    }
}

/// Helm deployment defaults, used when a request omits the fields.
#[derive(Debug, Clone, Deserialize)]
pub struct HelmConfig {
    /// Target namespace.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Release name.
    #[serde(default = "default_release")]
    pub release: String,

    /// Path to the Helm chart.
    #[serde(default = "default_chart_path")]
    pub chart_path: PathBuf,

    /// Path to the kubeconfig used for namespace operations.
    #[serde(default = "default_kubeconfig")]
    pub kubeconfig: PathBuf,
}

fn default_namespace() -> String {
    "default".to_owned()
}

fn default_release() -> String {
    "5gcore".to_owned()
}

fn default_chart_path() -> PathBuf {
    PathBuf::from("/opt/opensource-5g-core/helm-chart")
}

fn default_kubeconfig() -> PathBuf {
    PathBuf::from("/etc/kubernetes/admin.conf")
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            release: default_release(),
            chart_path: default_chart_path(),
            kubeconfig: default_kubeconfig(),
        }
    }
}

/// Cluster backend configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClusterConfig {
    /// Type of backend to use.
    #[serde(default)]
    pub backend: BackendType,
}

/// Type of cluster backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// kubectl/helm command-line backend.
    #[default]
    Helm,

    /// Mock backend for testing.
    Mock,
}
