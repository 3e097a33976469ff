use config::{Config as ConfigCrate, ConfigError};
use serde::Deserialize;

/// Main configuration structure for the Projects API server
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// The port the server will listen to (default: 7070)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Debug mode (verbose request logging)
    #[serde(default)]
    pub debug: Option<bool>,

    /// Populate the in-memory store with the demo dataset on startup
    #[serde(default)]
    pub seed: bool,

    /// Token validation configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Claims-level token validation settings.
///
/// Signature verification belongs to the STS middleware in front of this
/// service; only claim contents are checked here.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Expected `aud` claim; an empty string disables the audience check
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_port() -> u16 {
    7070
}

fn default_audience() -> String {
    "projects-api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            debug: None,
            seed: false,
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            audience: default_audience(),
        }
    }
}

impl ApiConfig {
    /// Creates a new config instance from `PROJECTS_*` environment variables
    pub fn new() -> Result<Self, String> {
        ConfigCrate::builder()
            .add_source(
                config::Environment::with_prefix("PROJECTS")
                    .prefix_separator("_")
                    .separator("_")
                    .convert_case(config::Case::Snake),
            )
            .build()
            .map_err(|e: ConfigError| e.to_string())?
            .try_deserialize()
            .map_err(|e| e.to_string())
    }
}
