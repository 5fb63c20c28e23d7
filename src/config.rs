//! Configuration types for the shared-list client.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Campaign Management endpoint in production.
pub const PRODUCTION_ENDPOINT: &str =
    "https://campaign.api.bingads.microsoft.com/Api/Advertiser/CampaignManagement/v13/CampaignManagementService.svc";

/// Campaign Management endpoint in the sandbox.
pub const SANDBOX_ENDPOINT: &str =
    "https://campaign.api.sandbox.bingads.microsoft.com/Api/Advertiser/CampaignManagement/v13/CampaignManagementService.svc";

/// The only config format version this crate reads.
pub const CONFIG_VERSION: &str = "1";

/// Main configuration for the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Config format version, must be [`CONFIG_VERSION`]
    pub version: String,

    /// Credentials sent in every request header
    pub auth: AuthConfig,

    /// Endpoint and call settings
    pub api: ApiConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            auth: AuthConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            auth,
            ..Default::default()
        }
    }

    /// Parse a YAML document. The result is not validated.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(ClientError::Config(format!(
                "unsupported config version {:?}, expected {:?}",
                self.version, CONFIG_VERSION
            )));
        }
        self.auth.validate()?;
        if self.api.timeout_secs == 0 {
            return Err(ClientError::Config(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(endpoint) = &self.api.endpoint {
            if endpoint.trim().is_empty() {
                return Err(ClientError::Config("api.endpoint is empty".to_string()));
            }
        }
        Ok(())
    }

    /// Endpoint the client posts to.
    pub fn endpoint(&self) -> &str {
        self.api.endpoint()
    }
}

/// Credentials of the calling user and account.
///
/// An access token is expected to be obtained beforehand; the client never
/// refreshes it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub developer_token: String,

    /// OAuth access token
    pub authentication_token: String,

    pub customer_id: String,

    pub customer_account_id: String,
}

impl AuthConfig {
    pub fn new(
        developer_token: impl Into<String>,
        authentication_token: impl Into<String>,
        customer_id: impl Into<String>,
        customer_account_id: impl Into<String>,
    ) -> Self {
        Self {
            developer_token: developer_token.into(),
            authentication_token: authentication_token.into(),
            customer_id: customer_id.into(),
            customer_account_id: customer_account_id.into(),
        }
    }

    /// All four credentials are required.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("auth.developer_token", &self.developer_token),
            ("auth.authentication_token", &self.authentication_token),
            ("auth.customer_id", &self.customer_id),
            ("auth.customer_account_id", &self.customer_account_id),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ClientError::Config(format!("{name} is required")));
            }
        }
        Ok(())
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("developer_token", &"<redacted>")
            .field("authentication_token", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .field("customer_account_id", &self.customer_account_id)
            .finish()
    }
}

/// Endpoint and call settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Target environment
    pub environment: Environment,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Log raw request and response bodies at debug level
    pub debug: bool,

    /// Overrides the environment's endpoint when set
    pub endpoint: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            timeout_secs: 30,
            debug: false,
            endpoint: None,
        }
    }
}

impl ApiConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.environment.endpoint())
    }
}

/// API environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Sandbox,
}

impl Environment {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_ENDPOINT,
            Self::Sandbox => SANDBOX_ENDPOINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    fn auth() -> AuthConfig {
        AuthConfig::new("dev-token", "access-token", "1001", "2002")
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.version, "1");
        assert_eq!(config.api.environment, Environment::Production);
        assert_eq!(config.api.timeout_secs, 30);
        assert!(!config.api.debug);
        assert_eq!(config.endpoint(), PRODUCTION_ENDPOINT);
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
version: "1"
auth:
  developer_token: dev-token
  authentication_token: access-token
  customer_id: "1001"
  customer_account_id: "2002"
api:
  environment: sandbox
  timeout_secs: 10
"#;
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.auth, auth());
        assert_eq!(config.api.environment, Environment::Sandbox);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.endpoint(), SANDBOX_ENDPOINT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_override() {
        let mut config = ClientConfig::new(auth());
        config.api.endpoint = Some("http://127.0.0.1:9999/svc".to_string());
        assert_eq!(config.endpoint(), "http://127.0.0.1:9999/svc");
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let mut config = ClientConfig::new(auth());
        config.auth.customer_account_id.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("auth.customer_account_id"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ClientConfig::new(auth());
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_version() {
        let mut config = ClientConfig::new(auth());
        config.version = "2".to_string();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("config version"));

        let yaml = "version: \"0\"\nauth:\n  developer_token: d\n  authentication_token: a\n  customer_id: c\n  customer_account_id: ca\n";
        assert!(ClientConfig::from_yaml_str(yaml).unwrap().validate().is_err());
    }

    #[test]
    fn test_unknown_environment() {
        let err = ClientConfig::from_yaml_str("api:\n  environment: staging\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", auth());
        assert!(!rendered.contains("access-token"));
        assert!(rendered.contains("1001"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "auth:\n  developer_token: d\n  authentication_token: a\n  customer_id: c\n  customer_account_id: ca"
        )
        .unwrap();
        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.auth.customer_account_id, "ca");

        let missing = ClientConfig::load("/nonexistent/client.yaml").unwrap_err();
        assert!(matches!(missing, ClientError::Io(_)));
    }
}
