//! Merchant configuration.
//!
//! Everything the merchant side needs to know about itself: identity at the
//! bank, account, callback URL and protocol choices. Built once and shared
//! read-only by every request.

use crate::crypto::DigestAlgorithm;
use crate::errors::{IpizzaError, Result};
use crate::hash::LengthMode;
use crate::types::IPIZZA_VERSION;
use serde::{Deserialize, Serialize};
use url::Url;

/// Service used for outbound payment requests unless configured otherwise.
pub const DEFAULT_REQUEST_SERVICE: &str = "1001";

fn default_version() -> String {
    IPIZZA_VERSION.to_string()
}

fn default_request_service() -> String {
    DEFAULT_REQUEST_SERVICE.to_string()
}

/// Configuration for one merchant at one bank.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MerchantConfig {
    /// Merchant id assigned by the bank (`VK_SND_ID`)
    pub seller_id: String,

    /// Merchant name (`VK_NAME`)
    pub seller_name: String,

    /// Account receiving payments (`VK_ACC`)
    pub seller_account: String,

    /// URL the bank returns to after payment or cancellation
    pub endpoint_url: String,

    /// Protocol version (`VK_VERSION`)
    #[serde(default = "default_version")]
    pub version: String,

    /// Service id of outbound payment requests
    #[serde(default = "default_request_service")]
    pub request_service: String,

    /// Digest used with the RSA signature
    #[serde(default)]
    pub digest: DigestAlgorithm,

    /// How field lengths are counted in the hash
    #[serde(default)]
    pub length_mode: LengthMode,

    /// Value sent as `VK_ENCODING`, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl MerchantConfig {
    /// Creates a configuration with protocol defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipizza_rs::config::MerchantConfig;
    ///
    /// let config = MerchantConfig::new(
    ///     "SHOP",
    ///     "Example Shop",
    ///     "EE871600161234567892",
    ///     "https://shop.example/banklink",
    /// )
    /// .with_encoding("UTF-8");
    ///
    /// assert_eq!(config.version, "008");
    /// assert_eq!(config.request_service, "1001");
    /// ```
    pub fn new(
        seller_id: impl Into<String>,
        seller_name: impl Into<String>,
        seller_account: impl Into<String>,
        endpoint_url: impl Into<String>,
    ) -> Self {
        Self {
            seller_id: seller_id.into(),
            seller_name: seller_name.into(),
            seller_account: seller_account.into(),
            endpoint_url: endpoint_url.into(),
            version: default_version(),
            request_service: default_request_service(),
            digest: DigestAlgorithm::default(),
            length_mode: LengthMode::default(),
            encoding: None,
        }
    }

    /// Sets the protocol version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the service id used for payment requests.
    pub fn with_request_service(mut self, service: impl Into<String>) -> Self {
        self.request_service = service.into();
        self
    }

    /// Sets the signature digest.
    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    /// Sets how hash lengths are counted.
    pub fn with_length_mode(mut self, mode: LengthMode) -> Self {
        self.length_mode = mode;
        self
    }

    /// Sets `VK_ENCODING`.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Reads the configuration from `IPIZZA_*` environment variables.
    ///
    /// Required: `IPIZZA_SELLER_ID`, `IPIZZA_SELLER_NAME`,
    /// `IPIZZA_SELLER_ACCOUNT`, `IPIZZA_ENDPOINT_URL`. Optional:
    /// `IPIZZA_VERSION`, `IPIZZA_REQUEST_SERVICE`, `IPIZZA_DIGEST`,
    /// `IPIZZA_ENCODING`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| IpizzaError::ConfigError(format!("{} is not set", key)))
        };

        let mut config = Self::new(
            required("IPIZZA_SELLER_ID")?,
            required("IPIZZA_SELLER_NAME")?,
            required("IPIZZA_SELLER_ACCOUNT")?,
            required("IPIZZA_ENDPOINT_URL")?,
        );

        if let Some(version) = lookup("IPIZZA_VERSION") {
            config = config.with_version(version);
        }
        if let Some(service) = lookup("IPIZZA_REQUEST_SERVICE") {
            config = config.with_request_service(service);
        }
        if let Some(digest) = lookup("IPIZZA_DIGEST") {
            config = config.with_digest(digest.parse()?);
        }
        if let Some(encoding) = lookup("IPIZZA_ENCODING") {
            config = config.with_encoding(encoding);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that required values are present and the endpoint is an absolute URL.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("seller_id", &self.seller_id),
            ("seller_name", &self.seller_name),
            ("seller_account", &self.seller_account),
            ("version", &self.version),
        ] {
            if value.trim().is_empty() {
                return Err(IpizzaError::ConfigError(format!("{} is empty", name)));
            }
        }

        let url = Url::parse(&self.endpoint_url).map_err(|e| {
            IpizzaError::ConfigError(format!("Invalid endpoint URL {}: {}", self.endpoint_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(IpizzaError::ConfigError(format!(
                "Endpoint URL must be http(s): {}",
                self.endpoint_url
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("IPIZZA_SELLER_ID", "SHOP"),
        ("IPIZZA_SELLER_NAME", "Shop"),
        ("IPIZZA_SELLER_ACCOUNT", "EE871600161234567892"),
        ("IPIZZA_ENDPOINT_URL", "https://shop.example/banklink"),
    ];

    #[test]
    fn test_defaults() {
        let config = MerchantConfig::new("SHOP", "Shop", "EE87", "https://shop.example/cb");

        assert_eq!(config.version, IPIZZA_VERSION);
        assert_eq!(config.request_service, DEFAULT_REQUEST_SERVICE);
        assert_eq!(config.digest, DigestAlgorithm::Sha1);
        assert_eq!(config.length_mode, LengthMode::Bytes);
        assert!(config.encoding.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let mut vars = env(&REQUIRED);
        vars.insert("IPIZZA_DIGEST".to_string(), "sha256".to_string());
        vars.insert("IPIZZA_REQUEST_SERVICE".to_string(), "1011".to_string());
        vars.insert("IPIZZA_VERSION".to_string(), "009".to_string());

        let config = MerchantConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.seller_id, "SHOP");
        assert_eq!(config.digest, DigestAlgorithm::Sha256);
        assert_eq!(config.request_service, "1011");
        assert_eq!(config.version, "009");
    }

    #[test]
    fn test_from_lookup_missing_required() {
        let mut vars = env(&REQUIRED);
        vars.remove("IPIZZA_SELLER_ACCOUNT");

        let err = MerchantConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("IPIZZA_SELLER_ACCOUNT"));
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let config = MerchantConfig::new("SHOP", "Shop", "EE87", "not a url");
        assert!(matches!(config.validate(), Err(IpizzaError::ConfigError(_))));

        let config = MerchantConfig::new("SHOP", "Shop", "EE87", "ftp://shop.example/");
        assert!(config.validate().is_err());

        let config = MerchantConfig::new(" ", "Shop", "EE87", "https://shop.example/");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "seller_id": "SHOP",
            "seller_name": "Shop",
            "seller_account": "EE87",
            "endpoint_url": "https://shop.example/cb",
            "digest": "sha256"
        }"#;

        let config: MerchantConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.version, "008");
        assert_eq!(config.digest, DigestAlgorithm::Sha256);
        assert_eq!(config.length_mode, LengthMode::Bytes);
    }
}
