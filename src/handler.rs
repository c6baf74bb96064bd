//! Merchant-side protocol handler.
//!
//! [`Banklink`] ties configuration, the service registry and key material
//! together. It holds no mutable state, so one instance can serve any number
//! of concurrent callers.

use crate::config::MerchantConfig;
use crate::crypto::KeyMaterial;
use crate::errors::{IpizzaError, Result};
use crate::reference::{ReferenceGenerator, StandardReference};
use crate::registry::{ServiceKind, ServiceRegistry};
use crate::request::RequestBuilder;
use crate::response::ResponseInterpreter;
use crate::types::{FieldMap, PaymentResponse};
use rust_decimal::Decimal;
use std::sync::Arc;

/// iPizza protocol handler for one merchant at one bank.
///
/// # Examples
///
/// ```no_run
/// use ipizza_rs::{Banklink, KeyMaterial, MerchantConfig, ServiceRegistry};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MerchantConfig::new(
///     "SHOP",
///     "Example Shop",
///     "EE871600161234567892",
///     "https://shop.example/banklink",
/// );
/// let keys = KeyMaterial::from_files("merchant_key.pem", "bank_cert.pem")?;
/// let banklink = Banklink::new(config, Arc::new(ServiceRegistry::ipizza()), keys)?;
///
/// let fields = banklink.prepare_request(123, Decimal::from_str("10.50")?, "Order 123", "EST", "EUR")?;
/// assert!(fields.contains_key("VK_MAC"));
/// # Ok(())
/// # }
/// ```
pub struct Banklink {
    config: MerchantConfig,
    registry: Arc<ServiceRegistry>,
    keys: KeyMaterial,
    references: Box<dyn ReferenceGenerator>,
    check_recipient: bool,
}

impl Banklink {
    /// Creates a handler.
    ///
    /// Fails with `ConfigError` if the configuration is invalid or its request
    /// service is not registered as a payment request.
    pub fn new(
        config: MerchantConfig,
        registry: Arc<ServiceRegistry>,
        keys: KeyMaterial,
    ) -> Result<Self> {
        config.validate()?;

        match registry.get(&config.request_service).map(|d| d.kind()) {
            Some(ServiceKind::PaymentRequest) => {}
            Some(_) => {
                return Err(IpizzaError::ConfigError(format!(
                    "Service {} is not a payment request",
                    config.request_service
                )))
            }
            None => {
                return Err(IpizzaError::ConfigError(format!(
                    "Request service {} is not registered",
                    config.request_service
                )))
            }
        }

        tracing::debug!(
            seller = %config.seller_id,
            service = %config.request_service,
            version = %config.version,
            "Banklink handler ready"
        );

        Ok(Self {
            config,
            registry,
            keys,
            references: Box::new(StandardReference),
            check_recipient: false,
        })
    }

    /// Replaces the reference number generator.
    pub fn with_reference_generator(mut self, generator: impl ReferenceGenerator + 'static) -> Self {
        self.references = Box::new(generator);
        self
    }

    /// Treat notifications whose `VK_REC_ID` is not our seller id as forged.
    pub fn expect_recipient(mut self, enabled: bool) -> Self {
        self.check_recipient = enabled;
        self
    }

    /// Builds a signed payment request ready to be posted to the bank.
    pub fn prepare_request(
        &self,
        order_id: u64,
        sum: Decimal,
        message: &str,
        language: &str,
        currency: &str,
    ) -> Result<FieldMap> {
        let descriptor = self
            .registry
            .get(&self.config.request_service)
            .ok_or_else(|| IpizzaError::UnknownService(self.config.request_service.clone()))?;

        RequestBuilder::new(
            &self.config,
            descriptor,
            self.keys.private_key(),
            self.references.as_ref(),
        )
        .build(order_id, sum, message, language, currency)
    }

    /// Classifies and authenticates a bank notification.
    pub fn interpret_response(&self, fields: &FieldMap) -> Result<PaymentResponse> {
        let interpreter = ResponseInterpreter::new(
            &self.registry,
            self.keys.public_key(),
            self.config.digest,
            self.config.length_mode,
        );
        let interpreter = if self.check_recipient {
            interpreter.expect_recipient(&self.config.seller_id)
        } else {
            interpreter
        };
        interpreter.interpret(fields)
    }

    /// Merchant configuration.
    pub fn config(&self) -> &MerchantConfig {
        &self.config
    }

    /// Service registry.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{merchant_config, merchant_key_material, success_notification};
    use crate::types::fields::*;
    use crate::types::PaymentStatus;
    use rust_decimal_macros::dec;

    struct FixedReference;

    impl ReferenceGenerator for FixedReference {
        fn reference(&self, _order_id: u64) -> String {
            "55".to_string()
        }
    }

    fn banklink() -> Banklink {
        Banklink::new(
            merchant_config(),
            Arc::new(ServiceRegistry::ipizza()),
            merchant_key_material(),
        )
        .unwrap()
    }

    #[test]
    fn test_handler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Banklink>();
    }

    #[test]
    fn test_rejects_non_request_service() {
        let config = merchant_config().with_request_service("1101");
        let err = Banklink::new(config, Arc::new(ServiceRegistry::ipizza()), merchant_key_material())
            .err()
            .unwrap();
        assert!(matches!(err, IpizzaError::ConfigError(_)));

        let config = merchant_config().with_request_service("7777");
        let result = Banklink::new(config, Arc::new(ServiceRegistry::ipizza()), merchant_key_material());
        assert!(result.is_err());
    }

    #[test]
    fn test_prepare_and_interpret() {
        let banklink = banklink();

        let request = banklink.prepare_request(123, dec!(10.50), "test", "EST", "EUR").unwrap();
        assert_eq!(request[VK_SERVICE], "1001");
        assert_eq!(request[VK_STAMP], "123");

        let response = banklink.interpret_response(&success_notification()).unwrap();
        assert_eq!(response.status(), PaymentStatus::Success);
    }

    #[test]
    fn test_custom_reference_generator() {
        let banklink = banklink().with_reference_generator(FixedReference);
        let request = banklink.prepare_request(1, dec!(1), "x", "ENG", "EUR").unwrap();
        assert_eq!(request[VK_REF], "55");
    }

    #[test]
    fn test_expect_recipient() {
        let config = merchant_config();
        let other = MerchantConfig {
            seller_id: "OTHER".to_string(),
            ..config
        };
        let banklink = Banklink::new(other, Arc::new(ServiceRegistry::ipizza()), merchant_key_material())
            .unwrap()
            .expect_recipient(true);

        let response = banklink.interpret_response(&success_notification()).unwrap();
        assert_eq!(response.status(), PaymentStatus::Error);
    }
}
