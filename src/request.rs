//! Outbound payment requests.
//!
//! Builds the field map the merchant posts to the bank. The signature is
//! computed last, over the fields the request service's descriptor lists.

use crate::config::MerchantConfig;
use crate::crypto::sign;
use crate::errors::Result;
use crate::hash::build_hash;
use crate::reference::ReferenceGenerator;
use crate::registry::ServiceDescriptor;
use crate::types::fields::*;
use crate::types::FieldMap;
use crate::utils::{current_datetime, format_amount};
use rsa::RsaPrivateKey;
use rust_decimal::Decimal;

/// Assembles and signs payment requests for one merchant.
pub struct RequestBuilder<'a> {
    config: &'a MerchantConfig,
    descriptor: &'a ServiceDescriptor,
    private_key: &'a RsaPrivateKey,
    references: &'a dyn ReferenceGenerator,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder for the request service described by `descriptor`.
    pub fn new(
        config: &'a MerchantConfig,
        descriptor: &'a ServiceDescriptor,
        private_key: &'a RsaPrivateKey,
        references: &'a dyn ReferenceGenerator,
    ) -> Self {
        Self {
            config,
            descriptor,
            private_key,
            references,
        }
    }

    /// Builds a signed payment request.
    pub fn build(
        &self,
        order_id: u64,
        sum: Decimal,
        message: &str,
        language: &str,
        currency: &str,
    ) -> Result<FieldMap> {
        let config = self.config;
        let amount = format_amount(sum)?;

        let mut fields = FieldMap::new();
        let mut set = |name: &str, value: String| {
            fields.insert(name.to_string(), value);
        };

        set(VK_SERVICE, self.descriptor.id().to_string());
        set(VK_VERSION, config.version.clone());
        set(VK_SND_ID, config.seller_id.clone());
        set(VK_STAMP, order_id.to_string());
        set(VK_AMOUNT, amount.clone());
        set(VK_CURR, currency.to_string());
        set(VK_ACC, config.seller_account.clone());
        set(VK_NAME, config.seller_name.clone());
        set(VK_REF, self.references.reference(order_id));
        set(VK_MSG, message.to_string());
        set(VK_RETURN, config.endpoint_url.clone());
        set(VK_CANCEL, config.endpoint_url.clone());
        set(VK_LANG, language.to_string());
        if let Some(encoding) = &config.encoding {
            set(VK_ENCODING, encoding.clone());
        }
        if self.descriptor.hashes(VK_DATETIME) {
            set(VK_DATETIME, current_datetime());
        }

        let hash = build_hash(self.descriptor, &fields, config.length_mode)?;
        let mac = sign(&hash, self.private_key, config.digest)?;
        fields.insert(VK_MAC.to_string(), mac);

        tracing::debug!(
            service = self.descriptor.id(),
            stamp = order_id,
            amount = %amount,
            currency,
            "Prepared payment request"
        );

        Ok(fields)
    }
}
