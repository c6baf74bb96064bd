//! Inbound bank notifications.
//!
//! A notification is classified by its service id and then authenticated. The
//! signature decides: a message that does not verify is reported as
//! [`PaymentStatus::Error`] no matter what service id it claims.

use crate::crypto::{verify, DigestAlgorithm};
use crate::errors::{IpizzaError, Result};
use crate::hash::{build_hash, LengthMode};
use crate::registry::{ServiceDescriptor, ServiceKind, ServiceRegistry};
use crate::types::fields::*;
use crate::types::{FieldMap, PaymentDetails, PaymentResponse, PaymentStatus};
use crate::utils::{parse_amount, parse_transaction_date, parse_transaction_datetime};
use rsa::RsaPublicKey;

/// Classifies and authenticates bank notifications.
pub struct ResponseInterpreter<'a> {
    registry: &'a ServiceRegistry,
    public_key: &'a RsaPublicKey,
    digest: DigestAlgorithm,
    length_mode: LengthMode,
    expected_recipient: Option<&'a str>,
}

impl<'a> ResponseInterpreter<'a> {
    /// Creates an interpreter verifying against the bank's `public_key`.
    pub fn new(
        registry: &'a ServiceRegistry,
        public_key: &'a RsaPublicKey,
        digest: DigestAlgorithm,
        length_mode: LengthMode,
    ) -> Self {
        Self {
            registry,
            public_key,
            digest,
            length_mode,
            expected_recipient: None,
        }
    }

    /// Also require `VK_REC_ID` to equal `seller_id`.
    pub fn expect_recipient(mut self, seller_id: &'a str) -> Self {
        self.expected_recipient = Some(seller_id);
        self
    }

    /// Interprets one notification.
    pub fn interpret(&self, fields: &FieldMap) -> Result<PaymentResponse> {
        let service_id = fields
            .get(VK_SERVICE)
            .ok_or_else(|| IpizzaError::MissingField(VK_SERVICE.to_string()))?;

        let descriptor = self
            .registry
            .get(service_id)
            .filter(|d| d.kind().is_payment())
            .ok_or_else(|| IpizzaError::UnsupportedService(service_id.clone()))?;

        let mut status = if descriptor.kind() == ServiceKind::PaymentSuccess {
            PaymentStatus::Success
        } else {
            PaymentStatus::Cancel
        };

        let order_id = fields.get(VK_STAMP).cloned().unwrap_or_default();

        if !self.is_authentic(descriptor, fields) {
            tracing::warn!(
                service = %service_id,
                stamp = %order_id,
                "Bank notification failed signature verification"
            );
            status = PaymentStatus::Error;
        } else if !self.is_for_us(fields) {
            tracing::warn!(
                service = %service_id,
                stamp = %order_id,
                recipient = fields.get(VK_REC_ID).map(String::as_str).unwrap_or(""),
                "Bank notification addressed to another merchant"
            );
            status = PaymentStatus::Error;
        }

        let details = match status {
            PaymentStatus::Success => Some(self.details(descriptor, fields)?),
            _ => None,
        };
        let automatic = fields.get(VK_AUTO).map(|v| v == "Y").unwrap_or(false);

        tracing::debug!(service = %service_id, stamp = %order_id, ?status, automatic, "Interpreted bank notification");

        Ok(PaymentResponse::new(
            status,
            service_id.clone(),
            order_id,
            automatic,
            details,
        ))
    }

    fn is_authentic(&self, descriptor: &ServiceDescriptor, fields: &FieldMap) -> bool {
        let Some(mac) = fields.get(VK_MAC) else {
            tracing::debug!("Notification has no {}", VK_MAC);
            return false;
        };

        match build_hash(descriptor, fields, self.length_mode) {
            Ok(hash) => verify(&hash, mac, self.public_key, self.digest),
            Err(e) => {
                tracing::debug!("Cannot rebuild notification hash: {}", e);
                false
            }
        }
    }

    fn is_for_us(&self, fields: &FieldMap) -> bool {
        match self.expected_recipient {
            Some(expected) => fields.get(VK_REC_ID).map(|r| r == expected).unwrap_or(false),
            None => true,
        }
    }

    /// Reads payment details. Only called once `fields` verified against
    /// `descriptor`, and the date comes from whichever date field it signs.
    fn details(&self, descriptor: &ServiceDescriptor, fields: &FieldMap) -> Result<PaymentDetails> {
        let get = |name: &str| {
            fields
                .get(name)
                .cloned()
                .ok_or_else(|| IpizzaError::MissingField(name.to_string()))
        };

        let transaction_date = if descriptor.hashes(VK_T_DATETIME) {
            parse_transaction_datetime(&get(VK_T_DATETIME)?)?
        } else if descriptor.hashes(VK_T_DATE) {
            parse_transaction_date(&get(VK_T_DATE)?)?
        } else {
            return Err(IpizzaError::MissingField(VK_T_DATE.to_string()));
        };

        Ok(PaymentDetails {
            sum: parse_amount(&get(VK_AMOUNT)?)?,
            currency: get(VK_CURR)?,
            sender_name: get(VK_SND_NAME)?,
            sender_account: get(VK_SND_ACC)?,
            transaction_id: get(VK_T_NO)?,
            transaction_date,
        })
    }
}
