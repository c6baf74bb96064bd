//! Core type definitions for the iPizza protocol.
//!
//! This module contains the field map exchanged with the bank, the protocol
//! field names, and the typed result of interpreting a bank notification.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default protocol version sent in `VK_VERSION`.
pub const IPIZZA_VERSION: &str = "008";

/// Flat mapping of protocol field names to values.
///
/// Field order carries no meaning on the wire; the order that matters for
/// signing comes from the [`ServiceDescriptor`](crate::registry::ServiceDescriptor).
pub type FieldMap = BTreeMap<String, String>;

/// Protocol field names.
///
/// These must match the bank's spelling byte for byte.
pub mod fields {
    /// Service (message type) identifier
    pub const VK_SERVICE: &str = "VK_SERVICE";
    /// Protocol version
    pub const VK_VERSION: &str = "VK_VERSION";
    /// Sender id: the merchant in requests, the bank in notifications
    pub const VK_SND_ID: &str = "VK_SND_ID";
    /// Recipient id
    pub const VK_REC_ID: &str = "VK_REC_ID";
    /// Merchant order id
    pub const VK_STAMP: &str = "VK_STAMP";
    /// Bank transaction number
    pub const VK_T_NO: &str = "VK_T_NO";
    /// Amount
    pub const VK_AMOUNT: &str = "VK_AMOUNT";
    /// Currency code
    pub const VK_CURR: &str = "VK_CURR";
    /// Merchant account in requests
    pub const VK_ACC: &str = "VK_ACC";
    /// Merchant name in requests
    pub const VK_NAME: &str = "VK_NAME";
    /// Recipient account in notifications
    pub const VK_REC_ACC: &str = "VK_REC_ACC";
    /// Recipient name in notifications
    pub const VK_REC_NAME: &str = "VK_REC_NAME";
    /// Payer account
    pub const VK_SND_ACC: &str = "VK_SND_ACC";
    /// Payer name
    pub const VK_SND_NAME: &str = "VK_SND_NAME";
    /// Payment reference number
    pub const VK_REF: &str = "VK_REF";
    /// Payment description
    pub const VK_MSG: &str = "VK_MSG";
    /// Transaction date, `dd.mm.yyyy`
    pub const VK_T_DATE: &str = "VK_T_DATE";
    /// Transaction date and time, ISO 8601 with offset
    pub const VK_T_DATETIME: &str = "VK_T_DATETIME";
    /// Request creation time
    pub const VK_DATETIME: &str = "VK_DATETIME";
    /// Return URL after payment
    pub const VK_RETURN: &str = "VK_RETURN";
    /// Return URL after cancellation
    pub const VK_CANCEL: &str = "VK_CANCEL";
    /// User interface language
    pub const VK_LANG: &str = "VK_LANG";
    /// Character encoding of the message
    pub const VK_ENCODING: &str = "VK_ENCODING";
    /// `Y` for automatic bank-to-merchant callbacks
    pub const VK_AUTO: &str = "VK_AUTO";
    /// Base64 signature
    pub const VK_MAC: &str = "VK_MAC";
}

/// Outcome of a bank notification.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Bank confirmed the payment and the signature is authentic
    Success,
    /// Payer cancelled and the signature is authentic
    Cancel,
    /// Signature did not verify; nothing in the message can be trusted
    Error,
}

/// Financial details of a confirmed payment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PaymentDetails {
    /// Amount paid
    pub sum: Decimal,

    /// Currency code (e.g. "EUR")
    pub currency: String,

    /// Payer name
    pub sender_name: String,

    /// Payer account number
    pub sender_account: String,

    /// Bank transaction number
    pub transaction_id: String,

    /// Transaction date as stated by the bank
    pub transaction_date: NaiveDateTime,
}

/// Interpreted bank notification.
///
/// Financial details are only present for [`PaymentStatus::Success`].
///
/// # Examples
///
/// ```
/// use ipizza_rs::types::{PaymentResponse, PaymentStatus};
///
/// let response = PaymentResponse::new(PaymentStatus::Cancel, "1901", "123", false, None);
/// assert!(response.details().is_none());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "RawPaymentResponse")]
pub struct PaymentResponse {
    status: PaymentStatus,

    #[serde(rename = "service")]
    service_id: String,

    order_id: String,

    #[serde(rename = "auto")]
    automatic: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<PaymentDetails>,
}

/// Wire form of [`PaymentResponse`]; deserialized values go through
/// [`PaymentResponse::new`] so details never survive a non-success status.
#[derive(Deserialize)]
struct RawPaymentResponse {
    status: PaymentStatus,

    #[serde(rename = "service")]
    service_id: String,

    order_id: String,

    #[serde(rename = "auto")]
    automatic: bool,

    #[serde(default)]
    details: Option<PaymentDetails>,
}

impl From<RawPaymentResponse> for PaymentResponse {
    fn from(raw: RawPaymentResponse) -> Self {
        PaymentResponse::new(
            raw.status,
            raw.service_id,
            raw.order_id,
            raw.automatic,
            raw.details,
        )
    }
}

impl PaymentResponse {
    /// Creates a response. Details passed with a non-success status are dropped.
    pub fn new(
        status: PaymentStatus,
        service_id: impl Into<String>,
        order_id: impl Into<String>,
        automatic: bool,
        details: Option<PaymentDetails>,
    ) -> Self {
        let details = if status == PaymentStatus::Success {
            details
        } else {
            None
        };
        Self {
            status,
            service_id: service_id.into(),
            order_id: order_id.into(),
            automatic,
            details,
        }
    }

    /// Final status of the notification.
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Returns true for an authentic success notification.
    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Success
    }

    /// Service id the bank claimed.
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Merchant order id (`VK_STAMP`). Empty if the bank omitted it.
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Whether the bank flagged this as an automatic server-to-server callback.
    pub fn is_automatic(&self) -> bool {
        self.automatic
    }

    /// Payment details, only for successful payments.
    pub fn details(&self) -> Option<&PaymentDetails> {
        self.details.as_ref()
    }

    /// Amount paid.
    pub fn sum(&self) -> Option<Decimal> {
        self.details.as_ref().map(|d| d.sum)
    }

    /// Currency code.
    pub fn currency(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.currency.as_str())
    }

    /// Payer name.
    pub fn sender_name(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.sender_name.as_str())
    }

    /// Payer account number.
    pub fn sender_account(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.sender_account.as_str())
    }

    /// Bank transaction number.
    pub fn transaction_id(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.transaction_id.as_str())
    }

    /// Transaction date.
    pub fn transaction_date(&self) -> Option<NaiveDateTime> {
        self.details.as_ref().map(|d| d.transaction_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn details() -> PaymentDetails {
        PaymentDetails {
            sum: dec!(10.50),
            currency: "EUR".to_string(),
            sender_name: "Tõnu Tamm".to_string(),
            sender_account: "EE382200221020145685".to_string(),
            transaction_id: "1234".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_success_exposes_details() {
        let response = PaymentResponse::new(PaymentStatus::Success, "1101", "123", false, Some(details()));

        assert!(response.is_successful());
        assert_eq!(response.sum(), Some(dec!(10.50)));
        assert_eq!(response.currency(), Some("EUR"));
        assert_eq!(response.transaction_id(), Some("1234"));
    }

    #[test]
    fn test_non_success_drops_details() {
        let response = PaymentResponse::new(PaymentStatus::Error, "1101", "123", false, Some(details()));

        assert_eq!(response.status(), PaymentStatus::Error);
        assert!(response.details().is_none());
        assert!(response.sum().is_none());
        assert!(response.sender_name().is_none());
    }

    #[test]
    fn test_response_serialization() {
        let response = PaymentResponse::new(PaymentStatus::Cancel, "1901", "77", true, None);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"cancel\""));
        assert!(json.contains("\"service\":\"1901\""));
        assert!(!json.contains("details"));

        let deserialized: PaymentResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, response);
    }

    #[test]
    fn test_deserialized_error_drops_details() {
        let json = r#"{
            "status": "error",
            "service": "1101",
            "order_id": "123",
            "auto": false,
            "details": {
                "sum": "10.50",
                "currency": "EUR",
                "sender_name": "Tõnu Tamm",
                "sender_account": "EE382200221020145685",
                "transaction_id": "1234",
                "transaction_date": "2024-03-15T00:00:00"
            }
        }"#;

        let response: PaymentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status(), PaymentStatus::Error);
        assert!(response.details().is_none());
        assert!(response.sum().is_none());
    }

    #[test]
    fn test_success_round_trips_details() {
        let response = PaymentResponse::new(PaymentStatus::Success, "1101", "123", false, Some(details()));

        let json = serde_json::to_string(&response).unwrap();
        let deserialized: PaymentResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, response);
        assert_eq!(deserialized.sum(), Some(dec!(10.50)));
    }
}
