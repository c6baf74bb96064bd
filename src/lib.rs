//! # ipizza-rs
//!
//! Merchant-side implementation of the iPizza bank payment protocol, the
//! "banklink" used by Baltic banks to initiate card-less payments.
//!
//! The merchant posts a set of `VK_*` fields to the bank, signed with the
//! merchant's RSA key. After the payer confirms or cancels, the bank posts a
//! notification back, signed with the bank's key. This crate builds the first
//! and authenticates the second. It does no HTTP of its own.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ipizza_rs::{Banklink, KeyMaterial, MerchantConfig, PaymentStatus, ServiceRegistry};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! # fn example(callback: ipizza_rs::FieldMap) -> Result<(), Box<dyn std::error::Error>> {
//! let config = MerchantConfig::from_env()?;
//! let keys = KeyMaterial::from_files("merchant_key.pem", "bank_cert.pem")?;
//! let banklink = Banklink::new(config, Arc::new(ServiceRegistry::ipizza()), keys)?;
//!
//! // Outbound: render these as hidden form fields posted to the bank.
//! let request = banklink.prepare_request(123, Decimal::new(1050, 2), "Order 123", "EST", "EUR")?;
//!
//! // Inbound: the fields the bank posted to the endpoint URL.
//! let response = banklink.interpret_response(&callback)?;
//! if response.status() == PaymentStatus::Success {
//!     println!("Paid {:?} {:?}", response.sum(), response.currency());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Protocol Overview
//!
//! 1. **Merchant builds a request**: service `1001`, order id in `VK_STAMP`,
//!    amount, reference number and return URLs
//! 2. **Merchant signs it**: canonical hash of the service's fields, RSA
//!    signature in `VK_MAC`
//! 3. **Payer confirms at the bank**
//! 4. **Bank notifies the merchant**: service `1101` for success or `1901`
//!    for cancellation, signed by the bank
//! 5. **Merchant authenticates the notification**: an invalid signature
//!    turns any claimed outcome into [`PaymentStatus::Error`]
//!
//! ## Canonical Hash
//!
//! Each field listed for the service is written, in the listed order, as its
//! length in three zero-padded digits followed by the value. Values longer
//! than 999 cannot be encoded and are rejected.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handler;
pub mod hash;
pub mod reference;
pub mod registry;
pub mod request;
pub mod response;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used items
pub use config::MerchantConfig;
pub use crypto::{DigestAlgorithm, KeyMaterial};
pub use errors::{IpizzaError, Result};
pub use handler::Banklink;
pub use hash::LengthMode;
pub use reference::{ReferenceGenerator, StandardReference};
pub use registry::{ServiceDescriptor, ServiceKind, ServiceRegistry};
pub use types::{FieldMap, PaymentDetails, PaymentResponse, PaymentStatus, IPIZZA_VERSION};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(IPIZZA_VERSION, "008");
    }

    #[test]
    fn test_module_accessibility() {
        let _ = MerchantConfig::new("SHOP", "Shop", "EE87", "https://shop.example/");
        let _ = ServiceRegistry::ipizza();
        let _ = StandardReference.reference(1);
    }
}
