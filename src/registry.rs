//! Service registry.
//!
//! Maps a service id (`VK_SERVICE`) to its kind and to the ordered list of
//! fields that participate in the signature. The order is part of the
//! protocol; it is never derived from the field map.

use crate::types::fields::*;
use std::collections::HashMap;

/// Role a service plays in the payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Merchant to bank payment request
    PaymentRequest,
    /// Bank to merchant notification of a completed payment
    PaymentSuccess,
    /// Bank to merchant notification of a cancelled payment
    PaymentCancel,
}

impl ServiceKind {
    /// Returns true for payment outcome notifications.
    pub fn is_payment(&self) -> bool {
        matches!(self, ServiceKind::PaymentSuccess | ServiceKind::PaymentCancel)
    }
}

/// Immutable description of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    id: String,
    kind: ServiceKind,
    fields: Vec<String>,
}

impl ServiceDescriptor {
    /// Creates a descriptor. `fields` is the hash order.
    ///
    /// Field names may come from constants or from a table loaded at runtime.
    pub fn new<I, S>(id: impl Into<String>, kind: ServiceKind, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            kind,
            fields: fields.into_iter().map(|f| f.as_ref().to_string()).collect(),
        }
    }

    /// Service id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Service kind.
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    /// Field names in hash order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns true if `field` participates in the hash.
    pub fn hashes(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

/// Lookup table of service descriptors.
///
/// Built once and then shared read-only; there is no global instance.
///
/// # Examples
///
/// ```
/// use ipizza_rs::registry::{ServiceKind, ServiceRegistry};
///
/// let registry = ServiceRegistry::ipizza();
/// assert!(registry.is_payment_service("1101"));
/// assert!(!registry.is_payment_service("1001"));
/// assert_eq!(registry.get("1901").unwrap().kind(), ServiceKind::PaymentCancel);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor, replacing any previous one with the same id.
    pub fn register(mut self, descriptor: ServiceDescriptor) -> Self {
        self.services.insert(descriptor.id.clone(), descriptor);
        self
    }

    /// Standard iPizza services: payment requests 1001/1002 and 1011/1012,
    /// success notifications 1101/1111, cancel notifications 1901/1911.
    pub fn ipizza() -> Self {
        Self::new()
            .register(ServiceDescriptor::new(
                "1001",
                ServiceKind::PaymentRequest,
                &[
                    VK_SERVICE, VK_VERSION, VK_SND_ID, VK_STAMP, VK_AMOUNT, VK_CURR, VK_ACC,
                    VK_NAME, VK_REF, VK_MSG,
                ],
            ))
            .register(ServiceDescriptor::new(
                "1002",
                ServiceKind::PaymentRequest,
                &[
                    VK_SERVICE, VK_VERSION, VK_SND_ID, VK_STAMP, VK_AMOUNT, VK_CURR, VK_REF,
                    VK_MSG,
                ],
            ))
            .register(ServiceDescriptor::new(
                "1011",
                ServiceKind::PaymentRequest,
                &[
                    VK_SERVICE, VK_VERSION, VK_SND_ID, VK_STAMP, VK_AMOUNT, VK_CURR, VK_ACC,
                    VK_NAME, VK_REF, VK_MSG, VK_RETURN, VK_CANCEL, VK_DATETIME,
                ],
            ))
            .register(ServiceDescriptor::new(
                "1012",
                ServiceKind::PaymentRequest,
                &[
                    VK_SERVICE, VK_VERSION, VK_SND_ID, VK_STAMP, VK_AMOUNT, VK_CURR, VK_REF,
                    VK_MSG, VK_RETURN, VK_CANCEL, VK_DATETIME,
                ],
            ))
            .register(ServiceDescriptor::new(
                "1101",
                ServiceKind::PaymentSuccess,
                &[
                    VK_SERVICE, VK_VERSION, VK_SND_ID, VK_REC_ID, VK_STAMP, VK_T_NO, VK_AMOUNT,
                    VK_CURR, VK_REC_ACC, VK_REC_NAME, VK_SND_ACC, VK_SND_NAME, VK_REF, VK_MSG,
                    VK_T_DATE,
                ],
            ))
            .register(ServiceDescriptor::new(
                "1111",
                ServiceKind::PaymentSuccess,
                &[
                    VK_SERVICE, VK_VERSION, VK_SND_ID, VK_REC_ID, VK_STAMP, VK_T_NO, VK_AMOUNT,
                    VK_CURR, VK_REC_ACC, VK_REC_NAME, VK_SND_ACC, VK_SND_NAME, VK_REF, VK_MSG,
                    VK_T_DATETIME,
                ],
            ))
            .register(ServiceDescriptor::new(
                "1901",
                ServiceKind::PaymentCancel,
                &[VK_SERVICE, VK_VERSION, VK_SND_ID, VK_REC_ID, VK_STAMP, VK_REF, VK_MSG],
            ))
            .register(ServiceDescriptor::new(
                "1911",
                ServiceKind::PaymentCancel,
                &[VK_SERVICE, VK_VERSION, VK_SND_ID, VK_REC_ID, VK_STAMP, VK_REF, VK_MSG],
            ))
    }

    /// Looks up a descriptor.
    pub fn get(&self, service_id: &str) -> Option<&ServiceDescriptor> {
        self.services.get(service_id)
    }

    /// Returns true if the id is registered as a success or cancel notification.
    pub fn is_payment_service(&self, service_id: &str) -> bool {
        self.get(service_id)
            .map(|d| d.kind().is_payment())
            .unwrap_or(false)
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
