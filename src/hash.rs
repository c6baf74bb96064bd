//! Canonical hash input.
//!
//! For each field of a service, in descriptor order, the value is written as a
//! three digit zero-padded length followed by the value itself. Nothing
//! separates the fields. These bytes are what gets signed and verified.

use crate::errors::{IpizzaError, Result};
use crate::registry::{ServiceDescriptor, ServiceRegistry};
use crate::types::FieldMap;
use serde::{Deserialize, Serialize};

/// Largest value length representable in the prefix.
pub const MAX_FIELD_LEN: usize = 999;

/// How a value's length is counted for its prefix.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthMode {
    /// UTF-8 byte length
    #[default]
    Bytes,
    /// Unicode scalar count, used by some banks with `VK_ENCODING=UTF-8`
    Chars,
}

impl LengthMode {
    fn measure(&self, value: &str) -> usize {
        match self {
            LengthMode::Bytes => value.len(),
            LengthMode::Chars => value.chars().count(),
        }
    }
}

/// Builds the canonical hash input for `descriptor` over `fields`.
///
/// # Examples
///
/// ```
/// use ipizza_rs::hash::{build_hash, LengthMode};
/// use ipizza_rs::registry::{ServiceDescriptor, ServiceKind};
/// use ipizza_rs::types::FieldMap;
///
/// let descriptor = ServiceDescriptor::new("1", ServiceKind::PaymentRequest, &["A", "B"]);
/// let mut fields = FieldMap::new();
/// fields.insert("A".to_string(), "xy".to_string());
/// fields.insert("B".to_string(), String::new());
///
/// let hash = build_hash(&descriptor, &fields, LengthMode::Bytes).unwrap();
/// assert_eq!(hash, b"002xy000");
/// ```
pub fn build_hash(
    descriptor: &ServiceDescriptor,
    fields: &FieldMap,
    mode: LengthMode,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    for name in descriptor.fields() {
        let value = fields
            .get(name.as_str())
            .ok_or_else(|| IpizzaError::MissingField(name.clone()))?;

        let len = mode.measure(value);
        if len > MAX_FIELD_LEN {
            return Err(IpizzaError::FieldTooLong {
                field: name.clone(),
                len,
            });
        }

        buf.extend_from_slice(format!("{:03}", len).as_bytes());
        buf.extend_from_slice(value.as_bytes());
    }

    Ok(buf)
}

/// Resolves `service_id` in `registry` and builds its hash input.
pub fn build_hash_for(
    registry: &ServiceRegistry,
    service_id: &str,
    fields: &FieldMap,
    mode: LengthMode,
) -> Result<Vec<u8>> {
    let descriptor = registry
        .get(service_id)
        .ok_or_else(|| IpizzaError::UnknownService(service_id.to_string()))?;
    build_hash(descriptor, fields, mode)
}
