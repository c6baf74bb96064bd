//! Payment reference numbers.
//!
//! The bank carries `VK_REF` through to statements so that incoming payments
//! can be matched to orders. The standard form is the order number followed by
//! a 7-3-1 weighted check digit.

const WEIGHTS: [u32; 3] = [7, 3, 1];

/// Derives a reference number from an order id.
///
/// Implementations must be deterministic: the same order id always yields the
/// same reference.
pub trait ReferenceGenerator: Send + Sync {
    /// Returns the reference for `order_id`.
    fn reference(&self, order_id: u64) -> String;
}

/// Estonian 7-3-1 reference number.
///
/// # Examples
///
/// ```
/// use ipizza_rs::reference::{ReferenceGenerator, StandardReference};
///
/// assert_eq!(StandardReference.reference(123), "1232");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardReference;

impl ReferenceGenerator for StandardReference {
    fn reference(&self, order_id: u64) -> String {
        let digits = order_id.to_string();
        format!("{}{}", digits, check_digit(&digits))
    }
}

fn check_digit(digits: &str) -> u32 {
    let sum: u32 = digits
        .bytes()
        .rev()
        .zip(WEIGHTS.iter().cycle())
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    (10 - sum % 10) % 10
}

/// Checks the trailing check digit of a reference number.
pub fn validate_reference(reference: &str) -> bool {
    if reference.len() < 2 || !reference.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (body, check) = reference.split_at(reference.len() - 1);
    check_digit(body) == u32::from(check.as_bytes()[0] - b'0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_references() {
        let generator = StandardReference;
        assert_eq!(generator.reference(123), "1232");
        assert_eq!(generator.reference(1), "13");
        assert_eq!(generator.reference(0), "00");
        assert_eq!(generator.reference(1234567), "12345672");
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("1232"));
        assert!(validate_reference("12345672"));
        assert!(!validate_reference("1233"));
        assert!(!validate_reference("1"));
        assert!(!validate_reference("12a2"));
    }

    #[test]
    fn test_generated_references_validate() {
        let generator = StandardReference;
        for order_id in [7, 42, 999, 100_000, u64::MAX] {
            assert!(validate_reference(&generator.reference(order_id)));
        }
    }
}
