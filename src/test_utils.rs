//! Shared fixtures for unit tests.

use crate::config::MerchantConfig;
use crate::crypto::{sign, DigestAlgorithm, KeyMaterial};
use crate::hash::{build_hash_for, LengthMode};
use crate::registry::ServiceRegistry;
use crate::types::fields::*;
use crate::types::FieldMap;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::OnceLock;

const KEY_BITS: usize = 1024;

fn generate() -> (RsaPrivateKey, RsaPublicKey) {
    let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), KEY_BITS).unwrap();
    let public_key = RsaPublicKey::from(&private_key);
    (private_key, public_key)
}

/// Merchant key pair, generated once per test binary.
pub(crate) fn merchant_keys() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// Bank key pair, generated once per test binary.
pub(crate) fn bank_keys() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(generate)
}

/// Merchant signing key plus the bank's verification key.
pub(crate) fn merchant_key_material() -> KeyMaterial {
    KeyMaterial::new(merchant_keys().0.clone(), bank_keys().1.clone())
}

pub(crate) fn merchant_config() -> MerchantConfig {
    MerchantConfig::new("SHOP", "Test Shop OÜ", "EE871600161234567892", "https://shop.example/banklink")
}

/// A 1101 notification for order 123, signed by the bank.
pub(crate) fn success_notification() -> FieldMap {
    let fields: FieldMap = [
        (VK_SERVICE, "1101"),
        (VK_VERSION, "008"),
        (VK_SND_ID, "BANK"),
        (VK_REC_ID, "SHOP"),
        (VK_STAMP, "123"),
        (VK_T_NO, "98765"),
        (VK_AMOUNT, "10.50"),
        (VK_CURR, "EUR"),
        (VK_REC_ACC, "EE871600161234567892"),
        (VK_REC_NAME, "Test Shop OÜ"),
        (VK_SND_ACC, "EE382200221020145685"),
        (VK_SND_NAME, "Tõnu Tamm"),
        (VK_REF, "1232"),
        (VK_MSG, "test"),
        (VK_T_DATE, "15.03.2024"),
        (VK_LANG, "EST"),
        (VK_AUTO, "N"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    bank_sign(fields)
}

/// Signs `fields` with the bank key under its own `VK_SERVICE`.
pub(crate) fn bank_sign(mut fields: FieldMap) -> FieldMap {
    let registry = ServiceRegistry::ipizza();
    let service = fields[VK_SERVICE].clone();
    let hash = build_hash_for(&registry, &service, &fields, LengthMode::Bytes).unwrap();
    let mac = sign(&hash, &bank_keys().0, DigestAlgorithm::Sha1).unwrap();
    fields.insert(VK_MAC.to_string(), mac);
    fields
}
