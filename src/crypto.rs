//! Signing and verification of canonical hash input.
//!
//! Signatures are RSASSA-PKCS1-v1_5 over a digest of the hash input,
//! carried as standard base64 in `VK_MAC`.

use crate::errors::{IpizzaError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha1::Digest;
use std::fmt;
use std::path::Path;
use x509_cert::der::{DecodePem, Encode};
use x509_cert::Certificate;

/// Message digest applied before RSA signing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-1, used by protocol version 008
    #[default]
    Sha1,
    /// SHA-256
    Sha256,
}

impl DigestAlgorithm {
    fn prepare(&self, data: &[u8]) -> (Pkcs1v15Sign, Vec<u8>) {
        match self {
            DigestAlgorithm::Sha1 => (
                Pkcs1v15Sign::new::<sha1::Sha1>(),
                sha1::Sha1::digest(data).to_vec(),
            ),
            DigestAlgorithm::Sha256 => (
                Pkcs1v15Sign::new::<sha2::Sha256>(),
                sha2::Sha256::digest(data).to_vec(),
            ),
        }
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = IpizzaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            other => Err(IpizzaError::ConfigError(format!(
                "Unknown digest algorithm: {}",
                other
            ))),
        }
    }
}

/// Signs canonical hash input and returns the base64 signature.
pub fn sign(hash: &[u8], private_key: &RsaPrivateKey, digest: DigestAlgorithm) -> Result<String> {
    let (scheme, hashed) = digest.prepare(hash);
    let signature = private_key
        .sign(scheme, &hashed)
        .map_err(|e| IpizzaError::SigningFailed(e.to_string()))?;
    Ok(BASE64.encode(signature))
}

/// Checks a base64 signature over canonical hash input.
///
/// Returns false for malformed encodings as well as for mismatches.
pub fn verify(
    hash: &[u8],
    signature: &str,
    public_key: &RsaPublicKey,
    digest: DigestAlgorithm,
) -> bool {
    let raw = match BASE64.decode(signature.trim()) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!("Signature is not valid base64: {}", e);
            return false;
        }
    };

    if raw.len() != public_key.size() {
        tracing::debug!(
            "Signature length {} does not match key size {}",
            raw.len(),
            public_key.size()
        );
        return false;
    }

    let (scheme, hashed) = digest.prepare(hash);
    public_key.verify(scheme, &hashed, &raw).is_ok()
}

/// Merchant signing key and bank verification key.
///
/// Loaded once at construction; both keys are only read afterwards.
pub struct KeyMaterial {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl KeyMaterial {
    /// Wraps already parsed keys.
    pub fn new(private_key: RsaPrivateKey, public_key: RsaPublicKey) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    /// Parses a PEM private key and a PEM public key or certificate.
    ///
    /// The private key may be PKCS#8 or PKCS#1. The public side may be an
    /// X.509 certificate, an SPKI public key, or a PKCS#1 public key.
    pub fn from_pem(private_pem: &str, public_pem: &str) -> Result<Self> {
        Ok(Self::new(
            parse_private_key(private_pem)?,
            parse_public_key(public_pem)?,
        ))
    }

    /// Reads both PEM files and parses them.
    pub fn from_files(private_path: impl AsRef<Path>, public_path: impl AsRef<Path>) -> Result<Self> {
        let private_pem = std::fs::read_to_string(private_path)?;
        let public_pem = std::fs::read_to_string(public_path)?;
        Self::from_pem(&private_pem, &public_pem)
    }

    /// Merchant signing key.
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Bank verification key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_key", &"<redacted>")
            .field("public_key_bits", &(self.public_key.size() * 8))
            .finish()
    }
}

fn parse_private_key(pem: &str) -> Result<RsaPrivateKey> {
    if pem.contains("BEGIN RSA PRIVATE KEY") {
        Ok(RsaPrivateKey::from_pkcs1_pem(pem)?)
    } else {
        Ok(RsaPrivateKey::from_pkcs8_pem(pem)?)
    }
}

fn parse_public_key(pem: &str) -> Result<RsaPublicKey> {
    if pem.contains("BEGIN CERTIFICATE") {
        let cert = Certificate::from_pem(pem.trim().as_bytes())
            .map_err(|e| IpizzaError::KeyError(format!("Invalid certificate: {}", e)))?;
        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| IpizzaError::KeyError(format!("Invalid certificate key: {}", e)))?;
        RsaPublicKey::from_public_key_der(&spki)
            .map_err(|e| IpizzaError::KeyError(format!("Certificate key is not RSA: {}", e)))
    } else if pem.contains("BEGIN RSA PUBLIC KEY") {
        Ok(RsaPublicKey::from_pkcs1_pem(pem)?)
    } else {
        RsaPublicKey::from_public_key_pem(pem).map_err(|e| IpizzaError::KeyError(e.to_string()))
    }
}
