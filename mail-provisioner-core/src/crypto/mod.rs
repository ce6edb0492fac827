//! DKIM key material
//!
//! RSA-2048 key generation and the PEM <-> single-line base64 transforms used
//! to publish the public half in a DKIM TXT record.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rsa::pkcs8::{DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{CoreError, CoreResult};
use crate::types::SigningKeyPair;

/// RSA modulus size of every generated DKIM key.
pub const RSA_KEY_BITS: usize = 2048;
const PEM_LINE_WIDTH: usize = 64;
const PUBLIC_KEY_BEGIN: &str = "-----BEGIN PUBLIC KEY-----";
const PUBLIC_KEY_END: &str = "-----END PUBLIC KEY-----";

/// Generate a fresh RSA-2048 signing key pair.
///
/// The public key is SPKI PEM, the private key PKCS#8 PEM. Both halves are
/// produced together or not at all. Nothing is logged.
///
/// This is CPU bound (hundreds of milliseconds); async callers should use
/// [`generate_signing_key_pair_async`].
pub fn generate_signing_key_pair() -> CoreResult<SigningKeyPair> {
    let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
        .map_err(|e| CoreError::KeyGeneration(e.to_string()))?;
    let public_key = RsaPublicKey::from(&private_key);

    let private_key_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CoreError::KeyGeneration(format!("PKCS#8 encoding failed: {e}")))?
        .to_string();
    let public_key_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CoreError::KeyGeneration(format!("SPKI encoding failed: {e}")))?;
    let public_key_base64 = strip_pem(&public_key_pem);

    Ok(SigningKeyPair {
        public_key_pem,
        private_key_pem,
        public_key_base64,
    })
}

/// [`generate_signing_key_pair`] on the blocking thread pool.
pub async fn generate_signing_key_pair_async() -> CoreResult<SigningKeyPair> {
    tokio::task::spawn_blocking(generate_signing_key_pair)
        .await
        .map_err(|e| CoreError::KeyGeneration(format!("key generation task failed: {e}")))?
}

/// DKIM TXT value for a base64 public key: `v=DKIM1; k=rsa; p=<key>`.
///
/// An empty key is accepted here; plan validation rejects it later.
pub fn format_for_dns(public_key_base64: &str) -> String {
    format!("v=DKIM1; k=rsa; p={public_key_base64}")
}

/// Drop PEM framing lines and all whitespace, leaving the base64 body.
pub fn strip_pem(pem: &str) -> String {
    pem.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("-----"))
        .flat_map(|line| line.chars().filter(|c| !c.is_whitespace()))
        .collect()
}

/// Re-frame a single-line base64 public key as an SPKI PEM block (64 columns).
pub fn wrap_public_key_pem(public_key_base64: &str) -> String {
    let body: Vec<char> = public_key_base64
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut pem = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);
    pem.push_str(PUBLIC_KEY_BEGIN);
    pem.push('\n');
    for line in body.chunks(PEM_LINE_WIDTH) {
        pem.extend(line);
        pem.push('\n');
    }
    pem.push_str(PUBLIC_KEY_END);
    pem.push('\n');
    pem
}

/// Check that a published base64 value really is an RSA SPKI public key.
pub fn decode_public_key_base64(public_key_base64: &str) -> CoreResult<RsaPublicKey> {
    let der = BASE64
        .decode(public_key_base64.trim())
        .map_err(|e| CoreError::Validation(format!("DKIM public key is not valid base64: {e}")))?;
    RsaPublicKey::from_public_key_der(&der)
        .map_err(|e| CoreError::Validation(format!("DKIM public key is not an RSA SPKI key: {e}")))
}
