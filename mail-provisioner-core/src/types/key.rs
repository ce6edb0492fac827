//! DKIM signing key material

/// RSA-2048 key pair backing a DKIM record.
///
/// Generated atomically by [`crate::crypto::generate_signing_key_pair`]; there
/// is never a value holding only one half. `public_key_base64` is always
/// `public_key_pem` with the PEM framing and newlines removed.
///
/// The `Debug` output never contains the private key.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeyPair {
    /// SPKI public key, PEM encoded (`-----BEGIN PUBLIC KEY-----`).
    pub public_key_pem: String,
    /// PKCS#8 private key, PEM encoded. Store confidentially; never sent to a DNS provider.
    pub private_key_pem: String,
    /// Single-line base64 DER of the public key, as published in the DKIM TXT record.
    pub public_key_base64: String,
}

impl std::fmt::Debug for SigningKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyPair")
            .field("public_key_base64", &self.public_key_base64)
            .field("private_key_pem", &"<redacted>")
            .finish_non_exhaustive()
    }
}
