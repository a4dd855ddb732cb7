use crate::PublicKey;
use ed25519_dalek::{Signature, VerifyingKey};

/// Verifies that `signature` over `message` was produced by the private key behind `address`.
/// Implementations must be deterministic and free of side effects.
pub trait SignatureVerifier {
    fn verify_signature(&self, address: &PublicKey, message: &[u8], signature: &[u8]) -> bool;
}

impl<F> SignatureVerifier for F
where
    F: Fn(&PublicKey, &[u8], &[u8]) -> bool,
{
    fn verify_signature(&self, address: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
        self(address, message, signature)
    }
}

/// Strict Ed25519 verification. Malformed keys and signatures never verify.
#[derive(Debug, Default, Copy, Clone)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify_signature(&self, address: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
        let verifying_key = match VerifyingKey::from_bytes(address.as_bytes()) {
            Ok(key) => key,
            Err(_) => return false,
        };
        let signature = match Signature::from_slice(signature) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        verifying_key.verify_strict(message, &signature).is_ok()
    }
}
