//! A minimal Ed25519 signing/verification helper with no dependency on
//! platform key-import machinery. Keys are exchanged as hex strings, mirroring
//! how Discord itself publishes application public keys.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{AppError, Result};

/// Recovers the 32-byte seed from a hex-encoded private key. A 32-byte value
/// is used directly as the seed; a 64-byte value is treated as a libsodium
/// "secret key" (seed ‖ public key) and only the first 32 bytes are used.
pub fn private_key_bytes(hex_key: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid private key hex: {e}")))?;

    match bytes.len() {
        32 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&bytes);
            Ok(seed)
        }
        64 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&bytes[..32]);
            Ok(seed)
        }
        n => Err(AppError::Internal(anyhow::anyhow!(
            "private key must be 32 or 64 bytes, got {n}"
        ))),
    }
}

fn signing_key(hex_key: &str) -> Result<SigningKey> {
    let seed = private_key_bytes(hex_key)?;
    Ok(SigningKey::from_bytes(&seed))
}

/// Derives the lowercase-hex public key from a hex-encoded private key.
pub fn public_key(hex_key: &str) -> Result<String> {
    let signing_key = signing_key(hex_key)?;
    Ok(hex::encode(signing_key.verifying_key().to_bytes()))
}

/// Signs `timestamp ‖ body` (concatenated as UTF-8 bytes, no separator) and
/// returns the lowercase-hex signature.
pub fn sign(private_key_hex: &str, timestamp: &str, body: &str) -> Result<String> {
    let signing_key = signing_key(private_key_hex)?;
    let message = [timestamp.as_bytes(), body.as_bytes()].concat();
    let signature = signing_key.sign(&message);
    Ok(hex::encode(signature.to_bytes()))
}

/// Verifies a hex signature over `message` against a hex public key.
pub fn verify(sig_hex: &str, message: &[u8], public_key_hex: &str) -> bool {
    let Ok(sig_bytes) = hex::decode(sig_hex) else {
        return false;
    };
    let Ok(sig_array): std::result::Result<[u8; 64], _> = sig_bytes.try_into() else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_array);

    let Ok(pk_bytes) = hex::decode(public_key_hex) else {
        return false;
    };
    let Ok(pk_array): std::result::Result<[u8; 32], _> = pk_bytes.try_into() else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&pk_array) else {
        return false;
    };

    verifying_key.verify(message, &signature).is_ok()
}
