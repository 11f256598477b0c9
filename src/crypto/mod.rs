//! Content sealing for journal entries.
//!
//! Entry bodies are encrypted with AES-256-GCM before they reach the store
//! and decrypted on read. The key is derived from the owner's opaque
//! identifier, so a record can only be opened in that owner's session.
//!
//! Two key-derivation versions coexist:
//!
//! - **v1** (legacy, read-only): the identifier's bytes padded with ASCII
//!   `'0'` to 32 bytes and truncated to exactly 32. Early records were
//!   written this way and must keep decrypting, so the transform is
//!   reproduced exactly.
//! - **v2** (write path): HKDF-SHA256 over the identifier with a fixed
//!   application salt.
//!
//! Sealed payloads are text-field safe: `base64(nonce || ciphertext+tag)`,
//! prefixed with `"v2:"` when the v2 key applies. Base64 never contains a
//! `:`, so untagged payloads are unambiguously legacy v1 records.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

/// AES-256 key length.
const KEY_LEN: usize = 32;

/// AES-GCM nonce length (12 bytes, fresh per seal, never reused per key).
const NONCE_LEN: usize = 12;

/// GCM authentication tag length, appended to the ciphertext by the cipher.
const TAG_LEN: usize = 16;

/// Filler byte of the legacy v1 key transform.
const V1_PAD: u8 = b'0';

/// Version tag prepended to payloads sealed with the v2 key.
const V2_PREFIX: &str = "v2:";

/// Fixed HKDF salt for the v2 key derivation.
const V2_SALT: &[u8] = b"journely/content-sealing";

/// HKDF info string binding v2 keys to this purpose.
const V2_INFO: &[u8] = b"entry content key v2";

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("content encryption failed")]
    Cipher,
}

#[derive(Debug, thiserror::Error)]
pub enum DecryptionError {
    #[error("ciphertext is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("ciphertext is {0} bytes, shorter than nonce and tag")]
    Truncated(usize),

    #[error("unrecognized ciphertext version `{0}`")]
    UnknownVersion(String),

    #[error("ciphertext failed authentication")]
    Unauthenticated,

    #[error("decrypted payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeyVersion {
    V1,
    V2,
}

/// Expand the owner identifier into an AES-256 key.
fn derive_key(secret: &str, version: KeyVersion) -> [u8; KEY_LEN] {
    match version {
        KeyVersion::V1 => derive_key_v1(secret),
        KeyVersion::V2 => derive_key_v2(secret),
    }
}

/// Legacy byte-stuffing transform: pad with `'0'` to 32 bytes, truncate to
/// exactly 32. Not a real KDF; kept byte-for-byte compatible so records
/// sealed by earlier releases keep opening.
fn derive_key_v1(secret: &str) -> [u8; KEY_LEN] {
    let mut key = [V1_PAD; KEY_LEN];
    let bytes = secret.as_bytes();
    let take = bytes.len().min(KEY_LEN);
    key[..take].copy_from_slice(&bytes[..take]);
    key
}

fn derive_key_v2(secret: &str) -> [u8; KEY_LEN] {
    let hk = Hkdf::<Sha256>::new(Some(V2_SALT), secret.as_bytes());
    let mut key = [0u8; KEY_LEN];
    hk.expand(V2_INFO, &mut key)
        .expect("32 bytes is a valid HKDF-SHA256 output length");
    key
}

/// Encrypt `plaintext` under the owner's key.
///
/// Returns a text-field-safe string: `"v2:" + base64(nonce || ciphertext)`,
/// where the ciphertext carries the GCM tag. Every call draws a fresh
/// random nonce, so sealing the same plaintext twice yields different
/// payloads.
pub fn seal(plaintext: &str, owner_secret: &str) -> Result<String, EncryptionError> {
    let key = derive_key(owner_secret, KeyVersion::V2);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| EncryptionError::Cipher)?;

    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);

    Ok(format!("{}{}", V2_PREFIX, STANDARD.encode(payload)))
}

/// Decrypt a sealed payload under the owner's key.
///
/// Tampered data and foreign-owner keys both surface as
/// [`DecryptionError::Unauthenticated`]; wrong plaintext is never returned
/// silently. Display paths recover from any error here with a placeholder
/// rather than failing the request.
pub fn open(sealed: &str, owner_secret: &str) -> Result<String, DecryptionError> {
    let (version, encoded) = match sealed.strip_prefix(V2_PREFIX) {
        Some(rest) => (KeyVersion::V2, rest),
        None => match sealed.split_once(':') {
            // Not base64, not a tag we know: a future format, not legacy data.
            Some((tag, _)) => return Err(DecryptionError::UnknownVersion(tag.to_string())),
            None => (KeyVersion::V1, sealed),
        },
    };

    let payload = STANDARD.decode(encoded)?;
    if payload.len() < NONCE_LEN + TAG_LEN {
        return Err(DecryptionError::Truncated(payload.len()));
    }
    let (nonce, ciphertext) = payload.split_at(NONCE_LEN);

    let key = derive_key(owner_secret, version);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| DecryptionError::Unauthenticated)?;

    Ok(String::from_utf8(plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "u7fK2pQxWb31vNcR8sT4yLhD9mE6aZ0j";

    /// Seal the way pre-versioning releases did: v1 key, no version tag.
    fn seal_legacy(plaintext: &str, owner_secret: &str) -> String {
        let key = derive_key(owner_secret, KeyVersion::V1);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .unwrap();

        let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);
        STANDARD.encode(payload)
    }

    #[test]
    fn roundtrip() {
        let sealed = seal("Today I planted the tomatoes.", OWNER).unwrap();
        assert_eq!(open(&sealed, OWNER).unwrap(), "Today I planted the tomatoes.");
    }

    #[test]
    fn roundtrip_empty_plaintext() {
        let sealed = seal("", OWNER).unwrap();
        assert_eq!(open(&sealed, OWNER).unwrap(), "");
    }

    #[test]
    fn roundtrip_unicode() {
        let text = "Дождь весь день ☔ — стало спокойно";
        let sealed = seal(text, OWNER).unwrap();
        assert_eq!(open(&sealed, OWNER).unwrap(), text);
    }

    #[test]
    fn roundtrip_short_secret() {
        let sealed = seal("short ids pad out", "u1").unwrap();
        assert_eq!(open(&sealed, "u1").unwrap(), "short ids pad out");
    }

    #[test]
    fn fresh_nonce_per_seal() {
        let a = seal("same words", OWNER).unwrap();
        let b = seal("same words", OWNER).unwrap();
        assert_ne!(a, b);
        assert_eq!(open(&a, OWNER).unwrap(), "same words");
        assert_eq!(open(&b, OWNER).unwrap(), "same words");
    }

    #[test]
    fn wrong_secret_fails_closed() {
        let sealed = seal("private thought", OWNER).unwrap();
        let err = open(&sealed, "some-other-user").unwrap_err();
        assert!(matches!(err, DecryptionError::Unauthenticated));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let sealed = seal("original words", OWNER).unwrap();
        let mut raw = STANDARD.decode(sealed.strip_prefix(V2_PREFIX).unwrap()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = format!("{}{}", V2_PREFIX, STANDARD.encode(raw));
        assert!(matches!(
            open(&tampered, OWNER).unwrap_err(),
            DecryptionError::Unauthenticated
        ));
    }

    #[test]
    fn truncated_payload_fails() {
        let sealed = format!("{}{}", V2_PREFIX, STANDARD.encode([0u8; NONCE_LEN]));
        assert!(matches!(
            open(&sealed, OWNER).unwrap_err(),
            DecryptionError::Truncated(len) if len == NONCE_LEN
        ));
    }

    #[test]
    fn garbage_input_fails_with_encoding_error() {
        assert!(matches!(
            open("!!not base64!!", OWNER).unwrap_err(),
            DecryptionError::Encoding(_)
        ));
    }

    #[test]
    fn future_version_tag_is_rejected() {
        assert!(matches!(
            open("v9:AAAA", OWNER).unwrap_err(),
            DecryptionError::UnknownVersion(tag) if tag == "v9"
        ));
    }

    #[test]
    fn legacy_records_still_open() {
        let sealed = seal_legacy("written before versioning", OWNER);
        assert!(!sealed.contains(':'));
        assert_eq!(open(&sealed, OWNER).unwrap(), "written before versioning");
    }

    #[test]
    fn v1_transform_pads_and_truncates_exactly() {
        let key = derive_key_v1("abc");
        assert_eq!(&key[..3], b"abc");
        assert!(key[3..].iter().all(|&b| b == V1_PAD));

        let long = "a]very[long]identifier]that]exceeds]thirty-two]bytes";
        let key = derive_key_v1(long);
        assert_eq!(&key[..], &long.as_bytes()[..KEY_LEN]);
    }

    #[test]
    fn v1_keys_collide_on_shared_prefix_v2_keys_do_not() {
        let a = "prefix-prefix-prefix-prefix-32by-AAA";
        let b = "prefix-prefix-prefix-prefix-32by-BBB";
        // The legacy truncation made these equivalent; HKDF fixes that.
        assert_eq!(derive_key_v1(a), derive_key_v1(b));
        assert_ne!(derive_key_v2(a), derive_key_v2(b));
    }

    #[test]
    fn v1_and_v2_derive_distinct_keys() {
        assert_ne!(derive_key_v1(OWNER), derive_key_v2(OWNER));
    }
}
