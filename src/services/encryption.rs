use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use anyhow::{Context, Result};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use uuid::Uuid;

/// Derive the per-organization sealing key from the master key.
pub fn derive_org_key(master_key: &[u8; 32], organization_id: Uuid) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, master_key);
    let info = format!("marketingos-org-{organization_id}");
    let mut key = [0u8; 32];
    hk.expand(info.as_bytes(), &mut key)
        .map_err(|_| anyhow::anyhow!("Failed to derive organization key"))?;
    Ok(key)
}

/// Seal a platform token for storage: AES-256-GCM with a random 12-byte
/// nonce, stored as `hex(nonce):hex(ciphertext||tag)`.
pub fn seal_token(plaintext: &str, key: &[u8; 32]) -> Result<String> {
    let cipher = Aes256Gcm::new_from_slice(key).context("Failed to create cipher")?;

    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| anyhow::anyhow!("Encryption failed: {}", e))?;

    Ok(format!("{}:{}", hex::encode(nonce_bytes), hex::encode(ciphertext)))
}

/// Reverse of [`seal_token`]. Fails on a tampered or foreign-key token.
pub fn open_token(sealed: &str, key: &[u8; 32]) -> Result<String> {
    let (nonce_hex, ct_hex) = sealed
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Malformed sealed token"))?;

    let nonce_bytes = hex::decode(nonce_hex).context("Malformed sealed token nonce")?;
    anyhow::ensure!(nonce_bytes.len() == 12, "Nonce must be exactly 12 bytes");
    let ciphertext = hex::decode(ct_hex).context("Malformed sealed token body")?;

    let cipher = Aes256Gcm::new_from_slice(key).context("Failed to create cipher")?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, ciphertext.as_ref())
        .map_err(|e| anyhow::anyhow!("Decryption failed (data may be corrupted or tampered): {}", e))?;

    String::from_utf8(plaintext).context("Decrypted token is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_keys_are_deterministic_and_distinct() {
        let master = [0u8; 32];
        let org_a = Uuid::new_v4();
        let org_b = Uuid::new_v4();
        let key_a = derive_org_key(&master, org_a).unwrap();
        let key_b = derive_org_key(&master, org_b).unwrap();
        let key_a_again = derive_org_key(&master, org_a).unwrap();

        assert_eq!(key_a, key_a_again);
        assert_ne!(key_a, key_b);
    }

    #[test]
    fn seal_open_round_trip() {
        let key = [42u8; 32];
        let token = "EAABsbCS1234longlivedtoken";

        let sealed = seal_token(token, &key).unwrap();
        assert_ne!(sealed, token);
        assert_eq!(open_token(&sealed, &key).unwrap(), token);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let key = [42u8; 32];
        let wrong = [99u8; 32];
        let sealed = seal_token("secreto", &key).unwrap();
        assert!(open_token(&sealed, &wrong).is_err());
    }

    #[test]
    fn open_tampered_token_fails() {
        let key = [42u8; 32];
        let sealed = seal_token("secreto", &key).unwrap();
        // Flip one hex digit of the ciphertext body
        let mut chars: Vec<char> = sealed.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        assert!(open_token(&tampered, &key).is_err());
    }

    #[test]
    fn open_malformed_token_fails() {
        let key = [42u8; 32];
        assert!(open_token("no-colon-here", &key).is_err());
        assert!(open_token("zzzz:zzzz", &key).is_err());
    }
}
