use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHasher, PasswordVerifier,
    password_hash::{PasswordHash, SaltString},
};

use crate::userdb::errors::UserError;
use crate::utils::gen_random_bytes;

/// Hashes a password into an Argon2id PHC string with a random salt
pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt_bytes = gen_random_bytes(16)?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| UserError::PasswordHash(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| UserError::PasswordHash(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Checks a password against a stored PHC string. Malformed hashes never verify.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Stand-in hash for accounts without a password, so a miss costs the same as a mismatch
static DUMMY_HASH: LazyLock<Result<String, UserError>> =
    LazyLock::new(|| hash_password("confarch-no-such-account"));

/// Verifies a credential off the async runtime. A missing hash still runs a full
/// verification against a dummy hash and never succeeds.
pub(crate) async fn check_password(
    stored: Option<String>,
    password: &str,
) -> Result<bool, UserError> {
    check_password_with(stored, password, verify_password).await
}

async fn check_password_with(
    stored: Option<String>,
    password: &str,
    verify: fn(&str, &str) -> bool,
) -> Result<bool, UserError> {
    let has_hash = stored.is_some();
    let hash = match stored {
        Some(hash) => hash,
        None => DUMMY_HASH.clone()?,
    };
    let password = password.to_string();

    let verified = tokio::task::spawn_blocking(move || verify(&hash, &password))
        .await
        .map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(has_hash && verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").expect("hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "battery staple"));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("pw").unwrap();
        let second = hash_password("pw").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("plaintext", "plaintext"));
        assert!(!verify_password("", ""));
    }

    static VERIFY_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counting_verify(hash: &str, password: &str) -> bool {
        VERIFY_CALLS.fetch_add(1, Ordering::SeqCst);
        verify_password(hash, password)
    }

    #[tokio::test]
    async fn test_missing_and_present_hash_both_verify() {
        let hash = hash_password("pw").unwrap();

        let before = VERIFY_CALLS.load(Ordering::SeqCst);
        assert!(!check_password_with(None, "pw", counting_verify).await.unwrap());
        assert_eq!(VERIFY_CALLS.load(Ordering::SeqCst), before + 1);

        assert!(!check_password_with(Some(hash.clone()), "nope", counting_verify).await.unwrap());
        assert_eq!(VERIFY_CALLS.load(Ordering::SeqCst), before + 2);

        assert!(check_password_with(Some(hash), "pw", counting_verify).await.unwrap());
        assert_eq!(VERIFY_CALLS.load(Ordering::SeqCst), before + 3);
    }

    #[tokio::test]
    async fn test_missing_hash_never_verifies_dummy_password() {
        assert!(!check_password(None, "confarch-no-such-account").await.unwrap());
    }

    #[test]
    fn test_dummy_hash_uses_real_hash_parameters() {
        let dummy = DUMMY_HASH.clone().unwrap();
        let real = hash_password("pw").unwrap();
        let dummy = PasswordHash::new(&dummy).unwrap();
        let real = PasswordHash::new(&real).unwrap();

        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.version, real.version);
        assert_eq!(dummy.params, real.params);
    }
}
