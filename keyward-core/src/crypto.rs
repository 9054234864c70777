use std::fmt;
use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher as _,
        PasswordVerifier as _, Salt, SaltString,
    },
};
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use tokio::sync::{OnceCell, Semaphore};
use zeroize::Zeroizing;

/// Password used to build the throwaway hash that unknown-email logins are
/// verified against.
const DUMMY_PASSWORD: &str = "keyward-timing-equalizer";

#[derive(Debug, Error)]
pub enum HashError {
    #[error("hash worker count must be at least one")]
    NoWorkers,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing error: {0}")]
    Hashing(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("hash worker failed: {0}")]
    Worker(String),
}

/// Argon2id password hashing with an optional server-side pepper.
///
/// Hashing is CPU-bound, so the async entry points run on tokio's blocking
/// pool and are gated by a semaphore holding one permit per worker. Clones
/// share the same permits.
#[derive(Clone)]
pub struct PasswordHasher {
    inner: Arc<HasherInner>,
}

struct HasherInner {
    argon2: Argon2<'static>,
    pepper: Zeroizing<Vec<u8>>,
    permits: Arc<Semaphore>,
    dummy_hash: OnceCell<Vec<u8>>,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.inner.argon2.params())
            .field("peppered", &!self.inner.pepper.is_empty())
            .field("permits_available", &self.inner.permits.available_permits())
            .finish()
    }
}

impl PasswordHasher {
    const SALT_LENGTH: usize = Salt::RECOMMENDED_LENGTH;

    /// Build a hasher with the argon2 crate's recommended cost parameters.
    pub fn new(workers: usize) -> Result<Self, HashError> {
        Self::with_params(Params::default(), workers)
    }

    /// Build a hasher with caller-specified Argon2 parameters (useful for
    /// tests or constrained environments).
    pub fn with_params(params: Params, workers: usize) -> Result<Self, HashError> {
        if workers == 0 {
            return Err(HashError::NoWorkers);
        }

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::default(), params);

        Ok(Self {
            inner: Arc::new(HasherInner {
                argon2,
                pepper: Zeroizing::new(Vec::new()),
                permits: Arc::new(Semaphore::new(workers)),
                dummy_hash: OnceCell::new(),
            }),
        })
    }

    /// Cheap parameters for tests.
    #[cfg(any(test, feature = "test-util"))]
    pub fn insecure_for_tests() -> Result<Self, HashError> {
        let params = Params::new(Params::MIN_M_COST, Params::MIN_T_COST, 1, None)
            .map_err(|err| HashError::InvalidParams(err.to_string()))?;
        Self::with_params(params, 2)
    }

    /// Append a server-side pepper to every password before hashing. An empty
    /// pepper leaves the hasher unpeppered.
    pub fn with_pepper(self, pepper: impl AsRef<[u8]>) -> Self {
        let inner = &self.inner;
        Self {
            inner: Arc::new(HasherInner {
                argon2: inner.argon2.clone(),
                pepper: Zeroizing::new(pepper.as_ref().to_vec()),
                permits: Arc::clone(&inner.permits),
                dummy_hash: OnceCell::new(),
            }),
        }
    }

    /// Hash a password on the bounded worker pool.
    pub async fn hash(&self, password: &str) -> Result<Vec<u8>, HashError> {
        let password = Zeroizing::new(password.to_owned());
        self.run_blocking(move |hasher| hasher.hash_blocking(&password))
            .await
    }

    /// Verify a password against a stored hash on the bounded worker pool.
    pub async fn verify(&self, hash: &[u8], password: &str) -> Result<bool, HashError> {
        let hash = hash.to_vec();
        let password = Zeroizing::new(password.to_owned());
        self.run_blocking(move |hasher| hasher.verify_blocking(&hash, &password))
            .await
    }

    /// Run a verification whose outcome is discarded, so that a login for an
    /// unknown account costs the same as one with a wrong password.
    pub async fn verify_dummy(&self, password: &str) -> Result<(), HashError> {
        let dummy = self
            .inner
            .dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .await?;
        self.verify(dummy, password).await.map(|_| ())
    }

    /// Hash a password with a fresh random salt. The PHC string is returned
    /// as bytes, ready for storage.
    pub fn hash_blocking(&self, password: &str) -> Result<Vec<u8>, HashError> {
        let material = self.peppered(password);

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| HashError::Hashing(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| HashError::Hashing(err.to_string()))?;

        let hash = self
            .inner
            .argon2
            .hash_password(&material, &salt)
            .map_err(|err| HashError::Hashing(err.to_string()))?;
        Ok(hash.to_string().into_bytes())
    }

    /// Verify a password against a stored hash.
    ///
    /// A mismatch yields `Ok(false)`. Only a structurally invalid hash is an
    /// error. The comparison itself is constant-time inside argon2.
    pub fn verify_blocking(&self, hash: &[u8], password: &str) -> Result<bool, HashError> {
        let encoded = std::str::from_utf8(hash)
            .map_err(|err| HashError::MalformedHash(err.to_string()))?;
        let parsed = PasswordHash::new(encoded)
            .map_err(|err| HashError::MalformedHash(err.to_string()))?;

        let material = self.peppered(password);
        match self.inner.argon2.verify_password(&material, &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(err) => Err(HashError::MalformedHash(err.to_string())),
        }
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.inner.pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.inner.pepper);
        material
    }

    async fn run_blocking<T, F>(&self, job: F) -> Result<T, HashError>
    where
        T: Send + 'static,
        F: FnOnce(&PasswordHasher) -> Result<T, HashError> + Send + 'static,
    {
        let permit = Arc::clone(&self.inner.permits)
            .acquire_owned()
            .await
            .map_err(|err| HashError::Worker(err.to_string()))?;
        let hasher = self.clone();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job(&hasher)
        })
        .await
        .map_err(|err| HashError::Worker(err.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_passwords_and_verifies() {
        let hasher = PasswordHasher::insecure_for_tests().unwrap();
        let hash = hasher.hash_blocking("correct horse").unwrap();
        assert!(hasher.verify_blocking(&hash, "correct horse").unwrap());
        assert!(!hasher.verify_blocking(&hash, "battery staple").unwrap());
    }

    #[test]
    fn salts_every_hash() {
        let hasher = PasswordHasher::insecure_for_tests().unwrap();
        let first = hasher.hash_blocking("same").unwrap();
        let second = hasher.hash_blocking("same").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with(b"$argon2id$"));
    }

    #[test]
    fn pepper_is_part_of_the_secret() {
        let plain = PasswordHasher::insecure_for_tests().unwrap();
        let peppered = PasswordHasher::insecure_for_tests().unwrap().with_pepper("pepper");

        let hash = peppered.hash_blocking("pw").unwrap();
        assert!(peppered.verify_blocking(&hash, "pw").unwrap());
        assert!(!plain.verify_blocking(&hash, "pw").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let hasher = PasswordHasher::insecure_for_tests().unwrap();
        assert!(matches!(
            hasher.verify_blocking(b"not-a-phc-string", "pw"),
            Err(HashError::MalformedHash(_))
        ));
        assert!(matches!(
            hasher.verify_blocking(&[0xff, 0xfe], "pw"),
            Err(HashError::MalformedHash(_))
        ));
    }

    #[test]
    fn rejects_zero_workers() {
        assert!(matches!(
            PasswordHasher::new(0),
            Err(HashError::NoWorkers)
        ));
    }

    #[tokio::test]
    async fn async_entry_points_use_the_worker_pool() {
        let hasher = PasswordHasher::insecure_for_tests().unwrap();
        let hash = hasher.hash("pw1").await.unwrap();
        assert!(hasher.verify(&hash, "pw1").await.unwrap());
        assert!(!hasher.verify(&hash, "pw2").await.unwrap());
        hasher.verify_dummy("anything").await.unwrap();
        assert_eq!(hasher.inner.permits.available_permits(), 2);
    }
}
