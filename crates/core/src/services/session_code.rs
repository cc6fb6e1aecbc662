//! Session join-code allocation.
//!
//! Codes are six characters from `[A-Z0-9]` (36^6 candidates). The
//! existence check here is only a pre-filter: the unique index on
//! `session.code` is the authority, and a duplicate reported at insert time
//! is retried with a fresh candidate under the same attempt budget.

use std::future::Future;

use askboard_common::{AppError, AppResult};
use askboard_db::repositories::SessionRepository;
use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, error, warn};

/// Characters a join code is drawn from.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Join code length.
pub const CODE_LENGTH: usize = 6;

/// Candidates tried before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Lookup used to skip codes that are already taken.
#[async_trait]
pub trait SessionCodeStore: Send + Sync {
    /// Whether `code` is already assigned to a session.
    async fn code_exists(&self, code: &str) -> AppResult<bool>;
}

#[async_trait]
impl SessionCodeStore for SessionRepository {
    async fn code_exists(&self, code: &str) -> AppResult<bool> {
        Self::code_exists(self, code).await
    }
}

/// Draw one candidate code.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// Whether `code` has the join-code shape (`^[A-Z0-9]{6}$`).
#[must_use]
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// Normalize user-typed codes: trim and upper-case.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Allocates unused join codes.
#[derive(Debug, Clone, Copy)]
pub struct SessionCodeAllocator {
    max_attempts: u32,
}

impl Default for SessionCodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCodeAllocator {
    /// Create an allocator with the standard attempt budget.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }

    /// Find a code the store does not know about.
    ///
    /// The caller still has to persist it; use [`Self::allocate_and_persist`]
    /// to get insert-time races retried as well.
    pub async fn allocate(&self, store: &dyn SessionCodeStore) -> AppResult<String> {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_code(&mut rand::thread_rng());
            if store.code_exists(&candidate).await? {
                debug!(attempt, code = %candidate, "Session code collision");
                continue;
            }
            return Ok(candidate);
        }

        error!(attempts = self.max_attempts, "Session code allocation exhausted");
        Err(AppError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    /// Pick a free code and hand it to `persist`.
    ///
    /// An [`AppError::DuplicateCode`] from `persist` means another request
    /// claimed the code between check and insert; it costs one attempt and a
    /// new candidate is tried. Any other error is returned as is.
    pub async fn allocate_and_persist<T, F, Fut>(
        &self,
        store: &dyn SessionCodeStore,
        mut persist: F,
    ) -> AppResult<T>
    where
        F: FnMut(String) -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_code(&mut rand::thread_rng());
            if store.code_exists(&candidate).await? {
                debug!(attempt, code = %candidate, "Session code collision");
                continue;
            }

            match persist(candidate).await {
                Err(AppError::DuplicateCode(code)) => {
                    warn!(attempt, code = %code, "Session code taken at insert, retrying");
                }
                other => return other,
            }
        }

        error!(attempts = self.max_attempts, "Session code allocation exhausted");
        Err(AppError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fake store that records every lookup.
    struct FakeStore {
        taken: Mutex<HashSet<String>>,
        always_taken: bool,
        lookups: AtomicU32,
    }

    impl FakeStore {
        fn empty() -> Self {
            Self {
                taken: Mutex::new(HashSet::new()),
                always_taken: false,
                lookups: AtomicU32::new(0),
            }
        }

        fn full() -> Self {
            Self {
                always_taken: true,
                ..Self::empty()
            }
        }
    }

    #[async_trait]
    impl SessionCodeStore for FakeStore {
        async fn code_exists(&self, code: &str) -> AppResult<bool> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.always_taken || self.taken.lock().unwrap().contains(code))
        }
    }

    struct FailingStore;

    #[async_trait]
    impl SessionCodeStore for FailingStore {
        async fn code_exists(&self, _code: &str) -> AppResult<bool> {
            Err(AppError::Database("connection reset".to_string()))
        }
    }

    #[test]
    fn test_generated_codes_have_code_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let code = generate_code(&mut rng);
            assert!(is_valid_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_generation_covers_alphabet() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<char> = (0..2000)
            .flat_map(|_| generate_code(&mut rng).chars().collect::<Vec<_>>())
            .collect();
        assert_eq!(seen.len(), CODE_ALPHABET.len());
    }

    #[test]
    fn test_is_valid_code() {
        assert!(is_valid_code("ABC123"));
        assert!(!is_valid_code("abc123"));
        assert!(!is_valid_code("ABC12"));
        assert!(!is_valid_code("ABC1234"));
        assert!(!is_valid_code("ABC-12"));
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  abc123 "), "ABC123");
    }

    #[tokio::test]
    async fn test_allocate_returns_valid_code() {
        let store = FakeStore::empty();
        let code = SessionCodeAllocator::new().allocate(&store).await.unwrap();

        assert!(is_valid_code(&code));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_allocate_exhausts_after_ten_attempts() {
        let store = FakeStore::full();
        let err = SessionCodeAllocator::new()
            .allocate(&store)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AllocationExhausted { attempts: 10 }));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let err = SessionCodeAllocator::new()
            .allocate(&FailingStore)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_duplicate_at_insert_is_retried() {
        let store = FakeStore::empty();
        let inserts = AtomicU32::new(0);

        let code = SessionCodeAllocator::new()
            .allocate_and_persist(&store, |candidate| {
                let n = inserts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(AppError::DuplicateCode(candidate))
                    } else {
                        Ok(candidate)
                    }
                }
            })
            .await
            .unwrap();

        assert!(is_valid_code(&code));
        assert_eq!(inserts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_duplicate_races_share_the_attempt_budget() {
        let store = FakeStore::empty();
        let inserts = AtomicU32::new(0);

        let err = SessionCodeAllocator::new()
            .allocate_and_persist(&store, |candidate| {
                inserts.fetch_add(1, Ordering::SeqCst);
                async move { Err::<String, _>(AppError::DuplicateCode(candidate)) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AllocationExhausted { attempts: 10 }));
        assert_eq!(inserts.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_other_persist_errors_are_not_retried() {
        let store = FakeStore::empty();
        let inserts = AtomicU32::new(0);

        let err = SessionCodeAllocator::new()
            .allocate_and_persist(&store, |_| {
                inserts.fetch_add(1, Ordering::SeqCst);
                async { Err::<String, _>(AppError::Database("disk full".to_string())) }
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(inserts.load(Ordering::SeqCst), 1);
    }
}
