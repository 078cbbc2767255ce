use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Salted, cost-parameterized bcrypt hashing.
///
/// Both operations are CPU-bound; handlers run them through `web::block`.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// Checks `password` against a stored hash.
    ///
    /// A malformed hash is a failed verification, not an error.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        match verify(password, hashed_password) {
            Ok(valid) => valid,
            Err(e) => {
                log::warn!("Stored password hash could not be verified: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Lowest cost bcrypt accepts; keeps the suite fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = PasswordHasher::new(TEST_COST);
        let password = "test_password123";
        let hashed = hasher.hash(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify(password, &hashed));
        assert!(!hasher.verify("wrong_password", &hashed));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = PasswordHasher::new(TEST_COST);
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("same", &first));
        assert!(hasher.verify("same", &second));
    }

    #[test]
    fn test_empty_password_does_not_panic() {
        let hasher = PasswordHasher::new(TEST_COST);
        let hashed = hasher.hash("").unwrap();

        assert!(hasher.verify("", &hashed));
        assert!(!hasher.verify("x", &hashed));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        let hasher = PasswordHasher::new(TEST_COST);
        assert!(!hasher.verify("test_password123", "invalidhashformat"));
        assert!(!hasher.verify("test_password123", ""));
    }

    #[test]
    fn test_default_cost() {
        assert_eq!(PasswordHasher::default().cost(), DEFAULT_COST);
    }
}
