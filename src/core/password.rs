//! Salted, iterated SHA-256 password digests
//!
//! Digest format: `sha256$<iterations>$<salt base64>$<hash base64>`.
//! The iteration count travels with the digest so it can be raised later
//! without invalidating stored records.

use crate::core::traits::PasswordHasher;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
const DEFAULT_ITERATIONS: u32 = 10_000;
/// Stored digests asking for more rounds than this never verify
const MAX_ITERATIONS: u32 = 100 * DEFAULT_ITERATIONS;

/// Default `PasswordHasher` used by the front end
#[derive(Debug, Clone, Copy)]
pub struct Sha256PasswordHasher {
    iterations: u32,
}

impl Sha256PasswordHasher {
    /// Create a hasher that stretches each digest `iterations` times
    ///
    /// Zero is treated as one round; counts above the verification limit
    /// are capped.
    pub fn with_iterations(iterations: u32) -> Self {
        Sha256PasswordHasher {
            iterations: iterations.clamp(1, MAX_ITERATIONS),
        }
    }

    fn derive(salt: &[u8], plaintext: &str, iterations: u32) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(plaintext.as_bytes());
        let mut digest = hasher.finalize();

        for _ in 1..iterations {
            let mut hasher = Sha256::new();
            hasher.update(digest);
            hasher.update(salt);
            digest = hasher.finalize();
        }

        digest.to_vec()
    }
}

impl Default for Sha256PasswordHasher {
    fn default() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, plaintext: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = Self::derive(&salt, plaintext, self.iterations);

        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            STANDARD.encode(salt),
            STANDARD.encode(digest)
        )
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let mut parts = digest.split('$');
        let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };

        let Ok(iterations) = iterations.parse::<u32>() else {
            return false;
        };
        if iterations == 0 || iterations > MAX_ITERATIONS {
            return false;
        }
        let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(expected)) else {
            return false;
        };

        let actual = Self::derive(&salt, plaintext, iterations);
        if actual.len() != expected.len() {
            return false;
        }

        // Compare every byte so timing does not depend on the mismatch position
        actual
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
