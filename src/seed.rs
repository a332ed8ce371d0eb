//! Deterministic RNG streams derived from one user seed.
//!
//! Each concern gets its own domain-separated stream so adding a draw in
//! one place never shifts the sequence another consumes.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const STREAM_RATES: &str = "rates";
pub const STREAM_MARKET: &str = "market";
pub const STREAM_EVENTS: &str = "events";

/// Derives a stream seed as HMAC-SHA256(user_seed, domain) truncated to
/// the first eight digest bytes.
#[must_use]
pub fn derive_stream_seed(seed: u64, domain: &str) -> u64 {
    // HMAC-SHA256 accepts any key length; the error arm is unreachable.
    let Ok(mut mac) = HmacSha256::new_from_slice(&seed.to_le_bytes()) else {
        return seed;
    };
    mac.update(domain.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// The engine's three long-lived streams.
#[derive(Debug, Clone)]
pub struct RngBundle {
    /// Daily APR draws.
    pub rates: ChaCha20Rng,
    /// Goods and asset price generation, dividends.
    pub market: ChaCha20Rng,
    /// Travel event gating, counts, selection, and parameters.
    pub events: ChaCha20Rng,
}

impl RngBundle {
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rates: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, STREAM_RATES)),
            market: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, STREAM_MARKET)),
            events: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, STREAM_EVENTS)),
        }
    }
}
