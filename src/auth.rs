//! Access-code verification and submission throttling.
//!
//! The configured code is never kept in the clear.  At startup it is
//! folded into an HMAC-SHA256 tag under a per-process random key;
//! candidates are checked with `hmac_sha256::HMAC::verify`, which compares
//! in constant time.  A code shorter or longer than the configured one
//! costs exactly as much to reject as a near miss.
//!
//! [`SubmissionLimiter`] is a token bucket in front of the admission
//! endpoint so the code cannot be brute-forced at line rate.

use burster::Limiter;
use core::fmt;
use core::time::Duration;
use log::warn;

// ── Access code ──────────────────────────────────────────────

/// The configured access code, stored as a keyed tag.
#[derive(Clone)]
pub struct AccessCode {
    key: [u8; 32],
    tag: [u8; 32],
}

impl AccessCode {
    pub fn new(code: &str) -> Self {
        let key = fill_random_key();
        let tag = hmac_sha256::HMAC::mac(code.as_bytes(), key);
        Self { key, tag }
    }

    /// Constant-time comparison of `candidate` against the configured code.
    pub fn matches(&self, candidate: &str) -> bool {
        hmac_sha256::HMAC::verify(candidate.as_bytes(), self.key, &self.tag)
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCode(<redacted>)")
    }
}

// ── Rate limiting ────────────────────────────────────────────

/// Token bucket guarding the admission endpoint.
pub struct SubmissionLimiter {
    bucket: burster::TokenBucket<fn() -> Duration>,
}

impl SubmissionLimiter {
    /// `rate_per_sec` tokens refill per second; the bucket holds the same
    /// number, so a full second's worth may arrive as one burst.
    pub fn new(rate_per_sec: u32) -> Self {
        let rate = u64::from(rate_per_sec.max(1));
        Self {
            bucket: burster::TokenBucket::new_with_time_provider(
                rate,
                rate,
                platform_now as fn() -> Duration,
            ),
        }
    }

    /// Consume one token; returns `false` when exhausted.
    pub fn admit(&mut self) -> bool {
        if self.bucket.try_consume(1).is_ok() {
            true
        } else {
            warn!("auth: submission rate limit exceeded, dropping");
            false
        }
    }
}

// ── Platform helpers ─────────────────────────────────────────

/// Per-process HMAC key.  Not cryptographically strong; it only has to
/// keep the tag from being a plain hash of the code.
fn fill_random_key() -> [u8; 32] {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut buf = [0u8; 32];
    for chunk in buf.chunks_mut(8) {
        let s = RandomState::new();
        let val = s.build_hasher().finish().to_le_bytes();
        let len = chunk.len().min(val.len());
        chunk[..len].copy_from_slice(&val[..len]);
    }
    buf
}

fn platform_now() -> Duration {
    use std::time::Instant;
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

// ── Tests ────────────────────────────────────────────────────
