use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Refresh a token slightly before its reported expiry.
const EXPIRY_SKEW: Duration = Duration::from_secs(5);

struct Slot {
    token: String,
    expires_at: Instant,
}

/// Single-slot OAuth token memo: current token plus expiry. Injected
/// into the adapter that needs it rather than living as process-wide
/// state, so each adapter instance owns its own refresh cycle.
#[derive(Default)]
pub struct TokenCache {
    slot: Mutex<Option<Slot>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token if it has not reached the skewed expiry.
    pub fn get_unexpired(&self) -> Option<String> {
        let slot = self.slot.lock().ok()?;
        slot.as_ref()
            .filter(|s| Instant::now() + EXPIRY_SKEW < s.expires_at)
            .map(|s| s.token.clone())
    }

    pub fn store(&self, token: String, expires_in_seconds: u64) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(Slot {
                token,
                expires_at: Instant::now() + Duration::from_secs(expires_in_seconds),
            });
        }
    }
}
