//! Fixed-window rate limiting per actor and action.
//!
//! Every key gets an independent counter that is reset to zero once its
//! window has elapsed. Unlike a sliding window the quota is fully restored
//! at the window boundary.

use std::{
    collections::HashMap,
    fmt,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tsync_entities::id::Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub const fn comments() -> Self {
        Self::new(10, Duration::from_secs(60))
    }

    pub const fn replies() -> Self {
        Self::new(20, Duration::from_secs(60))
    }

    pub const fn likes() -> Self {
        Self::new(50, Duration::from_secs(60))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Comment,
    Reply,
    Like,
}

impl Action {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Reply => "reply",
            Self::Like => "like",
        }
    }
}

/// Identifies a quota: the acting user combined with the kind of action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    pub fn new(actor_id: &Id, action: Action) -> Self {
        Self(format!("{actor_id}:{}", action.as_str()))
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    count: u32,
    window_reset_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    records: Mutex<HashMap<RateLimitKey, RateLimitRecord>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Counts the request against the quota of `key`.
    ///
    /// Returns `false` if the quota of the current window is exhausted.
    pub fn is_allowed(&self, key: &RateLimitKey) -> bool {
        self.is_allowed_at(key, Instant::now())
    }

    pub fn is_allowed_at(&self, key: &RateLimitKey, now: Instant) -> bool {
        let mut records = self.records.lock();
        match records.get_mut(key) {
            Some(record) if now < record.window_reset_at => {
                if record.count < self.config.max_requests {
                    record.count += 1;
                    true
                } else {
                    false
                }
            }
            _ => {
                if self.config.max_requests == 0 {
                    return false;
                }
                // Opening a window is the only place where records grow.
                records.retain(|_, record| now < record.window_reset_at);
                records.insert(
                    key.clone(),
                    RateLimitRecord {
                        count: 1,
                        window_reset_at: now + self.config.window,
                    },
                );
                true
            }
        }
    }

    /// Time until the current window of `key` resets or zero
    /// if there is no active window.
    pub fn reset_time(&self, key: &RateLimitKey) -> Duration {
        self.reset_time_at(key, Instant::now())
    }

    pub fn reset_time_at(&self, key: &RateLimitKey, now: Instant) -> Duration {
        self.records
            .lock()
            .get(key)
            .map(|record| record.window_reset_at.saturating_duration_since(now))
            .unwrap_or_default()
    }

    /// Drops all records whose window has elapsed.
    ///
    /// This also happens whenever a new window is opened.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|_, record| now < record.window_reset_at);
        before - records.len()
    }
}

/// Independent quotas for the different kinds of user actions.
#[derive(Debug)]
pub struct RateLimits {
    pub comments: RateLimiter,
    pub replies: RateLimiter,
    pub likes: RateLimiter,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self::new(
            RateLimitConfig::comments(),
            RateLimitConfig::replies(),
            RateLimitConfig::likes(),
        )
    }
}

impl RateLimits {
    pub fn new(comments: RateLimitConfig, replies: RateLimitConfig, likes: RateLimitConfig) -> Self {
        Self {
            comments: RateLimiter::new(comments),
            replies: RateLimiter::new(replies),
            likes: RateLimiter::new(likes),
        }
    }

    pub const fn limiter(&self, action: Action) -> &RateLimiter {
        match action {
            Action::Comment => &self.comments,
            Action::Reply => &self.replies,
            Action::Like => &self.likes,
        }
    }

    /// Consumes one request of `action` for `actor_id` or returns the
    /// time until the quota is available again.
    pub fn check(&self, actor_id: &Id, action: Action) -> Result<(), Duration> {
        let limiter = self.limiter(action);
        let key = RateLimitKey::new(actor_id, action);
        if limiter.is_allowed(&key) {
            Ok(())
        } else {
            Err(limiter.reset_time(&key))
        }
    }
}
