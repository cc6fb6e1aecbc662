//! Fixed-window rate limiting for participant actions.
//!
//! Counters live in process memory, keyed by `(action, identifier)`. This is
//! a best-effort single-process throttle; nothing is shared across instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use askboard_common::config::{RateLimitSettings, WindowLimit};
use askboard_common::{AppError, AppResult};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Shortest accepted purge interval.
pub const MIN_PURGE_INTERVAL: Duration = Duration::from_secs(1);

/// Rate limit configuration for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new rate limit config.
    #[must_use]
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl From<WindowLimit> for RateLimitConfig {
    fn from(limit: WindowLimit) -> Self {
        Self::new(limit.max, Duration::from_secs(limit.window_secs))
    }
}

/// Default limits per action.
pub mod limits {
    use super::RateLimitConfig;
    use std::time::Duration;

    /// Question submissions: 5 per 5 minutes.
    pub const QUESTION_SUBMISSION: RateLimitConfig =
        RateLimitConfig::new(5, Duration::from_secs(5 * 60));

    /// Votes and unvotes: 30 per minute.
    pub const VOTE: RateLimitConfig = RateLimitConfig::new(30, Duration::from_secs(60));

    /// Pulse-check feedback: 20 per minute.
    pub const FEEDBACK: RateLimitConfig = RateLimitConfig::new(20, Duration::from_secs(60));

    /// How often stale windows are dropped.
    pub const PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);
}

/// Throttled participant action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitAction {
    /// Submitting a question.
    SubmitQuestion,
    /// Casting or removing a vote.
    Vote,
    /// Leaving pulse-check feedback.
    Feedback,
}

impl RateLimitAction {
    /// Stable name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SubmitQuestion => "question",
            Self::Vote => "vote",
            Self::Feedback => "feedback",
        }
    }
}

/// Configured limit for each action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionLimits {
    /// Question submission limit.
    pub question: RateLimitConfig,
    /// Vote limit.
    pub vote: RateLimitConfig,
    /// Feedback limit.
    pub feedback: RateLimitConfig,
}

impl Default for ActionLimits {
    fn default() -> Self {
        Self {
            question: limits::QUESTION_SUBMISSION,
            vote: limits::VOTE,
            feedback: limits::FEEDBACK,
        }
    }
}

impl From<&RateLimitSettings> for ActionLimits {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            question: settings.question.into(),
            vote: settings.vote.into(),
            feedback: settings.feedback.into(),
        }
    }
}

impl ActionLimits {
    /// Limit for an action.
    #[must_use]
    pub const fn for_action(&self, action: RateLimitAction) -> RateLimitConfig {
        match action {
            RateLimitAction::SubmitQuestion => self.question,
            RateLimitAction::Vote => self.vote,
            RateLimitAction::Feedback => self.feedback,
        }
    }
}

/// Counter state for a single key.
#[derive(Debug, Clone, Copy)]
struct Window {
    /// Requests seen in the current window, including denied ones.
    count: u32,
    /// When the current window ends.
    reset_at: Instant,
}

/// Rate limit check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests counted in the current window, this one included.
    pub current: u32,
    /// Configured maximum.
    pub limit: u32,
    /// When the current window ends.
    pub reset_at: Instant,
    /// Whole seconds to wait, rounded up. Only set when denied.
    pub retry_after: Option<u64>,
}

impl RateLimitResult {
    /// Convert a denial into [`AppError::RateLimited`].
    pub fn into_result(self) -> AppResult<Self> {
        match self.retry_after {
            Some(retry_after) if !self.allowed => Err(AppError::RateLimited { retry_after }),
            _ => Ok(self),
        }
    }
}

/// In-memory fixed-window rate limiter.
///
/// Cloning shares the counters. Tests build their own instance instead of
/// reaching for a process-wide one.
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<(RateLimitAction, String), Window>>>,
    limits: ActionLimits,
}

impl RateLimiter {
    /// Create a limiter with the default per-action limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a limiter with explicit per-action limits.
    #[must_use]
    pub fn with_limits(limits: ActionLimits) -> Self {
        Self {
            windows: Arc::default(),
            limits,
        }
    }

    /// Configured per-action limits.
    #[must_use]
    pub const fn limits(&self) -> &ActionLimits {
        &self.limits
    }

    /// Count a request and report whether it fits in the window.
    ///
    /// The whole read-check-increment sequence runs under the write lock, so
    /// concurrent requests for the same key cannot both slip under the limit.
    pub async fn check(
        &self,
        action: RateLimitAction,
        identifier: &str,
        config: &RateLimitConfig,
    ) -> RateLimitResult {
        let mut windows = self.windows.write().await;
        let now = Instant::now();

        let window = windows
            .entry((action, identifier.to_string()))
            .and_modify(|w| {
                if now >= w.reset_at {
                    *w = Window {
                        count: 0,
                        reset_at: now + config.window,
                    };
                }
            })
            .or_insert(Window {
                count: 0,
                reset_at: now + config.window,
            });

        window.count = window.count.saturating_add(1);

        let allowed = window.count <= config.max_requests;
        let retry_after = (!allowed).then(|| {
            let wait = window.reset_at.saturating_duration_since(now);
            wait.as_millis().div_ceil(1000) as u64
        });

        RateLimitResult {
            allowed,
            current: window.count,
            limit: config.max_requests,
            reset_at: window.reset_at,
            retry_after,
        }
    }

    /// Check against the configured limit for `action`, failing with
    /// [`AppError::RateLimited`] when the window is exhausted.
    pub async fn enforce(
        &self,
        action: RateLimitAction,
        identifier: &str,
    ) -> AppResult<RateLimitResult> {
        let config = self.limits.for_action(action);
        let result = self.check(action, identifier, &config).await;

        if !result.allowed {
            warn!(
                action = action.as_str(),
                identifier = %identifier,
                current = result.current,
                limit = result.limit,
                retry_after = ?result.retry_after,
                "Rate limit exceeded"
            );
        }

        result.into_result()
    }

    /// Drop windows whose reset time has passed. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut windows = self.windows.write().await;
        let now = Instant::now();
        let before = windows.len();

        windows.retain(|_, w| now < w.reset_at);

        before - windows.len()
    }

    /// Number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.windows.read().await.len()
    }

    /// Spawn the periodic purge. The task stops when the handle is stopped or dropped.
    ///
    /// Intervals shorter than one second are raised to one second.
    #[must_use]
    pub fn start_purge_task(&self, every: Duration) -> PurgeTask {
        let every = every.max(MIN_PURGE_INTERVAL);
        let limiter = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = limiter.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired rate limit windows");
                }
            }
        });
        PurgeTask { handle }
    }
}

/// Handle to the background purge task.
#[derive(Debug)]
pub struct PurgeTask {
    handle: JoinHandle<()>,
}

impl PurgeTask {
    /// Stop purging.
    pub fn stop(self) {
        self.handle.abort();
    }

    /// Whether the task is still scheduled.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for PurgeTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
