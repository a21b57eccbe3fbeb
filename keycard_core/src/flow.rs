use crate::api::{login, register};
use crate::guard::Route;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// The login form
pub mod login_flow;
pub use login_flow::LoginFlow;

/// The registration form
pub mod register_flow;
pub use register_flow::RegisterFlow;

/// How long errors stay on screen.
pub const ERROR_DISPLAY: Duration = Duration::from_secs(5);

/// How long the "you're registered" message shows before we move on.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Identifies a scheduled timer so it can be cancelled or recognized when it
/// fires. Unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Get a fresh ID
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);

        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A request to move somewhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// Where to go
    pub to: Route,

    /// Replace the current history entry instead of pushing a new one, so
    /// going back skips the page we're leaving.
    pub replace: bool,
}

/// Things a flow needs done on its behalf. Side effects!
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Call the login endpoint and hand the result to `LoginFlow::finish`
    LogIn(login::Req),

    /// Call the register endpoint and hand the result to
    /// `RegisterFlow::finish`
    Register(register::Req),

    /// Call back into the flow's `timer_fired` after the delay
    Schedule(TimerId, Duration),

    /// Never mind about that timer
    Cancel(TimerId),

    /// Go somewhere else
    Navigate(Navigation),
}

/// A message that goes away on its own.
#[derive(Debug, Default)]
pub struct Notice {
    current: Option<(String, TimerId)>,
}

impl Notice {
    /// Show `text` until `delay` passes. Anything already showing is replaced
    /// and its timer cancelled.
    pub fn show(&mut self, text: String, delay: Duration, effects: &mut Vec<Effect>) {
        self.clear(effects);

        let timer = TimerId::next();
        tracing::debug!(?timer, ?delay, "scheduling notice expiry");

        self.current = Some((text, timer));
        effects.push(Effect::Schedule(timer, delay));
    }

    /// What's showing right now
    pub fn text(&self) -> Option<&str> {
        self.current.as_ref().map(|(text, _)| text.as_str())
    }

    /// Handle a timer firing. Returns whether it was ours (and we cleared the
    /// notice.) Timers we've moved on from are ignored.
    pub fn expire(&mut self, timer: TimerId) -> bool {
        match self.current {
            Some((_, current)) if current == timer => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Take the notice down now, cancelling its timer.
    pub fn clear(&mut self, effects: &mut Vec<Effect>) {
        if let Some((_, timer)) = self.current.take() {
            effects.push(Effect::Cancel(timer));
        }
    }
}
