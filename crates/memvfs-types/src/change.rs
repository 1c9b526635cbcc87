//! One-shot change notification.
//!
//! A [`ChangeTrigger`] is held by whoever owns the watched state; each
//! [`ChangeToken`] handed out from it observes exactly one transition. Owners
//! replace the trigger after firing rather than resetting it, so a token
//! only ever reports "has the change I subscribed to happened yet".

use tokio_util::sync::CancellationToken;

/// Invalidation side of a change subscription.
#[derive(Debug, Clone, Default)]
pub struct ChangeTrigger {
    signal: CancellationToken,
}

impl ChangeTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observable handle bound to this trigger.
    pub fn token(&self) -> ChangeToken {
        ChangeToken {
            signal: Some(self.signal.clone()),
        }
    }

    /// Signal every token from this trigger. Firing twice is harmless.
    pub fn fire(&self) {
        self.signal.cancel();
    }
}

/// Observable side of a change subscription.
#[derive(Debug, Clone)]
pub struct ChangeToken {
    signal: Option<CancellationToken>,
}

impl ChangeToken {
    /// A token that never fires, for providers that cannot observe changes.
    pub fn never() -> Self {
        Self { signal: None }
    }

    pub fn has_changed(&self) -> bool {
        self.signal.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Wait for the change. Returns immediately if it already happened;
    /// never returns for [`ChangeToken::never`].
    pub async fn changed(&self) {
        match &self.signal {
            Some(signal) => signal.cancelled().await,
            None => std::future::pending().await,
        }
    }
}
