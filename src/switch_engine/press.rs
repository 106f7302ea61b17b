//! Tap-vs-hold arbitration for the app-switch key.
//!
//! A press opens a session and arms the long-press timer. If the timer fires
//! first, the press is a hold and the session is consumed; the release then
//! does nothing. If the release comes first, the press is a tap. What either
//! outcome *means* depends on whether the overlay was open when the press
//! began, which is captured as the session's mode.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

pub const DEFAULT_HOLD_DURATION: Duration = Duration::from_secs(1);
pub const MIN_HOLD_DURATION: Duration = Duration::from_millis(50);
pub const MAX_HOLD_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PressMode {
    /// Overlay was closed when the press began.
    Normal,
    /// Overlay was already open when the press began.
    OverlayActive,
}

#[derive(Debug)]
struct PressSession {
    started_at: Instant,
    mode: PressMode,
    consumed: bool,
    timer_token: u64,
}

/// What a hold (timer firing) asks the caller to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HoldAction {
    OpenOverlay,
    CancelOverlay,
}

/// What a release asks the caller to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReleaseAction {
    /// Timer already fired for this session; the release is spent.
    None,
    /// Tap with the overlay closed.
    QuickSwitch,
    /// Tap with the overlay open.
    AdvanceSelection,
}

#[derive(Debug)]
pub struct PressArbiter {
    threshold: Duration,
    session: Option<PressSession>,
}

impl PressArbiter {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold: threshold.clamp(MIN_HOLD_DURATION, MAX_HOLD_DURATION),
            session: None,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn session_active(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a session. Returns `false` (and leaves state untouched) if one
    /// is already active; event delivery is serialized so this should not
    /// happen, but a stuck key repeat must not corrupt the session.
    pub fn begin(&mut self, now: Instant, overlay_open: bool, timer_token: u64) -> bool {
        if self.session.is_some() {
            warn!("press delivered while a session is active; ignoring");
            return false;
        }
        let mode = if overlay_open {
            PressMode::OverlayActive
        } else {
            PressMode::Normal
        };
        self.session = Some(PressSession {
            started_at: now,
            mode,
            consumed: false,
            timer_token,
        });
        true
    }

    /// Timer firing. A token mismatch means the firing raced with its own
    /// cancellation and must be dropped; an already consumed session likewise
    /// absorbs the firing.
    pub fn on_timer(&mut self, token: u64) -> Option<HoldAction> {
        let session = self.session.as_mut()?;
        if session.timer_token != token {
            debug!(token, "stale long-press timer firing; dropping");
            return None;
        }
        if session.consumed {
            return None;
        }
        session.consumed = true;
        Some(match session.mode {
            PressMode::Normal => HoldAction::OpenOverlay,
            PressMode::OverlayActive => HoldAction::CancelOverlay,
        })
    }

    /// Release. Ends the session either way; the caller must cancel the
    /// long-press timer before calling this.
    pub fn on_released(&mut self, now: Instant) -> ReleaseAction {
        let Some(session) = self.session.take() else {
            return ReleaseAction::None;
        };
        if session.consumed {
            return ReleaseAction::None;
        }
        let elapsed = now.saturating_duration_since(session.started_at);
        if elapsed >= self.threshold {
            // The timer should have fired first; treat an unconsumed
            // overlong press as a hold that never got its firing and do
            // nothing rather than mis-report a tap.
            debug!(?elapsed, "release after threshold without timer firing");
            return ReleaseAction::None;
        }
        match session.mode {
            PressMode::Normal => ReleaseAction::QuickSwitch,
            PressMode::OverlayActive => ReleaseAction::AdvanceSelection,
        }
    }

    /// Updates the threshold (clamped). Returns `true` when a session is
    /// active and the caller must restart the timer for the full new
    /// duration. Remaining time is deliberately not preserved; the restart
    /// measures from now.
    pub fn set_threshold(&mut self, threshold: Duration) -> bool {
        let clamped = threshold.clamp(MIN_HOLD_DURATION, MAX_HOLD_DURATION);
        if clamped == self.threshold {
            return false;
        }
        self.threshold = clamped;
        self.session.as_ref().is_some_and(|s| !s.consumed)
    }

    /// Replaces the live timer token after a threshold-change restart.
    pub fn replace_timer_token(&mut self, token: u64) {
        if let Some(session) = self.session.as_mut() {
            session.timer_token = token;
        }
    }
}
