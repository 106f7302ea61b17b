//! The switch engine: decision logic for tap-vs-hold app switching.
//!
//! Everything in this module is pure state-machine code. The engine never
//! holds a live handle to an OS object; it works with opaque ids and reaches
//! the outside world only through the collaborator traits defined here, which
//! the frontend implements on top of the platform APIs.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub mod cycle;
pub mod matcher;
pub mod mru;
pub mod overlay;
pub mod press;

pub use cycle::WindowCycler;
pub use matcher::matches_query;
pub use mru::MruTracker;
pub use overlay::{FilterOutcome, OverlaySession};
pub use press::{PressArbiter, PressMode};

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

/// Opaque identifier for a switchable application.
#[derive(
    Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct AppId(u32);

impl AppId {
    pub fn new(raw: u32) -> Self {
        AppId(raw)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Identifier for a window that stays stable across enumerations, unlike the
/// window's position in the enumeration order.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct WindowStableId(u64);

impl WindowStableId {
    pub fn new(raw: u64) -> Self {
        WindowStableId(raw)
    }
}

bitflags! {
    /// Capability flags reported by the process directory for a candidate.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct CandidateFlags: u8 {
        /// Regular activation policy (shows up in the Dock equivalent).
        const REGULAR = 1 << 0;
        const HIDDEN = 1 << 1;
        const TERMINATED = 1 << 2;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateInfo {
    pub id: AppId,
    pub name: String,
    pub flags: CandidateFlags,
}

impl CandidateInfo {
    /// Whether this candidate may appear in the MRU list. The engine's own
    /// process is additionally excluded by every caller.
    pub fn is_eligible(&self) -> bool {
        self.flags.contains(CandidateFlags::REGULAR)
            && !self.flags.intersects(CandidateFlags::HIDDEN | CandidateFlags::TERMINATED)
    }
}

/// One window in an enumeration supplied by the window directory. The order
/// of the enumeration is meaningful but may change between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    pub stable_id: WindowStableId,
    pub window_number: u32,
    pub title: String,
}

/// Read access to running applications. Implemented by the OS frontend;
/// activation notifications arrive separately as engine events.
pub trait ProcessDirectory {
    fn own_id(&self) -> AppId;
    fn candidates(&self) -> Vec<CandidateInfo>;
    fn frontmost(&self) -> Option<AppId>;
    fn info(&self, id: AppId) -> Option<CandidateInfo>;

    fn name(&self, id: AppId) -> Option<String> {
        self.info(id).map(|info| info.name)
    }
}

/// Read access to the windows of a single application.
pub trait WindowDirectory {
    fn windows(&self, app: AppId) -> Vec<WindowRecord>;
    fn focused_window_number(&self, app: AppId) -> Option<u32>;
    fn raise_window(&mut self, app: AppId, window: WindowStableId) -> bool;
}

/// What the overlay surface needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayFrame {
    pub rows: Vec<OverlayRow>,
    pub selected: Option<usize>,
    pub search: String,
    pub show_badges: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRow {
    pub id: AppId,
    pub name: String,
}

/// The overlay and toast rendering surface. Pointer selections come back to
/// the engine as events on its channel, never as synchronous callbacks.
pub trait PresentationSurface {
    fn show(&mut self, frame: &OverlayFrame);
    fn update(&mut self, frame: &OverlayFrame);
    fn hide(&mut self);
    fn show_toast(&mut self, text: &str);
    fn hide_toast(&mut self);
}

/// Activation and termination requests. All methods are best-effort; `false`
/// means the request was refused or the target is gone.
pub trait ActivationService {
    fn activate(&mut self, id: AppId) -> bool;
    fn activate_all_windows(&mut self, id: AppId) -> bool;
    fn relaunch(&mut self, id: AppId) -> bool;
    fn unhide_and_raise(&mut self, id: AppId) -> bool;
    fn terminate(&mut self, id: AppId) -> bool;
}
