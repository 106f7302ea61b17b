//! Sequential window cycling within one application.
//!
//! The window list comes back from the directory in an order the OS may
//! change or resize between calls, and the only handle that survives across
//! calls is the opaque stable id. While the remembered index is still in
//! range we advance purely positionally, which is cheap but ignores
//! reordering; when it falls out of range we re-anchor by stable id, then by
//! the focused window, then at position 0.

use tracing::trace;

use crate::common::collections::HashMap;

use super::{AppId, WindowRecord, WindowStableId};

#[derive(Debug, Default, Clone)]
struct CycleState {
    last_stable_id: Option<WindowStableId>,
    last_index: Option<usize>,
}

#[derive(Debug, Default)]
pub struct WindowCycler {
    // Entries are never removed; processes are few and short-lived enough
    // that the map stays small.
    states: HashMap<AppId, CycleState>,
}

impl WindowCycler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks the next window to raise for `app` out of `windows`. Returns
    /// the index of the chosen window, or `None` when the list is empty.
    pub fn next_window(
        &mut self,
        app: AppId,
        windows: &[WindowRecord],
        focused_number: Option<u32>,
    ) -> Option<usize> {
        if windows.is_empty() {
            return None;
        }
        let count = windows.len();
        let state = self.states.entry(app).or_default();

        let next = match state.last_index {
            Some(last) if last < count => (last + 1) % count,
            _ => {
                let anchor = state
                    .last_stable_id
                    .and_then(|id| windows.iter().position(|w| w.stable_id == id))
                    .or_else(|| {
                        focused_number
                            .and_then(|n| windows.iter().position(|w| w.window_number == n))
                    })
                    .unwrap_or(0);
                (anchor + 1) % count
            }
        };

        state.last_stable_id = Some(windows[next].stable_id);
        state.last_index = Some(next);
        trace!(?app, next, count, "advanced window cycle");
        Some(next)
    }
}
