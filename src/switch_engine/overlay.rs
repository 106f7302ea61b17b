//! Overlay session: the search/selection state machine that exists while the
//! candidate overlay is on screen.
//!
//! The session owns the search text, the filtered subsequence of the MRU
//! snapshot taken at open, and the selection cursor. Candidate names are
//! captured at open so filtering and rendering never depend on directory
//! lookups racing with process churn. Operations return explicit outcomes;
//! the caller performs activation, rendering, and teardown.

use tracing::trace;

use super::matcher::matches_query;
use super::{AppId, OverlayFrame, OverlayRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayEntry {
    pub id: AppId,
    pub name: String,
}

/// Result of an operation that re-runs the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Filter changed (or not); re-render.
    Render,
    /// Auto-select-single fired: activate this candidate and close.
    AutoSelected(AppId),
}

/// Result of the escape key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeOutcome {
    /// Search text was cleared; the overlay stays open.
    Cleared,
    /// Search was already empty: close and reactivate the origin.
    Cancel { origin: Option<AppId> },
}

#[derive(Debug)]
pub struct OverlaySession {
    entries: Vec<OverlayEntry>,
    search: String,
    filtered: Vec<OverlayEntry>,
    selected: Option<usize>,
    origin: Option<AppId>,
    auto_select_single: bool,
}

impl OverlaySession {
    /// Opens a session over an MRU snapshot. Returns `None` when the
    /// snapshot is empty; there is nothing to show.
    pub fn open(
        entries: Vec<OverlayEntry>,
        origin: Option<AppId>,
        auto_select_single: bool,
    ) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let filtered = entries.clone();
        Some(Self {
            entries,
            search: String::new(),
            filtered,
            selected: Some(0),
            origin,
            auto_select_single,
        })
    }

    pub fn origin(&self) -> Option<AppId> {
        self.origin
    }

    pub fn selected_id(&self) -> Option<AppId> {
        self.selected.and_then(|i| self.filtered.get(i)).map(|e| e.id)
    }

    pub fn set_auto_select_single(&mut self, enabled: bool) {
        self.auto_select_single = enabled;
    }

    /// Appends a printable scalar to the search text and refilters.
    /// Non-printable input is ignored.
    pub fn type_char(&mut self, c: char) -> FilterOutcome {
        if !is_printable(c) {
            return FilterOutcome::Render;
        }
        self.search.push(c);
        self.recompute_filter()
    }

    /// Removes the last character of the search text, if any.
    pub fn backspace(&mut self) -> FilterOutcome {
        if self.search.pop().is_none() {
            return FilterOutcome::Render;
        }
        self.recompute_filter()
    }

    /// Escape: clear the search first; a second escape cancels.
    pub fn escape_or_clear(&mut self) -> (EscapeOutcome, Option<FilterOutcome>) {
        if self.search.is_empty() {
            return (EscapeOutcome::Cancel { origin: self.origin }, None);
        }
        self.search.clear();
        let outcome = self.recompute_filter();
        (EscapeOutcome::Cleared, Some(outcome))
    }

    /// Cyclic selection move. No-op when the filtered list is empty.
    pub fn move_selection(&mut self, delta: isize) {
        let count = self.filtered.len();
        if count == 0 {
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(count as isize) as usize;
        self.selected = Some(next);
    }

    /// Digit row selection: '1'..'9' map to the first nine rows, '0' to the
    /// tenth. Returns the candidate when that row exists.
    pub fn select_by_digit(&self, digit: char) -> Option<AppId> {
        let index = match digit {
            '1'..='9' => digit as usize - '1' as usize,
            '0' => 9,
            _ => return None,
        };
        self.filtered.get(index).map(|e| e.id)
    }

    /// Removes the highlighted candidate from the session (the caller also
    /// removes it from the MRU and requests termination). Returns the
    /// removed candidate. The overlay stays open.
    pub fn quit_highlighted(&mut self) -> Option<OverlayEntry> {
        let index = self.selected?;
        let removed = self.filtered.remove(index);
        self.entries.retain(|e| e.id != removed.id);
        self.selected = if self.filtered.is_empty() {
            None
        } else {
            Some(index.min(self.filtered.len() - 1))
        };
        Some(removed)
    }

    /// Removes a candidate that disappeared underneath the session (e.g. the
    /// process terminated on its own).
    pub fn remove_candidate(&mut self, id: AppId) {
        let before = self.filtered.len();
        self.entries.retain(|e| e.id != id);
        self.filtered.retain(|e| e.id != id);
        if self.filtered.len() != before {
            self.selected = match self.selected {
                _ if self.filtered.is_empty() => None,
                Some(i) => Some(i.min(self.filtered.len() - 1)),
                None => None,
            };
        }
    }

    /// Re-runs the filter over the captured entries, preserving MRU order,
    /// and clamps the selection. May fire auto-select-single.
    fn recompute_filter(&mut self) -> FilterOutcome {
        let query = self.search.trim();
        self.filtered = if query.is_empty() {
            self.entries.clone()
        } else {
            self.entries
                .iter()
                .filter(|e| matches_query(&e.name, query))
                .cloned()
                .collect()
        };
        self.selected = match self.filtered.len() {
            0 => None,
            count => Some(self.selected.unwrap_or(0).min(count - 1)),
        };
        trace!(
            query,
            matches = self.filtered.len(),
            "recomputed overlay filter"
        );
        if self.auto_select_single && self.filtered.len() == 1 {
            return FilterOutcome::AutoSelected(self.filtered[0].id);
        }
        FilterOutcome::Render
    }

    pub fn frame(&self, show_badges: bool) -> OverlayFrame {
        OverlayFrame {
            rows: self
                .filtered
                .iter()
                .map(|e| OverlayRow { id: e.id, name: e.name.clone() })
                .collect(),
            selected: self.selected,
            search: self.search.clone(),
            show_badges,
        }
    }

    #[cfg(test)]
    pub(crate) fn filtered_ids(&self) -> Vec<AppId> {
        self.filtered.iter().map(|e| e.id).collect()
    }

    #[cfg(test)]
    pub(crate) fn selected_index(&self) -> Option<usize> {
        self.selected
    }
}

/// Printable per the overlay's definition: anything that is not a control,
/// format, or private-use scalar. (Rust `char` cannot be a surrogate.) The
/// format ranges below are the full Unicode Cf category; unassigned code
/// points are not filtered, that would need category tables we don't carry.
fn is_printable(c: char) -> bool {
    if c.is_control() {
        return false;
    }
    !matches!(c,
        '\u{00AD}'
            | '\u{0600}'..='\u{0605}'
            | '\u{061C}'
            | '\u{06DD}'
            | '\u{070F}'
            | '\u{0890}'..='\u{0891}'
            | '\u{08E2}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{206F}'
            | '\u{FEFF}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{110BD}'
            | '\u{110CD}'
            | '\u{13430}'..='\u{1343F}'
            | '\u{1BCA0}'..='\u{1BCA3}'
            | '\u{1D173}'..='\u{1D17A}'
            | '\u{E0001}'
            | '\u{E0020}'..='\u{E007F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}')
}
