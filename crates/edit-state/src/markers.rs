//! Error markers and breakpoints keyed by 1-based line number.
//!
//! Both containers renumber themselves when the buffer gains or loses lines.
//! Ordered maps keep the draw pass deterministic. The shift helpers take
//! 0-based buffer line indices and convert internally, so callers reason in
//! buffer coordinates throughout.

use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Parse errors (or any diagnostics) per line. A line that collects several
/// messages keeps them newline-separated in one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorMarkers {
    entries: BTreeMap<u32, String>,
}

impl ErrorMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, line_number: u32) -> Option<&str> {
        self.entries.get(&line_number).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(line, msg)| (*line, msg.as_str()))
    }

    /// Add a message to `line_number`, appending with a `\n` separator when
    /// the line already carries one.
    pub fn add(&mut self, line_number: u32, message: &str) {
        self.entries
            .entry(line_number)
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(message);
            })
            .or_insert_with(|| message.to_string());
    }

    /// Replace all markers wholesale.
    pub fn set(&mut self, markers: BTreeMap<u32, String>) {
        self.entries = markers;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// A new line now occupies 0-based index `inserted_at`; markers on that
    /// line and below move down by one.
    pub fn on_line_inserted(&mut self, inserted_at: usize) {
        let threshold = inserted_at as u32 + 1;
        let shifted: BTreeMap<u32, String> = std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(line, msg)| {
                if line >= threshold {
                    (line + 1, msg)
                } else {
                    (line, msg)
                }
            })
            .collect();
        self.entries = shifted;
    }

    /// The 0-based half-open line range `[start, end)` was removed; markers
    /// inside it are dropped, markers below shift up by the removed count.
    pub fn on_lines_removed(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end);
        let count = (end - start) as u32;
        if count == 0 {
            return;
        }
        let before = self.entries.len();
        let shifted: BTreeMap<u32, String> = std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|(line, msg)| {
                let index = (line as usize).saturating_sub(1);
                if index >= start && index < end {
                    None
                } else if index >= end {
                    Some((line - count, msg))
                } else {
                    Some((line, msg))
                }
            })
            .collect();
        self.entries = shifted;
        if self.entries.len() != before {
            trace!(
                target: "state.markers",
                dropped = before - self.entries.len(),
                "error_markers_dropped_with_lines"
            );
        }
    }
}

/// Set of 1-based line numbers carrying a breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakpoints {
    lines: BTreeSet<u32>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn contains(&self, line_number: u32) -> bool {
        self.lines.contains(&line_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines.iter().copied()
    }

    /// Returns true when the line did not already carry a breakpoint.
    pub fn add(&mut self, line_number: u32) -> bool {
        self.lines.insert(line_number)
    }

    /// Returns true when a breakpoint was present and removed.
    pub fn remove(&mut self, line_number: u32) -> bool {
        self.lines.remove(&line_number)
    }

    /// Flip the breakpoint on `line_number`; returns the resulting state.
    pub fn toggle(&mut self, line_number: u32) -> bool {
        if self.lines.remove(&line_number) {
            false
        } else {
            self.lines.insert(line_number);
            true
        }
    }

    pub fn set(&mut self, lines: BTreeSet<u32>) {
        self.lines = lines;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn on_line_inserted(&mut self, inserted_at: usize) {
        let threshold = inserted_at as u32 + 1;
        self.lines = std::mem::take(&mut self.lines)
            .into_iter()
            .map(|line| if line >= threshold { line + 1 } else { line })
            .collect();
    }

    pub fn on_lines_removed(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end);
        let count = (end - start) as u32;
        if count == 0 {
            return;
        }
        self.lines = std::mem::take(&mut self.lines)
            .into_iter()
            .filter_map(|line| {
                let index = (line as usize).saturating_sub(1);
                if index >= start && index < end {
                    None
                } else if index >= end {
                    Some(line - count)
                } else {
                    Some(line)
                }
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_with_newline_separator() {
        let mut markers = ErrorMarkers::new();
        markers.add(3, "first");
        markers.add(3, "second");
        assert_eq!(markers.get(3), Some("first\nsecond"));
        assert_eq!(markers.len(), 1);
    }

    #[test]
    fn inserted_line_shifts_markers_at_and_below() {
        let mut markers = ErrorMarkers::new();
        markers.add(2, "a");
        markers.add(5, "b");
        // New empty line occupies 0-based index 1 (1-based line 2).
        markers.on_line_inserted(1);
        assert_eq!(markers.get(3), Some("a"));
        assert_eq!(markers.get(6), Some("b"));
        assert!(markers.get(2).is_none());
    }

    #[test]
    fn removed_range_drops_inside_and_shifts_below() {
        let mut markers = ErrorMarkers::new();
        markers.add(1, "keep");
        markers.add(2, "drop");
        markers.add(3, "drop too");
        markers.add(5, "shift");
        // Remove 0-based lines [1, 3).
        markers.on_lines_removed(1, 3);
        assert_eq!(markers.get(1), Some("keep"));
        assert_eq!(markers.get(3), Some("shift"));
        assert_eq!(markers.len(), 2);
    }

    #[test]
    fn breakpoint_toggle_reports_resulting_state() {
        let mut bps = Breakpoints::new();
        assert!(bps.toggle(4));
        assert!(bps.contains(4));
        assert!(!bps.toggle(4));
        assert!(!bps.contains(4));
    }

    #[test]
    fn breakpoint_add_remove_report_changes() {
        let mut bps = Breakpoints::new();
        assert!(bps.add(2));
        assert!(!bps.add(2));
        assert!(bps.remove(2));
        assert!(!bps.remove(2));
    }

    #[test]
    fn breakpoints_follow_line_structure() {
        let mut bps = Breakpoints::new();
        bps.add(1);
        bps.add(4);
        bps.on_line_inserted(0);
        assert!(bps.contains(2));
        assert!(bps.contains(5));
        bps.on_lines_removed(0, 2);
        assert!(!bps.contains(1));
        assert!(bps.contains(3));
    }
}
