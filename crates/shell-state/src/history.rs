//! Append-only submission history with a single navigation cursor.
//!
//! `index == len` means "no entry selected, the live buffer is showing". The
//! index only leaves that position through `up`/`down` navigation and is
//! snapped back to it when a line is submitted.

/// Outcome of one navigation step, interpreted by the input machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Already at the edge; nothing to redraw.
    Unchanged,
    /// Load this entry into the buffer, replacing its content.
    Load(String),
    /// Advanced past the newest entry: clear the buffer back to live input.
    ClearToLive,
}

#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Vec<String>,
    index: usize,
    cap: usize,
}

impl HistoryLog {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            cap: cap.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Append a submitted line and snap the cursor back to "live input".
    /// Empty lines never reach here; the machine filters them on Enter.
    pub fn push(&mut self, line: &str) {
        self.entries.push(line.to_string());
        if self.entries.len() > self.cap {
            let overflow = self.entries.len() - self.cap;
            self.entries.drain(..overflow);
        }
        self.index = self.entries.len();
    }

    /// Step to the previous (older) entry.
    pub fn up(&mut self) -> NavOutcome {
        if self.index == 0 {
            return NavOutcome::Unchanged;
        }
        self.index -= 1;
        NavOutcome::Load(self.entries[self.index].clone())
    }

    /// Step to the next (newer) entry, or back to the live buffer when
    /// advancing past the newest one.
    pub fn down(&mut self) -> NavOutcome {
        if self.index >= self.entries.len() {
            return NavOutcome::Unchanged;
        }
        self.index += 1;
        if self.index == self.entries.len() {
            NavOutcome::ClearToLive
        } else {
            NavOutcome::Load(self.entries[self.index].clone())
        }
    }

    /// Snap the cursor back to the live position without appending (Ctrl+C).
    pub fn reset_index(&mut self) {
        self.index = self.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_snaps_index_to_live() {
        let mut h = HistoryLog::new(100);
        h.push("projects");
        assert_eq!(h.entries(), ["projects"]);
        assert_eq!(h.index(), 1);
    }

    #[test]
    fn up_then_down_is_idempotent() {
        let mut h = HistoryLog::new(100);
        for line in ["one", "two", "three"] {
            h.push(line);
        }
        for _ in 0..3 {
            assert!(matches!(h.up(), NavOutcome::Load(_)));
        }
        // Pinned at the oldest entry.
        assert_eq!(h.up(), NavOutcome::Unchanged);

        assert_eq!(h.down(), NavOutcome::Load("two".into()));
        assert_eq!(h.down(), NavOutcome::Load("three".into()));
        assert_eq!(h.down(), NavOutcome::ClearToLive);
        assert_eq!(h.down(), NavOutcome::Unchanged);
        assert_eq!(h.index(), h.len());
    }

    #[test]
    fn up_loads_newest_first() {
        let mut h = HistoryLog::new(100);
        h.push("older");
        h.push("newer");
        assert_eq!(h.up(), NavOutcome::Load("newer".into()));
        assert_eq!(h.up(), NavOutcome::Load("older".into()));
    }

    #[test]
    fn cap_drops_oldest_entries() {
        let mut h = HistoryLog::new(2);
        h.push("a");
        h.push("b");
        h.push("c");
        assert_eq!(h.entries(), ["b", "c"]);
        assert_eq!(h.index(), 2);
    }

    #[test]
    fn reset_index_returns_to_live() {
        let mut h = HistoryLog::new(100);
        h.push("x");
        h.up();
        assert_eq!(h.index(), 0);
        h.reset_index();
        assert_eq!(h.index(), 1);
    }
}
