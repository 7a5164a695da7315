//! Visible slices over filtered collections.
//!
//! Four windows share one manager: the featured carousel and the trendy
//! batch window over the live feed, the must-see window over the secondary
//! feed, and the infinite-scroll window over the archive. Each resets when
//! its collection's identity changes and otherwise keeps its position,
//! clamped to the current length.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::filter::FilterSelection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// First trendy index; index 0 belongs to the carousel.
    pub trendy_base: usize,
    pub trendy_batch: usize,
    pub must_see_batch: usize,
    pub page_size: usize,
    /// Load more once the reader is this close to the loaded end.
    pub scroll_threshold: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            trendy_base: 1,
            trendy_batch: 6,
            must_see_batch: 3,
            page_size: 12,
            scroll_threshold: 3,
        }
    }
}

/// Positions of every window at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowState {
    pub featured_index: usize,
    pub trendy_start: usize,
    pub expanded: bool,
    pub more_news_start: usize,
    pub loaded_count: usize,
}

/// Fixed-size window that steps a batch at a time and wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BatchWindow {
    base: usize,
    batch: usize,
    start: usize,
}

impl BatchWindow {
    fn new(base: usize, batch: usize) -> Self {
        Self {
            base,
            batch: batch.max(1),
            start: base,
        }
    }

    fn reset(&mut self) {
        self.start = self.base;
    }

    fn range(&self, len: usize) -> Range<usize> {
        let start = self.start.min(len);
        start..(start + self.batch).min(len)
    }

    fn next(&mut self, len: usize) {
        if len <= self.base {
            return;
        }
        let next = self.start + self.batch;
        self.start = if next >= len { self.base } else { next };
    }

    fn prev(&mut self, len: usize) {
        if len <= self.base {
            return;
        }
        self.start = if self.start >= self.base + self.batch {
            self.start - self.batch
        } else {
            self.last_start(len)
        };
    }

    fn last_start(&self, len: usize) -> usize {
        self.base + (len - self.base - 1) / self.batch * self.batch
    }

    fn clamp(&mut self, len: usize) {
        self.start = self.start.min(len);
    }
}

#[derive(Debug, Clone)]
pub struct WindowManager {
    config: WindowConfig,

    featured: usize,
    trendy: BatchWindow,
    expanded: bool,
    must_see: BatchWindow,
    loaded: usize,

    live_len: usize,
    secondary_len: usize,
    archive_len: usize,

    live_id: Option<(u64, FilterSelection)>,
    secondary_id: Option<(u64, FilterSelection)>,
    archive_id: Option<u64>,
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

impl WindowManager {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            featured: 0,
            trendy: BatchWindow::new(config.trendy_base, config.trendy_batch),
            expanded: false,
            must_see: BatchWindow::new(0, config.must_see_batch),
            loaded: 0,
            live_len: 0,
            secondary_len: 0,
            archive_len: 0,
            live_id: None,
            secondary_id: None,
            archive_id: None,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn state(&self) -> WindowState {
        WindowState {
            featured_index: self.featured,
            trendy_start: self.trendy.start,
            expanded: self.expanded,
            more_news_start: self.must_see.start,
            loaded_count: self.loaded,
        }
    }

    /// Track the filtered live feed. A new generation or selection resets
    /// the carousel and the trendy window.
    pub fn sync_live(&mut self, generation: u64, selection: &FilterSelection, len: usize) {
        self.live_len = len;
        if !same_identity(&self.live_id, generation, selection) {
            self.live_id = Some((generation, selection.clone()));
            self.featured = 0;
            self.trendy.reset();
            self.expanded = false;
        } else {
            self.featured = self.featured.min(len.saturating_sub(1));
            self.trendy.clamp(len);
        }
    }

    pub fn sync_secondary(&mut self, generation: u64, selection: &FilterSelection, len: usize) {
        self.secondary_len = len;
        if !same_identity(&self.secondary_id, generation, selection) {
            self.secondary_id = Some((generation, selection.clone()));
            self.must_see.reset();
        } else {
            self.must_see.clamp(len);
        }
    }

    pub fn sync_archive(&mut self, generation: u64, len: usize) {
        self.archive_len = len;
        if self.archive_id != Some(generation) {
            self.archive_id = Some(generation);
            self.loaded = self.config.page_size.min(len);
        } else {
            self.loaded = self.loaded.min(len);
        }
    }

    pub fn featured(&self) -> Option<usize> {
        (self.live_len > 0).then_some(self.featured)
    }

    pub fn next_featured(&mut self) {
        if self.live_len > 0 {
            self.featured = (self.featured + 1) % self.live_len;
        }
    }

    pub fn prev_featured(&mut self) {
        if self.live_len > 0 {
            self.featured = (self.featured + self.live_len - 1) % self.live_len;
        }
    }

    /// Indices of the live feed shown in the trendy section.
    pub fn trendy_range(&self) -> Range<usize> {
        if self.expanded {
            self.trendy.base.min(self.live_len)..self.live_len
        } else {
            self.trendy.range(self.live_len)
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Stepping is disabled while expanded.
    pub fn next_trendy(&mut self) {
        if !self.expanded {
            self.trendy.next(self.live_len);
        }
    }

    pub fn prev_trendy(&mut self) {
        if !self.expanded {
            self.trendy.prev(self.live_len);
        }
    }

    /// Collapsing returns to the batch that was showing before.
    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn must_see_range(&self) -> Range<usize> {
        self.must_see.range(self.secondary_len)
    }

    pub fn next_must_see(&mut self) {
        self.must_see.next(self.secondary_len);
    }

    pub fn prev_must_see(&mut self) {
        self.must_see.prev(self.secondary_len);
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn is_exhausted(&self) -> bool {
        self.loaded >= self.archive_len
    }

    /// The reader is at `position` in the archive list. Grows the loaded
    /// window by one page when that is close enough to its end. Returns
    /// whether anything was loaded.
    pub fn scroll_to(&mut self, position: usize) -> bool {
        if self.is_exhausted() {
            return false;
        }
        if position + self.config.scroll_threshold < self.loaded {
            return false;
        }
        self.load_more()
    }

    /// Unconditionally load the next page, if any remains.
    pub fn load_more(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.loaded = (self.loaded + self.config.page_size.max(1)).min(self.archive_len);
        true
    }
}

fn same_identity(
    current: &Option<(u64, FilterSelection)>,
    generation: u64,
    selection: &FilterSelection,
) -> bool {
    matches!(current, Some((g, s)) if *g == generation && s == selection)
}
