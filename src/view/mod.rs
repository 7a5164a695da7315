//! Presentation-ready view of the feeds.
//!
//! A [`FeedSession`] owns the user's filter selection and window positions.
//! Every call to [`FeedSession::build`] filters the latest snapshots, lets
//! the window manager catch up with them, and produces a fresh
//! [`FeedViewModel`]. Nothing in here touches the network or the cache.

use chrono::{DateTime, Utc};

use crate::domain::{Article, FeedSnapshot};
use crate::filter::{FilterEngine, FilterSelection};
use crate::window::{WindowConfig, WindowManager, WindowState};

pub const TOP_STORIES: usize = 5;

/// Latest published state of every feed plus the scheduler's busy flag.
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a> {
    pub live: &'a FeedSnapshot,
    pub secondary: &'a FeedSnapshot,
    pub spotlight: &'a FeedSnapshot,
    pub archive: &'a FeedSnapshot,
    pub busy: bool,
}

/// Returned by every navigation hook; the caller forwards it to the
/// refresh scheduler so the periodic timer restarts.
#[must_use = "interactions should reset the refresh timer"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Ready,
    /// Nothing to show for the live feed under the current selection.
    NoData,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveView {
    pub articles: Vec<Article>,
    pub shown: usize,
    pub total: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedViewModel {
    pub featured: Option<Article>,
    pub trendy: Vec<Article>,
    pub expanded: bool,
    pub must_see: Vec<Article>,
    pub top_stories: Vec<Article>,
    /// Lead article of the category fan-out.
    pub spotlight: Option<Article>,
    /// One article per spotlight category, in category order.
    pub category_picks: Vec<Article>,
    pub archive: ArchiveView,
    pub selection: FilterSelection,
    pub windows: WindowState,
    /// Live articles after filtering.
    pub live_count: usize,
    /// Live articles before filtering.
    pub live_total: usize,
    pub busy: bool,
    pub using_fallback: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub state: DisplayState,
}

pub struct FeedSession {
    engine: FilterEngine,
    selection: FilterSelection,
    windows: WindowManager,
}

impl FeedSession {
    pub fn new(engine: FilterEngine, window: WindowConfig) -> Self {
        Self {
            engine,
            selection: FilterSelection::default(),
            windows: WindowManager::new(window),
        }
    }

    pub fn with_selection(mut self, selection: FilterSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    pub fn build(&mut self, inputs: ViewInputs<'_>) -> FeedViewModel {
        let live = self.engine.apply(&inputs.live.articles, &self.selection);
        let secondary = self.engine.apply(&inputs.secondary.articles, &self.selection);
        let archive = inputs.archive.articles.as_slice();

        self.windows
            .sync_live(inputs.live.generation, &self.selection, live.len());
        self.windows
            .sync_secondary(inputs.secondary.generation, &self.selection, secondary.len());
        self.windows
            .sync_archive(inputs.archive.generation, archive.len());

        let shown = self.windows.loaded_count();
        let archive = ArchiveView {
            articles: archive[..shown].to_vec(),
            shown,
            total: archive.len(),
            has_more: !self.windows.is_exhausted(),
        };

        let state = if live.is_empty() {
            DisplayState::NoData
        } else {
            DisplayState::Ready
        };

        FeedViewModel {
            featured: self.windows.featured().and_then(|i| live.get(i).cloned()),
            trendy: live[self.windows.trendy_range()].to_vec(),
            expanded: self.windows.is_expanded(),
            must_see: secondary[self.windows.must_see_range()].to_vec(),
            top_stories: live.iter().take(TOP_STORIES).cloned().collect(),
            spotlight: inputs.spotlight.articles.first().cloned(),
            category_picks: inputs.spotlight.articles.to_vec(),
            archive,
            selection: self.selection.clone(),
            windows: self.windows.state(),
            live_count: live.len(),
            live_total: inputs.live.len(),
            busy: inputs.busy,
            using_fallback: inputs.live.using_fallback || inputs.secondary.using_fallback,
            updated_at: inputs.live.updated_at,
            state,
        }
    }

    pub fn step_featured(&mut self, forward: bool) -> Interaction {
        if forward {
            self.windows.next_featured();
        } else {
            self.windows.prev_featured();
        }
        Interaction
    }

    pub fn step_trendy(&mut self, forward: bool) -> Interaction {
        if forward {
            self.windows.next_trendy();
        } else {
            self.windows.prev_trendy();
        }
        Interaction
    }

    pub fn toggle_expanded(&mut self) -> Interaction {
        self.windows.toggle_expanded();
        Interaction
    }

    pub fn step_must_see(&mut self, forward: bool) -> Interaction {
        if forward {
            self.windows.next_must_see();
        } else {
            self.windows.prev_must_see();
        }
        Interaction
    }

    /// The reader moved to `position` in the archive list.
    pub fn scroll_archive(&mut self, position: usize) -> Interaction {
        self.windows.scroll_to(position);
        Interaction
    }

    pub fn load_more_archive(&mut self) -> Interaction {
        self.windows.load_more();
        Interaction
    }

    pub fn set_filter(&mut self, selection: FilterSelection) -> Interaction {
        self.selection = selection;
        Interaction
    }

    pub fn cycle_region(&mut self) -> Interaction {
        let mut selection = self.selection.clone();
        selection.region = self.engine.regions().next_after(&selection.region);
        self.set_filter(selection)
    }

    pub fn cycle_topic(&mut self) -> Interaction {
        let mut selection = self.selection.clone();
        selection.topic = self.engine.topics().next_after(&selection.topic);
        self.set_filter(selection)
    }

    pub fn cycle_verification(&mut self) -> Interaction {
        let mut selection = self.selection.clone();
        selection.verification = selection.verification.next();
        self.set_filter(selection)
    }
}

impl Default for FeedSession {
    fn default() -> Self {
        Self::new(FilterEngine::default(), WindowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SnapshotOrigin;
    use crate::filter::Verification;

    fn snapshot(ids: std::ops::RangeInclusive<i64>, origin: SnapshotOrigin) -> FeedSnapshot {
        let articles = ids
            .map(|id| {
                let mut a = Article::new(id, format!("Story {}", id));
                a.prediction = id % 2 == 0;
                a
            })
            .collect();
        FeedSnapshot::default().replaced(articles, origin)
    }

    struct Feeds {
        live: FeedSnapshot,
        secondary: FeedSnapshot,
        spotlight: FeedSnapshot,
        archive: FeedSnapshot,
    }

    impl Feeds {
        fn inputs(&self, busy: bool) -> ViewInputs<'_> {
            ViewInputs {
                live: &self.live,
                secondary: &self.secondary,
                spotlight: &self.spotlight,
                archive: &self.archive,
                busy,
            }
        }
    }

    fn feeds() -> Feeds {
        Feeds {
            live: snapshot(1..=20, SnapshotOrigin::Network),
            secondary: snapshot(100..=107, SnapshotOrigin::Cache).falling_back(),
            spotlight: snapshot(200..=203, SnapshotOrigin::Network),
            archive: snapshot(300..=329, SnapshotOrigin::Network),
        }
    }

    fn ids(articles: &[Article]) -> Vec<i64> {
        articles.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_build_composes_every_section() {
        let feeds = feeds();
        let mut session = FeedSession::default();
        let vm = session.build(feeds.inputs(false));

        assert_eq!(vm.state, DisplayState::Ready);
        assert_eq!(vm.featured.as_ref().map(|a| a.id), Some(1));
        assert_eq!(ids(&vm.trendy), vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(ids(&vm.top_stories), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&vm.must_see), vec![100, 101, 102]);
        assert_eq!(vm.spotlight.as_ref().map(|a| a.id), Some(200));
        assert_eq!(vm.category_picks.len(), 4);
        assert_eq!(vm.archive.shown, 12);
        assert_eq!(vm.archive.total, 30);
        assert!(vm.archive.has_more);
        assert_eq!(vm.live_total, 20);
        assert!(vm.using_fallback);
        assert!(!vm.busy);
    }

    #[test]
    fn test_hooks_move_windows() {
        let feeds = feeds();
        let mut session = FeedSession::default();
        session.build(feeds.inputs(false));

        let _ = session.step_featured(false);
        let _ = session.step_trendy(true);
        let _ = session.step_must_see(true);
        let _ = session.scroll_archive(10);
        let vm = session.build(feeds.inputs(true));

        assert_eq!(vm.featured.as_ref().map(|a| a.id), Some(20));
        assert_eq!(ids(&vm.trendy), vec![8, 9, 10, 11, 12, 13]);
        assert_eq!(ids(&vm.must_see), vec![103, 104, 105]);
        assert_eq!(vm.archive.shown, 24);
        assert!(vm.busy);

        let _ = session.toggle_expanded();
        let vm = session.build(feeds.inputs(false));
        assert!(vm.expanded);
        assert_eq!(vm.trendy.len(), 19);
    }

    #[test]
    fn test_filter_change_resets_windows() {
        let feeds = feeds();
        let mut session = FeedSession::default();
        session.build(feeds.inputs(false));
        let _ = session.step_featured(true);
        let _ = session.step_trendy(true);

        let _ = session.set_filter(FilterSelection::verification(Verification::Verified));
        let vm = session.build(feeds.inputs(false));

        assert_eq!(vm.featured.as_ref().map(|a| a.id), Some(2));
        assert_eq!(ids(&vm.trendy), vec![4, 6, 8, 10, 12, 14]);
        assert_eq!(ids(&vm.must_see), vec![100, 102, 104]);
        assert_eq!(vm.live_total, 20);
    }

    #[test]
    fn test_unchanged_refresh_keeps_positions() {
        let mut feeds = feeds();
        let mut session = FeedSession::default();
        session.build(feeds.inputs(false));
        let _ = session.step_featured(true);

        // Same ids again from the network: generation does not move.
        let again = (*feeds.live.articles).clone();
        feeds.live = feeds.live.replaced(again, SnapshotOrigin::Network);
        let vm = session.build(feeds.inputs(false));
        assert_eq!(vm.featured.as_ref().map(|a| a.id), Some(2));

        feeds.live = feeds
            .live
            .replaced(snapshot(1..=5, SnapshotOrigin::Network).articles.to_vec(), SnapshotOrigin::Network);
        let vm = session.build(feeds.inputs(false));
        assert_eq!(vm.featured.as_ref().map(|a| a.id), Some(1));
    }

    #[test]
    fn test_no_data_when_live_feed_is_empty() {
        let mut session = FeedSession::default();
        let empty = FeedSnapshot::default();
        let vm = session.build(ViewInputs {
            live: &empty,
            secondary: &empty,
            spotlight: &empty,
            archive: &empty,
            busy: false,
        });

        assert_eq!(vm.state, DisplayState::NoData);
        assert!(vm.featured.is_none());
        assert!(vm.trendy.is_empty());
        assert!(vm.must_see.is_empty());
        assert!(vm.spotlight.is_none());
        assert!(!vm.archive.has_more);
        assert!(!vm.using_fallback);
    }

    #[test]
    fn test_cycle_filters() {
        let mut session = FeedSession::default();
        let _ = session.cycle_region();
        let _ = session.cycle_topic();
        let _ = session.cycle_verification();

        let selection = session.selection();
        assert_eq!(selection.region, "India");
        assert_eq!(selection.topic, "Football");
        assert_eq!(selection.verification, Verification::Verified);
    }
}
