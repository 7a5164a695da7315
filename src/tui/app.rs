use ratatui::widgets::ListState;

use crate::domain::Article;
use crate::tui::event::Action;
use crate::view::{FeedSession, FeedViewModel, Interaction, ViewInputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Archive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Featured,
    Trendy,
    MustSee,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Featured => ActivePane::Trendy,
            ActivePane::Trendy => ActivePane::MustSee,
            ActivePane::MustSee => ActivePane::Featured,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActivePane::Featured => ActivePane::MustSee,
            ActivePane::Trendy => ActivePane::Featured,
            ActivePane::MustSee => ActivePane::Trendy,
        }
    }
}

pub struct TuiApp {
    pub view: View,
    pub active_pane: ActivePane,
    pub session: FeedSession,
    pub model: Option<FeedViewModel>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub trendy_list_state: ListState,
    pub must_see_list_state: ListState,
    pub archive_list_state: ListState,
}

impl TuiApp {
    pub fn new(session: FeedSession) -> Self {
        Self {
            view: View::Home,
            active_pane: ActivePane::Featured,
            session,
            model: None,
            should_quit: false,
            status_message: None,
            trendy_list_state: ListState::default(),
            must_see_list_state: ListState::default(),
            archive_list_state: ListState::default(),
        }
    }

    /// Recompute the view model and keep list selections inside it.
    pub fn rebuild(&mut self, inputs: ViewInputs<'_>) {
        let model = self.session.build(inputs);
        clamp_selection(&mut self.trendy_list_state, model.trendy.len());
        clamp_selection(&mut self.must_see_list_state, model.must_see.len());
        clamp_selection(&mut self.archive_list_state, model.archive.shown);
        self.model = Some(model);
    }

    pub fn switch_view(&mut self) -> View {
        self.view = match self.view {
            View::Home => View::Archive,
            View::Archive => View::Home,
        };
        self.view
    }

    pub fn selected_article(&self) -> Option<&Article> {
        let model = self.model.as_ref()?;
        match self.view {
            View::Archive => model
                .archive
                .articles
                .get(self.archive_list_state.selected()?),
            View::Home => match self.active_pane {
                ActivePane::Featured => model.featured.as_ref(),
                ActivePane::Trendy => model.trendy.get(self.trendy_list_state.selected()?),
                ActivePane::MustSee => model.must_see.get(self.must_see_list_state.selected()?),
            },
        }
    }

    /// Apply a navigation action. Returns the interaction to report to the
    /// refresh scheduler, or `None` for actions the app does not handle
    /// itself.
    pub fn handle(&mut self, action: Action) -> Option<Interaction> {
        match self.view {
            View::Home => self.handle_home(action),
            View::Archive => self.handle_archive(action),
        }
    }

    fn handle_home(&mut self, action: Action) -> Option<Interaction> {
        let interaction = match action {
            Action::NextPane => {
                self.active_pane = self.active_pane.next();
                Interaction
            }
            Action::PrevPane => {
                self.active_pane = self.active_pane.prev();
                Interaction
            }
            Action::MoveUp => {
                match self.active_pane {
                    ActivePane::Featured => {}
                    ActivePane::Trendy => self.trendy_list_state.select_previous(),
                    ActivePane::MustSee => self.must_see_list_state.select_previous(),
                }
                Interaction
            }
            Action::MoveDown => {
                let (state, len) = match (self.active_pane, self.model.as_ref()) {
                    (ActivePane::Trendy, Some(m)) => (&mut self.trendy_list_state, m.trendy.len()),
                    (ActivePane::MustSee, Some(m)) => {
                        (&mut self.must_see_list_state, m.must_see.len())
                    }
                    _ => return Some(Interaction),
                };
                select_next_within(state, len);
                Interaction
            }
            Action::StepPrev | Action::StepNext => {
                let forward = action == Action::StepNext;
                match self.active_pane {
                    ActivePane::Featured => self.session.step_featured(forward),
                    ActivePane::Trendy => {
                        self.trendy_list_state.select(Some(0));
                        self.session.step_trendy(forward)
                    }
                    ActivePane::MustSee => {
                        self.must_see_list_state.select(Some(0));
                        self.session.step_must_see(forward)
                    }
                }
            }
            Action::ToggleExpand => self.session.toggle_expanded(),
            Action::CycleRegion => self.session.cycle_region(),
            Action::CycleTopic => self.session.cycle_topic(),
            Action::CycleVerification => self.session.cycle_verification(),
            _ => return None,
        };
        Some(interaction)
    }

    fn handle_archive(&mut self, action: Action) -> Option<Interaction> {
        let shown = self.model.as_ref().map_or(0, |m| m.archive.shown);
        let interaction = match action {
            Action::MoveUp => {
                self.archive_list_state.select_previous();
                Interaction
            }
            Action::MoveDown => {
                select_next_within(&mut self.archive_list_state, shown);
                let position = self.archive_list_state.selected().unwrap_or(0);
                self.session.scroll_archive(position)
            }
            Action::LoadMore => self.session.load_more_archive(),
            _ => return None,
        };
        Some(interaction)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

fn select_next_within(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let next = state.selected().map_or(0, |i| (i + 1).min(len - 1));
    state.select(Some(next));
}

fn clamp_selection(state: &mut ListState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(i), len) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}
