pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{AppContext, Result};
use crate::domain::{FeedKey, FeedSnapshot};
use crate::fetcher::{FeedOutcome, FetchCoordinator, FetchPolicy};
use crate::scheduler::SchedulerHandle;
use crate::view::ViewInputs;

use self::app::{TuiApp, View};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let scheduler = ctx.scheduler()?;
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &ctx, &scheduler).await;
    restore_terminal(&mut terminal)?;

    scheduler.close();
    scheduler.shutdown().await;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Receivers for every feed the views read from.
struct Feeds {
    live: watch::Receiver<FeedSnapshot>,
    secondary: watch::Receiver<FeedSnapshot>,
    spotlight: watch::Receiver<FeedSnapshot>,
    archive: watch::Receiver<FeedSnapshot>,
}

impl Feeds {
    fn subscribe(coordinator: &FetchCoordinator) -> Self {
        Self {
            live: coordinator.subscribe(&FeedKey::Live),
            secondary: coordinator.subscribe(&coordinator.secondary_feed()),
            spotlight: coordinator.subscribe_spotlight(),
            archive: coordinator.subscribe(&FeedKey::Archive),
        }
    }

    fn rebuild(&self, app: &mut TuiApp, busy: bool) {
        let live = self.live.borrow().clone();
        let secondary = self.secondary.borrow().clone();
        let spotlight = self.spotlight.borrow().clone();
        let archive = self.archive.borrow().clone();

        app.rebuild(ViewInputs {
            live: &live,
            secondary: &secondary,
            spotlight: &spotlight,
            archive: &archive,
            busy,
        });
    }
}

async fn run_app(terminal: &mut Tui, ctx: &AppContext, scheduler: &SchedulerHandle) -> Result<()> {
    let feeds = Feeds::subscribe(&ctx.coordinator);
    let mut tui_app = TuiApp::new(ctx.session());
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let mut archive_task: Option<JoinHandle<FeedOutcome>> = None;

    scheduler.open();

    loop {
        let busy = scheduler.is_busy() || archive_task.is_some();
        feeds.rebuild(&mut tui_app, busy);
        terminal.draw(|frame| layout::render(frame, &mut tui_app, &ctx.config.colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                tui_app.clear_status();
                match ctx.config.keybindings.get_action(&key) {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::SwitchView => match tui_app.switch_view() {
                        View::Archive => {
                            scheduler.close();
                            load_archive(&mut archive_task, &ctx.coordinator, FetchPolicy::PreferCache);
                        }
                        View::Home => scheduler.open(),
                    },
                    Action::Refresh => match tui_app.view {
                        View::Home => scheduler.refresh(),
                        View::Archive => {
                            load_archive(&mut archive_task, &ctx.coordinator, FetchPolicy::Revalidate)
                        }
                    },
                    Action::OpenInBrowser => {
                        let link = tui_app
                            .selected_article()
                            .and_then(|a| a.web_url.clone());
                        match link {
                            Some(url) => {
                                if let Err(e) = open::that(&url) {
                                    tui_app.set_status(format!("Failed to open browser: {}", e));
                                }
                            }
                            None => tui_app.set_status("No link for this article"),
                        }
                        scheduler.interact();
                    }
                    action => {
                        if tui_app.handle(action).is_some() {
                            scheduler.interact();
                        }
                    }
                }
            }
            AppEvent::Tick => {
                if let Some(FeedOutcome::Failed(e)) = finished_archive(&mut archive_task).await {
                    tui_app.set_status(format!("Could not load all news: {}", e));
                }
            }
        }

        if tui_app.should_quit {
            break;
        }
    }

    if let Some(task) = archive_task.take() {
        task.abort();
    }
    Ok(())
}

fn load_archive(
    task: &mut Option<JoinHandle<FeedOutcome>>,
    coordinator: &Arc<FetchCoordinator>,
    policy: FetchPolicy,
) {
    if task.is_some() {
        debug!("Archive load already in flight");
        return;
    }
    let coordinator = coordinator.clone();
    *task = Some(tokio::spawn(async move {
        coordinator.refresh_feed(&FeedKey::Archive, policy).await
    }));
}

async fn finished_archive(task: &mut Option<JoinHandle<FeedOutcome>>) -> Option<FeedOutcome> {
    if !task.as_ref()?.is_finished() {
        return None;
    }
    match task.take()?.await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            warn!("Archive load task failed: {}", e);
            None
        }
    }
}
