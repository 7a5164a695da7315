//! Tokio driver for [`RefreshScheduler`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::fetcher::{CycleReport, FetchCoordinator};
use crate::scheduler::{Directive, RefreshKind, RefreshScheduler, Trigger};

/// Whatever the scheduler keeps fresh.
#[async_trait]
pub trait RefreshTarget: Send + Sync {
    async fn refresh(&self);
}

#[async_trait]
impl RefreshTarget for FetchCoordinator {
    async fn refresh(&self) {
        let CycleReport { live, .. } = self.refresh_cycle().await;
        if live.is_failure() {
            debug!("Live feed refresh failed; keeping current data");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Open,
    Interact,
    ManualRefresh,
    Close,
}

/// Raises the busy flag for as long as it lives.
struct BusyGuard {
    busy: Arc<watch::Sender<bool>>,
}

impl BusyGuard {
    fn raise(busy: &Arc<watch::Sender<bool>>) -> Self {
        busy.send_replace(true);
        Self { busy: busy.clone() }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

/// Control surface of a running scheduler.
///
/// Dropping the handle stops the driver; a refresh already in flight still
/// runs to completion.
pub struct SchedulerHandle {
    commands: mpsc::UnboundedSender<Command>,
    busy: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn open(&self) {
        self.send(Command::Open);
    }

    pub fn interact(&self) {
        self.send(Command::Interact);
    }

    pub fn refresh(&self) {
        self.send(Command::ManualRefresh);
    }

    pub fn close(&self) {
        self.send(Command::Close);
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Stop the driver and wait for it to exit.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            warn!("Scheduler task ended abnormally: {}", e);
        }
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Scheduler stopped; dropping {:?}", command);
        }
    }
}

/// Spawn the scheduler driver. The view starts closed; call
/// [`SchedulerHandle::open`] when it becomes active.
pub fn spawn_scheduler(
    target: Arc<dyn RefreshTarget>,
    interval: Duration,
    min_busy: Duration,
) -> SchedulerHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (busy_tx, busy_rx) = watch::channel(false);

    let driver = Driver {
        machine: RefreshScheduler::new(interval),
        target,
        min_busy,
        busy: Arc::new(busy_tx),
        in_flight: None,
    };
    let task = tokio::spawn(driver.run(commands_rx));

    SchedulerHandle {
        commands: commands_tx,
        busy: busy_rx,
        task,
    }
}

struct Driver {
    machine: RefreshScheduler,
    target: Arc<dyn RefreshTarget>,
    min_busy: Duration,
    busy: Arc<watch::Sender<bool>>,
    in_flight: Option<JoinHandle<()>>,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(
            "Refresh scheduler started (interval: {})",
            super::interval::format_interval(self.machine.interval())
        );

        loop {
            let deadline = self.machine.deadline();
            let has_in_flight = self.in_flight.is_some();

            let trigger = tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Open) => Trigger::ViewOpened,
                    Some(Command::Interact) => Trigger::Interact,
                    Some(Command::ManualRefresh) => Trigger::ManualRefresh,
                    Some(Command::Close) => Trigger::ViewClosed,
                    None => break,
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    Trigger::Tick
                }
                joined = async {
                    match self.in_flight.as_mut() {
                        Some(handle) => handle.await,
                        None => std::future::pending().await,
                    }
                }, if has_in_flight => {
                    if let Err(e) = joined {
                        warn!("Refresh task failed: {}", e);
                    }
                    self.in_flight = None;
                    Trigger::RefreshFinished
                }
            };

            let directive = self.machine.handle(trigger, Instant::now());
            debug!(
                "Scheduler {:?} -> {:?} ({:?})",
                trigger,
                self.machine.state(),
                directive
            );
            self.apply(directive);
        }

        info!("Refresh scheduler stopped");
    }

    fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Nothing => {}
            Directive::Start(kind) => self.start(kind),
            Directive::Adopt => self.adopt(),
        }
    }

    /// Hold the busy flag over the refresh already in flight. The adopted
    /// refresh only counts as finished once the minimum busy time has also
    /// passed, same as a manual refresh started directly.
    fn adopt(&mut self) {
        let Some(running) = self.in_flight.take() else {
            return;
        };
        let guard = BusyGuard::raise(&self.busy);
        let min_busy = self.min_busy;
        self.in_flight = Some(tokio::spawn(async move {
            let _guard = guard;
            let (joined, _) = tokio::join!(running, sleep(min_busy));
            if let Err(e) = joined {
                warn!("Adopted refresh failed: {}", e);
            }
        }));
    }

    fn start(&mut self, kind: RefreshKind) {
        let target = self.target.clone();

        let task = if kind == RefreshKind::Manual {
            let guard = BusyGuard::raise(&self.busy);
            let min_busy = self.min_busy;
            tokio::spawn(async move {
                let _guard = guard;
                tokio::join!(target.refresh(), sleep(min_busy));
            })
        } else {
            tokio::spawn(async move { target.refresh().await })
        };

        self.in_flight = Some(task);
    }
}
