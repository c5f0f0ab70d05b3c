use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use futures_util::{stream, StreamExt};
use sitewatch_core::{CycleStats, MonitorSettings, SiteReport, SiteSpec, SiteStatus};
use sitewatch_logging::{watch_debug, watch_info};
use tokio::sync::mpsc as async_mpsc;

use crate::fetch::PageFetcher;
use crate::notify::NotificationSink;
use crate::pipeline::{CheckOutcome, DiffArtifact, SitePipeline};
use crate::score::AnomalyScorer;
use crate::store::SnapshotStore;

/// Where the monitor currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Stopping,
}

const STATE_IDLE: u8 = 0;
const STATE_RUNNING: u8 = 1;
const STATE_STOPPING: u8 = 2;

fn run_state(raw: u8) -> RunState {
    match raw {
        STATE_RUNNING => RunState::Running,
        STATE_STOPPING => RunState::Stopping,
        _ => RunState::Idle,
    }
}

enum MonitorCommand {
    UpdateSites(Vec<SiteSpec>),
    Stop,
}

/// Everything the loop tells the outside world.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    CycleStarted {
        cycle: u64,
        sites: usize,
    },
    SiteChecked {
        cycle: u64,
        report: SiteReport,
    },
    /// A comparison happened; both raw captures ride along for external
    /// diff rendering.
    DiffComputed {
        cycle: u64,
        artifact: DiffArtifact,
    },
    CycleFinished {
        cycle: u64,
        stats: CycleStats,
    },
    /// Always the last event of a session.
    Stopped,
}

/// Owning handle to a monitor session running on its own thread.
///
/// The thread owns a tokio runtime; commands go in over a bounded channel,
/// events come out over a std channel the caller can poll from any thread.
pub struct MonitorHandle {
    cmd_tx: async_mpsc::Sender<MonitorCommand>,
    event_rx: mpsc::Receiver<MonitorEvent>,
    state: Arc<AtomicU8>,
    thread: Option<thread::JoinHandle<()>>,
}

impl MonitorHandle {
    /// Spawns the monitor thread and starts cycling immediately.
    pub fn start(
        settings: MonitorSettings,
        sites: Vec<SiteSpec>,
        fetcher: Arc<dyn PageFetcher>,
        scorer: Arc<dyn AnomalyScorer>,
        sinks: Vec<Arc<dyn NotificationSink>>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = async_mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel();
        let state = Arc::new(AtomicU8::new(STATE_RUNNING));

        let loop_state = Arc::clone(&state);
        let thread = thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let store = Arc::new(SnapshotStore::new());
            let pipeline = Arc::new(SitePipeline::new(
                fetcher,
                scorer,
                sinks,
                store,
                settings.clone(),
            ));
            runtime.block_on(run_loop(
                settings,
                sites,
                pipeline,
                cmd_rx,
                event_tx.clone(),
                Arc::clone(&loop_state),
            ));
            loop_state.store(STATE_IDLE, Ordering::SeqCst);
            let _ = event_tx.send(MonitorEvent::Stopped);
        });

        Self {
            cmd_tx,
            event_rx,
            state,
            thread: Some(thread),
        }
    }

    /// Replaces the site set; takes effect at the next cycle boundary.
    pub fn update_sites(&self, sites: Vec<SiteSpec>) {
        let _ = self.cmd_tx.try_send(MonitorCommand::UpdateSites(sites));
    }

    /// Asks the loop to finish in-flight checks and exit. Safe to call
    /// more than once.
    pub fn stop(&self) {
        let _ = self.state.compare_exchange(
            STATE_RUNNING,
            STATE_STOPPING,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        let _ = self.cmd_tx.try_send(MonitorCommand::Stop);
    }

    pub fn state(&self) -> RunState {
        run_state(self.state.load(Ordering::SeqCst))
    }

    /// Non-blocking event poll.
    pub fn try_recv(&self) -> Option<MonitorEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocking event poll with a deadline, for event pumps.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<MonitorEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Waits for the monitor thread to exit. Call `stop` first.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn run_loop(
    settings: MonitorSettings,
    initial_sites: Vec<SiteSpec>,
    pipeline: Arc<SitePipeline>,
    mut cmd_rx: async_mpsc::Receiver<MonitorCommand>,
    event_tx: mpsc::Sender<MonitorEvent>,
    state: Arc<AtomicU8>,
) {
    let mut sites = initial_sites;
    let interval = settings.effective_interval();
    let width = settings.max_concurrency.max(1);
    let mut cycle: u64 = 0;

    watch_info!(
        "monitor started: {} sites, interval {:?}",
        sites.len(),
        interval
    );

    'session: while state.load(Ordering::SeqCst) == STATE_RUNNING {
        // Absorb commands that arrived while checking or sleeping.
        loop {
            match cmd_rx.try_recv() {
                Ok(MonitorCommand::UpdateSites(next)) => sites = next,
                Ok(MonitorCommand::Stop) => break 'session,
                Err(_) => break,
            }
        }

        cycle += 1;
        let _ = event_tx.send(MonitorEvent::CycleStarted {
            cycle,
            sites: sites.len(),
        });
        watch_debug!("cycle {} started with {} sites", cycle, sites.len());

        let mut stats = CycleStats {
            sites: sites.len(),
            ..CycleStats::default()
        };
        let mut checks = stream::iter(sites.clone())
            .map(|site| {
                let pipeline = Arc::clone(&pipeline);
                async move { pipeline.check_site(&site).await }
            })
            .buffer_unordered(width);
        while let Some(outcome) = checks.next().await {
            let CheckOutcome {
                report,
                diff,
                notified,
            } = outcome;
            if report.status == SiteStatus::Unavailable {
                stats.unavailable += 1;
            }
            if notified {
                stats.notifications += 1;
            }
            let _ = event_tx.send(MonitorEvent::SiteChecked { cycle, report });
            if let Some(artifact) = diff {
                let _ = event_tx.send(MonitorEvent::DiffComputed { cycle, artifact });
            }
        }

        let _ = event_tx.send(MonitorEvent::CycleFinished { cycle, stats });
        watch_debug!(
            "cycle {} finished: {} unavailable, {} notifications",
            cycle,
            stats.unavailable,
            stats.notifications
        );

        if state.load(Ordering::SeqCst) != STATE_RUNNING {
            break;
        }

        // Interruptible sleep: stop wakes it, site updates do not shorten
        // it.
        let wake = tokio::time::Instant::now() + interval;
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(wake) => break,
                command = cmd_rx.recv() => match command {
                    Some(MonitorCommand::UpdateSites(next)) => sites = next,
                    Some(MonitorCommand::Stop) | None => break 'session,
                },
            }
        }
    }

    watch_info!("monitor stopping after {} cycles", cycle);
}
