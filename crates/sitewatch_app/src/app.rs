//! Console entry point: wires config, engine and sinks together and pumps
//! monitor events to stdout until the user asks to stop.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sitewatch_engine::{
    LogSink, MarkerScorer, MonitorEvent, MonitorHandle, NotificationSink, TieredFetcher,
    WebhookSink,
};
use sitewatch_logging::{watch_error, watch_info, watch_warn};

use crate::{config, logging, render};

const DEFAULT_CONFIG: &str = "sitewatch.ron";
const EVENT_POLL: Duration = Duration::from_millis(200);

pub fn run() -> ExitCode {
    logging::initialize();

    let config_path = config_path_from_args();
    let config = match config::load(&config_path) {
        Ok(config) => config,
        Err(err) => return report_config_error(&config_path, err),
    };
    if config.sites.is_empty() {
        eprintln!("sitewatch: no sites configured in {}", config_path.display());
        return ExitCode::FAILURE;
    }

    let settings = config.settings;
    let fetcher = match TieredFetcher::new(&settings, renderer()) {
        Ok(fetcher) => Arc::new(fetcher),
        Err(err) => {
            watch_error!("cannot start: {}", err);
            eprintln!("sitewatch: http client setup failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let scorer = Arc::new(MarkerScorer::default());

    let mut sinks: Vec<Arc<dyn NotificationSink>> = vec![Arc::new(LogSink)];
    if let Some(endpoint) = &config.webhook {
        match WebhookSink::new(endpoint.clone(), settings.fetch_timeout) {
            Ok(sink) => sinks.push(Arc::new(sink)),
            Err(err) => watch_warn!("webhook sink disabled: {}", err),
        }
    }

    watch_info!(
        "watching {} site(s) every {:?}",
        config.sites.len(),
        settings.effective_interval()
    );
    println!("{}", render::header());

    let handle = MonitorHandle::start(settings, config.sites, fetcher, scorer, sinks);
    let stop_requested = spawn_stdin_watcher();

    let mut stopping = false;
    loop {
        if !stopping && stop_requested.try_recv().is_ok() {
            stopping = true;
            watch_info!("shutdown requested");
            println!("stopping after the current cycle...");
            handle.stop();
        }
        match handle.recv_timeout(EVENT_POLL) {
            Some(MonitorEvent::Stopped) => break,
            Some(event) => print_event(&event),
            None => {}
        }
    }
    handle.join();
    ExitCode::SUCCESS
}

fn print_event(event: &MonitorEvent) {
    match event {
        MonitorEvent::CycleStarted { cycle, sites } => {
            println!("{}", render::cycle_started(*cycle, *sites));
        }
        MonitorEvent::SiteChecked { report, .. } => {
            println!("{}", render::report_row(report));
        }
        MonitorEvent::DiffComputed { artifact, .. } => {
            if let Some(note) = render::diff_note(artifact) {
                println!("{note}");
            }
        }
        MonitorEvent::CycleFinished { cycle, stats } => {
            println!("{}", render::cycle_summary(*cycle, stats));
        }
        MonitorEvent::Stopped => {}
    }
}

fn config_path_from_args() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
}

fn report_config_error(path: &std::path::Path, err: config::ConfigError) -> ExitCode {
    watch_error!("cannot start: {}", err);
    eprintln!("sitewatch: {err}");
    if let config::ConfigError::Read { source, .. } = &err {
        if source.kind() == io::ErrorKind::NotFound {
            eprintln!("create {} like this:\n{}", path.display(), config::template());
        }
    }
    ExitCode::FAILURE
}

/// A line on stdin (or stdin closing) asks for shutdown.
fn spawn_stdin_watcher() -> mpsc::Receiver<()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut line = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
        let _ = tx.send(());
    });
    rx
}

#[cfg(feature = "headless")]
fn renderer() -> Option<Arc<dyn sitewatch_engine::DynamicRenderer>> {
    Some(Arc::new(sitewatch_engine::ChromiumRenderer))
}

#[cfg(not(feature = "headless"))]
fn renderer() -> Option<Arc<dyn sitewatch_engine::DynamicRenderer>> {
    None
}
