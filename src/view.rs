//! Dashboard view: owns the refresh loop and the countdown ticker.
//!
//! Both timers are tokio tasks acquired on [`DashboardView::mount`] and aborted
//! when the view is dropped, so no scheduled work outlives the view.
//!
//! A manual refresh that arrives while a cycle is still fetching cancels
//! that cycle; dropping its future drops the in-flight HTTP requests. The
//! generation check in [`AppState::publish`] keeps an older cycle from ever
//! replacing a newer snapshot.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::aggregate::summarize;
use crate::render::{render_dashboard, RenderOptions};
use crate::source::{load_dataset, RecordSource};
use crate::state::{AppState, Snapshot};

const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Run adapter, normalizer, and aggregator once.
pub async fn refresh_cycle(
    state: &AppState,
    source: Option<&dyn RecordSource>,
    generation: u64,
) -> Snapshot {
    let data = load_dataset(source, &state.config.notion.properties).await;
    let refreshed_at = Local::now();
    let summary = summarize(&data.dataset, refreshed_at.date_naive());

    Snapshot {
        generation,
        data,
        summary,
        refreshed_at,
    }
}

fn emit_frame(state: &AppState, frames: &mpsc::Sender<String>, options: &RenderOptions) {
    let snapshot = state.snapshot();
    let frame = render_dashboard(snapshot.as_deref(), state.countdown(), options);
    // Frames are cosmetic; a slow consumer just misses one.
    let _ = frames.try_send(frame);
}

async fn run_refresh_loop(
    state: Arc<AppState>,
    source: Option<Arc<dyn RecordSource>>,
    frames: mpsc::Sender<String>,
    options: RenderOptions,
) {
    let period = Duration::from_secs(state.refresh_period_secs());

    loop {
        let generation = state.begin_refresh();
        log::debug!("Dashboard: refresh cycle {} started", generation);

        tokio::select! {
            snapshot = refresh_cycle(&state, source.as_deref(), generation) => {
                if state.publish(snapshot) {
                    state.reset_countdown();
                    state.countdown_reset.notify_one();
                    emit_frame(&state, &frames, &options);
                }
            }
            _ = state.refresh_wake.notified() => {
                log::info!("Dashboard: manual refresh cancelled in-flight cycle {}", generation);
                continue;
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            _ = state.refresh_wake.notified() => {
                log::info!("Dashboard: woken by manual refresh");
            }
        }
    }
}

async fn run_countdown(state: Arc<AppState>, frames: mpsc::Sender<String>, options: RenderOptions) {
    let mut ticker = interval_at(Instant::now() + COUNTDOWN_TICK, COUNTDOWN_TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                state.tick_countdown();
            }
            _ = state.countdown_reset.notified() => {
                state.reset_countdown();
                ticker.reset();
            }
        }
        emit_frame(&state, &frames, &options);
    }
}

/// A mounted dashboard. Dropping it cancels both timers.
pub struct DashboardView {
    state: Arc<AppState>,
    refresh_task: JoinHandle<()>,
    countdown_task: JoinHandle<()>,
}

impl DashboardView {
    /// Start the refresh loop (first cycle runs immediately) and the
    /// one-second countdown. Rendered frames are sent on `frames`.
    pub fn mount(
        state: Arc<AppState>,
        source: Option<Arc<dyn RecordSource>>,
        frames: mpsc::Sender<String>,
        options: RenderOptions,
    ) -> Self {
        let refresh_task = tokio::spawn(run_refresh_loop(
            state.clone(),
            source,
            frames.clone(),
            options.clone(),
        ));
        let countdown_task = tokio::spawn(run_countdown(state.clone(), frames, options));

        log::info!(
            "Dashboard: mounted (refresh every {}s)",
            state.refresh_period_secs()
        );

        Self {
            state,
            refresh_task,
            countdown_task,
        }
    }

    /// Re-run the pipeline now and restart both timers.
    pub fn refresh_now(&self) {
        log::info!("Dashboard: manual refresh requested");
        self.state.request_refresh();
    }

    /// Tear the view down. Equivalent to dropping it.
    pub fn unmount(self) {}
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.refresh_task.abort();
        self.countdown_task.abort();
        log::info!("Dashboard: unmounted, timers cancelled");
    }
}
