//! Replay scheduler: forward-only stepping and continuous playback.
//!
//! The scheduler owns the session (event sequence, cursor, mode), the
//! replay state, the audit log, and the sink. Continuous mode is a
//! single tick loop with one suspension point per tick; cancellation
//! lands at tick boundaries, so an event is always either fully applied
//! or not applied at all. The configured rate is a soft pacing signal,
//! not a deadline.

use replay_protocol::Event;
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::audit::{AuditLog, AuditRow};
use crate::reconstructor::{ApplyOutcome, ReplayState};
use crate::sink::StructuralSink;

/// Normal halt signal: the cursor already sits on the last event.
/// Callers disable further stepping; this is not an error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("end of log")]
pub struct EndOfLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    Idle,
    Stepping,
    Continuous,
}

/// Rates at or below zero would stall the tick loop forever.
const MIN_EVENTS_PER_SECOND: f64 = 0.001;

pub struct ReplayScheduler<S: StructuralSink> {
    events: Vec<Event>,
    /// `None` means "before the first event".
    cursor: Option<usize>,
    mode: ReplayMode,
    state: ReplayState,
    audit: AuditLog,
    sink: S,
}

impl<S: StructuralSink> ReplayScheduler<S> {
    pub fn new(sink: S) -> Self {
        Self {
            events: Vec::new(),
            cursor: None,
            mode: ReplayMode::Idle,
            state: ReplayState::new(),
            audit: AuditLog::new(),
            sink,
        }
    }

    /// Start a fresh session over `events`: cursor back before the
    /// first event, tree and registry to the root-only state, audit
    /// emptied. The only way to go backward.
    pub fn load(&mut self, events: Vec<Event>) {
        self.events = events;
        self.cursor = None;
        self.mode = ReplayMode::Idle;
        self.state.reset();
        self.audit.clear();
        debug!(events = self.events.len(), "session loaded");
    }

    /// Apply exactly one event and forward its ops to the sink.
    /// Forward-only: the cursor never decreases.
    pub fn step(&mut self) -> Result<(), EndOfLog> {
        self.mode = ReplayMode::Stepping;
        self.advance()
    }

    /// Continuous playback at `events_per_second` until end of log or
    /// `stop` is cancelled. While the sink reports busy, ticks are
    /// skipped rather than queued. Manual stepping remains valid after
    /// this returns.
    pub async fn run_continuous(&mut self, events_per_second: f64, stop: &CancellationToken) {
        self.mode = ReplayMode::Continuous;
        let period =
            Duration::from_secs_f64(1.0 / events_per_second.max(MIN_EVENTS_PER_SECOND));
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                _ = ticks.tick() => {}
            }
            if !self.sink.is_idle() {
                // Backpressure: drop this tick, try again next period.
                continue;
            }
            if self.advance().is_err() {
                break;
            }
        }
        self.mode = ReplayMode::Idle;
    }

    fn advance(&mut self) -> Result<(), EndOfLog> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.events.len() {
            return Err(EndOfLog);
        }
        self.cursor = Some(next);
        let outcome = self.state.apply(&self.events[next]);
        for op in &outcome.ops {
            self.sink.apply(op);
        }
        self.audit.push(build_audit_row(&self.events[next], &outcome));
        Ok(())
    }

    /// Index of the last applied event; `None` before the first step.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn state(&self) -> &ReplayState {
        &self.state
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

fn build_audit_row(event: &Event, outcome: &ApplyOutcome) -> AuditRow {
    let context = match &outcome.diagnostic {
        Some(diagnostic) => diagnostic.to_string(),
        None if outcome.ops.is_empty() => "no-op".to_string(),
        None => format!("{} structural op(s)", outcome.ops.len()),
    };
    AuditRow {
        time: event.timestamp.clone(),
        category: event.stage.category().to_string(),
        action: event.stage.as_str().to_string(),
        report_id: event.report_id().map(str::to_string),
        context,
    }
}
