//! JSONL export of a running session.
//!
//! One `"decision"` line per applied action and one `"hand"` line per
//! completed hand. Decision lines carry the whole [`DecisionEvent`] so
//! `tiltbench eval` can score them later.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tiltbench_ai::ev::{evaluate_decision, EvReport, EvSettings};
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::cards::Card;
use tiltbench_engine::events::{DecisionEvent, EventSink, HandRecord, Recovery, ShowdownInfo};
use tiltbench_engine::pot::PotResult;
use tiltbench_engine::state::Street;
use tracing::{debug, warn};

#[derive(Serialize)]
struct DecisionLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    hand_id: &'a str,
    ts: DateTime<Utc>,
    sequence: u32,
    seat: usize,
    street: Street,
    action: String,
    amount: u32,
    stack_after: u32,
    pot: u32,
    scripted: bool,
    recovery: Option<&'a Recovery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ev: Option<&'a EvReport>,
    event: &'a DecisionEvent,
}

#[derive(Serialize)]
struct HandLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    hand_id: &'a str,
    ts: DateTime<Utc>,
    button: usize,
    board: &'a [Card],
    final_street: Street,
    starting_stacks: &'a [u32],
    final_stacks: &'a [u32],
    net: Vec<i64>,
    pots: &'a [PotResult],
    rake: u32,
    scripted: bool,
    showdown: Option<&'a ShowdownInfo>,
}

/// A line read back from a session log. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogLine {
    Decision {
        event: Box<DecisionEvent>,
        #[serde(default)]
        ev: Option<EvReport>,
    },
    Hand {
        hand_id: String,
        net: Vec<i64>,
    },
}

/// Per-seat running totals of scored decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeatRegret {
    pub decisions: u32,
    pub total_regret: f64,
    pub total_ev: f64,
}

impl SeatRegret {
    pub fn mean_regret(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.total_regret / f64::from(self.decisions)
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RegretTally {
    pub seats: BTreeMap<usize, SeatRegret>,
}

impl RegretTally {
    pub fn add(&mut self, report: &EvReport) {
        let entry = self.seats.entry(report.seat).or_default();
        entry.decisions += 1;
        entry.total_regret += report.regret();
        entry.total_ev += report.taken_ev;
    }
}

#[derive(Debug, Default)]
struct SinkState {
    lines: u64,
    error: Option<std::io::Error>,
    tally: RegretTally,
}

/// Read access to a [`JsonlSink`] after it has been handed to a table.
#[derive(Debug, Clone)]
pub struct JsonlHandle {
    state: Arc<Mutex<SinkState>>,
}

impl JsonlHandle {
    pub fn lines_written(&self) -> u64 {
        self.lock().lines
    }

    /// First write error, if any. Writing stops after it.
    pub fn take_error(&self) -> Option<std::io::Error> {
        self.lock().error.take()
    }

    pub fn tally(&self) -> RegretTally {
        self.lock().tally.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writes session events as JSON lines.
pub struct JsonlSink<W: Write + Send> {
    out: W,
    scoring: Option<(EvSettings, CancelToken)>,
    state: Arc<Mutex<SinkState>>,
}

impl<W: Write + Send> JsonlSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            scoring: None,
            state: Arc::new(Mutex::new(SinkState::default())),
        }
    }

    /// Score every decision before writing it and attach the report.
    pub fn with_ev(mut self, settings: EvSettings, cancel: CancelToken) -> Self {
        self.scoring = Some((settings, cancel));
        self
    }

    pub fn handle(&self) -> JsonlHandle {
        JsonlHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn write_line<T: Serialize>(&mut self, value: &T) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.error.is_some() {
            return;
        }
        let result = serde_json::to_string(value)
            .map_err(std::io::Error::from)
            .and_then(|line| writeln!(self.out, "{}", line));
        match result {
            Ok(()) => state.lines += 1,
            Err(e) => {
                warn!(error = %e, "session log write failed; further lines dropped");
                state.error = Some(e);
            }
        }
    }

    fn score(&self, event: &DecisionEvent) -> Option<EvReport> {
        let (settings, cancel) = self.scoring.as_ref()?;
        match evaluate_decision(event, settings, cancel) {
            Ok(report) => Some(report),
            Err(e) => {
                debug!(hand_id = %event.hand_id, seat = event.seat, error = %e, "decision not scored");
                None
            }
        }
    }
}

impl<W: Write + Send> EventSink for JsonlSink<W> {
    fn on_decision(&mut self, event: &DecisionEvent) {
        let ev = self.score(event);
        if let Some(report) = &ev {
            self.state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .tally
                .add(report);
        }
        let line = DecisionLine {
            kind: "decision",
            hand_id: &event.hand_id,
            ts: event.timestamp,
            sequence: event.sequence,
            seat: event.seat,
            street: event.street,
            action: event.applied.to_string(),
            amount: event.applied.amount(),
            stack_after: event.stack_after,
            pot: event.pot_after,
            scripted: event.scripted,
            recovery: event.recovery.as_ref(),
            ev: ev.as_ref(),
            event,
        };
        self.write_line(&line);
    }

    fn on_hand_complete(&mut self, record: &HandRecord) {
        let line = HandLine {
            kind: "hand",
            hand_id: &record.hand_id,
            ts: record.ts,
            button: record.button,
            board: &record.board,
            final_street: record.final_street,
            starting_stacks: &record.starting_stacks,
            final_stacks: &record.final_stacks,
            net: record.net(),
            pots: &record.pots,
            rake: record.rake,
            scripted: record.scripted,
            showdown: record.showdown.as_ref(),
        };
        self.write_line(&line);
        if let Err(e) = self.out.flush() {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.error.is_none() {
                warn!(error = %e, "session log flush failed");
                state.error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiltbench_ai::model::Alternative;
    use tiltbench_engine::rules::Action;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn report(seat: usize, taken_ev: f64, best: f64) -> EvReport {
        EvReport {
            hand_id: "20260101-000001".into(),
            sequence: 0,
            seat,
            taken: Action::Fold,
            taken_ev,
            alternatives: vec![tiltbench_ai::ev::AlternativeEv {
                kind: Alternative::CheckCall,
                action: Action::Call(10),
                ev: best,
            }],
            samples: 10,
        }
    }

    #[test]
    fn tally_accumulates_per_seat() {
        let mut tally = RegretTally::default();
        tally.add(&report(1, 0.0, 30.0));
        tally.add(&report(1, 10.0, 10.0));
        let seat = tally.seats[&1];
        assert_eq!(seat.decisions, 2);
        assert!((seat.mean_regret() - 15.0).abs() < 1e-9);
        assert!(!tally.seats.contains_key(&0));
    }

    #[test]
    fn write_errors_are_kept_not_raised() {
        let mut sink = JsonlSink::new(Broken);
        let handle = sink.handle();
        sink.write_line(&serde_json::json!({"type": "hand"}));
        sink.write_line(&serde_json::json!({"type": "hand"}));
        assert_eq!(handle.lines_written(), 0);
        assert!(handle.take_error().is_some());
        assert!(handle.take_error().is_none());
    }

    #[test]
    fn hand_lines_read_back() {
        let line: LogLine =
            serde_json::from_str(r#"{"type":"hand","hand_id":"x","net":[5,-5],"rake":0}"#).unwrap();
        assert!(matches!(line, LogLine::Hand { ref net, .. } if net == &vec![5, -5]));
    }
}
