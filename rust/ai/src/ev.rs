//! Counterfactual EV of recorded decisions.
//!
//! Works only on the frozen [`DecisionEvent`] snapshot. The hero's cards and
//! the board at decision time are known. Everything else is sampled and
//! opponents follow the call/fold model in [`crate::model`].

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};
use tiltbench_engine::cancel::CancelToken;
use tiltbench_engine::events::{DecisionEvent, EventSink, HandRecord};
use tiltbench_engine::rules::Action;
use tracing::{debug, warn};

use crate::errors::AiError;
use crate::model::{candidates, score_actions, Alternative, Spot};
use crate::rollout::RolloutBudget;

pub const DEFAULT_EV_SAMPLES: u32 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvSettings {
    pub samples: u32,
    pub seed: u64,
    /// Defend probability per seat; seats not listed use minimum-defence frequency
    #[serde(default)]
    pub tendencies: HashMap<usize, f64>,
}

impl Default for EvSettings {
    fn default() -> Self {
        Self {
            samples: DEFAULT_EV_SAMPLES,
            seed: 0,
            tendencies: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeEv {
    pub kind: Alternative,
    pub action: Action,
    pub ev: f64,
}

/// EV of the applied action and every legal alternative, in chips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvReport {
    pub hand_id: String,
    pub sequence: u32,
    pub seat: usize,
    pub taken: Action,
    pub taken_ev: f64,
    pub alternatives: Vec<AlternativeEv>,
    pub samples: u32,
}

impl EvReport {
    pub fn best(&self) -> Option<&AlternativeEv> {
        self.alternatives.iter().max_by(|a, b| a.ev.total_cmp(&b.ev))
    }

    /// Chips given up against the best alternative; never negative.
    pub fn regret(&self) -> f64 {
        self.best()
            .map_or(0.0, |b| (b.ev - self.taken_ev).max(0.0))
    }

    pub fn ev_of(&self, kind: Alternative) -> Option<f64> {
        self.alternatives
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.ev)
    }
}

fn event_seed(base: u64, event: &DecisionEvent) -> u64 {
    let id = event
        .hand_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x100_0000_01b3));
    base ^ id ^ u64::from(event.sequence).rotate_left(32)
}

/// Score one decision.
pub fn evaluate_decision(
    event: &DecisionEvent,
    settings: &EvSettings,
    cancel: &CancelToken,
) -> Result<EvReport, AiError> {
    let obs = &event.observation;
    let spot = Spot::from_observation(obs)?;
    let options = candidates(&event.legal, obs.pot, obs.bet_to_match, obs.to_call);
    let mut actions: Vec<Action> = options.iter().map(|(_, a)| *a).collect();
    let taken_index = match actions.iter().position(|a| *a == event.applied) {
        Some(i) => i,
        None => {
            actions.push(event.applied);
            actions.len() - 1
        }
    };
    let defend: HashMap<usize, f64> = spot
        .live_opponents()
        .into_iter()
        .filter_map(|seat| settings.tendencies.get(&seat).map(|&p| (seat, p.clamp(0.0, 1.0))))
        .collect();
    let budget = RolloutBudget {
        samples: settings.samples.max(1),
        seed: event_seed(settings.seed, event),
        deadline: None,
    };
    let sums = score_actions(&spot, &actions, &defend, &budget, cancel)?;
    let means = sums.means();
    let taken_ev = means.get(taken_index).copied().unwrap_or(0.0);
    let alternatives = options
        .iter()
        .zip(&means)
        .map(|((kind, action), ev)| AlternativeEv {
            kind: *kind,
            action: *action,
            ev: *ev,
        })
        .collect();
    debug!(
        hand_id = %event.hand_id,
        sequence = event.sequence,
        seat = event.seat,
        taken_ev,
        "decision scored"
    );
    Ok(EvReport {
        hand_id: event.hand_id.clone(),
        sequence: event.sequence,
        seat: event.seat,
        taken: event.applied,
        taken_ev,
        alternatives,
        samples: sums.samples,
    })
}

/// Score every decision of a completed hand, in order.
pub fn evaluate_hand(
    record: &HandRecord,
    settings: &EvSettings,
    cancel: &CancelToken,
) -> Result<Vec<EvReport>, AiError> {
    record
        .events
        .iter()
        .map(|e| evaluate_decision(e, settings, cancel))
        .collect()
}

enum Job {
    Event(Box<DecisionEvent>),
    Stop,
}

/// Scores decisions on a background thread while the session runs.
pub struct EvWorker {
    tx: Sender<Job>,
    handle: JoinHandle<Vec<EvReport>>,
    cancel: CancelToken,
}

/// [`EventSink`] feeding an [`EvWorker`].
#[derive(Clone)]
pub struct EvWorkerSink {
    tx: Sender<Job>,
}

impl EventSink for EvWorkerSink {
    fn on_decision(&mut self, event: &DecisionEvent) {
        if self.tx.send(Job::Event(Box::new(event.clone()))).is_err() {
            warn!("EV worker is gone; decision not scored");
        }
    }
}

impl EvWorker {
    pub fn spawn(settings: EvSettings, cancel: CancelToken) -> Self {
        let (tx, rx) = channel();
        let worker_cancel = cancel.clone();
        let handle = thread::spawn(move || Self::work(rx, settings, worker_cancel));
        Self { tx, handle, cancel }
    }

    fn work(rx: Receiver<Job>, settings: EvSettings, cancel: CancelToken) -> Vec<EvReport> {
        let mut reports = Vec::new();
        while let Ok(job) = rx.recv() {
            let event = match job {
                Job::Event(event) => event,
                Job::Stop => break,
            };
            match evaluate_decision(&event, &settings, &cancel) {
                Ok(report) => reports.push(report),
                Err(AiError::Cancelled) => break,
                Err(e) => debug!(hand_id = %event.hand_id, error = %e, "decision skipped"),
            }
        }
        reports
    }

    pub fn sink(&self) -> EvWorkerSink {
        EvWorkerSink {
            tx: self.tx.clone(),
        }
    }

    /// Wait for queued work and return every report.
    ///
    /// If the token was cancelled, partial results are dropped.
    pub fn finish(self) -> Result<Vec<EvReport>, AiError> {
        // A send error only means the worker already exited.
        let _ = self.tx.send(Job::Stop);
        let reports = self.handle.join().map_err(|_| AiError::WorkerGone)?;
        if self.cancel.is_cancelled() {
            return Err(AiError::Cancelled);
        }
        Ok(reports)
    }
}
