#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tiltbench_engine::agent::Strategy;
use tiltbench_engine::observation::Observation;
use tiltbench_engine::rules::Action;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::{LookupSpan, Registry};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Collects every event emitted while installed.
#[derive(Clone, Default)]
pub struct TestLogSubscriber {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogSubscriber {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl<S> Layer<S> for TestLogSubscriber
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.entries.lock().unwrap().push(LogEntry {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

/// Run `f` with a thread-local capturing subscriber.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<LogEntry>) {
    let logs = TestLogSubscriber::default();
    let subscriber = Registry::default().with(logs.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, logs.entries())
}

/// Picks uniformly among fold / passive / a random legal raise size.
pub struct RandomLegal {
    rng: ChaCha8Rng,
}

impl RandomLegal {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomLegal {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        let legal = &obs.legal;
        match self.rng.random_range(0..10) {
            0 if !legal.check => Action::Fold,
            1..=2 => match legal.raise {
                Some(r) => r.action(self.rng.random_range(r.min_to..=r.max_to)),
                None => legal.passive(),
            },
            3 => legal.all_in(),
            _ => legal.passive(),
        }
    }
}

/// Always answers with the same action, legal or not.
pub struct Stubborn(pub Action);

impl Strategy for Stubborn {
    fn name(&self) -> &str {
        "stubborn"
    }

    fn decide(&mut self, _obs: &Observation) -> Action {
        self.0
    }
}

/// Sleeps past any small budget before checking.
pub struct Sleepy(pub u64);

impl Strategy for Sleepy {
    fn name(&self) -> &str {
        "sleepy"
    }

    fn decide(&mut self, obs: &Observation) -> Action {
        std::thread::sleep(std::time::Duration::from_millis(self.0));
        obs.legal.passive()
    }
}
