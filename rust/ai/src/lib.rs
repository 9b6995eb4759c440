//! # tiltbench-ai: Strategies and Decision Scoring
//!
//! AI opponents for the tiltbench engine and the counterfactual EV module
//! used to score recorded decisions.
//!
//! ## Core Components
//!
//! - [`heuristic`] - Strength-table strategy shaped by the seat profile
//! - [`montecarlo`] - Rollout strategy choosing the highest-EV candidate
//! - [`gto`] - Mixed policies from a JSON strategy table with regret matching
//! - [`ev`] - EV of the action taken versus its alternatives
//! - [`rollout`] - Chunked, seeded sampling run on rayon
//! - [`opponents`] - Per-seat tendency tracking
//! - [`create_strategy`] - Factory by [`StrategyKind`]
//!
//! ## Quick Start
//!
//! ```rust
//! use tiltbench_ai::{create_strategy, StrategyKind};
//! use tiltbench_engine::config::{GameConfig, SeatConfig};
//! use tiltbench_engine::observation::Profile;
//! use tiltbench_engine::agent::Controller;
//! use tiltbench_engine::table::Table;
//!
//! let mut config = GameConfig::new(vec![
//!     SeatConfig::ai("h1", Profile::default()),
//!     SeatConfig::ai("h2", Profile { skill: 0.9, aggression: 0.3 }),
//! ]);
//! config.seed = Some(5);
//! let controllers = vec![
//!     Controller::Strategy(create_strategy(StrategyKind::Heuristic, 1)),
//!     Controller::Strategy(create_strategy(StrategyKind::Gto, 2)),
//! ];
//! let mut table = Table::new(config, controllers, None).unwrap();
//! table.run(5).unwrap();
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tiltbench_engine::agent::Strategy;

pub mod errors;
pub mod ev;
pub mod gto;
pub mod heuristic;
pub mod model;
pub mod montecarlo;
pub mod opponents;
pub mod rollout;
pub mod strength;

pub use errors::AiError;

/// Available AI strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Heuristic,
    MonteCarlo,
    Gto,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Heuristic,
        StrategyKind::MonteCarlo,
        StrategyKind::Gto,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Heuristic => "heuristic",
            StrategyKind::MonteCarlo => "montecarlo",
            StrategyKind::Gto => "gto",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(StrategyKind::Heuristic),
            "montecarlo" | "mc" => Ok(StrategyKind::MonteCarlo),
            "gto" => Ok(StrategyKind::Gto),
            other => Err(format!(
                "unknown strategy '{}' (expected heuristic, montecarlo or gto)",
                other
            )),
        }
    }
}

/// Tuning shared by the factory.
#[derive(Debug, Clone, Default)]
pub struct StrategyOptions {
    /// Rollouts per Monte-Carlo decision; `None` uses the default
    pub rollouts: Option<u32>,
    /// Strategy table for the GTO seat; `None` uses the built-in prior
    pub table: Option<gto::StrategyTable>,
    /// Let GTO seats refine their table from their own decisions after each hand
    pub refinement: Option<ev::EvSettings>,
}

/// Build a strategy with default options.
///
/// # Example
///
/// ```rust
/// use tiltbench_ai::{create_strategy, StrategyKind};
///
/// let s = create_strategy("mc".parse::<StrategyKind>().unwrap(), 7);
/// assert_eq!(s.name(), "montecarlo");
/// ```
pub fn create_strategy(kind: StrategyKind, seed: u64) -> Box<dyn Strategy> {
    create_strategy_with(kind, seed, StrategyOptions::default())
}

pub fn create_strategy_with(kind: StrategyKind, seed: u64, options: StrategyOptions) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Heuristic => Box::new(heuristic::HeuristicStrategy::new(seed)),
        StrategyKind::MonteCarlo => Box::new(montecarlo::MonteCarloStrategy::new(
            seed,
            options.rollouts.unwrap_or(montecarlo::DEFAULT_ROLLOUTS),
        )),
        StrategyKind::Gto => {
            let gto = gto::GtoStrategy::with_table(options.table.unwrap_or_default(), seed);
            match options.refinement {
                Some(settings) => Box::new(gto.with_online_refinement(settings)),
                None => Box::new(gto),
            }
        }
    }
}
