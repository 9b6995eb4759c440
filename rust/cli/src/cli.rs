//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::validation::validate_unit;

#[derive(Parser, Debug)]
#[command(
    name = "tiltbench",
    version,
    about = "No-limit hold'em research bench: play, simulate and score decisions"
)]
pub struct TiltbenchCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play at a table against AI opponents
    Play {
        /// Number of AI opponents
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=8))]
        opponents: u8,
        /// Comma-separated strategies, assigned to opponents in turn
        #[arg(long, default_value = "heuristic")]
        strategy: String,
        /// Opponent skill, 0.0 to 1.0
        #[arg(long, default_value_t = 0.5, value_parser = parse_unit)]
        skill: f32,
        /// Opponent aggression, 0.0 to 1.0
        #[arg(long, default_value_t = 0.5, value_parser = parse_unit)]
        aggression: f32,
        #[arg(long, default_value_t = 20)]
        hands: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// Append decisions and hand summaries to this JSONL file
        #[arg(long)]
        log: Option<PathBuf>,
        /// Score your decisions in the background and report regret at the end
        #[arg(long)]
        ev: bool,
        /// Strategy table JSON for GTO opponents
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Run an AI-only session
    Sim {
        #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(2..=9))]
        seats: u8,
        /// Comma-separated strategies, assigned to seats in turn
        #[arg(long, default_value = "heuristic,montecarlo,gto")]
        strategies: String,
        #[arg(long, default_value_t = 100)]
        hands: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 0.5, value_parser = parse_unit)]
        skill: f32,
        #[arg(long, default_value_t = 0.5, value_parser = parse_unit)]
        aggression: f32,
        /// JSONL output path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Score every decision and print per-seat regret
        #[arg(long)]
        ev: bool,
        /// Rollouts per scored decision
        #[arg(long, default_value_t = 200)]
        ev_samples: u32,
        /// Reset every stack before each hand
        #[arg(long)]
        restock: bool,
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Score logged decisions, or rank a hand
    Eval {
        /// Session log written by `play --log` or `sim --output`
        #[arg(long, conflicts_with = "cards", required_unless_present = "cards")]
        input: Option<PathBuf>,
        /// 5 to 7 cards to rank, or 2 hole cards plus a board for equity, e.g. "AsKd QhJhTh"
        #[arg(long)]
        cards: Option<String>,
        /// Opponents for the equity estimate (with 2 to 6 cards)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=8))]
        opponents: u8,
        /// Only score this seat's decisions
        #[arg(long)]
        seat: Option<usize>,
        #[arg(long, default_value_t = 1000)]
        samples: u32,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
}

fn parse_unit(s: &str) -> Result<f32, String> {
    let v: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    validate_unit("value", v)
}
