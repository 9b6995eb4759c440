//! # tiltbench-engine: No-Limit Hold'em Game Engine
//!
//! A deterministic multi-seat No-Limit Texas Hold'em engine for research
//! sessions in which human subjects play against AI opponents. Every decision
//! point is captured as an immutable [`events::DecisionEvent`] so it can be
//! scored later.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and parsing
//! - [`deck`] - Seeded deck shuffling with ChaCha20 RNG
//! - [`hand`] - Hand evaluation and ranking
//! - [`rules`] - Actions and legal-action computation
//! - [`pot`] - Side pot layering, awards and rake
//! - [`engine`] - Per-hand betting state machine
//! - [`table`] - Session driver: controllers, recovery, archive
//! - [`events`] - DecisionEvent, HandRecord and sinks
//! - [`agent`] - Strategy and HumanInput capabilities
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use tiltbench_engine::cards::parse_cards;
//! use tiltbench_engine::hand::{evaluate, Category};
//!
//! let cards = parse_cards("AhKhQhJhTh2c3d").unwrap();
//! let rank = evaluate(&cards).unwrap();
//! assert_eq!(rank.category, Category::StraightFlush);
//! ```
//!
//! ## Running a session
//!
//! ```rust
//! use tiltbench_engine::agent::FixedPolicy;
//! use tiltbench_engine::config::{GameConfig, SeatConfig};
//! use tiltbench_engine::observation::Profile;
//! use tiltbench_engine::table::{ai, Table};
//!
//! let mut config = GameConfig::new(vec![
//!     SeatConfig::ai("caller", Profile::default()),
//!     SeatConfig::ai("raiser", Profile::default()),
//! ]);
//! config.seed = Some(42);
//! let controllers = vec![ai(FixedPolicy::CheckOrCall), ai(FixedPolicy::AlwaysRaise)];
//! let mut table = Table::new(config, controllers, None).unwrap();
//! table.run(3).unwrap();
//! assert!(!table.hands().is_empty());
//! ```

pub mod agent;
pub mod cancel;
pub mod cards;
pub mod config;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod hand;
pub mod observation;
pub mod player;
pub mod pot;
pub mod rules;
pub mod script;
pub mod state;
pub mod table;
