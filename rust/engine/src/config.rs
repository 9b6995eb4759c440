use serde::{Deserialize, Serialize};

use crate::engine::{Blinds, MAX_CHIPS_IN_PLAY};
use crate::errors::GameError;
use crate::observation::Profile;
use crate::player::SeatKind;
use crate::pot::Rake;

pub const MIN_SEATS: usize = 2;
pub const MAX_SEATS: usize = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatConfig {
    pub name: String,
    pub kind: SeatKind,
    #[serde(default)]
    pub profile: Profile,
}

impl SeatConfig {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SeatKind::Human,
            profile: Profile::default(),
        }
    }

    pub fn ai(name: impl Into<String>, profile: Profile) -> Self {
        Self {
            name: name.into(),
            kind: SeatKind::Ai,
            profile,
        }
    }
}

/// What happens to stacks between hands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackPolicy {
    /// Stacks carry over; busted seats sit out
    #[default]
    Carry,
    /// Every seat is reset to the starting stack before each hand
    Restock,
}

/// Session settings consumed by [`crate::table::Table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub seats: Vec<SeatConfig>,
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    #[serde(default)]
    pub ante: u32,
    /// Base seed; hand `i` (from 0) is shuffled with `seed + i`
    #[serde(default)]
    pub seed: Option<u64>,
    /// Budget for AI decisions; `None` disables the timeout
    #[serde(default)]
    pub decision_timeout_ms: Option<u64>,
    #[serde(default)]
    pub rake: Rake,
    #[serde(default)]
    pub stack_policy: StackPolicy,
}

impl GameConfig {
    pub fn new(seats: Vec<SeatConfig>) -> Self {
        Self {
            seats,
            starting_stack: 1000,
            small_blind: 5,
            big_blind: 10,
            ante: 0,
            seed: None,
            decision_timeout_ms: Some(2000),
            rake: Rake::default(),
            stack_policy: StackPolicy::Carry,
        }
    }

    pub fn blinds(&self) -> Blinds {
        Blinds {
            small: self.small_blind,
            big: self.big_blind,
            ante: self.ante,
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let n = self.seats.len();
        if !(MIN_SEATS..=MAX_SEATS).contains(&n) {
            return Err(GameError::Configuration(format!(
                "seat count must be between {} and {}, got {}",
                MIN_SEATS, MAX_SEATS, n
            )));
        }
        if self.starting_stack == 0 {
            return Err(GameError::Configuration(
                "starting stack must be positive".into(),
            ));
        }
        let total = u64::from(self.starting_stack) * n as u64;
        if total > MAX_CHIPS_IN_PLAY {
            return Err(GameError::Configuration(format!(
                "{} seats at {} chips exceeds the limit of {} chips in play",
                n, self.starting_stack, MAX_CHIPS_IN_PLAY
            )));
        }
        if self.small_blind == 0 || self.big_blind == 0 {
            return Err(GameError::Configuration("blinds must be positive".into()));
        }
        if self.small_blind > self.big_blind {
            return Err(GameError::Configuration(format!(
                "small blind {} exceeds big blind {}",
                self.small_blind, self.big_blind
            )));
        }
        if self.decision_timeout_ms == Some(0) {
            return Err(GameError::Configuration(
                "decision timeout must be positive".into(),
            ));
        }
        if self.rake.basis_points > 10_000 {
            return Err(GameError::Configuration(format!(
                "rake of {} basis points exceeds 100%",
                self.rake.basis_points
            )));
        }
        for (i, seat) in self.seats.iter().enumerate() {
            let p = seat.profile;
            if !(0.0..=1.0).contains(&p.skill) || !(0.0..=1.0).contains(&p.aggression) {
                return Err(GameError::Configuration(format!(
                    "seat {} profile out of range: skill {}, aggression {}",
                    i, p.skill, p.aggression
                )));
            }
        }
        Ok(())
    }
}
