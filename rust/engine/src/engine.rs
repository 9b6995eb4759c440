use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::cards::Card;
use crate::deck::Deck;
use crate::errors::GameError;
use crate::events::{ActionRecord, ShowdownInfo, ShownHand};
use crate::hand::best_five;
use crate::observation::{Observation, Profile, SeatView};
use crate::player::{Player, PlayerStatus};
use crate::pot::{award_layers, build_layers, clockwise_from_button, take_rake, Contribution, PotResult, Rake};
use crate::rules::{legal_actions, validate_action, Action, LegalActions, Situation};
use crate::state::{HandState, Street};

/// Forced bets for every hand.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Blinds {
    pub small: u32,
    pub big: u32,
    #[serde(default)]
    pub ante: u32,
}

/// How a hand's chips were paid out.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub pots: Vec<PotResult>,
    pub showdown: Option<ShowdownInfo>,
    pub rake: u32,
    pub evaluator_calls: u32,
}

/// Outcome of [`Engine::apply`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Applied {
    pub seat: usize,
    /// Street on which the action was taken
    pub street: Street,
    pub requested: Action,
    pub action: Action,
    pub clamped_from: Option<u32>,
    pub stack_after: u32,
    pub pot_after: u32,
}

/// Betting state machine for one table.
///
/// Owns the seated players and, while a hand runs, its [`HandState`] and deck.
/// Every chip movement is followed by a conservation check.
///
/// # Examples
///
/// ```
/// use tiltbench_engine::deck::Deck;
/// use tiltbench_engine::engine::{Blinds, Engine};
/// use tiltbench_engine::player::{Player, SeatKind};
/// use tiltbench_engine::pot::Rake;
/// use tiltbench_engine::rules::Action;
///
/// let players = vec![
///     Player::new(0, "a", SeatKind::Ai, 1000),
///     Player::new(1, "b", SeatKind::Ai, 1000),
/// ];
/// let blinds = Blinds { small: 5, big: 10, ante: 0 };
/// let mut engine = Engine::new(players, blinds, Rake::default()).unwrap();
/// let mut deck = Deck::new_with_seed(7);
/// deck.shuffle();
/// engine.start_hand("20260101-000001".into(), 0, deck).unwrap();
///
/// // Heads-up the button posts the small blind and acts first.
/// assert_eq!(engine.to_act(), Some(0));
/// engine.apply(0, Action::Fold).unwrap();
/// assert!(engine.is_complete());
/// assert_eq!(engine.players()[1].stack(), 1005);
/// assert_eq!(engine.evaluator_calls(), 0);
/// ```
#[derive(Debug)]
pub struct Engine {
    players: Vec<Player>,
    blinds: Blinds,
    rake: Rake,
    deck: Deck,
    hand: Option<HandState>,
    chips_at_start: u64,
    rake_taken: u32,
    evaluator_calls: u32,
    settlement: Option<Settlement>,
}

/// Most chips a table may hold; pots and side-pot tiers are summed in `u32`.
pub const MAX_CHIPS_IN_PLAY: u64 = u32::MAX as u64;

fn check_chip_total(total: u64) -> Result<(), GameError> {
    if total > MAX_CHIPS_IN_PLAY {
        return Err(GameError::Configuration(format!(
            "{} chips in play exceeds the limit of {}",
            total, MAX_CHIPS_IN_PLAY
        )));
    }
    Ok(())
}

impl Engine {
    pub fn new(players: Vec<Player>, blinds: Blinds, rake: Rake) -> Result<Self, GameError> {
        if players.len() < 2 {
            return Err(GameError::Configuration(format!(
                "need at least 2 seats, got {}",
                players.len()
            )));
        }
        if blinds.small == 0 || blinds.big == 0 {
            return Err(GameError::Configuration("blinds must be positive".into()));
        }
        if blinds.small > blinds.big {
            return Err(GameError::Configuration(format!(
                "small blind {} exceeds big blind {}",
                blinds.small, blinds.big
            )));
        }
        check_chip_total(players.iter().map(|p| u64::from(p.stack())).sum())?;
        Ok(Self {
            players,
            blinds,
            rake,
            deck: Deck::new_with_seed(0),
            hand: None,
            chips_at_start: 0,
            rake_taken: 0,
            evaluator_calls: 0,
            settlement: None,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, seat: usize) -> Option<&Player> {
        self.players.get(seat)
    }

    pub fn blinds(&self) -> Blinds {
        self.blinds
    }

    pub fn hand(&self) -> Option<&HandState> {
        self.hand.as_ref()
    }

    pub fn to_act(&self) -> Option<usize> {
        self.hand.as_ref().and_then(|h| h.to_act)
    }

    pub fn is_complete(&self) -> bool {
        self.hand.as_ref().is_some_and(HandState::is_complete)
    }

    pub fn in_progress(&self) -> bool {
        self.hand.as_ref().is_some_and(|h| !h.is_complete())
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    /// Hand evaluations performed in the current (or last) hand.
    pub fn evaluator_calls(&self) -> u32 {
        self.evaluator_calls
    }

    pub fn rake_taken(&self) -> u32 {
        self.rake_taken
    }

    /// Chips committed to the pot in the current hand.
    pub fn pot_total(&self) -> u32 {
        self.players.iter().map(Player::hand_contribution).sum()
    }

    /// Replace every stack at once between hands.
    pub fn set_stacks(&mut self, stacks: &[u32]) -> Result<(), GameError> {
        if self.in_progress() {
            return Err(GameError::Configuration(
                "cannot change stacks during a hand".into(),
            ));
        }
        if stacks.len() != self.players.len() {
            return Err(GameError::Configuration(format!(
                "{} stacks for {} seats",
                stacks.len(),
                self.players.len()
            )));
        }
        check_chip_total(stacks.iter().map(|&s| u64::from(s)).sum())?;
        for (player, &stack) in self.players.iter_mut().zip(stacks) {
            player.set_stack(stack);
        }
        Ok(())
    }

    /// Post antes and blinds, deal hole cards and hand the turn to the first actor.
    ///
    /// When `button` is not funded the button moves to the next funded seat.
    pub fn start_hand(
        &mut self,
        hand_id: String,
        button: usize,
        deck: Deck,
    ) -> Result<(), GameError> {
        if self.in_progress() {
            return Err(GameError::Configuration(
                "a hand is already in progress".into(),
            ));
        }
        for p in &mut self.players {
            p.reset_for_hand();
        }
        let n = self.players.len();
        let funded: Vec<usize> = clockwise_from_button(button % n, n)
            .into_iter()
            .filter(|&s| self.players[s].status() == PlayerStatus::Active)
            .collect();
        if funded.len() < 2 {
            return Err(GameError::NotEnoughPlayers);
        }
        let button = if self.players[button % n].status() == PlayerStatus::Active {
            button % n
        } else {
            funded[0]
        };
        // Dealing order: left of the button round to the button.
        let order: Vec<usize> = clockwise_from_button(button, n)
            .into_iter()
            .filter(|&s| self.players[s].status() == PlayerStatus::Active)
            .collect();

        self.deck = deck;
        self.chips_at_start = self.players.iter().map(|p| u64::from(p.stack())).sum();
        self.rake_taken = 0;
        self.evaluator_calls = 0;
        self.settlement = None;

        let mut state = HandState::new(hand_id, n, button);
        let (sb, bb) = if order.len() == 2 {
            (button, order[0])
        } else {
            (order[0], order[1])
        };
        state.small_blind_seat = sb;
        state.big_blind_seat = bb;

        if self.blinds.ante > 0 {
            for &s in &order {
                self.players[s].commit_dead(self.blinds.ante);
            }
        }
        self.players[sb].commit(self.blinds.small);
        self.players[bb].commit(self.blinds.big);
        state.bet_to_match = self.players[sb]
            .street_contribution()
            .max(self.players[bb].street_contribution());
        state.last_raise_size = self.blinds.big;

        let mut holes: Vec<[Option<Card>; 2]> = vec![[None, None]; n];
        for round in 0..2 {
            for &s in &order {
                holes[s][round] = Some(self.deck.draw()?);
            }
        }
        for &s in &order {
            if let [Some(a), Some(b)] = holes[s] {
                self.players[s].give_cards([a, b]);
            }
        }

        for (s, p) in self.players.iter().enumerate() {
            state.needs_to_act[s] = p.status() == PlayerStatus::Active;
        }
        debug!(
            hand_id = %state.hand_id,
            button,
            small_blind = sb,
            big_blind = bb,
            "hand started"
        );
        self.hand = Some(state);
        self.check_conservation()?;
        self.progress(bb)
    }

    /// Legal actions for `seat`, which must be the seat to act.
    pub fn legal_actions(&self, seat: usize) -> Result<LegalActions, GameError> {
        let hand = self.active_hand()?;
        match hand.to_act {
            Some(expected) if expected == seat => Ok(self.legal_for(hand, seat)),
            Some(expected) => Err(GameError::NotPlayersTurn {
                expected,
                actual: seat,
            }),
            None => Err(GameError::HandAlreadyComplete),
        }
    }

    fn legal_for(&self, hand: &HandState, seat: usize) -> LegalActions {
        let p = &self.players[seat];
        if p.status() != PlayerStatus::Active {
            return LegalActions::none();
        }
        legal_actions(&Situation {
            stack: p.stack(),
            street_contribution: p.street_contribution(),
            bet_to_match: hand.bet_to_match,
            last_raise_size: hand.last_raise_size,
            big_blind: self.blinds.big,
            raise_locked: hand.raise_locked[seat],
            opponents_can_respond: self.opponents_can_respond(seat),
        })
    }

    /// Snapshot for `seat`. Only that seat's hole cards are included.
    pub fn observation(
        &self,
        seat: usize,
        profile: Profile,
        time_budget_ms: Option<u64>,
    ) -> Result<Observation, GameError> {
        let hand = self.hand.as_ref().ok_or(GameError::NoHandInProgress)?;
        let p = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::Configuration(format!("no seat {}", seat)))?;
        let legal = if hand.to_act == Some(seat) {
            self.legal_for(hand, seat)
        } else {
            LegalActions::none()
        };
        Ok(Observation {
            hand_id: hand.hand_id.clone(),
            seat,
            street: hand.street,
            hole_cards: p.hole_cards(),
            board: hand.board.clone(),
            pot: self.pot_total(),
            bet_to_match: hand.bet_to_match,
            to_call: hand.bet_to_match.saturating_sub(p.street_contribution()),
            legal,
            button: hand.button,
            big_blind: self.blinds.big,
            raises_this_street: hand.raises_this_street,
            seats: self
                .players
                .iter()
                .map(|q| SeatView {
                    seat: q.id(),
                    name: q.name().to_string(),
                    kind: q.kind(),
                    stack: q.stack(),
                    status: q.status(),
                    street_contribution: q.street_contribution(),
                    hand_contribution: q.hand_contribution(),
                })
                .collect(),
            history: hand.history.clone(),
            profile,
            time_budget_ms,
        })
    }

    /// Apply `action` for `seat`.
    ///
    /// An illegal action returns [`GameError::IllegalAction`] and leaves the
    /// state untouched. A bet above the stack is clamped to all-in and reported
    /// through [`Applied::clamped_from`].
    pub fn apply(&mut self, seat: usize, action: Action) -> Result<Applied, GameError> {
        let legal = self.legal_actions(seat)?;
        let validated = validate_action(seat, &legal, action)?;
        let applied = validated.action;

        let Some(hand) = self.hand.as_mut() else {
            return Err(GameError::NoHandInProgress);
        };
        let street = hand.street;
        let player = &mut self.players[seat];
        match applied {
            Action::Fold => player.fold(),
            Action::Check => {}
            Action::Call(amount) => {
                player.commit(amount);
            }
            Action::Bet(to) | Action::Raise(to) => {
                player.commit(to - player.street_contribution());
                let increment = to - hand.bet_to_match;
                let full = increment >= hand.last_raise_size;
                if full {
                    hand.last_raise_size = increment;
                    hand.last_aggressor = Some(seat);
                    hand.raises_this_street = hand.raises_this_street.saturating_add(1);
                }
                hand.bet_to_match = to;
                for (s, other) in self.players.iter().enumerate() {
                    if s == seat || other.status() != PlayerStatus::Active {
                        continue;
                    }
                    if full {
                        hand.raise_locked[s] = false;
                    } else if !hand.needs_to_act[s] {
                        hand.raise_locked[s] = true;
                    }
                    hand.needs_to_act[s] = true;
                }
            }
        }
        hand.needs_to_act[seat] = false;
        hand.raise_locked[seat] = false;
        hand.history.push(ActionRecord {
            seat,
            street,
            action: applied,
        });

        self.check_conservation()?;
        self.progress(seat)?;
        Ok(Applied {
            seat,
            street,
            requested: action,
            action: applied,
            clamped_from: validated.clamped_from,
            stack_after: self.players[seat].stack(),
            pot_after: self.pot_total(),
        })
    }

    /// Cancel the running hand and return every contribution.
    pub fn abort(&mut self) {
        if !self.in_progress() {
            return;
        }
        for p in &mut self.players {
            p.refund();
        }
        if let Some(hand) = self.hand.take() {
            debug!(hand_id = %hand.hand_id, "hand aborted");
        }
        self.settlement = None;
    }

    /// `sum(pot) + sum(stacks) + rake` must equal the chips in play at hand start.
    pub fn check_conservation(&self) -> Result<(), GameError> {
        let actual: u64 = self
            .players
            .iter()
            .map(|p| u64::from(p.stack()) + u64::from(p.hand_contribution()))
            .sum::<u64>()
            + u64::from(self.rake_taken);
        if actual != self.chips_at_start {
            error!(
                expected = self.chips_at_start,
                actual,
                "chip conservation violated"
            );
            return Err(GameError::EngineInvariantViolation {
                expected: self.chips_at_start,
                actual,
            });
        }
        Ok(())
    }

    fn active_hand(&self) -> Result<&HandState, GameError> {
        match &self.hand {
            None => Err(GameError::NoHandInProgress),
            Some(h) if h.is_complete() => Err(GameError::HandAlreadyComplete),
            Some(h) => Ok(h),
        }
    }

    fn live_seats(&self) -> Vec<usize> {
        self.players
            .iter()
            .filter(|p| p.status().is_live())
            .map(Player::id)
            .collect()
    }

    fn opponents_can_respond(&self, seat: usize) -> bool {
        self.players
            .iter()
            .any(|p| p.id() != seat && p.status() == PlayerStatus::Active)
    }

    /// Next Active seat after `after` that still owes a decision.
    ///
    /// A seat owing nothing with no one left to bet against is passed over.
    fn next_actor(&mut self, after: usize) -> Option<usize> {
        let n = self.players.len();
        for i in 1..=n {
            let s = (after + i) % n;
            let p = &self.players[s];
            let hand = self.hand.as_ref()?;
            if p.status() != PlayerStatus::Active || !hand.needs_to_act[s] {
                continue;
            }
            let owes = hand.bet_to_match > p.street_contribution();
            if !owes && !self.opponents_can_respond(s) {
                if let Some(h) = self.hand.as_mut() {
                    h.needs_to_act[s] = false;
                }
                continue;
            }
            return Some(s);
        }
        None
    }

    fn progress(&mut self, last: usize) -> Result<(), GameError> {
        if self.live_seats().len() == 1 {
            return self.finish_uncontested();
        }
        let mut cursor = last;
        loop {
            if let Some(next) = self.next_actor(cursor) {
                if let Some(h) = self.hand.as_mut() {
                    h.to_act = Some(next);
                }
                return Ok(());
            }
            for p in &mut self.players {
                p.end_street();
            }
            let Some(hand) = self.hand.as_mut() else {
                return Err(GameError::NoHandInProgress);
            };
            hand.to_act = None;
            if hand.street == Street::River {
                return self.showdown();
            }
            self.deal_next_street()?;
            cursor = self.hand.as_ref().map_or(last, |h| h.button);
        }
    }

    fn deal_next_street(&mut self) -> Result<(), GameError> {
        let Some(hand) = self.hand.as_mut() else {
            return Err(GameError::NoHandInProgress);
        };
        let Some(next) = hand.street.next_betting() else {
            return Err(GameError::HandAlreadyComplete);
        };
        self.deck.burn()?;
        while hand.board.len() < next.board_len() {
            hand.board.push(self.deck.draw()?);
        }
        hand.street = next;
        hand.bet_to_match = 0;
        hand.last_raise_size = self.blinds.big;
        hand.last_aggressor = None;
        hand.raises_this_street = 0;
        for (s, p) in self.players.iter().enumerate() {
            hand.needs_to_act[s] = p.status() == PlayerStatus::Active;
            hand.raise_locked[s] = false;
        }
        debug!(hand_id = %hand.hand_id, street = %next, board = ?hand.board, "street dealt");
        Ok(())
    }

    fn contributions(&self) -> Vec<Contribution> {
        self.players
            .iter()
            .map(|p| Contribution {
                seat: p.id(),
                amount: p.hand_contribution(),
                folded: !p.status().is_live(),
            })
            .collect()
    }

    fn finish_uncontested(&mut self) -> Result<(), GameError> {
        let layers = build_layers(&self.contributions());
        let button = self.hand.as_ref().map_or(0, |h| h.button);
        let order = clockwise_from_button(button, self.players.len());
        let pots = award_layers(&layers, &HashMap::new(), &order);
        self.settle(pots, None, 0)
    }

    fn showdown(&mut self) -> Result<(), GameError> {
        let Some(hand) = self.hand.as_mut() else {
            return Err(GameError::NoHandInProgress);
        };
        hand.street = Street::Showdown;
        let board = hand.board.clone();
        let button = hand.button;

        let mut layers = build_layers(&self.contributions());
        let contenders: Vec<usize> = {
            let mut seats: Vec<usize> = layers
                .iter()
                .filter(|l| !l.is_uncalled())
                .flat_map(|l| l.eligible.iter().copied())
                .collect();
            seats.sort_unstable();
            seats.dedup();
            seats
        };

        let mut ranks = HashMap::with_capacity(contenders.len());
        let mut shown = Vec::with_capacity(contenders.len());
        for seat in contenders {
            let Some(hole) = self.players[seat].hole_cards() else {
                continue;
            };
            let mut cards = Vec::with_capacity(7);
            cards.extend_from_slice(&hole);
            cards.extend_from_slice(&board);
            let (five, rank) = best_five(&cards)?;
            self.evaluator_calls += 1;
            ranks.insert(seat, rank);
            shown.push(ShownHand {
                seat,
                hole_cards: hole,
                best_five: five,
                rank,
            });
        }

        let rake = if board.len() >= 3 {
            take_rake(&mut layers, &self.rake)
        } else {
            0
        };
        let order = clockwise_from_button(button, self.players.len());
        let pots = award_layers(&layers, &ranks, &order);
        if let Some(orphan) = pots.iter().find(|p| p.winners.is_empty() && p.amount > 0) {
            error!(amount = orphan.amount, eligible = ?orphan.eligible, "pot layer without winner");
            return Err(GameError::EngineInvariantViolation {
                expected: u64::from(orphan.amount),
                actual: 0,
            });
        }
        self.settle(pots, Some(ShowdownInfo { hands: shown }), rake)
    }

    fn settle(
        &mut self,
        pots: Vec<PotResult>,
        showdown: Option<ShowdownInfo>,
        rake: u32,
    ) -> Result<(), GameError> {
        for p in &mut self.players {
            p.clear_contributions();
        }
        for pot in &pots {
            for &(seat, share) in &pot.shares {
                self.players[seat].add_chips(share);
            }
        }
        self.rake_taken = rake;
        if let Some(hand) = self.hand.as_mut() {
            hand.street = Street::Complete;
            hand.to_act = None;
            debug!(
                hand_id = %hand.hand_id,
                rake,
                evaluator_calls = self.evaluator_calls,
                "hand complete"
            );
        }
        self.settlement = Some(Settlement {
            pots,
            showdown,
            rake,
            evaluator_calls: self.evaluator_calls,
        });
        self.check_conservation()
    }
}
