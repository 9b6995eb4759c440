use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::agent::{Controller, HumanInput, Strategy};
use crate::cancel::CancelToken;
use crate::config::{GameConfig, StackPolicy};
use crate::deck::Deck;
use crate::engine::{Applied, Engine};
use crate::errors::GameError;
use crate::events::{format_hand_id, ActionRecord, DecisionEvent, EventSink, HandRecord, Recovery};
use crate::player::{Player, PlayerStatus, SeatKind};
use crate::pot::clockwise_from_button;
use crate::script::ScriptedDeal;

/// A session: seats, stacks across hands, the button, the per-seat
/// controllers and the archive of completed hands.
pub struct Table {
    config: GameConfig,
    engine: Engine,
    controllers: Vec<Controller>,
    human: Option<Box<dyn HumanInput>>,
    sinks: Vec<Box<dyn EventSink>>,
    hands: Vec<HandRecord>,
    button: usize,
    hands_started: u64,
    base_seed: u64,
    date: String,
    script: Option<ScriptedDeal>,
    cancel: CancelToken,
}

impl Table {
    /// `controllers[i]` decides for seat `i`. Human seats need `human`.
    pub fn new(
        config: GameConfig,
        controllers: Vec<Controller>,
        human: Option<Box<dyn HumanInput>>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        if controllers.len() != config.seats.len() {
            return Err(GameError::Configuration(format!(
                "{} seats but {} controllers",
                config.seats.len(),
                controllers.len()
            )));
        }
        for (i, (seat, ctl)) in config.seats.iter().zip(&controllers).enumerate() {
            if (seat.kind == SeatKind::Human) != ctl.is_human() {
                return Err(GameError::Configuration(format!(
                    "seat {} is {:?} but controlled by {}",
                    i,
                    seat.kind,
                    ctl.label()
                )));
            }
        }
        if human.is_none() && controllers.iter().any(Controller::is_human) {
            return Err(GameError::Configuration(
                "human seat configured without an input source".into(),
            ));
        }

        let players = config
            .seats
            .iter()
            .enumerate()
            .map(|(i, s)| Player::new(i, s.name.clone(), s.kind, config.starting_stack))
            .collect();
        let engine = Engine::new(players, config.blinds(), config.rake)?;
        let base_seed = config
            .seed
            .unwrap_or_else(rand::random::<u64>);
        info!(
            seats = config.seats.len(),
            seed = base_seed,
            stack = config.starting_stack,
            "table opened"
        );
        let mut table = Self {
            config,
            engine,
            controllers,
            human,
            sinks: Vec::new(),
            hands: Vec::new(),
            button: 0,
            hands_started: 0,
            base_seed,
            date: Utc::now().format("%Y%m%d").to_string(),
            script: None,
            cancel: CancelToken::new(),
        };
        table.reset_session();
        Ok(table)
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Share an existing token, e.g. one already handed to a human input source.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels the running hand (and any later one) when triggered.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Completed hands, oldest first.
    pub fn hands(&self) -> &[HandRecord] {
        &self.hands
    }

    pub fn stacks(&self) -> Vec<u32> {
        self.engine.players().iter().map(Player::stack).collect()
    }

    pub fn button(&self) -> usize {
        self.button
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Fix the cards of the next hand only. Betting logic is unaffected.
    pub fn script_next_hand(&mut self, deal: ScriptedDeal) {
        self.script = Some(deal);
    }

    /// Clear every strategy's learned state. Runs when the table opens.
    pub fn reset_session(&mut self) {
        for ctl in &mut self.controllers {
            if let Controller::Strategy(s) = ctl {
                s.reset_session();
            }
        }
    }

    fn funded_seats(&self) -> usize {
        self.engine.players().iter().filter(|p| p.stack() > 0).count()
    }

    /// Play up to `hands` hands; stops early when fewer than two seats have chips.
    pub fn run(&mut self, hands: usize) -> Result<usize, GameError> {
        let mut played = 0;
        for _ in 0..hands {
            if self.config.stack_policy == StackPolicy::Carry && self.funded_seats() < 2 {
                info!(played, "session over: not enough funded seats");
                break;
            }
            self.play_hand()?;
            played += 1;
        }
        Ok(played)
    }

    /// Play one hand to completion and archive it.
    ///
    /// On cancellation the hand is aborted, its chips refunded and nothing is
    /// archived.
    pub fn play_hand(&mut self) -> Result<&HandRecord, GameError> {
        self.cancel.check()?;
        if self.config.stack_policy == StackPolicy::Restock {
            let stacks = vec![self.config.starting_stack; self.config.seats.len()];
            self.engine.set_stacks(&stacks)?;
        }
        let n = self.config.seats.len();
        if self.engine.players()[self.button].stack() == 0 {
            self.button = self.next_funded(self.button).ok_or(GameError::NotEnoughPlayers)?;
        }

        let hand_index = self.hands_started;
        let seed = self.base_seed.wrapping_add(hand_index);
        let hand_id = format_hand_id(&self.date, (hand_index + 1) as u32);
        let (deck, scripted) = match self.script.take() {
            Some(deal) => {
                let order: Vec<usize> = clockwise_from_button(self.button, n)
                    .into_iter()
                    .filter(|&s| self.engine.players()[s].stack() > 0)
                    .collect();
                (deal.to_deck(&order, seed)?, true)
            }
            None => {
                let mut deck = Deck::new_with_seed(seed);
                deck.shuffle();
                (deck, false)
            }
        };
        let starting_stacks = self.stacks();
        self.engine.start_hand(hand_id.clone(), self.button, deck)?;
        self.hands_started += 1;
        debug!(%hand_id, seed, scripted, "dealing");

        let mut events = Vec::new();
        while let Some(seat) = self.engine.to_act() {
            if self.cancel.is_cancelled() {
                return Err(self.abort_hand());
            }
            let event = match self.decide_and_apply(seat, events.len() as u32, scripted) {
                Ok(event) => event,
                Err(GameError::Cancelled) => return Err(self.abort_hand()),
                Err(e) => return Err(e),
            };
            let record = ActionRecord {
                seat,
                street: event.street,
                action: event.applied,
            };
            for ctl in &mut self.controllers {
                if let Controller::Strategy(s) = ctl {
                    s.observe(&record);
                }
            }
            for sink in &mut self.sinks {
                sink.on_decision(&event);
            }
            events.push(event);
        }

        let record = self.archive(seed, scripted, starting_stacks, events)?;
        for sink in &mut self.sinks {
            sink.on_hand_complete(&record);
        }
        for ctl in &mut self.controllers {
            if let Controller::Strategy(s) = ctl {
                s.hand_finished(&record);
            }
        }
        if let Some(h) = self.human.as_mut() {
            h.hand_finished(&record);
        }
        self.hands.push(record);
        if let Some(next) = self.next_funded(self.button) {
            self.button = next;
        }
        let last = self.hands.len() - 1;
        Ok(&self.hands[last])
    }

    fn abort_hand(&mut self) -> GameError {
        self.engine.abort();
        info!("hand cancelled; contributions refunded");
        GameError::Cancelled
    }

    fn next_funded(&self, from: usize) -> Option<usize> {
        let n = self.config.seats.len();
        clockwise_from_button(from, n)
            .into_iter()
            .find(|&s| self.engine.players()[s].stack() > 0)
    }

    /// Ask the seat's controller, repair the answer if needed, apply it.
    fn decide_and_apply(
        &mut self,
        seat: usize,
        sequence: u32,
        scripted: bool,
    ) -> Result<DecisionEvent, GameError> {
        let legal = self.engine.legal_actions(seat)?;
        let is_human = self.controllers[seat].is_human();
        let budget = if is_human {
            None
        } else {
            self.config.decision_timeout_ms
        };
        let observation =
            self.engine
                .observation(seat, self.config.seats[seat].profile, budget)?;

        let started = Instant::now();
        let requested = match &mut self.controllers[seat] {
            Controller::Human => match self.human.as_mut() {
                Some(h) => h.request_action(&observation, &legal),
                None => legal.minimal(),
            },
            Controller::Strategy(s) => s.decide(&observation),
        };
        let latency_ms = started.elapsed().as_millis() as u64;
        // A human quitting mid-decision cancels before anything is applied.
        self.cancel.check()?;

        let mut recovery = None;
        let applied: Applied = match budget {
            Some(budget_ms) if latency_ms > budget_ms => {
                warn!(
                    target: "tiltbench_engine::table",
                    kind = "StrategyTimeout",
                    seat,
                    elapsed_ms = latency_ms,
                    budget_ms,
                    "decision too slow; applying minimal action"
                );
                recovery = Some(Recovery::StrategyTimeout {
                    elapsed_ms: latency_ms,
                    budget_ms,
                });
                self.engine.apply(seat, legal.minimal())?
            }
            _ => match self.engine.apply(seat, requested) {
                Ok(applied) => applied,
                Err(GameError::IllegalAction { reason, .. }) => {
                    warn!(
                        target: "tiltbench_engine::table",
                        kind = "IllegalAction",
                        seat,
                        requested = %requested,
                        reason = %reason,
                        "illegal action replaced"
                    );
                    recovery = Some(Recovery::IllegalAction { reason });
                    self.engine.apply(seat, legal.minimal())?
                }
                Err(e) => return Err(e),
            },
        };
        if let Some(asked) = applied.clamped_from {
            info!(
                kind = "InsufficientStack",
                seat,
                requested = asked,
                available = applied.action.amount(),
                "request clamped to what the stack allows"
            );
            recovery = Some(Recovery::InsufficientStack {
                requested: asked,
                available: applied.action.amount(),
            });
        }

        Ok(DecisionEvent {
            hand_id: observation.hand_id.clone(),
            sequence,
            street: applied.street,
            seat,
            seat_kind: self.config.seats[seat].kind,
            legal,
            requested,
            applied: applied.action,
            recovery,
            timestamp: Utc::now(),
            latency_ms,
            scripted,
            stack_after: applied.stack_after,
            pot_after: applied.pot_after,
            observation,
        })
    }

    fn archive(
        &self,
        seed: u64,
        scripted: bool,
        starting_stacks: Vec<u32>,
        events: Vec<DecisionEvent>,
    ) -> Result<HandRecord, GameError> {
        let hand = self.engine.hand().ok_or(GameError::NoHandInProgress)?;
        let settlement = self
            .engine
            .settlement()
            .ok_or(GameError::NoHandInProgress)?;
        Ok(HandRecord {
            hand_id: hand.hand_id.clone(),
            deck_seed: Some(seed),
            scripted,
            button: hand.button,
            starting_stacks,
            hole_cards: self
                .engine
                .players()
                .iter()
                .map(|p| match p.status() {
                    PlayerStatus::SittingOut => None,
                    _ => p.hole_cards(),
                })
                .collect(),
            board: hand.board.clone(),
            events,
            actions: hand.history.clone(),
            pots: settlement.pots.clone(),
            showdown: settlement.showdown.clone(),
            rake: settlement.rake,
            final_stacks: self.stacks(),
            final_street: hand.street,
            evaluator_calls: settlement.evaluator_calls,
            ts: Utc::now(),
        })
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("controllers", &self.controllers)
            .field("button", &self.button)
            .field("hands", &self.hands.len())
            .finish()
    }
}

/// Boxed strategy helper for building controller lists.
pub fn ai(strategy: impl Strategy + 'static) -> Controller {
    Controller::Strategy(Box::new(strategy))
}
