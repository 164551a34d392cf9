//! The per-room resolution engine: validates the seven base actions,
//! runs the challenge/counteraction protocol and advances turns.

use std::fmt::{self, Formatter};
use std::mem;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;
use tracing::debug;

use crate::action::{ActionKind, ActionRequest, CounterKind, CounterRequest};
use crate::card::{self, Character, DECK_SIZE};
use crate::error::GameError;
use crate::game::{Game, GameStatus, LastAction, Player, Seat};

pub const COUP_COST: u8 = 7;
pub const ASSASSINATE_COST: u8 = 3;
pub const MUST_COUP_AT: u8 = 10;
pub const STEAL_MAX: u8 = 2;
const EXCHANGE_DRAW: usize = 2;
const MIN_PLAYERS: usize = 2;
const MAX_PLAYERS: usize = 6;

/// The claim currently in the air, awaiting challenge or counter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingAction {
    pub actor_id: String,
    #[serde(rename = "action_type")]
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_index: Option<usize>,
}

impl PendingAction {
    fn staged(actor_id: &str, request: &ActionRequest) -> Self {
        Self {
            actor_id: actor_id.to_string(),
            kind: request.kind,
            target_id: request.target_id.clone(),
            card_index: request.card_index,
        }
    }
}

/// A block staked against the pending action. The claimed character is
/// public the moment it is announced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingCounter {
    pub blocker_id: String,
    pub counter_type: CounterKind,
    pub claimed_character: Character,
}

/// Resolution state. One variant at a time, payload attached, so an open
/// challenge window plus an open counter window cannot be represented.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitingChallenge {
        pending: PendingAction,
    },
    AwaitingCounter {
        pending: PendingAction,
    },
    AwaitingCounterChallenge {
        pending: PendingAction,
        counter: PendingCounter,
    },
    ExchangeSelection {
        actor: String,
        keep: usize,
    },
}

/// Which input window an in-progress result has opened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    ChallengeWindow,
    CounteractionWindow,
    Exchange,
}

/// Wire-shaped result of one engine operation, fanned out by the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Window>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub game_over: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Character>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_result: Option<Box<Outcome>>,
}

impl Outcome {
    pub(crate) fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            state: None,
            game_over: false,
            cards: None,
            action_result: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    fn with_state(mut self, state: Window) -> Self {
        self.state = Some(state);
        self
    }

    fn with_cards(mut self, cards: Vec<Character>) -> Self {
        self.cards = Some(cards);
        self
    }

    fn with_result(mut self, result: Outcome) -> Self {
        self.game_over = self.game_over || result.game_over;
        self.action_result = Some(Box::new(result));
        self
    }
}

/// One room's game plus its resolution state machine. The RNG is injected
/// so shuffles are reproducible under test.
pub struct Engine<R: Rng = Pcg64Mcg> {
    game: Game,
    phase: Phase,
    rng: R,
}

impl Engine {
    pub fn new(room_code: &str, seats: &[Seat]) -> Result<Self, GameError> {
        Self::with_rng(room_code, seats, Pcg64Mcg::from_entropy())
    }

    pub fn seeded(room_code: &str, seats: &[Seat], seed: u64) -> Result<Self, GameError> {
        Self::with_rng(room_code, seats, Pcg64Mcg::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn with_rng(room_code: &str, seats: &[Seat], mut rng: R) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&seats.len()) {
            return Err(GameError::BadPlayerCount);
        }

        let deck = card::build_deck(&mut rng);
        Ok(Self {
            game: Game::new(room_code, seats, deck),
            phase: Phase::Idle,
            rng,
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn challenge_window_open(&self) -> bool {
        matches!(
            self.phase,
            Phase::AwaitingChallenge { .. } | Phase::AwaitingCounterChallenge { .. }
        )
    }

    pub fn counteraction_window_open(&self) -> bool {
        matches!(self.phase, Phase::AwaitingCounter { .. })
    }

    pub fn pending_action(&self) -> Option<&PendingAction> {
        match &self.phase {
            Phase::AwaitingChallenge { pending }
            | Phase::AwaitingCounter { pending }
            | Phase::AwaitingCounterChallenge { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub fn pending_counteraction(&self) -> Option<&PendingCounter> {
        match &self.phase {
            Phase::AwaitingCounterChallenge { counter, .. } => Some(counter),
            _ => None,
        }
    }

    /// Deal starting hands and open play. Cards are drawn here, not at
    /// room creation, so a waiting room can seat players first.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.game.status != GameStatus::Waiting {
            return Err(GameError::AlreadyStarted);
        }
        self.game.deal()?;
        self.game.status = GameStatus::Playing;
        debug!(room = %self.game.room_code(), "game started");
        Ok(())
    }

    /// Take a turn action. Immediate actions (Income, Coup) resolve on the
    /// spot; claim-bearing ones stage a pending action and open a window.
    pub fn act(&mut self, actor_id: &str, request: &ActionRequest) -> Result<Outcome, GameError> {
        self.validate_action(actor_id, request)?;
        let actor_name = self.name_of(actor_id)?;
        debug!(actor = actor_id, kind = %request.kind, "action accepted");

        let outcome = match request.kind {
            ActionKind::Income => {
                self.require_mut(actor_id)?.coins += 1;
                self.game.last_action =
                    Some(LastAction::simple(ActionKind::Income, actor_name.clone()));
                self.game.next_player();
                Outcome::ok(format!("Player {actor_name} took income"))
            }
            ActionKind::Coup => {
                let target_id = request
                    .target_id
                    .clone()
                    .ok_or(GameError::MissingTarget { action: "coup" })?;
                let target_name = self.name_of(&target_id)?;
                self.require_mut(actor_id)?.coins -= COUP_COST;
                self.lose_card(&target_id, request.card_index)?;
                self.game.last_action = Some(LastAction::targeted(
                    ActionKind::Coup,
                    actor_name.clone(),
                    target_name.clone(),
                ));
                let mut outcome = Outcome::ok(format!(
                    "Player {actor_name} performed a coup against {target_name}"
                ));
                self.conclude(&mut outcome);
                outcome
            }
            ActionKind::ForeignAid => {
                self.phase = Phase::AwaitingCounter {
                    pending: PendingAction::staged(actor_id, request),
                };
                Outcome::ok(format!(
                    "Player {actor_name} is attempting to take foreign aid"
                ))
                .with_state(Window::CounteractionWindow)
            }
            kind => {
                if kind == ActionKind::Assassinate {
                    // fee is escrowed up front and refunded if the claim
                    // is blocked or successfully challenged
                    self.require_mut(actor_id)?.coins -= ASSASSINATE_COST;
                }
                self.phase = Phase::AwaitingChallenge {
                    pending: PendingAction::staged(actor_id, request),
                };
                Outcome::ok(format!("Player {actor_name} is attempting {kind}"))
                    .with_state(Window::ChallengeWindow)
            }
        };

        debug_assert_eq!(self.game.card_population(), DECK_SIZE);
        Ok(outcome)
    }

    /// Challenge whichever claim is currently in the air: the pending
    /// action's, or the block's once a counteraction was announced.
    pub fn challenge(
        &mut self,
        challenger_id: &str,
        card_index: Option<usize>,
    ) -> Result<Outcome, GameError> {
        self.ensure_playing()?;
        let challenger = self
            .game
            .player(challenger_id)
            .ok_or(GameError::UnknownPlayer)?;
        if !challenger.is_alive {
            return Err(GameError::DeadPlayer);
        }
        let challenger_name = challenger.name.clone();

        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingChallenge { pending } => {
                if pending.actor_id == challenger_id {
                    self.restage(pending);
                    return Err(GameError::SelfChallenge);
                }
                self.resolve_action_challenge(pending, challenger_id, &challenger_name, card_index)
            }
            Phase::AwaitingCounterChallenge { pending, counter } => {
                if counter.blocker_id == challenger_id {
                    self.phase = Phase::AwaitingCounterChallenge { pending, counter };
                    return Err(GameError::SelfChallenge);
                }
                self.resolve_counter_challenge(
                    pending,
                    counter,
                    challenger_id,
                    &challenger_name,
                    card_index,
                )
            }
            other => {
                self.phase = other;
                Err(GameError::NoChallengeWindow)
            }
        }
    }

    /// Decline to challenge. One explicit pass resolves the window; the
    /// host decides when enough players have spoken.
    pub fn pass_challenge(&mut self, player_id: &str) -> Result<Outcome, GameError> {
        self.ensure_playing()?;
        let player = self.game.player(player_id).ok_or(GameError::UnknownPlayer)?;
        if !player.is_alive {
            return Err(GameError::DeadPlayer);
        }

        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingCounterChallenge { pending, counter } => {
                if pending.kind == ActionKind::Assassinate {
                    self.require_mut(&pending.actor_id)?.coins += ASSASSINATE_COST;
                }
                let blocker_name = self.name_of(&counter.blocker_id)?;
                let mut outcome = Outcome::ok(format!(
                    "No one challenged. {blocker_name}'s counteraction succeeds. Action blocked."
                ));
                self.conclude(&mut outcome);
                Ok(outcome)
            }
            Phase::AwaitingChallenge { pending } => {
                let result = self.execute_pending(pending)?;
                let mut outcome =
                    Outcome::ok("No one challenged. Action succeeds.").with_result(result);
                self.finish_if_over(&mut outcome);
                Ok(outcome)
            }
            other => {
                self.phase = other;
                Err(GameError::NoChallengeWindow)
            }
        }
    }

    /// Announce a block against the pending action. The block is itself a
    /// claim and opens a fresh challenge window aimed at the blocker.
    pub fn counter(
        &mut self,
        blocker_id: &str,
        request: &CounterRequest,
    ) -> Result<Outcome, GameError> {
        self.ensure_playing()?;
        let blocker = self.game.player(blocker_id).ok_or(GameError::UnknownPlayer)?;
        if !blocker.is_alive {
            return Err(GameError::DeadPlayer);
        }
        let blocker_name = blocker.name.clone();

        let pending = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingCounter { pending } => pending,
            Phase::AwaitingChallenge { pending } if pending.kind.counter().is_some() => pending,
            other => {
                self.phase = other;
                return Err(GameError::NoCounterWindow);
            }
        };

        if pending.actor_id == blocker_id {
            self.restage(pending);
            return Err(GameError::SelfBlock);
        }
        if pending.kind.counter() != Some(request.counter_type) {
            self.restage(pending);
            return Err(GameError::CounterMismatch);
        }

        let claimed = match request.counter_type {
            CounterKind::BlockForeignAid => Character::Duke,
            CounterKind::BlockAssassination => Character::Contessa,
            CounterKind::BlockStealing => {
                let character = request.character.unwrap_or(Character::Captain);
                if character != Character::Captain && character != Character::Ambassador {
                    self.restage(pending);
                    return Err(GameError::BadBlockCharacter);
                }
                character
            }
        };

        let blocked_noun = match pending.kind {
            ActionKind::ForeignAid => "foreign aid",
            ActionKind::Assassinate => "assassination",
            _ => "stealing",
        };
        debug!(blocker = blocker_id, %claimed, action = %pending.kind, "block announced");

        let message = format!("{blocker_name} is blocking {blocked_noun} with {claimed:?}");
        self.phase = Phase::AwaitingCounterChallenge {
            pending,
            counter: PendingCounter {
                blocker_id: blocker_id.to_string(),
                counter_type: request.counter_type,
                claimed_character: claimed,
            },
        };
        Ok(Outcome::ok(message).with_state(Window::ChallengeWindow))
    }

    /// Decline to counter Foreign Aid; the pending action executes.
    pub fn pass_counter(&mut self, player_id: &str) -> Result<Outcome, GameError> {
        self.ensure_playing()?;
        let player = self.game.player(player_id).ok_or(GameError::UnknownPlayer)?;
        if !player.is_alive {
            return Err(GameError::DeadPlayer);
        }

        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AwaitingCounter { pending } => {
                let result = self.execute_pending(pending)?;
                let mut outcome =
                    Outcome::ok("No one countered. Action succeeds.").with_result(result);
                self.finish_if_over(&mut outcome);
                Ok(outcome)
            }
            other => {
                self.phase = other;
                Err(GameError::NoCounterWindow)
            }
        }
    }

    /// Pick which cards to keep after an exchange. `kept_indices` address
    /// the enlarged hand; count must equal the pre-exchange hand size and
    /// indices must be unique and in bounds.
    pub fn complete_exchange(
        &mut self,
        player_id: &str,
        kept_indices: &[usize],
    ) -> Result<Outcome, GameError> {
        self.ensure_playing()?;
        let (actor, keep) = match &self.phase {
            Phase::ExchangeSelection { actor, keep } => (actor.clone(), *keep),
            _ => return Err(GameError::NoExchange),
        };
        if actor != player_id {
            return Err(GameError::NoExchange);
        }
        if kept_indices.len() != keep {
            return Err(GameError::WrongKeepCount { expected: keep });
        }

        let hand_len = self
            .game
            .player(player_id)
            .ok_or(GameError::UnknownPlayer)?
            .hand_size();
        let mut seen = vec![false; hand_len];
        for &idx in kept_indices {
            if idx >= hand_len || seen[idx] {
                return Err(GameError::BadKeepIndices);
            }
            seen[idx] = true;
        }

        let player = self.require_mut(player_id)?;
        let name = player.name.clone();
        let pool = mem::take(&mut player.cards);
        player.cards = kept_indices.iter().map(|&i| pool[i]).collect();
        let returned: Vec<Character> = pool
            .iter()
            .enumerate()
            .filter(|(i, _)| !seen[*i])
            .map(|(_, &c)| c)
            .collect();
        card::return_and_shuffle(&mut self.game.deck, returned, &mut self.rng);
        self.phase = Phase::Idle;

        let mut outcome = Outcome::ok(format!("Player {name} completed exchange"));
        self.conclude(&mut outcome);
        debug_assert_eq!(self.game.card_population(), DECK_SIZE);
        Ok(outcome)
    }

    fn validate_action(&self, actor_id: &str, request: &ActionRequest) -> Result<(), GameError> {
        self.ensure_playing()?;
        if !matches!(self.phase, Phase::Idle) {
            return Err(GameError::ActionPending);
        }

        let actor = self.game.player(actor_id).ok_or(GameError::UnknownPlayer)?;
        if !actor.is_alive {
            return Err(GameError::DeadPlayer);
        }
        let current = self
            .game
            .current_player()
            .ok_or_else(|| GameError::internal("turn pointer out of range"))?;
        if current.id != actor_id {
            return Err(GameError::NotYourTurn);
        }
        if actor.coins >= MUST_COUP_AT && request.kind != ActionKind::Coup {
            return Err(GameError::MustCoup);
        }

        match request.kind {
            ActionKind::Coup => {
                if actor.coins < COUP_COST {
                    return Err(GameError::InsufficientCoins { action: "coup" });
                }
                self.validate_target(request, "coup")?;
            }
            ActionKind::Assassinate => {
                if actor.coins < ASSASSINATE_COST {
                    return Err(GameError::InsufficientCoins {
                        action: "assassination",
                    });
                }
                self.validate_target(request, "assassination")?;
            }
            ActionKind::Steal => {
                let target = self.validate_target(request, "stealing")?;
                if target.coins == 0 {
                    return Err(GameError::NothingToSteal);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn validate_target<'a>(
        &'a self,
        request: &ActionRequest,
        noun: &'static str,
    ) -> Result<&'a Player, GameError> {
        let target_id = request
            .target_id
            .as_deref()
            .ok_or(GameError::MissingTarget { action: noun })?;
        let target = self.game.player(target_id).ok_or(GameError::UnknownTarget)?;
        if !target.is_alive {
            return Err(GameError::DeadTarget);
        }
        Ok(target)
    }

    fn resolve_action_challenge(
        &mut self,
        pending: PendingAction,
        challenger_id: &str,
        challenger_name: &str,
        card_index: Option<usize>,
    ) -> Result<Outcome, GameError> {
        let claimed = pending
            .kind
            .claimed_character()
            .ok_or_else(|| GameError::internal("pending action carries no claim"))?;
        let actor = self
            .game
            .player(&pending.actor_id)
            .ok_or_else(|| GameError::internal("pending actor not seated in this room"))?;
        let actor_name = actor.name.clone();
        let truthful = actor.cards.contains(&claimed);
        debug!(
            actor = %pending.actor_id,
            challenger = challenger_id,
            %claimed,
            truthful,
            "resolving challenge against claim"
        );

        let mut outcome = if truthful {
            self.lose_card(challenger_id, card_index)?;
            self.recycle_card(&pending.actor_id, claimed)?;
            let result = self.execute_pending(pending)?;
            Outcome::ok(format!(
                "Challenge failed! {actor_name} had the {claimed}. {challenger_name} loses a card."
            ))
            .with_result(result)
        } else {
            if pending.kind == ActionKind::Assassinate {
                self.require_mut(&pending.actor_id)?.coins += ASSASSINATE_COST;
            }
            self.lose_card(&pending.actor_id, card_index)?;
            let mut outcome = Outcome::ok(format!(
                "Challenge successful! {actor_name} did not have the {claimed} and loses a card."
            ));
            self.conclude(&mut outcome);
            outcome
        };

        self.finish_if_over(&mut outcome);
        debug_assert_eq!(self.game.card_population(), DECK_SIZE);
        Ok(outcome)
    }

    fn resolve_counter_challenge(
        &mut self,
        pending: PendingAction,
        counter: PendingCounter,
        challenger_id: &str,
        challenger_name: &str,
        card_index: Option<usize>,
    ) -> Result<Outcome, GameError> {
        let claimed = counter.claimed_character;
        let blocker = self
            .game
            .player(&counter.blocker_id)
            .ok_or_else(|| GameError::internal("blocker not seated in this room"))?;
        let blocker_name = blocker.name.clone();
        let truthful = blocker.cards.contains(&claimed);
        debug!(
            blocker = %counter.blocker_id,
            challenger = challenger_id,
            %claimed,
            truthful,
            "resolving challenge against block"
        );

        let mut outcome = if truthful {
            // block stands: original action is cancelled for good
            self.lose_card(challenger_id, card_index)?;
            self.recycle_card(&counter.blocker_id, claimed)?;
            if pending.kind == ActionKind::Assassinate {
                self.require_mut(&pending.actor_id)?.coins += ASSASSINATE_COST;
            }
            let mut outcome = Outcome::ok(format!(
                "Challenge failed! {blocker_name} had the {claimed}. {challenger_name} loses a card. Action blocked."
            ));
            self.conclude(&mut outcome);
            outcome
        } else {
            self.lose_card(&counter.blocker_id, card_index)?;
            let result = self.execute_pending(pending)?;
            Outcome::ok(format!(
                "Challenge successful! {blocker_name} did not have the {claimed} and loses a card. Original action proceeds."
            ))
            .with_result(result)
        };

        self.finish_if_over(&mut outcome);
        debug_assert_eq!(self.game.card_population(), DECK_SIZE);
        Ok(outcome)
    }

    /// Apply a pending action's effects once every window around it has
    /// closed. Exchange is the one action that does not end the turn here.
    fn execute_pending(&mut self, pending: PendingAction) -> Result<Outcome, GameError> {
        let actor_name = self.name_of(&pending.actor_id)?;

        match pending.kind {
            ActionKind::Tax => {
                self.require_mut(&pending.actor_id)?.coins += 3;
                self.game.last_action =
                    Some(LastAction::simple(ActionKind::Tax, actor_name.clone()));
                let mut outcome = Outcome::ok(format!("Player {actor_name} took tax (3 coins)"));
                self.conclude(&mut outcome);
                Ok(outcome)
            }
            ActionKind::ForeignAid => {
                self.require_mut(&pending.actor_id)?.coins += 2;
                self.game.last_action =
                    Some(LastAction::simple(ActionKind::ForeignAid, actor_name.clone()));
                let mut outcome =
                    Outcome::ok(format!("Player {actor_name} took foreign aid (2 coins)"));
                self.conclude(&mut outcome);
                Ok(outcome)
            }
            ActionKind::Assassinate => {
                let target_id = pending
                    .target_id
                    .clone()
                    .ok_or_else(|| GameError::internal("assassination without a target"))?;
                let target_name = self.name_of(&target_id)?;
                // fee was escrowed when the claim was staged; the target may
                // already be out, in which case there is no card to take
                self.lose_card(&target_id, pending.card_index)?;
                self.game.last_action = Some(LastAction::targeted(
                    ActionKind::Assassinate,
                    actor_name.clone(),
                    target_name.clone(),
                ));
                let mut outcome =
                    Outcome::ok(format!("Player {actor_name} assassinated {target_name}"));
                self.conclude(&mut outcome);
                Ok(outcome)
            }
            ActionKind::Steal => {
                let target_id = pending
                    .target_id
                    .clone()
                    .ok_or_else(|| GameError::internal("steal without a target"))?;
                let target = self.require_mut(&target_id)?;
                let amount = target.coins.min(STEAL_MAX);
                target.coins -= amount;
                let target_name = target.name.clone();
                self.require_mut(&pending.actor_id)?.coins += amount;
                self.game.last_action = Some(LastAction {
                    kind: ActionKind::Steal,
                    player: actor_name.clone(),
                    target: Some(target_name.clone()),
                    amount: Some(amount),
                });
                let mut outcome = Outcome::ok(format!(
                    "Player {actor_name} stole {amount} coins from {target_name}"
                ));
                self.conclude(&mut outcome);
                Ok(outcome)
            }
            ActionKind::Exchange => {
                for _ in 0..EXCHANGE_DRAW {
                    let drawn = self
                        .game
                        .deck
                        .pop()
                        .ok_or_else(|| GameError::internal("deck underflow during exchange"))?;
                    self.require_mut(&pending.actor_id)?.cards.push(drawn);
                }
                let hand = self
                    .game
                    .player(&pending.actor_id)
                    .ok_or(GameError::UnknownPlayer)?
                    .cards
                    .clone();
                let keep = hand.len() - EXCHANGE_DRAW;
                self.phase = Phase::ExchangeSelection {
                    actor: pending.actor_id.clone(),
                    keep,
                };
                self.game.last_action =
                    Some(LastAction::simple(ActionKind::Exchange, actor_name.clone()));
                Ok(Outcome::ok(format!("Player {actor_name} is exchanging cards"))
                    .with_state(Window::Exchange)
                    .with_cards(hand))
            }
            ActionKind::Income | ActionKind::Coup => Err(GameError::internal(
                "unchallengeable action was staged as pending",
            )),
        }
    }

    /// Flip one hand card face-up. An out-of-range index falls back to 0;
    /// an empty hand is a no-op (the player is already out).
    fn lose_card(&mut self, player_id: &str, card_index: Option<usize>) -> Result<(), GameError> {
        let player = self.require_mut(player_id)?;
        if player.cards.is_empty() {
            return Ok(());
        }
        let idx = match card_index {
            Some(i) if i < player.cards.len() => i,
            _ => 0,
        };
        let card = player.cards.remove(idx);
        player.revealed_cards.push(card);
        if player.cards.is_empty() {
            player.is_alive = false;
            debug!(player = player_id, "player eliminated");
        }
        Ok(())
    }

    /// A revealed-but-truthful claim goes back into the deck; the deck is
    /// reshuffled and a replacement drawn, keeping the hand size constant.
    fn recycle_card(&mut self, player_id: &str, character: Character) -> Result<(), GameError> {
        let player = self.require_mut(player_id)?;
        let idx = player
            .cards
            .iter()
            .position(|&c| c == character)
            .ok_or_else(|| GameError::internal("claimed card vanished before recycling"))?;
        let card = player.cards.remove(idx);

        card::return_and_shuffle(&mut self.game.deck, [card], &mut self.rng);
        let fresh = self
            .game
            .deck
            .pop()
            .ok_or_else(|| GameError::internal("deck underflow after reshuffle"))?;
        self.require_mut(player_id)?.cards.push(fresh);
        Ok(())
    }

    /// End of a fully resolved action: either the game just ended, or the
    /// turn moves on.
    fn conclude(&mut self, outcome: &mut Outcome) {
        if self.game.is_over() {
            self.game.status = GameStatus::Finished;
            outcome.game_over = true;
        } else {
            self.game.next_player();
        }
    }

    fn finish_if_over(&mut self, outcome: &mut Outcome) {
        if self.game.is_over() {
            self.game.status = GameStatus::Finished;
            outcome.game_over = true;
        }
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        if self.game.status == GameStatus::Playing {
            Ok(())
        } else {
            Err(GameError::NotPlaying)
        }
    }

    fn restage(&mut self, pending: PendingAction) {
        self.phase = if pending.kind == ActionKind::ForeignAid {
            Phase::AwaitingCounter { pending }
        } else {
            Phase::AwaitingChallenge { pending }
        };
    }

    fn name_of(&self, player_id: &str) -> Result<String, GameError> {
        Ok(self
            .game
            .player(player_id)
            .ok_or(GameError::UnknownPlayer)?
            .name
            .clone())
    }

    fn require_mut(&mut self, player_id: &str) -> Result<&mut Player, GameError> {
        self.game
            .player_mut(player_id)
            .ok_or(GameError::UnknownPlayer)
    }
}

impl<R: Rng> fmt::Debug for Engine<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "T {} | P {} | {:?}",
            self.game.turn_number, self.game.current_player_index, self.phase
        )?;
        for (idx, player) in self.game.players.iter().enumerate() {
            writeln!(
                f,
                "\tP {idx}: ${} | hand {} | revealed {:?}",
                player.coins,
                player.hand_size(),
                player.revealed_cards
            )?;
        }
        Ok(())
    }
}
