use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::card::Character;
use crate::error::GameError;

pub const STARTING_COINS: u8 = 2;
pub const CARDS_PER_PLAYER: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// A seated player as handed over by the lobby: identity only, no cards yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: String,
    pub name: String,
}

impl Seat {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub coins: u8,
    pub(crate) cards: Vec<Character>,
    pub revealed_cards: Vec<Character>,
    pub is_alive: bool,
}

impl Player {
    fn seated(seat: &Seat) -> Self {
        Self {
            id: seat.id.clone(),
            name: seat.name.clone(),
            coins: 0,
            cards: Vec::new(),
            revealed_cards: Vec::new(),
            is_alive: true,
        }
    }

    pub fn hand_size(&self) -> usize {
        self.cards.len()
    }
}

/// Public summary of the most recently resolved action, broadcast with
/// every snapshot. Never carries hidden card identities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LastAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub player: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u8>,
}

impl LastAction {
    pub(crate) fn simple(kind: ActionKind, player: impl Into<String>) -> Self {
        Self {
            kind,
            player: player.into(),
            target: None,
            amount: None,
        }
    }

    pub(crate) fn targeted(
        kind: ActionKind,
        player: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            player: player.into(),
            target: Some(target.into()),
            amount: None,
        }
    }
}

/// One room's table state: seats in fixed turn order, the shared deck and
/// the turn pointer. The resolution engine owns the only mutable handle.
#[derive(Clone, Debug)]
pub struct Game {
    pub(crate) room_code: String,
    pub(crate) status: GameStatus,
    pub(crate) players: Vec<Player>,
    pub(crate) current_player_index: usize,
    pub(crate) deck: Vec<Character>,
    pub(crate) turn_number: u32,
    pub(crate) last_action: Option<LastAction>,
}

impl Game {
    pub(crate) fn new(room_code: &str, seats: &[Seat], deck: Vec<Character>) -> Self {
        Self {
            room_code: room_code.to_string(),
            status: GameStatus::Waiting,
            players: seats.iter().map(Player::seated).collect(),
            current_player_index: 0,
            deck,
            turn_number: 0,
            last_action: None,
        }
    }

    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn last_action(&self) -> Option<&LastAction> {
        self.last_action.as_ref()
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// The game is over iff at most one player is alive.
    pub fn is_over(&self) -> bool {
        self.players.iter().filter(|p| p.is_alive).count() <= 1
    }

    pub fn winner(&self) -> Option<&Player> {
        if self.is_over() {
            self.players.iter().find(|p| p.is_alive)
        } else {
            None
        }
    }

    pub(crate) fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Draw the starting hands in turn order and fund the purses.
    pub(crate) fn deal(&mut self) -> Result<(), GameError> {
        for idx in 0..self.players.len() {
            for _ in 0..CARDS_PER_PLAYER {
                let card = self
                    .deck
                    .pop()
                    .ok_or_else(|| GameError::internal("deck underflow while dealing"))?;
                self.players[idx].cards.push(card);
            }
            self.players[idx].coins = STARTING_COINS;
        }
        Ok(())
    }

    /// Advance the turn pointer to the next living player. If no other
    /// player is alive the pointer stays put and the turn counter does not
    /// move (terminal state).
    pub(crate) fn next_player(&mut self) {
        let n = self.players.len();
        for step in 1..n {
            let idx = (self.current_player_index + step) % n;
            if self.players[idx].is_alive {
                self.current_player_index = idx;
                self.turn_number += 1;
                return;
            }
        }
    }

    /// Cards on the table, in hands and in revealed piles. Always 15.
    pub(crate) fn card_population(&self) -> usize {
        self.deck.len()
            + self
                .players
                .iter()
                .map(|p| p.cards.len() + p.revealed_cards.len())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use crate::card::{build_deck, DECK_SIZE};

    use super::*;

    fn game(num_players: usize) -> Game {
        let seats: Vec<Seat> = (0..num_players)
            .map(|i| Seat::new(format!("p{i}"), format!("Player {i}")))
            .collect();
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        Game::new("room", &seats, build_deck(&mut rng))
    }

    #[test]
    fn deal_funds_and_draws() {
        let mut game = game(4);
        game.deal().unwrap();

        for player in game.players() {
            assert_eq!(player.coins, STARTING_COINS);
            assert_eq!(player.hand_size(), CARDS_PER_PLAYER);
            assert!(player.is_alive);
        }
        assert_eq!(game.deck_len(), DECK_SIZE - 4 * CARDS_PER_PLAYER);
        assert_eq!(game.card_population(), DECK_SIZE);
    }

    #[test]
    fn next_player_skips_the_dead() {
        let mut game = game(4);
        game.deal().unwrap();
        game.players[1].is_alive = false;

        game.next_player();
        assert_eq!(game.current_player_index(), 2);
        assert_eq!(game.turn_number(), 1);

        game.next_player();
        assert_eq!(game.current_player_index(), 3);

        game.next_player();
        assert_eq!(game.current_player_index(), 0);
        assert_eq!(game.turn_number(), 3);
    }

    #[test]
    fn next_player_stays_when_alone() {
        let mut game = game(3);
        game.deal().unwrap();
        game.players[1].is_alive = false;
        game.players[2].is_alive = false;

        game.next_player();
        assert_eq!(game.current_player_index(), 0);
        assert_eq!(game.turn_number(), 0);
        assert!(game.is_over());
        assert_eq!(game.winner().map(|p| p.id.as_str()), Some("p0"));
    }

    #[test]
    fn over_with_two_left_is_false() {
        let mut game = game(3);
        game.deal().unwrap();
        game.players[0].is_alive = false;
        assert!(!game.is_over());
        assert!(game.winner().is_none());
    }
}
