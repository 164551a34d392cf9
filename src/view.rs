//! Per-viewer snapshots. Everything here is what a single player is
//! allowed to see: their own hand face-up, everyone else's face-down.

use rand::Rng;
use serde::Serialize;

use crate::card::Character;
use crate::engine::{Engine, PendingAction, PendingCounter};
use crate::game::{GameStatus, LastAction, Player};

/// One seat as seen by a viewer. `cards` holds `None` for every card the
/// viewer may not see; revealed cards are always public.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub coins: u8,
    pub cards: Vec<Option<Character>>,
    pub revealed_cards: Vec<Character>,
    pub is_alive: bool,
}

impl PlayerView {
    fn redacted(player: &Player, visible: bool) -> Self {
        let cards = player
            .cards
            .iter()
            .map(|&c| if visible { Some(c) } else { None })
            .collect();
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            coins: player.coins,
            cards,
            revealed_cards: player.revealed_cards.clone(),
            is_alive: player.is_alive,
        }
    }
}

/// A full game snapshot tailored to one viewer, ready to serialize and
/// push over the wire.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameView {
    pub room_code: String,
    pub status: GameStatus,
    pub players: Vec<PlayerView>,
    pub current_player_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_player: Option<String>,
    pub is_your_turn: bool,
    pub turn_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_action: Option<LastAction>,
    pub cards_left: usize,
    pub challenge_window_open: bool,
    pub counteraction_window_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_counteraction: Option<PendingCounter>,
}

impl GameView {
    /// Snapshot the engine for `viewer_id`. Returns `None` when the viewer
    /// is not seated in this room.
    pub fn redacted<R: Rng>(engine: &Engine<R>, viewer_id: &str) -> Option<Self> {
        let game = engine.game();
        game.player(viewer_id)?;

        let players = game
            .players()
            .iter()
            .map(|p| PlayerView::redacted(p, p.id == viewer_id))
            .collect();
        let current_player = game.current_player();

        Some(Self {
            room_code: game.room_code().to_string(),
            status: game.status(),
            players,
            current_player_index: game.current_player_index(),
            current_player: current_player.map(|p| p.name.clone()),
            is_your_turn: current_player.is_some_and(|p| p.id == viewer_id),
            turn_number: game.turn_number(),
            last_action: game.last_action().cloned(),
            cards_left: game.deck_len(),
            challenge_window_open: engine.challenge_window_open(),
            counteraction_window_open: engine.counteraction_window_open(),
            pending_action: engine.pending_action().cloned(),
            pending_counteraction: engine.pending_counteraction().cloned(),
        })
    }
}
