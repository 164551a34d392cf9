//! Room registry: one engine per room code, each behind its own lock so
//! rooms never contend with each other. Ordering within a room is
//! whatever order the lock grants.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use crate::action::{ActionRequest, CounterRequest};
use crate::engine::{Engine, Outcome};
use crate::error::{ErrorKind, GameError};
use crate::game::Seat;
use crate::view::GameView;

#[derive(Default)]
pub struct Rooms {
    rooms: Mutex<HashMap<String, Arc<Mutex<Engine>>>>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room for the given seats. Creating a room that already
    /// exists is a no-op so a reconnecting host cannot wipe a live game.
    pub fn create(&self, room_code: &str, seats: &[Seat]) -> Result<(), GameError> {
        let mut rooms = self.rooms.lock().unwrap();
        if rooms.contains_key(room_code) {
            return Ok(());
        }

        let engine = Engine::new(room_code, seats)?;
        rooms.insert(room_code.to_string(), Arc::new(Mutex::new(engine)));
        info!(room = room_code, players = seats.len(), "room created");
        Ok(())
    }

    pub fn start(&self, room_code: &str) -> Outcome {
        self.dispatch(room_code, |engine| {
            engine.start()?;
            Ok(Outcome::ok("Game started"))
        })
    }

    pub fn remove(&self, room_code: &str) -> bool {
        let removed = self.rooms.lock().unwrap().remove(room_code).is_some();
        if removed {
            info!(room = room_code, "room removed");
        }
        removed
    }

    pub fn contains(&self, room_code: &str) -> bool {
        self.rooms.lock().unwrap().contains_key(room_code)
    }

    pub fn act(&self, room_code: &str, player_id: &str, request: &ActionRequest) -> Outcome {
        self.dispatch(room_code, |engine| engine.act(player_id, request))
    }

    pub fn challenge(&self, room_code: &str, player_id: &str, card_index: Option<usize>) -> Outcome {
        self.dispatch(room_code, |engine| engine.challenge(player_id, card_index))
    }

    pub fn pass_challenge(&self, room_code: &str, player_id: &str) -> Outcome {
        self.dispatch(room_code, |engine| engine.pass_challenge(player_id))
    }

    pub fn counter(&self, room_code: &str, player_id: &str, request: &CounterRequest) -> Outcome {
        self.dispatch(room_code, |engine| engine.counter(player_id, request))
    }

    pub fn pass_counter(&self, room_code: &str, player_id: &str) -> Outcome {
        self.dispatch(room_code, |engine| engine.pass_counter(player_id))
    }

    pub fn complete_exchange(
        &self,
        room_code: &str,
        player_id: &str,
        kept_indices: &[usize],
    ) -> Outcome {
        self.dispatch(room_code, |engine| {
            engine.complete_exchange(player_id, kept_indices)
        })
    }

    /// Snapshot the room for one viewer. `None` when the room does not
    /// exist or the viewer is not seated in it.
    pub fn player_view(&self, room_code: &str, viewer_id: &str) -> Option<GameView> {
        let engine = self.room(room_code)?;
        let engine = engine.lock().unwrap();
        GameView::redacted(&engine, viewer_id)
    }

    /// Shared handle to one room's engine, for hosts that need direct
    /// access beyond the pass-through operations.
    pub fn room(&self, room_code: &str) -> Option<Arc<Mutex<Engine>>> {
        self.rooms.lock().unwrap().get(room_code).cloned()
    }

    /// Run one engine operation under the room lock and flatten errors
    /// into wire-shaped failure outcomes. Internal errors are logged and
    /// replaced with a generic message.
    fn dispatch<F>(&self, room_code: &str, op: F) -> Outcome
    where
        F: FnOnce(&mut Engine) -> Result<Outcome, GameError>,
    {
        let Some(engine) = self.room(room_code) else {
            return Outcome::failure(GameError::UnknownRoom.to_string());
        };
        let mut engine = engine.lock().unwrap();

        match op(&mut engine) {
            Ok(outcome) => outcome,
            Err(err) if err.kind() == ErrorKind::Internal => {
                error!(room = room_code, %err, "engine invariant violated");
                Outcome::failure("internal game error")
            }
            Err(err) => {
                warn!(room = room_code, %err, "request rejected");
                Outcome::failure(err.to_string())
            }
        }
    }
}
