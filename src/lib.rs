pub mod action;
pub mod card;
pub mod engine;
pub mod error;
pub mod game;
pub mod rooms;
pub mod view;

pub use action::{ActionKind, ActionRequest, CounterKind, CounterRequest};
pub use card::Character;
pub use engine::{Engine, Outcome, Window};
pub use error::{ErrorKind, GameError};
pub use game::{Game, GameStatus, Seat};
pub use rooms::Rooms;
pub use view::GameView;
