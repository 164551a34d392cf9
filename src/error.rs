use thiserror::Error;

/// Coarse classification of engine failures. `Validation` and `Protocol`
/// errors are recoverable and go back to the single requester; `Internal`
/// means a broken invariant and is surfaced as a generic failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Protocol,
    Internal,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("game not found")]
    UnknownRoom,
    #[error("player not found")]
    UnknownPlayer,
    #[error("player is not alive")]
    DeadPlayer,
    #[error("not your turn")]
    NotYourTurn,
    #[error("the game is not in progress")]
    NotPlaying,
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("a game needs between 2 and 6 players")]
    BadPlayerCount,
    #[error("you must perform a coup when you have 10 or more coins")]
    MustCoup,
    #[error("not enough coins for {action}")]
    InsufficientCoins { action: &'static str },
    #[error("no target specified for {action}")]
    MissingTarget { action: &'static str },
    #[error("target player not found")]
    UnknownTarget,
    #[error("target player is not alive")]
    DeadTarget,
    #[error("target player has no coins to steal")]
    NothingToSteal,
    #[error("you cannot challenge your own claim")]
    SelfChallenge,
    #[error("you cannot counter your own action")]
    SelfBlock,
    #[error("invalid character for blocking stealing")]
    BadBlockCharacter,

    #[error("no action to challenge")]
    NoChallengeWindow,
    #[error("no action to counter")]
    NoCounterWindow,
    #[error("that counteraction does not apply to the pending action")]
    CounterMismatch,
    #[error("another action is still being resolved")]
    ActionPending,
    #[error("no exchange action in progress")]
    NoExchange,
    #[error("you must keep exactly {expected} cards")]
    WrongKeepCount { expected: usize },
    #[error("invalid card indices")]
    BadKeepIndices,

    #[error("internal game error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        use GameError::*;

        match self {
            UnknownRoom | UnknownPlayer | DeadPlayer | NotYourTurn | NotPlaying
            | AlreadyStarted | BadPlayerCount | MustCoup | InsufficientCoins { .. }
            | MissingTarget { .. } | UnknownTarget | DeadTarget | NothingToSteal
            | SelfChallenge | SelfBlock | BadBlockCharacter => ErrorKind::Validation,
            NoChallengeWindow | NoCounterWindow | CounterMismatch | ActionPending
            | NoExchange | WrongKeepCount { .. } | BadKeepIndices => ErrorKind::Protocol,
            Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        GameError::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(GameError::NotYourTurn.kind(), ErrorKind::Validation);
        assert_eq!(GameError::NoChallengeWindow.kind(), ErrorKind::Protocol);
        assert_eq!(
            GameError::internal("deck underflow").kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn messages_match_wire_text() {
        assert_eq!(
            GameError::MustCoup.to_string(),
            "you must perform a coup when you have 10 or more coins"
        );
        assert_eq!(
            GameError::InsufficientCoins { action: "coup" }.to_string(),
            "not enough coins for coup"
        );
        assert_eq!(
            GameError::WrongKeepCount { expected: 2 }.to_string(),
            "you must keep exactly 2 cards"
        );
    }
}
