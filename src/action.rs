use std::fmt::{self, Formatter};

use serde::{Deserialize, Serialize};

use crate::card::Character;

/// The seven base actions a player can take on their turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Income,
    ForeignAid,
    Coup,
    Tax,
    Assassinate,
    Steal,
    Exchange,
}

impl ActionKind {
    /// The character a player implicitly claims by taking this action.
    pub fn claimed_character(self) -> Option<Character> {
        match self {
            ActionKind::Tax => Some(Character::Duke),
            ActionKind::Assassinate => Some(Character::Assassin),
            ActionKind::Steal => Some(Character::Captain),
            ActionKind::Exchange => Some(Character::Ambassador),
            _ => None,
        }
    }

    /// Whether the action stakes a character claim and can be challenged.
    pub fn challengeable(self) -> bool {
        self.claimed_character().is_some()
    }

    /// The counteraction that cancels this action, if one exists.
    pub fn counter(self) -> Option<CounterKind> {
        match self {
            ActionKind::ForeignAid => Some(CounterKind::BlockForeignAid),
            ActionKind::Assassinate => Some(CounterKind::BlockAssassination),
            ActionKind::Steal => Some(CounterKind::BlockStealing),
            _ => None,
        }
    }

    pub fn needs_target(self) -> bool {
        matches!(
            self,
            ActionKind::Coup | ActionKind::Assassinate | ActionKind::Steal
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Income => "income",
            ActionKind::ForeignAid => "foreign_aid",
            ActionKind::Coup => "coup",
            ActionKind::Tax => "tax",
            ActionKind::Assassinate => "assassinate",
            ActionKind::Steal => "steal",
            ActionKind::Exchange => "exchange",
        };
        f.write_str(name)
    }
}

/// The three block types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    BlockForeignAid,
    BlockAssassination,
    BlockStealing,
}

/// A player's action request as delivered by the transport layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "action_type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_index: Option<usize>,
}

impl ActionRequest {
    pub fn of(kind: ActionKind) -> Self {
        Self {
            kind,
            target_id: None,
            card_index: None,
        }
    }

    pub fn targeting(kind: ActionKind, target_id: impl Into<String>) -> Self {
        Self {
            kind,
            target_id: Some(target_id.into()),
            card_index: None,
        }
    }
}

/// A block announcement. `character` only matters for `BlockStealing`,
/// where the blocker picks Captain or Ambassador (Captain by default).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRequest {
    pub counter_type: CounterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
}

impl CounterRequest {
    pub fn of(counter_type: CounterKind) -> Self {
        Self {
            counter_type,
            character: None,
        }
    }
}
