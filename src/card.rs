use std::fmt::{self, Formatter};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::Character::{Ambassador, Assassin, Captain, Contessa, Duke};

/// The five character roles of the base card set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
}

pub static CHARACTER_VARIANTS: [Character; 5] = [
    Duke,
    Assassin,
    Captain,
    Ambassador,
    Contessa,
];

pub const COPIES_PER_CHARACTER: usize = 3;
pub const DECK_SIZE: usize = 15;

impl fmt::Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Duke => "duke",
            Assassin => "assassin",
            Captain => "captain",
            Ambassador => "ambassador",
            Contessa => "contessa",
        };
        f.write_str(name)
    }
}

/// Build the full 15-card deck, 3 copies per role, shuffled once.
pub fn build_deck<R: Rng>(rng: &mut R) -> Vec<Character> {
    let mut deck: Vec<Character> = CHARACTER_VARIANTS
        .iter()
        .flat_map(|&card| std::iter::repeat(card).take(COPIES_PER_CHARACTER))
        .collect();

    deck.shuffle(rng);
    deck
}

/// Return cards to the deck and reshuffle. The deck is treated as a stack,
/// so a reshuffle must happen before the next draw counts as uniform.
pub fn return_and_shuffle<R: Rng>(
    deck: &mut Vec<Character>,
    cards: impl IntoIterator<Item = Character>,
    rng: &mut R,
) {
    deck.extend(cards);
    deck.shuffle(rng);
}
