//! Card model and best-hand evaluation for the bot heuristic.

use serde::{Deserialize, Serialize};
use std::{cmp::Reverse, fmt, str::FromStr};
use thiserror::Error;

/// Card value, deuce = 2 ... ace = 14.
pub type Value = u8;

pub const ACE: Value = 14;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    const ALL: [Suit; 4] = [Suit::Club, Suit::Diamond, Suit::Heart, Suit::Spade];

    fn letter(self) -> char {
        match self {
            Suit::Club => 'c',
            Suit::Diamond => 'd',
            Suit::Heart => 'h',
            Suit::Spade => 's',
        }
    }
}

/// Card parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("Invalid card value in {0:?}")]
    InvalidValue(String),

    #[error("Invalid card suit in {0:?}")]
    InvalidSuit(String),
}

/// A card is a value and a suit. Serialized in short form, e.g. `"As"`, `"Td"`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self.0 {
            14 => 'A',
            13 => 'K',
            12 => 'Q',
            11 => 'J',
            10 => 'T',
            v => char::from(b'0' + v),
        };
        write!(f, "{value}{}", self.1.letter())
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let suit = match chars.next_back().map(|c| c.to_ascii_lowercase()) {
            Some('c') => Suit::Club,
            Some('d') => Suit::Diamond,
            Some('h') => Suit::Heart,
            Some('s') => Suit::Spade,
            _ => return Err(CardError::InvalidSuit(s.to_string())),
        };
        let value = match chars.as_str().to_ascii_uppercase().as_str() {
            "A" => ACE,
            "K" => 13,
            "Q" => 12,
            "J" => 11,
            "T" | "10" => 10,
            digit => match digit.parse::<Value>() {
                Ok(v @ 2..=9) => v,
                _ => return Err(CardError::InvalidValue(s.to_string())),
            },
        };
        Ok(Card(value, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = CardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "high card",
            Self::OnePair => "one pair",
            Self::TwoPair => "two pair",
            Self::ThreeOfAKind => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::FourOfAKind => "four of a kind",
            Self::StraightFlush => "straight flush",
        };
        write!(f, "{repr}")
    }
}

/// Best hand category with tiebreak values, highest first. Ordering compares
/// category then values.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HandValue {
    pub rank: Rank,
    pub values: Vec<Value>,
}

/// Evaluate the best hand that can be made from `cards` (up to 7).
///
/// Returns `None` for an empty slice or when a card value is outside
/// `2..=14`. With fewer than five cards only pairs, trips and quads can be
/// made.
pub fn evaluate(cards: &[Card]) -> Option<HandValue> {
    if cards.is_empty() || cards.iter().any(|card| !(2..=ACE).contains(&card.0)) {
        return None;
    }

    let mut counts = [0u8; 15];
    for card in cards {
        counts[usize::from(card.0)] = counts[usize::from(card.0)].saturating_add(1);
    }

    if let Some(hand) = best_flush(cards) {
        return Some(hand);
    }

    // (count, value) groups, biggest group then highest value first
    let mut groups: Vec<(u8, Value)> = (2..=ACE)
        .rev()
        .filter(|&v| counts[usize::from(v)] > 0)
        .map(|v| (counts[usize::from(v)], v))
        .collect();
    groups.sort_by_key(|&(count, value)| Reverse((count, value)));

    let kickers = |exclude: &[Value], take: usize| -> Vec<Value> {
        groups
            .iter()
            .map(|&(_, v)| v)
            .filter(|v| !exclude.contains(v))
            .take(take)
            .collect()
    };

    let (top_count, top) = groups[0];
    let second = groups.get(1).copied();

    if top_count == 4 {
        let mut values = vec![top];
        values.extend(kickers(&[top], 1));
        return Some(HandValue {
            rank: Rank::FourOfAKind,
            values,
        });
    }

    if top_count == 3 {
        if let Some((count, pair)) = second {
            if count >= 2 {
                return Some(HandValue {
                    rank: Rank::FullHouse,
                    values: vec![top, pair],
                });
            }
        }
    }

    let distinct: Vec<Value> = groups.iter().map(|&(_, v)| v).collect();
    if let Some(high) = straight_high(&distinct) {
        return Some(HandValue {
            rank: Rank::Straight,
            values: vec![high],
        });
    }

    let hand = match (top_count, second) {
        (3, _) => {
            let mut values = vec![top];
            values.extend(kickers(&[top], 2));
            HandValue {
                rank: Rank::ThreeOfAKind,
                values,
            }
        }
        (2, Some((2, low_pair))) => {
            let mut values = vec![top, low_pair];
            values.extend(kickers(&[top, low_pair], 1));
            HandValue {
                rank: Rank::TwoPair,
                values,
            }
        }
        (2, _) => {
            let mut values = vec![top];
            values.extend(kickers(&[top], 3));
            HandValue {
                rank: Rank::OnePair,
                values,
            }
        }
        _ => HandValue {
            rank: Rank::HighCard,
            values: kickers(&[], 5),
        },
    };
    Some(hand)
}

/// Flush or straight flush, if five or more cards share a suit.
fn best_flush(cards: &[Card]) -> Option<HandValue> {
    Suit::ALL.iter().find_map(|&suit| {
        let mut values: Vec<Value> = cards
            .iter()
            .filter(|card| card.1 == suit)
            .map(|card| card.0)
            .collect();
        if values.len() < 5 {
            return None;
        }
        values.sort_unstable_by(|a, b| b.cmp(a));
        values.dedup();

        Some(match straight_high(&values) {
            Some(high) => HandValue {
                rank: Rank::StraightFlush,
                values: vec![high],
            },
            None => HandValue {
                rank: Rank::Flush,
                values: values.into_iter().take(5).collect(),
            },
        })
    })
}

/// Highest straight in a set of distinct values; the ace also plays low.
fn straight_high(values: &[Value]) -> Option<Value> {
    let has = |v: Value| values.contains(&v) || (v == 1 && values.contains(&ACE));
    (5..=ACE).rev().find(|&high| (high - 4..=high).all(has))
}
