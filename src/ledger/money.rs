//! KWD amounts. Stored as integer fils (1/1000 KWD), summed as `Decimal`,
//! rounded to 3 places only when presented.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const FILS_PER_DINAR: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denomination {
    Note20,
    Note10,
    Note5,
    Note1,
    NoteHalf,
    NoteQuarter,
    Coin100,
    Coin50,
    Coin20,
    Coin10,
    Coin5,
}

impl Denomination {
    pub const ALL: [Self; 11] = [
        Self::Note20,
        Self::Note10,
        Self::Note5,
        Self::Note1,
        Self::NoteHalf,
        Self::NoteQuarter,
        Self::Coin100,
        Self::Coin50,
        Self::Coin20,
        Self::Coin10,
        Self::Coin5,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Note20 => "note_20",
            Self::Note10 => "note_10",
            Self::Note5 => "note_5",
            Self::Note1 => "note_1",
            Self::NoteHalf => "note_0_5",
            Self::NoteQuarter => "note_0_25",
            Self::Coin100 => "coin_100",
            Self::Coin50 => "coin_50",
            Self::Coin20 => "coin_20",
            Self::Coin10 => "coin_10",
            Self::Coin5 => "coin_5",
        }
    }

    /// Face value in KWD. Coins are named in fils.
    #[must_use]
    pub fn face_value(self) -> Decimal {
        match self {
            Self::Note20 => Decimal::new(20, 0),
            Self::Note10 => Decimal::new(10, 0),
            Self::Note5 => Decimal::new(5, 0),
            Self::Note1 => Decimal::ONE,
            Self::NoteHalf => Decimal::new(5, 1),
            Self::NoteQuarter => Decimal::new(25, 2),
            Self::Coin100 => Decimal::new(100, 3),
            Self::Coin50 => Decimal::new(50, 3),
            Self::Coin20 => Decimal::new(20, 3),
            Self::Coin10 => Decimal::new(10, 3),
            Self::Coin5 => Decimal::new(5, 3),
        }
    }
}

/// Note and coin counts of one box collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenominationCounts {
    pub note_20: i32,
    pub note_10: i32,
    pub note_5: i32,
    pub note_1: i32,
    pub note_0_5: i32,
    pub note_0_25: i32,
    pub coin_100: i32,
    pub coin_50: i32,
    pub coin_20: i32,
    pub coin_10: i32,
    pub coin_5: i32,
}

impl DenominationCounts {
    #[must_use]
    pub const fn count(&self, denomination: Denomination) -> i32 {
        match denomination {
            Denomination::Note20 => self.note_20,
            Denomination::Note10 => self.note_10,
            Denomination::Note5 => self.note_5,
            Denomination::Note1 => self.note_1,
            Denomination::NoteHalf => self.note_0_5,
            Denomination::NoteQuarter => self.note_0_25,
            Denomination::Coin100 => self.coin_100,
            Denomination::Coin50 => self.coin_50,
            Denomination::Coin20 => self.coin_20,
            Denomination::Coin10 => self.coin_10,
            Denomination::Coin5 => self.coin_5,
        }
    }

    /// First denomination with a negative count, if any.
    #[must_use]
    pub fn first_negative(&self) -> Option<Denomination> {
        Denomination::ALL.into_iter().find(|d| self.count(*d) < 0)
    }

    /// Unrounded total in KWD.
    #[must_use]
    pub fn total(&self) -> Decimal {
        Denomination::ALL
            .into_iter()
            .map(|d| Decimal::from(self.count(d)) * d.face_value())
            .sum()
    }

    #[must_use]
    pub fn total_fils(&self) -> i64 {
        to_fils(self.total()).unwrap_or(i64::MAX)
    }
}

/// Round to 3 places and pin the scale so `30.3` renders as `30.300`.
#[must_use]
pub fn present(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(3);
    rounded
}

#[must_use]
pub fn from_fils(fils: i64) -> Decimal {
    Decimal::new(fils, 3)
}

/// Exact conversion; `None` when the amount has sub-fils precision or overflows.
#[must_use]
pub fn to_fils(amount: Decimal) -> Option<i64> {
    let scaled = amount.checked_mul(Decimal::from(FILS_PER_DINAR))?;
    if !scaled.fract().is_zero() {
        return None;
    }
    scaled.to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_mixed_notes_and_coins() {
        let counts = DenominationCounts {
            note_20: 1,
            note_5: 2,
            coin_100: 3,
            ..Default::default()
        };

        assert_eq!(counts.total(), Decimal::new(303, 1));
        assert_eq!(present(counts.total()).to_string(), "30.300");
        assert_eq!(counts.total_fils(), 30_300);
    }

    #[test]
    fn test_total_is_exact_for_small_coins() {
        // 0.1 + 0.2 style sums must not drift
        let counts = DenominationCounts {
            coin_5: 3,
            coin_10: 7,
            note_0_25: 1,
            ..Default::default()
        };

        assert_eq!(present(counts.total()).to_string(), "0.335");
    }

    #[test]
    fn test_empty_counts_total_zero() {
        assert_eq!(present(DenominationCounts::default().total()).to_string(), "0.000");
    }

    #[test]
    fn test_first_negative() {
        let counts = DenominationCounts {
            coin_50: -1,
            ..Default::default()
        };
        assert_eq!(counts.first_negative(), Some(Denomination::Coin50));
        assert_eq!(Denomination::Coin50.key(), "coin_50");
    }

    #[test]
    fn test_fils_conversion() {
        assert_eq!(to_fils(Decimal::new(12_5, 1)), Some(12_500));
        assert_eq!(to_fils(Decimal::new(1_0005, 4)), None);
        assert_eq!(from_fils(12_500).to_string(), "12.500");
    }

    #[test]
    fn test_present_rounds_half_away_from_zero() {
        assert_eq!(present(Decimal::new(1_2345, 4)).to_string(), "1.235");
    }
}
