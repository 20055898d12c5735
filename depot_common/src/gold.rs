use std::{fmt::Display, iter::Sum, ops::Add};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

/// Number of cents in one gold unit.
pub const CENTS_PER_GOLD: i64 = 100;

//--------------------------------------        Gold         ---------------------------------------------------------
/// A signed amount of in-game gold, held as a whole number of hundredths so that balances compare exactly.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Gold(i64);

op!(binary Gold, Add, add);
op!(binary Gold, Sub, sub);
op!(inplace Gold, AddAssign, add_assign);
op!(inplace Gold, SubAssign, sub_assign);
op!(unary Gold, Neg, neg);

impl Sum for Gold {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as gold: {0}")]
pub struct GoldConversionError(String);

impl From<i64> for Gold {
    /// Interprets the value as a number of cents.
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl TryFrom<f64> for Gold {
    type Error = GoldConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::try_from_f64(value)
    }
}

impl Display for Gold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let cents_per_gold = CENTS_PER_GOLD.unsigned_abs();
        write!(f, "{sign}{}.{:02}g", abs / cents_per_gold, abs % cents_per_gold)
    }
}

impl Gold {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_gold(gold: i64) -> Self {
        Self(gold * CENTS_PER_GOLD)
    }

    /// Converts a balance reported as a floating point number of gold, rounding to the nearest cent.
    pub fn try_from_f64(gold: f64) -> Result<Self, GoldConversionError> {
        if !gold.is_finite() {
            return Err(GoldConversionError(format!("{gold} is not a finite number")));
        }
        let cents = (gold * CENTS_PER_GOLD as f64).round();
        #[allow(clippy::cast_precision_loss)]
        if cents > i64::MAX as f64 || cents < i64::MIN as f64 {
            return Err(GoldConversionError(format!("{gold} is out of range")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(cents as i64))
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}
