use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;

const NAIRA_SYMBOL: &str = "₦";

//--------------------------------------        Kobo         ---------------------------------------------------------
/// An amount in the smallest Naira unit. 100 kobo make one Naira.
///
/// Paystack reports every amount in kobo, and the database stores the same integer, so the value never passes
/// through a floating point representation.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Kobo(i64);

impl From<i64> for Kobo {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Formats the amount as Naira with two decimal places, e.g. `₦5000.00`.
impl Display for Kobo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{NAIRA_SYMBOL}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Kobo {
    pub fn value(&self) -> i64 {
        self.0
    }
}
