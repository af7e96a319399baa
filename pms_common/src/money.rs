use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const USD_CURRENCY_CODE: &str = "usd";

//--------------------------------------     UsdCents       ----------------------------------------------------------
/// A USD amount in minor units (cents). All marketplace prices are stored and transmitted to the payment processor
/// in this form.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct UsdCents(i64);

op!(binary UsdCents, Add, add);
op!(binary UsdCents, Sub, sub);
op!(inplace UsdCents, SubAssign, sub_assign);
op!(unary UsdCents, Neg, neg);

impl Mul<i64> for UsdCents {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for UsdCents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in US cents: {0}")]
pub struct MoneyConversionError(pub String);

impl From<i64> for UsdCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for UsdCents {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for UsdCents {}

impl Display for UsdCents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl UsdCents {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// Converts a decimal dollar amount, as it appears in a JSON document (e.g. `"19.99"`), into cents.
    ///
    /// The conversion is exact on the decimal representation. The whole part is multiplied by 100 and the first two
    /// fraction digits are added; any further fraction digits are truncated, never rounded. `19.99` becomes 1999 and
    /// `19.999` becomes 1999.
    pub fn from_decimal_str(price: &str) -> Result<Self, MoneyConversionError> {
        let price = price.trim();
        let negative = price.starts_with('-');
        let unsigned = price.trim_start_matches('-');
        let mut parts = unsigned.split('.');
        let whole = match parts.next() {
            Some("") => 0,
            Some(w) => w
                .parse::<i64>()
                .map_err(|e| MoneyConversionError(format!("Invalid price value: {price}. {e}.")))?,
            None => return Err(MoneyConversionError(format!("Invalid price value: {price}."))),
        };
        let frac = parts.next().unwrap_or("");
        if frac.chars().any(|c| !c.is_ascii_digit()) {
            return Err(MoneyConversionError(format!("Invalid price value: {price}.")));
        }
        let mut frac_digits = frac.chars().take(2).collect::<String>();
        while frac_digits.len() < 2 {
            frac_digits.push('0');
        }
        // frac_digits is now exactly two ascii digits
        let cents = frac_digits.parse::<i64>().map_err(|e| MoneyConversionError(format!("{price}: {e}")))?;
        let total = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(cents))
            .ok_or_else(|| MoneyConversionError(format!("Price is out of range: {price}.")))?;
        Ok(Self(if negative { -total } else { total }))
    }
}
