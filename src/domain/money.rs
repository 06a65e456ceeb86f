//! Exact money and quantity types.
//!
//! Amounts are held as integer cents and quantities as integer thousandths,
//! so no value ever passes through floating point. Rounding happens in exactly
//! one place: [`LineAmount::total`] when a quantity is multiplied by a rate.
//!
//! Parsed amounts are capped at [`Money::MAX`]. With that cap and a `u32`
//! quantity a single rated total always fits in `i64`; adding totals together
//! is the only place that can overflow, so it goes through
//! [`Money::checked_add`].

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$?\s*(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d{1,2}))?$").expect("valid money pattern")
});

static QUANTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d{1,3}))?$").expect("valid quantity pattern"));

static EXTRA_DECIMALS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?\s*[\d,]+\.\d+$").expect("valid decimals pattern"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("'{0}' is not a valid number")]
    Invalid(String),

    #[error("'{0}' must not be negative")]
    Negative(String),

    #[error("'{value}' has more than {max} decimal places")]
    TooPrecise { value: String, max: u32 },

    #[error("'{0}' is too large (limit is $1,000,000,000.00)")]
    Overflow(String),
}

/// 金額，以「分」為單位的整數
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// 可接受的最大單筆金額 $1,000,000,000.00
    pub const MAX: Money = Money(100_000_000_000);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// quantity × rate，最後一步才四捨五入到分 (half-up)
    ///
    /// Saturates at the `i64` bounds; amounts within [`Money::MAX`] never
    /// reach them.
    pub fn times(self, quantity: Quantity) -> Money {
        let product = i128::from(self.0) * i128::from(quantity.thousandths());
        let rounded = if product >= 0 {
            (product + 500) / 1000
        } else {
            (product - 500) / 1000
        };
        match i64::try_from(rounded) {
            Ok(cents) => Money(cents),
            Err(_) if rounded < 0 => Money(i64::MIN),
            Err(_) => Money(i64::MAX),
        }
    }
}

impl FromStr for Money {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.starts_with('-') || text.starts_with("$-") || text.starts_with("($") {
            return Err(AmountError::Negative(text.to_string()));
        }

        let Some(caps) = MONEY_RE.captures(text) else {
            if EXTRA_DECIMALS_RE.is_match(text) {
                return Err(AmountError::TooPrecise {
                    value: text.to_string(),
                    max: 2,
                });
            }
            return Err(AmountError::Invalid(text.to_string()));
        };

        let whole: i64 = caps[1]
            .replace(',', "")
            .parse()
            .map_err(|_| AmountError::Overflow(text.to_string()))?;
        let fraction = match caps.get(2) {
            Some(m) if m.as_str().len() == 1 => m.as_str().parse::<i64>().unwrap_or(0) * 10,
            Some(m) => m.as_str().parse::<i64>().unwrap_or(0),
            None => 0,
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .map(Money)
            .filter(|amount| *amount <= Money::MAX)
            .ok_or_else(|| AmountError::Overflow(text.to_string()))
    }
}

impl TryFrom<String> for Money {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// 非負數量（例如滑翔機時數），以千分之一為單位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    pub const fn from_thousandths(thousandths: u32) -> Self {
        Self(thousandths)
    }

    pub fn thousandths(self) -> u32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for Quantity {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.starts_with('-') {
            return Err(AmountError::Negative(text.to_string()));
        }

        let Some(caps) = QUANTITY_RE.captures(text) else {
            let digits_only = text.replace('.', "");
            if text.matches('.').count() == 1 && digits_only.chars().all(|c| c.is_ascii_digit()) {
                return Err(AmountError::TooPrecise {
                    value: text.to_string(),
                    max: 3,
                });
            }
            return Err(AmountError::Invalid(text.to_string()));
        };

        let whole: u32 = caps[1]
            .parse()
            .map_err(|_| AmountError::Overflow(text.to_string()))?;
        let fraction = caps.get(2).map_or(0, |m| {
            let digits = m.as_str();
            let value: u32 = digits.parse().unwrap_or(0);
            value * 10u32.pow(3 - digits.len() as u32)
        });

        whole
            .checked_mul(1000)
            .and_then(|t| t.checked_add(fraction))
            .map(Quantity)
            .ok_or_else(|| AmountError::Overflow(text.to_string()))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 1000;
        let fraction = format!("{:03}", self.0 % 1000);
        let trimmed = fraction.trim_end_matches('0');
        if trimmed.is_empty() {
            write!(f, "{}.0", whole)
        } else {
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}

/// 一筆帳單明細的金額來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAmount {
    Flat(Money),
    Rated { quantity: Quantity, rate: Money },
}

impl LineAmount {
    pub fn total(&self) -> Money {
        match *self {
            LineAmount::Flat(amount) => amount,
            LineAmount::Rated { quantity, rate } => rate.times(quantity),
        }
    }
}
