//! Currency amounts in words and Brazilian real formatting.

use crate::error::{DocumentError, Result};
use crate::numerals::spell_number;
use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Names of a two-tier currency, used to pick singular/plural forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Currency {
    pub unit_singular: &'static str,
    pub unit_plural: &'static str,
    pub subunit_singular: &'static str,
    pub subunit_plural: &'static str,
}

pub const BRAZILIAN_REAL: Currency = Currency {
    unit_singular: "real",
    unit_plural: "reais",
    subunit_singular: "centavo",
    subunit_plural: "centavos",
};

/// A value split into whole units and cents, cents always in `0..=99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub negative: bool,
    pub whole: u64,
    pub cents: u8,
}

impl MonetaryAmount {
    /// Splits `value` into whole units and cents, rounding the cents half-up.
    ///
    /// Cents that round up to 100 carry into the whole part, so `19.995`
    /// becomes 20 units and 0 cents.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        let abs = value.abs();
        let whole_part = abs.trunc();
        let mut whole = whole_part
            .to_u64()
            .ok_or_else(|| DocumentError::InvalidAmount(value.to_string()))?;

        let mut cents = ((abs - whole_part) * Decimal::new(100, 0))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u8()
            .unwrap_or(0);

        if cents == 100 {
            whole = whole
                .checked_add(1)
                .ok_or_else(|| DocumentError::InvalidAmount(value.to_string()))?;
            cents = 0;
        }

        Ok(Self {
            negative: value.is_sign_negative() && (whole > 0 || cents > 0),
            whole,
            cents,
        })
    }

    /// Converts through the shortest decimal text of `value`, so `19.995`
    /// is read as written rather than as its binary approximation.
    pub fn from_f64(value: f64) -> Result<Self> {
        let decimal: Decimal = value
            .to_string()
            .parse()
            .map_err(|_| DocumentError::InvalidAmount(value.to_string()))?;
        Self::from_decimal(decimal)
    }
}

impl Currency {
    /// Spells an amount, e.g. `"mil duzentos e trinta e quatro reais e cinquenta e seis centavos"`.
    /// The result is lower case; see [`spell_amount`] for the capitalized form.
    pub fn spell(&self, amount: &MonetaryAmount) -> Result<String> {
        let mut phrase = match amount.whole {
            0 => format!("zero {}", self.unit_plural),
            1 => format!("um {}", self.unit_singular),
            n => format!("{} {}", spell_number(n)?, self.unit_plural),
        };

        match amount.cents {
            0 => {}
            1 => phrase.push_str(&format!(" e um {}", self.subunit_singular)),
            n => phrase.push_str(&format!(
                " e {} {}",
                spell_number(u64::from(n))?,
                self.subunit_plural
            )),
        }

        if amount.negative {
            phrase = format!("menos {}", phrase);
        }

        Ok(phrase)
    }
}

/// Spells a real amount with the first letter capitalized:
/// `1234.56` -> `"Mil duzentos e trinta e quatro reais e cinquenta e seis centavos"`.
pub fn spell_amount(value: Decimal) -> Result<String> {
    let amount = MonetaryAmount::from_decimal(value)?;
    Ok(capitalize_first(&BRAZILIAN_REAL.spell(&amount)?))
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parses amounts typed as `"1.234,56"`, `"1234,56"`, `"1234.56"` or `"R$ 300,00"`.
///
/// When a comma is present it is the decimal separator and dots are
/// thousands separators; otherwise a dot is the decimal separator.
/// Anything unparseable yields zero.
pub fn parse_brl_amount(input: &str) -> Decimal {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return Decimal::ZERO;
    }

    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };

    match normalized.parse::<Decimal>() {
        Ok(value) => value,
        Err(_) => {
            warn!("Could not parse amount '{}', using 0,00", input);
            Decimal::ZERO
        }
    }
}

/// Formats `1234.56` as `"1.234,56"`.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let mut magnitude = rounded.abs();
    magnitude.rescale(2);
    let text = magnitude.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, grouped, frac_part)
}
