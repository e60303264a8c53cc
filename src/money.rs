// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Exact monetary values tagged with a currency.
//!
//! Amounts are [`rust_decimal::Decimal`] values, never binary floats, so
//! repeated arithmetic cannot accumulate rounding error. Every [`Money`]
//! is a whole number of its currency's minor units (cents for a
//! two-decimal currency); sub-minor precision is rejected at construction
//! because it cannot be divided exactly.
//!
//! # Example
//!
//! ```
//! use groupsplit_rs::{Currency, Money};
//! use rust_decimal_macros::dec;
//!
//! let usd = Currency::new("USD").unwrap();
//! let price = Money::new(dec!(12.50), usd).unwrap();
//! assert_eq!(price.minor_units(), 1250);
//! assert_eq!(price.to_string(), "12.50");
//! ```

use crate::error::ExpenseError;
use rust_decimal::Decimal;
use std::fmt;

/// An ISO 4217-style currency: a 3-letter code plus its minor-unit
/// exponent (number of decimal places).
///
/// The exponent is looked up from a static exception table: most
/// currencies use 2 decimal places, a handful (JPY, KRW, ...) use 0 and a
/// handful (BHD, KWD, ...) use 3. Nothing here hardcodes cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    code: [u8; 3],
    exponent: u32,
}

/// Minor-unit exponents that differ from the default of 2.
fn exponent_for(code: &str) -> u32 {
    match code {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF"
        | "UGX" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

impl Currency {
    /// Parses a currency code.
    ///
    /// Accepts exactly three ASCII letters (case-insensitive, surrounding
    /// whitespace ignored) and normalizes to uppercase.
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::InvalidCurrency`] for anything else.
    pub fn new(code: &str) -> Result<Self, ExpenseError> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ExpenseError::InvalidCurrency(code.to_string()));
        }
        let upper = trimmed.to_ascii_uppercase();
        let mut bytes = [0u8; 3];
        bytes.copy_from_slice(upper.as_bytes());
        Ok(Self {
            code: bytes,
            exponent: exponent_for(&upper),
        })
    }

    /// The 3-letter uppercase code.
    pub fn code(&self) -> &str {
        // Constructor guarantees valid ASCII.
        std::str::from_utf8(&self.code).unwrap_or_default()
    }

    /// Number of decimal places in the minor unit (0, 2, or 3).
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// One minor unit as a decimal (e.g. `0.01` for USD, `1` for JPY).
    pub fn minor_unit(&self) -> Decimal {
        Decimal::new(1, self.exponent)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An exact decimal amount in a specific currency.
///
/// Invariant: the amount is a whole multiple of the currency's minor unit.
/// All arithmetic is same-currency and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Wraps a decimal amount in a currency.
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::MalformedAmount`] if the amount has more
    /// decimal places than the currency's minor unit; such a value could
    /// not be split into minor-unit increments without losing money.
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, ExpenseError> {
        if amount.normalize().scale() > currency.exponent() {
            return Err(ExpenseError::MalformedAmount {
                value: amount.to_string(),
                currency: currency.code().to_string(),
            });
        }
        Ok(Self { amount, currency })
    }

    /// Parses a decimal string (e.g. an amount cell from a CSV export).
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::MalformedAmount`] on non-numeric content or
    /// sub-minor-unit precision.
    pub fn parse(value: &str, currency: Currency) -> Result<Self, ExpenseError> {
        let amount: Decimal =
            value.trim().parse().map_err(|_| ExpenseError::MalformedAmount {
                value: value.to_string(),
                currency: currency.code().to_string(),
            })?;
        Self::new(amount, currency)
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Builds a value from a whole count of minor units.
    pub fn from_minor_units(units: i128, currency: Currency) -> Self {
        Self {
            amount: Decimal::from_i128_with_scale(units, currency.exponent()),
            currency,
        }
    }

    /// The amount as a whole count of minor units.
    pub fn minor_units(&self) -> i128 {
        // Lossless: construction rejects scale beyond the exponent.
        let mut scaled = self.amount;
        scaled.rescale(self.currency.exponent());
        scaled.mantissa()
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Same-currency addition.
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::CurrencyMismatch`] when the currencies differ.
    pub fn checked_add(&self, other: &Money) -> Result<Money, ExpenseError> {
        self.ensure_same_currency(other)?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// Same-currency subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::CurrencyMismatch`] when the currencies differ.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, ExpenseError> {
        self.ensure_same_currency(other)?;
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency,
        })
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), ExpenseError> {
        if self.currency != other.currency {
            return Err(ExpenseError::CurrencyMismatch(
                self.currency.code().to_string(),
                other.currency.code().to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    /// Renders at the currency's minor-unit scale (`7.00`, not `7`),
    /// which is the stable wire form for monetary fields.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled = self.amount;
        scaled.rescale(self.currency.exponent());
        write!(f, "{}", scaled)
    }
}
