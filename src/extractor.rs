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

//! Transaction extraction from raw CSV rows.
//!
//! A bank export row is an ordered sequence of text cells. Extraction
//! applies a caller-supplied [`ColumnMap`] to pull the date, amount, and
//! description out of a row and normalize them into a [`Transaction`].
//! Rows that carry no positive amount are not errors; they are skipped
//! (`Ok(None)`), because exports routinely mix credits, refunds, and
//! informational lines into the same file.

use crate::error::ExpenseError;
use crate::money::{Currency, Money};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Column indices locating the three modeled fields in a raw row.
///
/// Participant flag columns are not part of this map; they are read later
/// from the raw row via `Transaction::source_row_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub amount: usize,
    pub description: usize,
}

/// A normalized transaction ready for splitting.
///
/// # Invariants
///
/// - `amount` is strictly positive (non-positive rows never extract).
/// - `source_row_index` is the row's position in the input sequence and
///   is unique per extraction; it is the sole link back to raw cells not
///   otherwise modeled (the participant opt-in flags).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction date, normalized to UTC.
    pub date: DateTime<Utc>,
    /// Total cost fronted by the payer.
    pub amount: Money,
    /// Description with whitespace runs collapsed to single spaces.
    pub description: String,
    /// Zero-based index of the source row.
    pub source_row_index: usize,
}

/// Reads the cell at `column`, failing when the row is too short.
pub(crate) fn cell<'a>(row: &'a [String], column: usize) -> Result<&'a str, ExpenseError> {
    row.get(column)
        .map(String::as_str)
        .ok_or(ExpenseError::RowShape {
            column,
            len: row.len(),
        })
}

/// Collapses every whitespace run (spaces, tabs, newlines) to one ASCII
/// space and trims the ends. Multi-line bank descriptions would otherwise
/// corrupt downstream tabular display and the wire encoding.
fn normalize_description(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a date cell against the configured source format.
///
/// The format must match exactly; there is no inference. Formats without
/// a time component (the common case for bank exports, e.g. `%d/%m/%Y`)
/// normalize to midnight UTC.
fn parse_date(value: &str, format: &str) -> Result<DateTime<Utc>, ExpenseError> {
    let trimmed = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ExpenseError::MalformedDate {
            value: value.to_string(),
            format: format.to_string(),
        })
}

/// Extracts one row into a [`Transaction`].
///
/// Returns `Ok(None)` when the row should be excluded: the amount cell is
/// empty, or parses to a value ≤ 0 (a credit or refund, never silently
/// treated as a cost).
///
/// # Errors
///
/// - [`ExpenseError::RowShape`]: a mapped column is out of range.
/// - [`ExpenseError::MalformedAmount`]: non-numeric amount content.
/// - [`ExpenseError::MalformedDate`]: date cell does not match `date_format`.
pub fn extract_row(
    row: &[String],
    index: usize,
    columns: &ColumnMap,
    date_format: &str,
    currency: Currency,
) -> Result<Option<Transaction>, ExpenseError> {
    let amount_cell = cell(row, columns.amount)?;
    if amount_cell.trim().is_empty() {
        return Ok(None);
    }

    let amount = Money::parse(amount_cell, currency)?;
    if !amount.is_positive() {
        return Ok(None);
    }

    let date = parse_date(cell(row, columns.date)?, date_format)?;
    let description = normalize_description(cell(row, columns.description)?);

    Ok(Some(Transaction {
        date,
        amount,
        description,
        source_row_index: index,
    }))
}
