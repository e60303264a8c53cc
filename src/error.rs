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

//! Error types for expense extraction, splitting, and request building.

use crate::base::UserId;
use thiserror::Error;

/// Validation failures in the expense pipeline.
///
/// Every variant is a per-record outcome: a failure aborts processing of
/// the single offending transaction and nothing else. The pipeline never
/// auto-corrects ambiguous input (no date-format guessing, no treating a
/// negative amount as a refund) and never retries; these are pure
/// computations, so retry is meaningless.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpenseError {
    /// Date cell does not match the configured source format
    #[error("malformed date '{value}' (expected format '{format}')")]
    MalformedDate { value: String, format: String },

    /// Amount cell is not a decimal number, or carries more decimal
    /// places than the currency's minor unit allows
    #[error("malformed amount '{value}' for currency {currency}")]
    MalformedAmount { value: String, currency: String },

    /// A mapped column index lies beyond the end of the row
    #[error("row has {len} cells, mapped column {column} is out of range")]
    RowShape { column: usize, len: usize },

    /// Split requested over fewer than one participant
    #[error("cannot split between {0} people (need at least 1)")]
    InvalidSplit(usize),

    /// Active participant is missing from the group roster
    #[error("participant {0} has no entry in the group roster")]
    UnresolvedParticipant(UserId),

    /// Currency code is not three ASCII letters
    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),

    /// Arithmetic attempted across two different currencies
    #[error("currency mismatch: {0} vs {1}")]
    CurrencyMismatch(String, String),

    /// Same CSV column mapped to more than one participant
    #[error("column {0} is mapped to more than one participant")]
    DuplicateColumn(usize),
}

/// An [`ExpenseError`] tagged with the source row it occurred on.
///
/// Row indices are zero-based positions in the raw row sequence (after any
/// header row has been stripped), matching `Transaction::source_row_index`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {source}")]
pub struct RowError {
    pub row: usize,
    #[source]
    pub source: ExpenseError,
}

impl RowError {
    pub fn new(row: usize, source: ExpenseError) -> Self {
        Self { row, source }
    }
}
