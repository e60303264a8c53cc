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

//! Sequential row-to-request pipeline.
//!
//! The [`Generator`] drives one transaction at a time through
//! extraction → participant resolution → splitting → request building.
//! Rows are processed strictly in order and every failure is local to its
//! row: a malformed record is reported and the next row proceeds. No
//! stage performs I/O or holds process-wide state, so a caller that does
//! not need the sequential ordering may fan the pure stages out freely.

use crate::base::{GroupId, UserId};
use crate::error::RowError;
use crate::extractor::{ColumnMap, Transaction, extract_row};
use crate::money::Currency;
use crate::participants::{ActiveParticipantSet, ParticipantMap, Roster};
use crate::request::ExpenseRequest;

/// Everything the pipeline needs to turn rows into requests.
///
/// All configuration is explicit values passed in by the caller: the
/// column mapping, date format, and participant map are preferences the
/// surrounding tool may persist, but the pipeline itself never reads or
/// writes them anywhere.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Where the date, amount, and description cells live.
    pub columns: ColumnMap,
    /// strftime-style format of the source date cells (e.g. `%d/%m/%Y`).
    pub date_format: String,
    /// Currency every amount in the export is denominated in.
    pub currency: Currency,
    /// Flag-column → user mapping; order sets remainder priority.
    pub participants: ParticipantMap,
    /// The user who fronted every cost in the export.
    pub payer: UserId,
    /// Target expense group in the remote service.
    pub group: GroupId,
    /// Affirmative token for opt-in flag cells.
    pub opt_in: String,
}

/// Turns raw CSV rows into expense-creation requests.
#[derive(Debug)]
pub struct Generator {
    settings: Settings,
    roster: Roster,
}

impl Generator {
    pub fn new(settings: Settings, roster: Roster) -> Self {
        Self { settings, roster }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Extracts every includable transaction from `rows`.
    ///
    /// Rows whose amount is empty or non-positive are excluded outright
    /// (they produce no entry). Malformed rows yield an `Err` carrying the
    /// row index and abort nothing else.
    pub fn transactions(&self, rows: &[Vec<String>]) -> Vec<Result<Transaction, RowError>> {
        rows.iter()
            .enumerate()
            .filter_map(|(index, row)| {
                extract_row(
                    row,
                    index,
                    &self.settings.columns,
                    &self.settings.date_format,
                    self.settings.currency,
                )
                .map_err(|e| RowError::new(index, e))
                .transpose()
            })
            .collect()
    }

    /// Builds the request for one extracted transaction.
    ///
    /// `rows` must be the same sequence the transaction was extracted
    /// from: the participant flags live in cells the [`Transaction`] does
    /// not model, reachable only through `source_row_index`.
    pub fn request(
        &self,
        transaction: &Transaction,
        rows: &[Vec<String>],
    ) -> Result<ExpenseRequest, RowError> {
        let index = transaction.source_row_index;
        let row = rows.get(index).map(Vec::as_slice).unwrap_or(&[]);

        let active = ActiveParticipantSet::resolve(row, &self.settings.participants, &self.settings.opt_in)
            .map_err(|e| RowError::new(index, e))?;

        ExpenseRequest::build(
            transaction,
            self.settings.payer,
            &active,
            self.settings.group,
            &self.roster,
        )
        .map_err(|e| RowError::new(index, e))
    }

    /// Runs the full pipeline with a caller-supplied include decision.
    ///
    /// `select` is invoked once per extracted transaction, in row order,
    /// and stands in for whatever decides inclusion: a human confirming
    /// each row, a script, or a test harness. Returning `false` skips the
    /// transaction locally; subsequent rows still process. Extraction
    /// failures pass through as errors without being offered to `select`.
    pub fn requests<F>(
        &self,
        rows: &[Vec<String>],
        mut select: F,
    ) -> Vec<Result<ExpenseRequest, RowError>>
    where
        F: FnMut(&Transaction) -> bool,
    {
        self.transactions(rows)
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(transaction) => {
                    if select(&transaction) {
                        Some(self.request(&transaction, rows))
                    } else {
                        None
                    }
                }
                Err(e) => Some(Err(e)),
            })
            .collect()
    }
}
