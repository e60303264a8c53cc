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

//! Participant configuration and per-row opt-in resolution.
//!
//! Which participants share a given expense is encoded in the source rows
//! themselves: each configured participant owns one flag column, and a
//! cell matching the affirmative token opts that participant into the
//! row's cost. The column→user mapping is a configuration surface supplied
//! by the caller and kept in sync with the remote group's membership; it
//! is never embedded in the splitting logic.

use crate::base::UserId;
use crate::error::ExpenseError;
use crate::extractor::cell;
use serde::{Deserialize, Serialize};

/// Default affirmative token for opt-in flag cells.
pub const DEFAULT_OPT_IN: &str = "yes";

/// Ordered mapping from raw-row column index to remote user id.
///
/// Order matters: it defines remainder-distribution priority in the split
/// (after the payer), so two maps with the same entries in different
/// orders are different configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantMap {
    entries: Vec<(usize, UserId)>,
}

impl ParticipantMap {
    /// Builds a map from `(column, user)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::DuplicateColumn`] if the same column index
    /// appears twice; one flag cell cannot speak for two participants.
    pub fn new(entries: Vec<(usize, UserId)>) -> Result<Self, ExpenseError> {
        for (i, (column, _)) in entries.iter().enumerate() {
            if entries[..i].iter().any(|(c, _)| c == column) {
                return Err(ExpenseError::DuplicateColumn(*column));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(usize, UserId)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All mapped user ids, in map order.
    pub fn users(&self) -> impl Iterator<Item = UserId> + '_ {
        self.entries.iter().map(|(_, user)| *user)
    }
}

/// The participants who opted into one transaction, in map order.
///
/// Computed fresh per transaction from the raw row; never persisted. The
/// payer is not a member of this set; they are implicit in every split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveParticipantSet {
    members: Vec<UserId>,
}

impl ActiveParticipantSet {
    /// Reads each mapped flag cell and collects the users whose cell
    /// matches `opt_in` (case-insensitive, surrounding whitespace
    /// trimmed), preserving [`ParticipantMap`] order.
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::RowShape`] when the row is shorter than a
    /// mapped column requires.
    pub fn resolve(
        row: &[String],
        map: &ParticipantMap,
        opt_in: &str,
    ) -> Result<Self, ExpenseError> {
        let mut members = Vec::new();
        for (column, user) in map.entries() {
            let flag = cell(row, *column)?;
            if flag.trim().eq_ignore_ascii_case(opt_in) {
                members.push(*user);
            }
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[UserId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// One member of the remote group's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub name: String,
}

/// The external participant directory: the remote group's members.
///
/// Supplied by the caller (ultimately from the ledger service's group
/// listing); request building rejects any active participant missing from
/// it. Names are carried only for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Member>,
}

impl Roster {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    pub fn contains(&self, id: UserId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    pub fn name_of(&self, id: UserId) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.as_str())
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }
}
