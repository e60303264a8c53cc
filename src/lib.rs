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

//! # Groupsplit
//!
//! This library converts rows of a personal-finance CSV export into
//! shared-expense requests for a remote ledger service, dividing each
//! transaction's cost among a payer and a configurable set of
//! participants with no rounding leakage: the shares of every split sum
//! back to the original amount exactly, at the currency's minor-unit
//! granularity.
//!
//! ## Core Components
//!
//! - [`Money`] / [`Currency`]: exact decimal amounts, minor-unit aware
//! - [`extract_row`]: raw CSV row → normalized [`Transaction`]
//! - [`ActiveParticipantSet`]: per-row participant opt-in resolution
//! - [`split`] / [`allocate`]: the exact-division core
//! - [`ExpenseRequest`]: the flat parameter set for one creation call
//! - [`Generator`]: the sequential row-to-request pipeline
//!
//! ## Example
//!
//! ```
//! use groupsplit_rs::{
//!     ActiveParticipantSet, Currency, DEFAULT_OPT_IN, ExpenseRequest, GroupId, Member,
//!     ParticipantMap, Roster, Transaction, UserId, allocate, extract_row, ColumnMap,
//! };
//!
//! let currency = Currency::new("USD").unwrap();
//! let columns = ColumnMap { date: 0, amount: 2, description: 1 };
//! let row: Vec<String> = ["14/02/2024", "Coffee  and\nsnacks", "10.00", "yes", "yes"]
//!     .iter().map(|c| c.to_string()).collect();
//!
//! let tx = extract_row(&row, 0, &columns, "%d/%m/%Y", currency).unwrap().unwrap();
//! assert_eq!(tx.description, "Coffee and snacks");
//!
//! let map = ParticipantMap::new(vec![(3, UserId(200)), (4, UserId(300))]).unwrap();
//! let active = ActiveParticipantSet::resolve(&row, &map, DEFAULT_OPT_IN).unwrap();
//!
//! // Payer plus two participants: 10.00 splits 3.34 / 3.33 / 3.33.
//! let shares = allocate(tx.amount, &active).unwrap();
//! assert_eq!(shares.payer_share().to_string(), "3.34");
//! assert_eq!(shares.total(), tx.amount);
//! ```
//!
//! ## Boundaries
//!
//! Transport (OAuth signing, HTTP), interactive prompting, and preference
//! persistence are external collaborators. The pipeline here is pure and
//! strictly sequential; every request is reconstructible from its inputs,
//! so caller-level retries are safe.

pub mod base;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod money;
pub mod participants;
pub mod request;
pub mod split;

pub use base::{GroupId, UserId};
pub use error::{ExpenseError, RowError};
pub use extractor::{ColumnMap, Transaction, extract_row};
pub use generator::{Generator, Settings};
pub use money::{Currency, Money};
pub use participants::{ActiveParticipantSet, DEFAULT_OPT_IN, Member, ParticipantMap, Roster};
pub use request::{ExpenseRequest, UserShare};
pub use split::{SplitResult, allocate, split};
