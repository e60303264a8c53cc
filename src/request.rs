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

//! Expense request construction and wire encoding.
//!
//! An [`ExpenseRequest`] is the flat parameter set one expense-creation
//! call to the remote ledger service expects. Building it is a pure data
//! transformation: the same transaction, participant set, and settings
//! always reconstruct the identical request, so a transport-level retry
//! can safely rebuild from inputs. Actually signing and sending the
//! request is the transport collaborator's job, not this crate's.
//!
//! The wire contract is the field set `payment`, `cost`, `description`,
//! `date`, `group_id`, `currency_code`, plus one
//! `users__{i}__user_id` / `users__{i}__paid_share` / `users__{i}__owed_share`
//! triple per involved user, with the payer always at index 0. Both the
//! query-string and JSON renditions emit exactly these names, in this
//! order.

use crate::base::{GroupId, UserId};
use crate::error::ExpenseError;
use crate::extractor::Transaction;
use crate::money::Money;
use crate::participants::{ActiveParticipantSet, Roster};
use crate::split::allocate;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One user's line in an expense request.
///
/// `paid_share` is money the user actually handed over; `owed_share` is
/// money the user is responsible for. For the payer these differ (paid =
/// full cost, owed = their fair share); for everyone else paid is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserShare {
    pub user_id: UserId,
    pub paid_share: Money,
    pub owed_share: Money,
}

/// A fully built expense-creation request.
///
/// # Invariants
///
/// - `users[0]` is the payer; active participants follow in set order.
/// - `Σ paid_share == Σ owed_share == cost`, exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRequest {
    cost: Money,
    description: String,
    date: DateTime<Utc>,
    group_id: GroupId,
    users: Vec<UserShare>,
}

impl ExpenseRequest {
    /// Builds the request for one transaction.
    ///
    /// The payer fronts the full cost (`paid_share` = total) and owes the
    /// payer share computed by [`allocate`]; each active participant owes
    /// their allocated share and paid nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ExpenseError::UnresolvedParticipant`] when the payer or
    /// an active participant has no entry in `roster`. Identifiers are
    /// checked against the caller-supplied directory only, never against
    /// the remote service itself.
    pub fn build(
        transaction: &Transaction,
        payer: UserId,
        participants: &ActiveParticipantSet,
        group_id: GroupId,
        roster: &Roster,
    ) -> Result<Self, ExpenseError> {
        if !roster.contains(payer) {
            return Err(ExpenseError::UnresolvedParticipant(payer));
        }
        for user in participants.members() {
            if !roster.contains(*user) {
                return Err(ExpenseError::UnresolvedParticipant(*user));
            }
        }

        let shares = allocate(transaction.amount, participants)?;
        let currency = transaction.amount.currency();

        let mut users = Vec::with_capacity(participants.len() + 1);
        users.push(UserShare {
            user_id: payer,
            paid_share: transaction.amount,
            owed_share: shares.payer_share(),
        });
        for (user, owed) in shares.participant_shares() {
            users.push(UserShare {
                user_id: *user,
                paid_share: Money::zero(currency),
                owed_share: *owed,
            });
        }

        Ok(Self {
            cost: transaction.amount,
            description: transaction.description.clone(),
            date: transaction.date,
            group_id,
            users,
        })
    }

    pub fn cost(&self) -> Money {
        self.cost
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// All involved users; index 0 is the payer.
    pub fn users(&self) -> &[UserShare] {
        &self.users
    }

    /// The wire fields as ordered `(name, value)` pairs.
    ///
    /// This is the stable contract any transport collaborator encodes;
    /// both [`Self::to_query_string`] and the `Serialize` impl are built
    /// on it. Monetary values render at the currency's minor-unit scale.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("payment".to_string(), "false".to_string()),
            ("cost".to_string(), self.cost.to_string()),
            ("description".to_string(), self.description.clone()),
            (
                "date".to_string(),
                self.date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            ),
            ("group_id".to_string(), self.group_id.to_string()),
            (
                "currency_code".to_string(),
                self.cost.currency().code().to_string(),
            ),
        ];
        for (i, user) in self.users.iter().enumerate() {
            pairs.push((format!("users__{i}__user_id"), user.user_id.to_string()));
            pairs.push((format!("users__{i}__paid_share"), user.paid_share.to_string()));
            pairs.push((format!("users__{i}__owed_share"), user.owed_share.to_string()));
        }
        pairs
    }

    /// Percent-encoded query string of [`Self::query_pairs`], ready to be
    /// appended to the expense-creation endpoint and signed.
    pub fn to_query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Serialize for ExpenseRequest {
    /// Serializes as a flat map of the wire fields, so the JSON rendition
    /// carries exactly the same names and values as the query string.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pairs = self.query_pairs();
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (key, value) in &pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::ExpenseRequest;
    use crate::base::{GroupId, UserId};
    use crate::error::ExpenseError;
    use crate::extractor::Transaction;
    use crate::money::{Currency, Money};
    use crate::participants::{
        ActiveParticipantSet, DEFAULT_OPT_IN, Member, ParticipantMap, Roster,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn transaction(amount: rust_decimal::Decimal) -> Transaction {
        Transaction {
            date: Utc.with_ymd_and_hms(2024, 2, 14, 0, 0, 0).unwrap(),
            amount: Money::new(amount, Currency::new("USD").unwrap()).unwrap(),
            description: "Coffee and snacks".to_string(),
            source_row_index: 0,
        }
    }

    fn active(users: &[u64]) -> ActiveParticipantSet {
        let map = ParticipantMap::new(
            users
                .iter()
                .enumerate()
                .map(|(i, u)| (i, UserId(*u)))
                .collect(),
        )
        .unwrap();
        let row: Vec<String> = users.iter().map(|_| "yes".to_string()).collect();
        ActiveParticipantSet::resolve(&row, &map, DEFAULT_OPT_IN).unwrap()
    }

    fn roster(ids: &[u64]) -> Roster {
        Roster::new(
            ids.iter()
                .map(|id| Member {
                    id: UserId(*id),
                    name: format!("user-{id}"),
                })
                .collect(),
        )
    }

    #[test]
    fn payer_is_index_zero_and_fronts_full_cost() {
        let request = ExpenseRequest::build(
            &transaction(dec!(10.00)),
            UserId(100),
            &active(&[200, 300]),
            GroupId(77),
            &roster(&[100, 200, 300]),
        )
        .unwrap();

        let users = request.users();
        assert_eq!(users[0].user_id, UserId(100));
        assert_eq!(users[0].paid_share.to_string(), "10.00");
        assert_eq!(users[0].owed_share.to_string(), "3.34");
        assert_eq!(users[1].paid_share.to_string(), "0.00");
        assert_eq!(users[1].owed_share.to_string(), "3.33");
        assert_eq!(users[2].owed_share.to_string(), "3.33");
    }

    #[test]
    fn paid_and_owed_each_sum_to_cost() {
        let request = ExpenseRequest::build(
            &transaction(dec!(20.03)),
            UserId(100),
            &active(&[200, 300]),
            GroupId(77),
            &roster(&[100, 200, 300]),
        )
        .unwrap();

        let paid: i128 = request.users().iter().map(|u| u.paid_share.minor_units()).sum();
        let owed: i128 = request.users().iter().map(|u| u.owed_share.minor_units()).sum();
        assert_eq!(paid, 2003);
        assert_eq!(owed, 2003);
    }

    #[test]
    fn unknown_participant_is_rejected() {
        let err = ExpenseRequest::build(
            &transaction(dec!(10.00)),
            UserId(100),
            &active(&[200, 999]),
            GroupId(77),
            &roster(&[100, 200]),
        )
        .unwrap_err();
        assert_eq!(err, ExpenseError::UnresolvedParticipant(UserId(999)));
    }

    #[test]
    fn unknown_payer_is_rejected() {
        let err = ExpenseRequest::build(
            &transaction(dec!(10.00)),
            UserId(5),
            &active(&[200]),
            GroupId(77),
            &roster(&[100, 200]),
        )
        .unwrap_err();
        assert_eq!(err, ExpenseError::UnresolvedParticipant(UserId(5)));
    }

    #[test]
    fn query_pairs_use_the_wire_field_names() {
        let request = ExpenseRequest::build(
            &transaction(dec!(21.00)),
            UserId(100),
            &active(&[200, 300]),
            GroupId(77),
            &roster(&[100, 200, 300]),
        )
        .unwrap();

        let pairs = request.query_pairs();
        let expected = [
            ("payment", "false"),
            ("cost", "21.00"),
            ("description", "Coffee and snacks"),
            ("date", "2024-02-14T00:00:00Z"),
            ("group_id", "77"),
            ("currency_code", "USD"),
            ("users__0__user_id", "100"),
            ("users__0__paid_share", "21.00"),
            ("users__0__owed_share", "7.00"),
            ("users__1__user_id", "200"),
            ("users__1__paid_share", "0.00"),
            ("users__1__owed_share", "7.00"),
            ("users__2__user_id", "300"),
            ("users__2__paid_share", "0.00"),
            ("users__2__owed_share", "7.00"),
        ];
        assert_eq!(pairs.len(), expected.len());
        for ((key, value), (want_key, want_value)) in pairs.iter().zip(expected) {
            assert_eq!(key, want_key);
            assert_eq!(value, want_value);
        }
    }

    #[test]
    fn query_string_percent_encodes_values() {
        let mut tx = transaction(dec!(5.00));
        tx.description = "fish & chips".to_string();
        let request = ExpenseRequest::build(
            &tx,
            UserId(100),
            &active(&[]),
            GroupId(77),
            &roster(&[100]),
        )
        .unwrap();

        let query = request.to_query_string();
        assert!(query.contains("description=fish%20%26%20chips"));
        assert!(query.contains("date=2024-02-14T00%3A00%3A00Z"));
        assert!(query.starts_with("payment=false&cost=5.00&"));
    }

    #[test]
    fn json_rendition_is_flat_with_wire_names() {
        let request = ExpenseRequest::build(
            &transaction(dec!(21.00)),
            UserId(100),
            &active(&[200]),
            GroupId(77),
            &roster(&[100, 200]),
        )
        .unwrap();

        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(json["cost"], "21.00");
        assert_eq!(json["currency_code"], "USD");
        assert_eq!(json["users__0__user_id"], "100");
        assert_eq!(json["users__1__owed_share"], "10.50");
        assert_eq!(json["payment"], "false");
    }
}
