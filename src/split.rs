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

//! Exact cost division among participants.
//!
//! All arithmetic happens on whole minor-unit quantities (integer division
//! and modulo on `i128`), never on floats, so the shares of any split sum
//! back to the original amount with no rounding drift, which is the one invariant
//! this crate exists to protect.
//!
//! # Example
//!
//! ```
//! use groupsplit_rs::{Currency, Money, split};
//! use rust_decimal_macros::dec;
//!
//! let usd = Currency::new("USD").unwrap();
//! let total = Money::new(dec!(10.00), usd).unwrap();
//! let (base, remainder) = split(total, 3).unwrap();
//! assert_eq!(base.to_string(), "3.33");
//! assert_eq!(remainder.to_string(), "0.01");
//! ```

use crate::base::UserId;
use crate::error::ExpenseError;
use crate::money::Money;
use crate::participants::ActiveParticipantSet;

/// Divides `amount` among `participant_count` people (payer included).
///
/// Returns `(base, remainder)` where `base` is the amount divided by the
/// count and truncated down to the currency's minor unit, and `remainder`
/// is what truncation left over: `base * count + remainder == amount`
/// exactly, with `0 <= remainder < count` minor units. The minor unit is
/// currency-aware: a JPY split truncates to whole yen, a KWD split to
/// thousandths.
///
/// # Errors
///
/// Returns [`ExpenseError::InvalidSplit`] when `participant_count < 1`.
pub fn split(amount: Money, participant_count: usize) -> Result<(Money, Money), ExpenseError> {
    if participant_count < 1 {
        return Err(ExpenseError::InvalidSplit(participant_count));
    }
    let currency = amount.currency();
    let units = amount.minor_units();
    let count = participant_count as i128;
    let base = units / count;
    let remainder = units % count;
    Ok((
        Money::from_minor_units(base, currency),
        Money::from_minor_units(remainder, currency),
    ))
}

/// The exact division of one transaction's cost.
///
/// # Invariants
///
/// - `payer_share + Σ participant_shares == amount`, exactly, at the
///   currency's minor-unit granularity.
/// - `participant_shares` preserves [`ActiveParticipantSet`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitResult {
    payer_share: Money,
    participant_shares: Vec<(UserId, Money)>,
}

impl SplitResult {
    /// Share of the cost the payer is responsible for.
    pub fn payer_share(&self) -> Money {
        self.payer_share
    }

    /// Each active participant's share, in set order.
    pub fn participant_shares(&self) -> &[(UserId, Money)] {
        &self.participant_shares
    }

    /// Sum of all shares. Equals the split amount by construction; kept
    /// as a method so callers can verify conservation themselves.
    pub fn total(&self) -> Money {
        let mut units = self.payer_share.minor_units();
        for (_, share) in &self.participant_shares {
            units += share.minor_units();
        }
        Money::from_minor_units(units, self.payer_share.currency())
    }
}

/// Splits `amount` between the payer and the active participants and
/// distributes the truncation remainder.
///
/// The remainder is handed out one minor-unit increment at a time: payer
/// first, then each active participant in set order, until exhausted.
/// Since the remainder is strictly less than the head count, nobody
/// receives more than one extra increment.
///
/// The payer-first, fixed-order tie-break is deliberate and deterministic.
/// It does not rotate across repeated transactions, so over many splits
/// the same people systematically absorb the extra increment, a known
/// fairness limitation, kept rather than silently rebalanced.
///
/// # Errors
///
/// Never fails for a well-formed input: the head count is
/// `participants.len() + 1`, which is at least 1 (a transaction with no
/// opted-in participants is simply carried entirely by the payer).
/// [`ExpenseError::InvalidSplit`] is propagated from [`split`] for
/// completeness.
pub fn allocate(
    amount: Money,
    participants: &ActiveParticipantSet,
) -> Result<SplitResult, ExpenseError> {
    let head_count = participants.len() + 1;
    let (base, remainder) = split(amount, head_count)?;

    let base_units = base.minor_units();
    let mut extra_units = remainder.minor_units();
    let currency = amount.currency();

    // Payer has priority 0 for the remainder.
    let payer_units = if extra_units > 0 {
        extra_units -= 1;
        base_units + 1
    } else {
        base_units
    };

    let participant_shares = participants
        .members()
        .iter()
        .map(|user| {
            let units = if extra_units > 0 {
                extra_units -= 1;
                base_units + 1
            } else {
                base_units
            };
            (*user, Money::from_minor_units(units, currency))
        })
        .collect::<Vec<_>>();

    let result = SplitResult {
        payer_share: Money::from_minor_units(payer_units, currency),
        participant_shares,
    };
    debug_assert_eq!(
        result.total(),
        amount,
        "shares must sum exactly to the split amount"
    );
    Ok(result)
}
