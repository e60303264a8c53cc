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

//! Property-based tests for the split calculator.
//!
//! These verify the exactness invariants for any positive amount, any
//! head count, and any participant ordering, including zero- and
//! three-decimal currencies.

use groupsplit_rs::{
    ActiveParticipantSet, Currency, DEFAULT_OPT_IN, Money, ParticipantMap, UserId, allocate,
    split,
};
use proptest::prelude::*;

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// One of the three minor-unit exponents in circulation.
fn arb_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::new("USD").unwrap()),
        Just(Currency::new("JPY").unwrap()),
        Just(Currency::new("KWD").unwrap()),
    ]
}

/// A positive amount as 1..=10_000_000 minor units of a random currency.
fn arb_amount() -> impl Strategy<Value = Money> {
    (arb_currency(), 1i128..=10_000_000i128)
        .prop_map(|(currency, units)| Money::from_minor_units(units, currency))
}

/// An active participant set of 0..=8 distinct users in random order.
fn arb_participants() -> impl Strategy<Value = ActiveParticipantSet> {
    prop::collection::hash_set(1u64..=1_000_000u64, 0..=8).prop_map(|ids| {
        let map = ParticipantMap::new(
            ids.into_iter()
                .enumerate()
                .map(|(column, id)| (column, UserId(id)))
                .collect(),
        )
        .expect("enumerated columns are unique");
        let row: Vec<String> = (0..map.len()).map(|_| "yes".to_string()).collect();
        ActiveParticipantSet::resolve(&row, &map, DEFAULT_OPT_IN).expect("row covers all columns")
    })
}

// =============================================================================
// Split Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// base * n + remainder reconstructs the amount exactly, and the
    /// remainder is strictly less than n minor units.
    #[test]
    fn split_is_exact(amount in arb_amount(), count in 1usize..=50) {
        let (base, remainder) = split(amount, count).unwrap();

        let reconstructed =
            base.minor_units() * count as i128 + remainder.minor_units();
        prop_assert_eq!(reconstructed, amount.minor_units());
        prop_assert!(remainder.minor_units() >= 0);
        prop_assert!(remainder.minor_units() < count as i128);
    }

    /// The payer's share plus every participant's share equals the amount
    /// exactly, for any participant ordering.
    #[test]
    fn allocation_conserves_the_amount(
        amount in arb_amount(),
        participants in arb_participants(),
    ) {
        let result = allocate(amount, &participants).unwrap();
        prop_assert_eq!(result.total(), amount);
    }

    /// No share deviates from the truncated base by more than one minor
    /// unit, and the payer absorbs the first spare unit.
    #[test]
    fn each_share_gets_at_most_one_extra_unit(
        amount in arb_amount(),
        participants in arb_participants(),
    ) {
        let head_count = participants.len() + 1;
        let (base, remainder) = split(amount, head_count).unwrap();
        let result = allocate(amount, &participants).unwrap();

        let base_units = base.minor_units();
        let spare = remainder.minor_units();

        let payer_extra = result.payer_share().minor_units() - base_units;
        prop_assert_eq!(payer_extra, i128::from(spare > 0));

        let mut handed_out = payer_extra;
        for (_, share) in result.participant_shares() {
            let extra = share.minor_units() - base_units;
            prop_assert!(extra == 0 || extra == 1);
            handed_out += extra;
        }
        prop_assert_eq!(handed_out, spare);
    }

    /// Earlier participants never receive less than later ones; the
    /// distribution is a prefix of the ordering.
    #[test]
    fn spare_units_go_to_a_prefix_of_the_ordering(
        amount in arb_amount(),
        participants in arb_participants(),
    ) {
        let result = allocate(amount, &participants).unwrap();
        let shares: Vec<i128> = result
            .participant_shares()
            .iter()
            .map(|(_, share)| share.minor_units())
            .collect();
        for pair in shares.windows(2) {
            prop_assert!(pair[0] >= pair[1]);
        }
    }

    /// Identical inputs produce bit-for-bit identical outputs.
    #[test]
    fn allocation_is_deterministic(
        amount in arb_amount(),
        participants in arb_participants(),
    ) {
        let a = allocate(amount, &participants).unwrap();
        let b = allocate(amount, &participants).unwrap();
        prop_assert_eq!(a, b);
    }

    /// A single payer always carries the whole amount.
    #[test]
    fn single_payer_boundary(amount in arb_amount()) {
        let (base, remainder) = split(amount, 1).unwrap();
        prop_assert_eq!(base, amount);
        prop_assert!(remainder.is_zero());
    }
}
