// Property-based tests for the transition table, quota sums and the tax calculator

use geotnb::domain::{quota_summary, Geometry, OwnerShare, Parcel, Permission, Role, ValidationState, permissions};
use geotnb::tax::{compute_tnb, round2};
use geotnb::workflow::{can_transition, find_rule, validate, ParcelWorkflow};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::TaxAgent),
        Just(Role::GisTechnician),
        Just(Role::Reader),
    ]
}

fn state_strategy() -> impl Strategy<Value = ValidationState> {
    prop_oneof![
        Just(ValidationState::Draft),
        Just(ValidationState::Validated),
        Just(ValidationState::Published),
        Just(ValidationState::Archived),
    ]
}

// Two decimal places, as quota shares are entered in the portal
fn share_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=100).prop_map(|n| Decimal::new(n, 2))
}

fn parcel_strategy() -> impl Strategy<Value = Parcel> {
    (
        state_strategy(),
        prop::collection::vec(share_strategy(), 0..4),
        0i64..2000,
        any::<bool>(),
    )
        .prop_map(|(state, shares, surface, with_geometry)| {
            let mut parcel = Parcel::draft("TF-PROP/1", "R2", Decimal::from(surface));
            parcel.validation_state = state;
            parcel.owners = shares
                .into_iter()
                .enumerate()
                .map(|(i, share)| OwnerShare::new(i as u64 + 1, format!("owner-{i}"), share))
                .collect();
            if with_geometry {
                parcel.geometry = Some(Geometry::polygon(vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 0.0]]));
            }
            parcel
        })
}

proptest! {
    #[test]
    fn allowed_transitions_come_from_the_table(
        from in state_strategy(),
        to in state_strategy(),
        role in role_strategy(),
    ) {
        let allowed = can_transition(from, to, role);
        let listed = find_rule(from, to).is_some_and(|rule| rule.allowed_roles.contains(&role));
        prop_assert_eq!(allowed, listed);
    }

    #[test]
    fn readers_and_archived_parcels_never_move(
        from in state_strategy(),
        to in state_strategy(),
        role in role_strategy(),
    ) {
        prop_assert!(!can_transition(from, to, Role::Reader));
        prop_assert!(!can_transition(ValidationState::Archived, to, role));
        prop_assert!(!can_transition(from, from, role));
    }

    #[test]
    fn every_role_is_bounded_by_admin(role in role_strategy()) {
        let admin = permissions(Role::Admin);
        prop_assert!(permissions(role).is_subset(&admin));
        prop_assert!(admin.contains(&Permission::AdminOverride));
    }

    #[test]
    fn quota_validity_matches_tolerance(shares in prop::collection::vec(share_strategy(), 0..6)) {
        let sum: Decimal = shares.iter().copied().sum();
        let summary = quota_summary(shares);
        prop_assert_eq!(summary.sum, sum);
        prop_assert_eq!(summary.is_valid, (sum - Decimal::ONE).abs() <= Decimal::new(1, 2));
    }

    #[test]
    fn validation_is_deterministic(parcel in parcel_strategy(), to in state_strategy()) {
        prop_assert_eq!(validate(&parcel, to), validate(&parcel, to));
    }

    #[test]
    fn refused_requests_leave_the_parcel_unchanged(
        parcel in parcel_strategy(),
        to in state_strategy(),
        role in role_strategy(),
    ) {
        let before = parcel.validation_state;
        let actor = geotnb::domain::User::new(9, "prop", role);
        let mut workflow = ParcelWorkflow::new(parcel);
        match workflow.request(to, &actor) {
            Ok(state) => prop_assert_eq!(state, to),
            Err(_) => prop_assert_eq!(workflow.parcel().validation_state, before),
        }
    }

    #[test]
    fn tnb_is_rounded_product_or_zero_when_exempted(
        surface in 1i64..1_000_000,
        tariff in 0i64..50,
        share in share_strategy(),
        exempted in any::<bool>(),
    ) {
        let surface = Decimal::new(surface, 1);
        let tariff = Decimal::from(tariff);
        let code = if exempted { "2" } else { "none" };

        let result = compute_tnb(surface, tariff, share, code).unwrap();
        prop_assert_eq!(result.is_exempted, exempted);
        if exempted {
            prop_assert_eq!(result.amount, Decimal::ZERO);
        } else {
            prop_assert_eq!(result.amount, round2(surface * tariff * share));
            prop_assert!(result.amount >= Decimal::ZERO);
        }
    }

    #[test]
    fn tnb_rejects_out_of_contract_inputs(surface in -1000i64..=0, share in 101i64..500) {
        prop_assert!(compute_tnb(Decimal::from(surface), Decimal::TEN, Decimal::ONE, "none").is_err());
        prop_assert!(compute_tnb(Decimal::TEN, Decimal::TEN, Decimal::new(share, 2), "none").is_err());
    }
}
