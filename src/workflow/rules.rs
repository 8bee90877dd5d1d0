use serde::Serialize;
use std::fmt;

use crate::domain::{Parcel, Role, ValidationState};

/// Named business rule checked before a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    ReferenceFonciereRequired,
    SurfaceImposableRequired,
    ProprietairesRequired,
    QuotePartsSumValid,
    GeometryValid,
    MontantTnbComputed,
}

impl ValidationRule {
    pub fn name(&self) -> &'static str {
        match self {
            ValidationRule::ReferenceFonciereRequired => "reference_fonciere_required",
            ValidationRule::SurfaceImposableRequired => "surface_imposable_required",
            ValidationRule::ProprietairesRequired => "proprietaires_required",
            ValidationRule::QuotePartsSumValid => "quote_parts_sum_valid",
            ValidationRule::GeometryValid => "geometry_valid",
            ValidationRule::MontantTnbComputed => "montant_tnb_computed",
        }
    }

    /// Evaluates the rule; `Some(message)` on failure.
    pub fn check(&self, parcel: &Parcel) -> Option<String> {
        match self {
            ValidationRule::ReferenceFonciereRequired => parcel
                .reference
                .trim()
                .is_empty()
                .then(|| "La référence foncière est obligatoire".to_string()),
            ValidationRule::SurfaceImposableRequired => (parcel.taxable_surface <= rust_decimal::Decimal::ZERO)
                .then(|| "La surface imposable doit être supérieure à 0".to_string()),
            ValidationRule::ProprietairesRequired => parcel
                .owners
                .is_empty()
                .then(|| "Au moins un propriétaire est requis".to_string()),
            ValidationRule::QuotePartsSumValid => {
                let summary = parcel.quota_summary();
                (!summary.is_valid).then(|| {
                    format!(
                        "La somme des quotes-parts doit être égale à 1 (actuellement {})",
                        summary.sum.normalize()
                    )
                })
            }
            ValidationRule::GeometryValid => match &parcel.geometry {
                None => Some("La géométrie est obligatoire".to_string()),
                Some(g) if g.kind != "Polygon" => {
                    Some(format!("La géométrie doit être un Polygon (reçu {})", g.kind))
                }
                Some(g) if g.exterior().len() < 4 => {
                    Some("Le polygone doit contenir au moins 4 points".to_string())
                }
                Some(g) if !g.is_closed() => Some("Le polygone doit être fermé".to_string()),
                Some(_) => None,
            },
            ValidationRule::MontantTnbComputed => (!parcel.is_exempted()
                && parcel.tnb_amount <= rust_decimal::Decimal::ZERO)
                .then(|| "Le montant TNB doit être calculé avant publication".to_string()),
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One permitted edge of the validation workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionRule {
    pub from: ValidationState,
    pub to: ValidationState,
    pub allowed_roles: &'static [Role],
    pub validations: &'static [ValidationRule],
}

impl TransitionRule {
    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }
}

pub const TRANSITIONS: [TransitionRule; 5] = [
    TransitionRule {
        from: ValidationState::Draft,
        to: ValidationState::Validated,
        allowed_roles: &[Role::Admin, Role::TaxAgent, Role::GisTechnician],
        validations: &[
            ValidationRule::ReferenceFonciereRequired,
            ValidationRule::SurfaceImposableRequired,
            ValidationRule::ProprietairesRequired,
            ValidationRule::QuotePartsSumValid,
            ValidationRule::GeometryValid,
        ],
    },
    TransitionRule {
        from: ValidationState::Validated,
        to: ValidationState::Published,
        allowed_roles: &[Role::Admin, Role::TaxAgent],
        validations: &[
            ValidationRule::SurfaceImposableRequired,
            ValidationRule::ProprietairesRequired,
            ValidationRule::QuotePartsSumValid,
            ValidationRule::MontantTnbComputed,
        ],
    },
    TransitionRule {
        from: ValidationState::Validated,
        to: ValidationState::Draft,
        allowed_roles: &[Role::Admin, Role::TaxAgent],
        validations: &[],
    },
    TransitionRule {
        from: ValidationState::Published,
        to: ValidationState::Archived,
        allowed_roles: &[Role::Admin],
        validations: &[],
    },
    TransitionRule {
        from: ValidationState::Published,
        to: ValidationState::Validated,
        allowed_roles: &[Role::Admin],
        validations: &[],
    },
];

pub fn find_rule(from: ValidationState, to: ValidationState) -> Option<&'static TransitionRule> {
    TRANSITIONS.iter().find(|r| r.from == from && r.to == to)
}

/// States reachable from `from` by `role` through the table.
pub fn next_states(from: ValidationState, role: Role) -> Vec<ValidationState> {
    TRANSITIONS
        .iter()
        .filter(|r| r.from == from && r.allows(role))
        .map(|r| r.to)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Geometry;
    use rust_decimal_macros::dec;

    #[test]
    fn table_has_no_duplicate_edges() {
        for (i, a) in TRANSITIONS.iter().enumerate() {
            for b in &TRANSITIONS[i + 1..] {
                assert!(!(a.from == b.from && a.to == b.to));
            }
        }
    }

    #[test]
    fn archived_has_no_outgoing_rule() {
        for role in Role::ALL {
            assert!(next_states(ValidationState::Archived, role).is_empty());
        }
    }

    #[test]
    fn geometry_rule_boundaries() {
        let mut parcel = Parcel::draft("TF-1", "R1", dec!(10));
        let rule = ValidationRule::GeometryValid;

        parcel.geometry = Some(Geometry::polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]));
        assert_eq!(rule.check(&parcel), None);

        parcel.geometry = Some(Geometry::polygon(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]));
        assert!(rule.check(&parcel).unwrap().contains("4 points"));

        parcel.geometry = Some(Geometry::polygon(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]));
        assert!(rule.check(&parcel).unwrap().contains("fermé"));
    }

    #[test]
    fn quota_rule_reports_sum() {
        let mut parcel = Parcel::draft("TF-1", "R1", dec!(10));
        parcel.owners = vec![
            crate::domain::OwnerShare::new(1, "A", dec!(0.5)),
            crate::domain::OwnerShare::new(2, "B", dec!(0.3)),
            crate::domain::OwnerShare::new(3, "C", dec!(0.1)),
        ];
        let message = ValidationRule::QuotePartsSumValid.check(&parcel).unwrap();
        assert!(message.contains("0.9"), "{message}");
    }
}
