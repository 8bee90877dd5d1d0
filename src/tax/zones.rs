use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::TaxError;

/// Urban zoning code with its TNB rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneTariff {
    pub code: &'static str,
    pub label: &'static str,
    /// DH per square meter
    pub rate: Decimal,
}

pub const ZONE_TARIFFS: [ZoneTariff; 7] = [
    ZoneTariff { code: "R1", label: "Résidentiel dense", rate: dec!(10) },
    ZoneTariff { code: "R2", label: "Résidentiel moyen", rate: dec!(8) },
    ZoneTariff { code: "R3", label: "Résidentiel villas", rate: dec!(6) },
    ZoneTariff { code: "R4", label: "Résidentiel périphérique", rate: dec!(4) },
    ZoneTariff { code: "I1", label: "Industriel", rate: dec!(5) },
    ZoneTariff { code: "C1", label: "Commercial", rate: dec!(15) },
    ZoneTariff { code: "A1", label: "Zone d'aménagement futur", rate: dec!(2) },
];

pub fn zone(code: &str) -> Option<&'static ZoneTariff> {
    let code = code.trim();
    ZONE_TARIFFS.iter().find(|z| z.code.eq_ignore_ascii_case(code))
}

pub fn tariff_for_zone(code: &str) -> Result<Decimal, TaxError> {
    zone(code)
        .map(|z| z.rate)
        .ok_or_else(|| TaxError::UnknownZone(code.to_string()))
}

/// Exemption codes shown on fiscal documents. Any code other than `none`
/// exempts, listed or not.
pub const EXEMPTIONS: [(&str, &str); 6] = [
    ("1", "Terrain appartenant à l'État ou aux collectivités"),
    ("2", "Terrain affecté à l'exploitation agricole"),
    ("3", "Terrain situé hors périmètre urbain"),
    ("4", "Terrain objet d'une autorisation de construire"),
    ("5", "Terrain appartenant à une association d'utilité publique"),
    ("6", "Exonération temporaire (lotissement en cours)"),
];

pub fn exemption_label(code: &str) -> Option<&'static str> {
    EXEMPTIONS
        .iter()
        .find(|(c, _)| *c == code.trim())
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(tariff_for_zone("r1").unwrap(), dec!(10));
        assert_eq!(tariff_for_zone(" C1 ").unwrap(), dec!(15));
    }

    #[test]
    fn unknown_zone_is_an_error() {
        assert!(matches!(tariff_for_zone("Z9"), Err(TaxError::UnknownZone(z)) if z == "Z9"));
    }

    #[test]
    fn zone_codes_are_unique() {
        for (i, a) in ZONE_TARIFFS.iter().enumerate() {
            for b in &ZONE_TARIFFS[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }

    #[test]
    fn exemption_labels() {
        assert!(exemption_label("3").is_some());
        assert!(exemption_label("none").is_none());
    }
}
