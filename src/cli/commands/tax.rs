use anyhow::Result;
use rust_decimal::Decimal;

use super::Command;
use crate::tax::{compute_tnb, exemption_label, tariff_for_zone, EXEMPTIONS, ZONE_TARIFFS};

pub struct TnbCommand {
    pub surface: Decimal,
    pub zone: Option<String>,
    pub tariff: Option<Decimal>,
    pub quota: Decimal,
    pub exemption: String,
}

impl Command for TnbCommand {
    async fn execute(&self) -> Result<()> {
        let tariff = match (self.tariff, &self.zone) {
            (Some(tariff), _) => tariff,
            (None, Some(zone)) => tariff_for_zone(zone)?,
            (None, None) => anyhow::bail!("Either --zone or --tariff is required"),
        };

        let result = compute_tnb(self.surface, tariff, self.quota, &self.exemption)?;
        if result.is_exempted {
            let label = exemption_label(&self.exemption).unwrap_or("exonération");
            println!("Exonéré ({label}) : 0.00 DH");
        } else {
            println!(
                "{} m² x {} DH/m² x {} = {:.2} DH",
                self.surface, tariff, self.quota, result.amount
            );
        }
        Ok(())
    }
}

pub struct ZonesCommand;

impl Command for ZonesCommand {
    async fn execute(&self) -> Result<()> {
        println!("📐 ZONE TARIFFS (DH/m²)");
        for zone in &ZONE_TARIFFS {
            println!("  {:<3} {:>4}  {}", zone.code, zone.rate, zone.label);
        }
        println!();
        println!("🏷️  EXEMPTIONS");
        for (code, label) in &EXEMPTIONS {
            println!("  {code}  {label}");
        }
        Ok(())
    }
}
