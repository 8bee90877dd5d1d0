use anyhow::Result;

use super::{connect, logged_in_user, Command};
use crate::api::{request_transition, ParcelFilter, TransitionRequestError, UiReaction};
use crate::config::GeoTnbConfig;
use crate::domain::ValidationState;
use crate::session::Session;

pub struct ParcelsCommand {
    pub config: GeoTnbConfig,
    pub filter: ParcelFilter,
}

impl Command for ParcelsCommand {
    async fn execute(&self) -> Result<()> {
        let client = connect(&self.config)?;
        let page = client.parcels.list(&self.filter).await?;

        println!(
            "{:<20} {:<6} {:>12} {:>12}  {}",
            "REFERENCE", "ZONE", "SURFACE", "TNB (DH)", "ETAT"
        );
        for parcel in &page.items {
            println!(
                "{:<20} {:<6} {:>12} {:>12.2}  {}",
                parcel.reference, parcel.zoning, parcel.taxable_surface, parcel.tnb_amount, parcel.validation_state
            );
        }
        println!();
        println!(
            "Page {}/{} - {} parcel(s)",
            page.page + 1,
            page.total_pages().max(1),
            page.total
        );
        Ok(())
    }
}

pub struct StatsCommand {
    pub config: GeoTnbConfig,
}

impl Command for StatsCommand {
    async fn execute(&self) -> Result<()> {
        let client = connect(&self.config)?;
        let stats = client.dashboard.stats().await?;

        println!("📊 GEOTNB DASHBOARD");
        println!("   Parcels: {}", stats.total_parcels);
        for (state, count) in &stats.parcels_by_state {
            println!("     {state}: {count}");
        }
        println!("   Exempted: {}", stats.exempted_parcels);
        println!("   Owners: {}", stats.total_owners);
        println!("   Taxable surface: {} m²", stats.total_surface);
        println!("   Total TNB: {:.2} DH", stats.total_tnb);
        Ok(())
    }
}

pub struct RequestTransitionCommand {
    pub config: GeoTnbConfig,
    pub id: u64,
    pub to: ValidationState,
    pub comment: Option<String>,
}

impl Command for RequestTransitionCommand {
    async fn execute(&self) -> Result<()> {
        let client = connect(&self.config)?;
        let user = logged_in_user(&client)?;
        let session = Session::new();
        session.login(user.clone());

        match request_transition(&client, &user, self.id, self.to, self.comment.clone()).await {
            Ok(parcel) => {
                println!("✅ {} is now {}", parcel.reference, parcel.validation_state.label());
                Ok(())
            }
            Err(TransitionRequestError::Api(err)) => {
                if session.report_error(&err) == UiReaction::ForceLogout {
                    // expired token: drop it so the next command asks for a login
                    client.auth.clear_local()?;
                }
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}
