use anyhow::{anyhow, Result};
use std::sync::Arc;

use crate::api::{FileTokenStore, GeoTnbClient};
use crate::config::GeoTnbConfig;
use crate::domain::User;

pub mod auth;
pub mod export;
pub mod parcels;
pub mod permissions;
pub mod tax;
pub mod workflow;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Backend client using the configured session file.
pub fn connect(config: &GeoTnbConfig) -> Result<GeoTnbClient> {
    let tokens = Arc::new(FileTokenStore::new(&config.auth.token_file));
    let client = GeoTnbClient::new(&config.api, tokens)?;
    tracing::debug!(base_url = %client.api().base_url(), "Backend client ready");
    Ok(client)
}

pub fn logged_in_user(client: &GeoTnbClient) -> Result<User> {
    client
        .auth
        .current_user()
        .ok_or_else(|| anyhow!("Not logged in. Run 'geotnb login' first"))
}

pub fn show_usage() -> Result<()> {
    println!("🗺️  GeoTNB - Taxe sur les Terrains Non Bâtis");
    println!();
    println!("Offline:");
    println!("  geotnb permissions [ROLE]      # Role permission table");
    println!("  geotnb transitions             # Validation workflow table");
    println!("  geotnb tnb --surface 500 --zone R1");
    println!("  geotnb validate --file parcelle.json --to Valide");
    println!();
    println!("Online:");
    println!("  geotnb login -u <username>     # Password from GEOTNB_PASSWORD or -p");
    println!("  geotnb parcels --state Brouillon");
    println!("  geotnb request-transition 42 --to Valide");
    Ok(())
}
