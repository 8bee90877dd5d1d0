use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::domain::{Role, ValidationState};
use crate::export::ExportFormat;

pub mod commands;

#[derive(Parser)]
#[command(name = "geotnb")]
#[command(about = "GeoTNB fiscal core: permissions, validation workflow and TNB tax computation")]
#[command(long_about = "GeoTNB manages the Taxe sur les Terrains Non Bâtis. Offline commands evaluate the \
                       permission table, the validation workflow and the tax calculator; online commands talk \
                       to the GeoTNB backend configured in geotnb.toml or GEOTNB_API__BASE_URL.")]
pub struct Cli {
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the permissions granted to a role
    Permissions {
        /// Role wire name, e.g. AGENT_FISCAL (all roles when omitted)
        role: Option<String>,
    },
    /// Print the validation transition table
    Transitions,
    /// Check whether a role may move a parcel between two states
    CanTransition {
        #[arg(long)]
        from: ValidationState,
        #[arg(long)]
        to: ValidationState,
        #[arg(long)]
        role: Role,
    },
    /// Evaluate a parcel JSON file against the rules of a transition
    Validate {
        /// Parcel as returned by the backend
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        to: ValidationState,
        /// Also check that this role may perform the transition
        #[arg(long)]
        role: Option<Role>,
    },
    /// Compute the TNB for one share of a parcel
    Tnb {
        #[arg(long)]
        surface: Decimal,
        /// Zoning code used to look up the tariff
        #[arg(long, required_unless_present = "tariff")]
        zone: Option<String>,
        /// Explicit tariff in DH/m², overrides the zone table
        #[arg(long)]
        tariff: Option<Decimal>,
        #[arg(long, default_value = "1")]
        quota: Decimal,
        #[arg(long, default_value = "none")]
        exemption: String,
    },
    /// Print the zone tariff and exemption tables
    Zones,
    /// Export parcels as CSV or GeoJSON
    Export {
        /// Parcels JSON file; fetched from the backend when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Only parcels in this state
        #[arg(long)]
        state: Option<ValidationState>,
    },
    /// Log in to the backend and store the session
    Login {
        #[arg(long, short = 'u')]
        username: String,
        #[arg(long, short = 'p', env = "GEOTNB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the stored session
    Logout,
    /// List parcels from the backend
    Parcels {
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        zone: Option<String>,
        #[arg(long)]
        state: Option<ValidationState>,
        #[arg(long, default_value = "0")]
        page: u32,
        #[arg(long, default_value = "20")]
        size: u32,
    },
    /// Show dashboard statistics
    Stats,
    /// Check a transition locally, then ask the backend to apply it
    RequestTransition {
        /// Parcel id
        id: u64,
        #[arg(long)]
        to: ValidationState,
        #[arg(long)]
        comment: Option<String>,
    },
}
