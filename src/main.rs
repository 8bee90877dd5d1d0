use anyhow::Result;
use clap::Parser;

use geotnb::cli::commands::auth::{LoginCommand, LogoutCommand};
use geotnb::cli::commands::export::ExportCommand;
use geotnb::cli::commands::parcels::{ParcelsCommand, RequestTransitionCommand, StatsCommand};
use geotnb::cli::commands::permissions::PermissionsCommand;
use geotnb::cli::commands::tax::{TnbCommand, ZonesCommand};
use geotnb::cli::commands::workflow::{CanTransitionCommand, TransitionsCommand, ValidateCommand};
use geotnb::cli::commands::{show_usage, Command};
use geotnb::cli::{Cli, Commands};
use geotnb::api::ParcelFilter;
use geotnb::config::{config, init_config, GeoTnbConfig};
use geotnb::telemetry::{init_telemetry, shutdown_telemetry};

fn run(command: impl Command) -> Result<()> {
    tokio::runtime::Runtime::new()?.block_on(async { command.execute().await })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: GeoTnbConfig = config()?.clone();
    let level = if cli.verbose { "debug" } else { config.observability.log_level.as_str() };
    init_telemetry(level, config.observability.json_logs)?;
    init_config()?;

    let result = match cli.command {
        // No subcommand: explain what the tool does
        None => show_usage(),
        Some(Commands::Permissions { role }) => run(PermissionsCommand { role }),
        Some(Commands::Transitions) => run(TransitionsCommand),
        Some(Commands::CanTransition { from, to, role }) => run(CanTransitionCommand { from, to, role }),
        Some(Commands::Validate { file, to, role }) => run(ValidateCommand { file, to, role }),
        Some(Commands::Tnb { surface, zone, tariff, quota, exemption }) => run(TnbCommand {
            surface,
            zone,
            tariff,
            quota,
            exemption,
        }),
        Some(Commands::Zones) => run(ZonesCommand),
        Some(Commands::Export { input, format, output, state }) => run(ExportCommand {
            config,
            input,
            format,
            output,
            state,
        }),
        Some(Commands::Login { username, password }) => run(LoginCommand {
            config,
            username,
            password,
        }),
        Some(Commands::Logout) => run(LogoutCommand { config }),
        Some(Commands::Parcels { reference, zone, state, page, size }) => run(ParcelsCommand {
            config,
            filter: ParcelFilter {
                reference,
                zoning: zone,
                state,
                exempted: None,
                page: Some(page),
                size: Some(size),
            },
        }),
        Some(Commands::Stats) => run(StatsCommand { config }),
        Some(Commands::RequestTransition { id, to, comment }) => run(RequestTransitionCommand {
            config,
            id,
            to,
            comment,
        }),
    };

    shutdown_telemetry();
    result
}
