#![forbid(unsafe_code)]

mod cli;
mod commands;
mod startup;

use anyhow::Result;

use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();

    if matches!(cli.command, Command::Version) {
        println!("tuntap-router {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let rt = startup::bootstrap(&cli)?;

    // Service root span, fields appear in every subsequent log entry
    let _root_span = tracing::span!(
        tracing::Level::INFO,
        "service",
        service.name = "tuntap-router",
        service.version = env!("CARGO_PKG_VERSION"),
    )
    .entered();

    match &cli.command {
        Command::Version => {}
        Command::Validate => commands::cmd_validate(&rt)?,
        Command::Check { direction, packet } => {
            commands::cmd_check(rt.filter.firewall(), (*direction).into(), packet)?;
        }
        Command::Route { packet } => {
            commands::cmd_route(&rt.routing, packet)?;
        }
    }

    if cli.metrics {
        commands::cmd_metrics(&rt.metrics)?;
    }
    Ok(())
}
