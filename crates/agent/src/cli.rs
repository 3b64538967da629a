use clap::{Parser, Subcommand, ValueEnum};
use domain::common::entity::Direction;
use infrastructure::config::{LogFormat, LogLevel};
use infrastructure::constants::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "tuntap-router",
    about = "IPv4 firewall and router for tun/tap packet pumps",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: String,

    /// Log level override (takes precedence over config file)
    #[arg(short, long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log format: json (default, production) or text (development)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Print Prometheus metrics after the command completes
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Chain selector on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Inbound,
    Outbound,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Inbound => Self::Inbound,
            DirectionArg::Outbound => Self::Outbound,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display version and build information
    Version,

    /// Load the configuration, build every chain and print a summary
    Validate,

    /// Run a packet through a firewall chain and print the verdict code
    Check {
        /// Chain to evaluate
        #[arg(short, long, value_enum)]
        direction: DirectionArg,

        /// Raw IPv4 packet as hex
        #[arg(short, long)]
        packet: String,
    },

    /// Look up a packet in the route table, forward it, and print the code
    Route {
        /// Raw IPv4 packet as hex
        #[arg(short, long)]
        packet: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
