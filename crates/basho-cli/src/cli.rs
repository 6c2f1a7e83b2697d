use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "basho",
    about = "basho: Japanese prefectures, municipalities, and postal codes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Dataset root (defaults to the bundled datasets)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Seeded snapshot file to query, or to write with `seed`
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List prefectures
    Prefectures(PrefecturesArgs),
    /// List the nine regions
    Regions,
    /// List active municipalities of a prefecture
    Cities(CitiesArgs),
    /// Show a municipality by code
    City(CityArgs),
    /// Look up a postal code
    Postal(PostalArgs),
    /// Check municipality codes
    Validate(ValidateArgs),
    /// Compute the check digit for a five-digit prefix
    CheckDigit(CheckDigitArgs),
    /// Copy the datasets into the snapshot named by --db
    Seed,
    /// Compare declared capitals with the capital flags in city data
    VerifyCapitals,
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct PrefecturesArgs {
    /// Region name, Japanese or English (e.g. 関東, Kanto)
    #[arg(long)]
    pub region: Option<String>,
}

#[derive(Args)]
pub struct CitiesArgs {
    /// Prefecture code or name (e.g. 13, 東京都, Tokyo)
    pub prefecture: String,
}

#[derive(Args)]
pub struct CityArgs {
    /// Six-digit municipality code
    pub code: String,
    /// Follow mergers to the current municipality
    #[arg(long)]
    pub current: bool,
    /// Print every municipality along the merger chain
    #[arg(long, conflicts_with = "current")]
    pub chain: bool,
}

#[derive(Args)]
pub struct PostalArgs {
    /// Seven-digit postal code, with or without a hyphen
    pub code: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[arg(required = true)]
    pub codes: Vec<String>,
}

#[derive(Args)]
pub struct CheckDigitArgs {
    /// First five digits of a municipality code
    pub prefix: String,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override the bind address from the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
