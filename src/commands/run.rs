//! Command dispatch logic for gh-harvest

use super::{
    ContributorsArgs, DetailsArgs, InitArgs, ReposArgs, TopArgs, UsersArgs, ValidateArgs, init_config, process_contributors,
    process_details, process_repos, process_top_repos, process_users, validate_config,
};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "gh-harvest", version, author, long_about = None)]
#[command(about = "Collect GitHub users, repositories and repository metadata into CSV datasets")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: HarvestSubcommand,
}

#[derive(Subcommand, Debug)]
enum HarvestSubcommand {
    /// Search for users and record them
    Users(Box<UsersArgs>),
    /// List the public repositories owned by previously collected users
    Repos(Box<ReposArgs>),
    /// Search for the most-starred repositories
    Top(Box<TopArgs>),
    /// Keep the contributors of collected repositories that live in a given location
    Contributors(Box<ContributorsArgs>),
    /// Walk collected repositories and extract their details
    Details(Box<DetailsArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        HarvestSubcommand::Users(args) => process_users(host, args).await,
        HarvestSubcommand::Repos(args) => process_repos(host, args).await,
        HarvestSubcommand::Top(args) => process_top_repos(host, args).await,
        HarvestSubcommand::Contributors(args) => process_contributors(host, args).await,
        HarvestSubcommand::Details(args) => process_details(host, args).await,
        HarvestSubcommand::Init(args) => init_config(host, args),
        HarvestSubcommand::Validate(args) => validate_config(host, args),
    }
}
