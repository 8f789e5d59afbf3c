//! Command-line interface for gh-harvest
//!
//! Each pipeline stage is a subcommand that reads its input from the previous stage's CSV file
//! (or a search query), collects from the GitHub API, and appends to its own CSV file:
//!
//! - **users**: user search, written to the users file
//! - **repos**: repositories owned by each collected user
//! - **top**: most-starred repositories matching a search query
//! - **contributors**: contributors of collected repositories filtered by location
//! - **details**: tree walk and field extraction for collected repositories
//!
//! `init` and `validate` manage the configuration file. The `common` module owns the startup
//! sequence shared by the stages: logging, `.env` loading, configuration, and token discovery.

mod common;
mod contributors;
mod details;
mod host;
mod init;
mod progress_reporter;
mod repos;
mod run;
mod top;
mod users;
mod validate;

pub use common::{CommonArgs, LogLevel};
pub use contributors::{ContributorsArgs, process_contributors};
pub use details::{DetailsArgs, process_details};
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use progress_reporter::ProgressReporter;
pub use repos::{ReposArgs, process_repos};
pub use run::run;
pub use top::{TopArgs, process_top_repos};
pub use users::{UsersArgs, process_users};
pub use validate::{ValidateArgs, validate_config};
