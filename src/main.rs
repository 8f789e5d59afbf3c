//! Collect GitHub users, repositories and repository metadata into CSV datasets.
//!
//! # Overview
//!
//! `gh-harvest` runs a multi-stage collection pipeline against the GitHub REST API. Every stage
//! appends to a CSV file in the output directory, and later stages read the files produced by
//! earlier ones:
//!
//! ```bash
//! gh-harvest users --query "location:egypt followers:>10"
//! gh-harvest repos
//! gh-harvest details
//! gh-harvest contributors --location egypt
//! gh-harvest top --query "stars:>1000 -location:egypt"
//! ```
//!
//! # Credentials
//!
//! Access tokens are taken from `--token` (repeatable), `--tokens-file`, or the `GITHUB_TOKENS`,
//! `GITHUB_TOKEN` and `GITHUB_ACCESS_TOKEN1`.. environment variables, which may also be set in a
//! `.env` file. When a token hits its rate limit the next one is used.
//!
//! # Resuming
//!
//! Outputs are appended, so an interrupted stage can be resumed with `--skip N`. Items that could
//! not be collected are listed in `<stage>_missed.txt` next to the outputs.
//!
//! # Configuration
//!
//! `gh-harvest init` writes the default configuration to `harvest.yml`; `gh-harvest validate`
//! checks an edited one.

use gh_harvest::{Host, run};
use std::io::Write;
use std::io::{stderr, stdout};

/// Default host that runs real OS commands.
#[derive(Debug, Clone, Default)]
pub struct RealHost;

impl Host for RealHost {
    fn output(&mut self) -> impl Write {
        stdout()
    }

    fn error(&mut self) -> impl Write {
        stderr()
    }

    fn exit(&mut self, code: i32) {
        std::process::exit(code);
    }
}

#[tokio::main]
async fn main() -> Result<(), ohno::AppError> {
    run(&mut RealHost, std::env::args()).await
}
