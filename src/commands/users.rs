use super::Host;
use super::common::{CommonArgs, Session};
use crate::Result;
use crate::collectors::collect_users;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct UsersArgs {
    /// User-search query, e.g. `location:egypt followers:>10`
    #[arg(long, short = 'q', value_name = "QUERY")]
    pub query: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Search for users and append them to the users file.
pub async fn process_users<H: Host>(host: &mut H, args: &UsersArgs) -> Result<()> {
    let session = Session::new(host, &args.common)?;
    let mut sink = session.open_output(&session.config.output_files.users)?;

    let summary = collect_users(
        &session.client,
        &session.config,
        &args.query,
        &mut sink,
        session.window,
        &session.progress,
    )
    .await?;

    session.finish(host, &sink, &summary)
}
