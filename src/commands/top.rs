use super::Host;
use super::common::{CommonArgs, Session};
use crate::Result;
use crate::collectors::collect_top_repos;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct TopArgs {
    /// Repository-search query, e.g. `stars:>1000 -location:egypt`
    #[arg(long, short = 'q', value_name = "QUERY")]
    pub query: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Search for the most-starred repositories and append them to the top repositories file.
pub async fn process_top_repos<H: Host>(host: &mut H, args: &TopArgs) -> Result<()> {
    let session = Session::new(host, &args.common)?;
    let mut sink = session.open_output(&session.config.output_files.top_repos)?;

    let summary = collect_top_repos(
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
