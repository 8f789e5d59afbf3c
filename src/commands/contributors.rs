use super::Host;
use super::common::{CommonArgs, Session};
use crate::Result;
use crate::collectors::collect_contributors;
use crate::reports::read_records;
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ContributorsArgs {
    /// Keep contributors whose profile location contains this text (case-insensitive)
    #[arg(long, short = 'l', value_name = "LOCATION")]
    pub location: String,

    /// Repositories file to read from (default is the configured repositories file)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Filter the contributors of every repository in the repositories file by location.
pub async fn process_contributors<H: Host>(host: &mut H, args: &ContributorsArgs) -> Result<()> {
    let session = Session::new(host, &args.common)?;
    let repos = read_records(&session.input_path(args.input.as_ref(), &session.config.output_files.repos))?;
    let mut sink = session.open_output(&session.config.output_files.contributors)?;

    let summary = collect_contributors(
        &session.client,
        &session.config,
        &args.location,
        repos,
        &mut sink,
        session.window,
        &session.progress,
    )
    .await?;

    session.finish(host, &sink, &summary)
}
