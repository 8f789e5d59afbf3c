use super::Host;
use super::common::{CommonArgs, Session};
use crate::Result;
use crate::collectors::collect_details;
use crate::reports::read_records;
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct DetailsArgs {
    /// Repositories file to read from (default is the configured repositories file)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Walk and analyze every repository in the repositories file.
pub async fn process_details<H: Host>(host: &mut H, args: &DetailsArgs) -> Result<()> {
    let session = Session::new(host, &args.common)?;
    let repos = read_records(&session.input_path(args.input.as_ref(), &session.config.output_files.repos))?;
    let mut sink = session.open_output(&session.config.output_files.details)?;

    let summary = collect_details(&session.client, &session.config, repos, &mut sink, session.window, &session.progress).await?;

    session.finish(host, &sink, &summary)
}
