use super::Host;
use super::common::{CommonArgs, Session};
use crate::Result;
use crate::collectors::collect_repos;
use crate::reports::read_records;
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct ReposArgs {
    /// Users file to read logins from (default is the configured users file)
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<Utf8PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// List the repositories of every user in the users file.
pub async fn process_repos<H: Host>(host: &mut H, args: &ReposArgs) -> Result<()> {
    let session = Session::new(host, &args.common)?;
    let users = read_records(&session.input_path(args.input.as_ref(), &session.config.output_files.users))?;
    let mut sink = session.open_output(&session.config.output_files.repos)?;

    let summary = collect_repos(&session.client, &session.config, users, &mut sink, session.window, &session.progress).await?;

    session.finish(host, &sink, &summary)
}
