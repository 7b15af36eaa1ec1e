use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "storyloader",
    about = "Bulk create or update Jira user stories from a CSV file"
)]
pub struct Cli {
    /// CSV file with one user story per row [default: user_stories.csv]
    #[arg(short, long, env = "STORYLOADER_INPUT")]
    pub input: Option<PathBuf>,

    /// Project key new stories are created in [default: NA]
    #[arg(long, env = "STORYLOADER_PROJECT")]
    pub project: Option<String>,

    /// TOML file with a [fields] table overriding the Jira field mapping
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
