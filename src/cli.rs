use clap::{Parser, ValueEnum};

/// Snapshot a GitHub repository's issues and pull requests to JSON files.
///
/// All settings come from the environment (or a `.env` file).
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Run only one of the two fetches.
    #[arg(long, value_enum)]
    pub only: Option<Target>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Issues,
    Pulls,
}

impl Args {
    pub fn wants(&self, target: Target) -> bool {
        self.only.map_or(true, |only| only == target)
    }
}
