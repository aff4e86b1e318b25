use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod args;

#[cfg(test)]
mod tests;

pub use args::{CodesArgs, ScoreArgs, SearchArgs, SyncArgs, TreeArgs, TypesArgs};

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Storefront catalog attribute and search administration", version)]
pub struct Cli {
    #[arg(long, global = true, default_value = ".storefront")]
    pub root: PathBuf,

    /// Debug-level logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the state database and warm the attribute cache.
    Init,
    /// Import a JSON sync batch of attribute types and codes.
    Sync(SyncArgs),
    /// List active attribute types.
    Types(TypesArgs),
    /// List the active codes of one attribute type.
    Codes(CodesArgs),
    /// Print the architecture tree of an attribute type.
    Tree(TreeArgs),
    /// Reload every active type into the cache.
    Refresh,
    /// Score and rank candidates read from a JSON file.
    Score(ScoreArgs),
    /// Query the configured search server and rank the results.
    Search(SearchArgs),
}

impl Commands {
    /// Operation name carried in error payloads.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Sync(_) => "sync",
            Self::Types(_) => "types",
            Self::Codes(_) => "codes",
            Self::Tree(_) => "tree",
            Self::Refresh => "refresh",
            Self::Score(_) => "score",
            Self::Search(_) => "search",
        }
    }

    pub fn type_key(&self) -> Option<String> {
        match self {
            Self::Codes(args) => Some(args.type_key.clone()),
            Self::Tree(args) => Some(args.type_key.clone()),
            _ => None,
        }
    }
}
