use std::path::PathBuf;

use clap::Args;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// JSON file holding `{ "types": [ { "attribute_type": …, "codes": [ … ] } ] }`.
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct TypesArgs {
    /// Only types flagged as required.
    #[arg(long, default_value_t = false)]
    pub required: bool,
}

#[derive(Debug, Args)]
pub struct CodesArgs {
    #[arg(long = "type", value_name = "TYPE")]
    pub type_key: String,
    /// Print a single code instead of the whole list.
    #[arg(long)]
    pub code: Option<String>,
}

#[derive(Debug, Args)]
pub struct TreeArgs {
    #[arg(long = "type", value_name = "TYPE")]
    pub type_key: String,
    /// Comma-separated codes ranked first, in this order. Natural code order otherwise.
    #[arg(long, value_delimiter = ',', value_name = "CODES")]
    pub section_order: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ScoreArgs {
    #[arg(long)]
    pub query: String,
    /// JSON array of search candidates.
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub query: String,
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}
