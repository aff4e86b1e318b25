use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::json;
use storefront_core::models::SyncBatch;
use storefront_core::{AppConfig, NaturalCodeOrder, NodeOrdering, SectionOrder, Storefront};
use tracing::debug;

use crate::cli::Commands;

mod support;

pub(crate) use self::support::report_failure;
use self::support::{print_json, read_json_file, score_candidates_file};

pub(crate) fn run_from_root(root: &Path, command: Commands) -> Result<()> {
    match command {
        // Offline scoring needs neither the state database nor a search server.
        Commands::Score(args) => {
            print_json(&score_candidates_file(&args.query, &args.file)?)?;
        }
        Commands::Init => {
            let app = open_app(root)?;
            app.initialize().context("initialize failed")?;
            let config = app.config();
            print_json(&json!({
                "root": app.root().display().to_string(),
                "search_backend": config.search.backend.as_str(),
                "cache_invalidation": config.cache.invalidation.as_str(),
                "cached_types": app.cache().len(),
            }))?;
            app.shutdown();
        }
        Commands::Sync(args) => {
            let batch: SyncBatch = read_json_file(&args.file)?;
            let report = open_app(root)?
                .sync_attributes(&batch)
                .context("sync failed")?;
            print_json(&report)?;
        }
        Commands::Types(args) => {
            let app = open_app(root)?;
            let types = if args.required {
                app.required_attribute_types()?
            } else {
                app.active_attribute_types()?
            };
            print_json(&types)?;
        }
        Commands::Codes(args) => {
            let app = open_app(root)?;
            match args.code {
                Some(code) => {
                    let entry = app
                        .find_code_for_type(&args.type_key, &code)?
                        .ok_or_else(|| {
                            anyhow!("code {code} not found for type {}", args.type_key)
                        })?;
                    print_json(&entry)?;
                }
                None => {
                    let codes = app.find_codes_for_type(&args.type_key)?;
                    print_json(&codes[..])?;
                }
            }
        }
        Commands::Tree(args) => {
            let ordering: Box<dyn NodeOrdering> = if args.section_order.is_empty() {
                Box::new(NaturalCodeOrder)
            } else {
                Box::new(SectionOrder::new(
                    args.section_order.iter().map(|code| code.trim()),
                ))
            };
            let tree = open_app(root)?
                .generate_architecture(&args.type_key, ordering.as_ref())
                .with_context(|| format!("failed to build tree for {}", args.type_key))?;
            print_json(&tree)?;
        }
        Commands::Refresh => {
            let report = open_app(root)?.refresh_cache()?;
            print_json(&report)?;
        }
        Commands::Search(args) => {
            let app = open_app(root)?;
            app.initialize().context("search server unavailable")?;
            let results = app.search(&args.query, args.limit);
            app.shutdown();
            print_json(&results?)?;
        }
    }
    Ok(())
}

fn open_app(root: &Path) -> Result<Storefront> {
    let config = AppConfig::from_env().context("invalid storefront configuration")?;
    let app = Storefront::new(root, config).context("failed to open storefront state")?;
    debug!(target: "storefront.cli", root = %root.display(), "opened storefront state");
    Ok(app)
}
