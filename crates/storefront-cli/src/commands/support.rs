use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use storefront_core::error::ErrorPayload;
use storefront_core::models::ComponentSearchView;
use storefront_core::scoring::sort_by_score_desc;
use storefront_core::{RelevanceScorer, StorefrontError};

pub(super) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

pub(super) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

pub(super) fn score_candidates_file(query: &str, path: &Path) -> Result<Vec<ComponentSearchView>> {
    let mut candidates: Vec<ComponentSearchView> = read_json_file(path)?;
    RelevanceScorer::default().score(query, &mut candidates);
    sort_by_score_desc(&mut candidates);
    Ok(candidates)
}

/// Prints the error chain and, for core errors, the JSON payload to stderr.
pub(crate) fn report_failure(err: &anyhow::Error, operation: &str, type_key: Option<String>) {
    eprintln!("Error: {err:#}");
    if let Some(payload) = failure_payload(err, operation, type_key)
        && let Ok(rendered) = serde_json::to_string_pretty(&payload)
    {
        eprintln!("{rendered}");
    }
}

fn failure_payload(
    err: &anyhow::Error,
    operation: &str,
    type_key: Option<String>,
) -> Option<ErrorPayload> {
    err.downcast_ref::<StorefrontError>()
        .map(|core| core.to_payload(operation, type_key))
}
