use std::collections::{HashMap, HashSet};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::InvalidationScope;
use crate::error::Result;
use crate::models::{ActiveStatus, AttributeSyncItem, CodeEntry, SyncBatch, SyncReport};
use crate::state::SYSTEM_USER;

use super::Storefront;
use super::attribute_service::{validate_attribute_type, validate_code_entry};

impl Storefront {
    /// Brings the stored attributes in line with `batch`.
    ///
    /// Items naming the same type are merged first: the last item's type
    /// fields win and the code lists are concatenated. Every valid type and
    /// code is then saved and made active. Codes of a synced type that are
    /// absent from its codes are deactivated, and so are active types absent
    /// from the batch. Invalid records and records whose write fails are
    /// reported in `rejected` and skipped. The cache is invalidated once the
    /// writes are done, also when a later step fails, and rebuilt on success.
    pub fn sync_attributes(&self, batch: &SyncBatch) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        let outcome = self.apply_sync(batch, &mut report);
        // Some writes may have landed even when a later step failed.
        self.cache.invalidate(&InvalidationScope::All)?;
        outcome?;
        let refresh = self.cache.refresh_all()?;

        info!(
            target: "storefront.sync",
            types_saved = report.types_saved,
            codes_saved = report.codes_saved,
            types_deactivated = report.types_deactivated.len(),
            codes_deactivated = report.codes_deactivated.len(),
            rejected = report.rejected.len(),
            cached_types = refresh.refreshed.len(),
            "attribute sync finished"
        );
        Ok(report)
    }

    fn apply_sync(&self, batch: &SyncBatch, report: &mut SyncReport) -> Result<()> {
        let items = merge_items_by_type(batch, report);
        let mut present = HashSet::new();

        for (type_key, item) in &items {
            present.insert(type_key.clone());
            if let Err(err) = self.sync_item(type_key, item, report) {
                reject(report, format!("attribute type {type_key}: {err}"));
            }
        }

        if present.is_empty() {
            warn!(
                target: "storefront.sync",
                "no attribute type in the batch was accepted; keeping existing types active"
            );
        } else {
            for existing in self.state.list_active_attribute_types()? {
                if present.contains(&existing.type_key) {
                    continue;
                }
                self.state.set_type_status(
                    &existing.type_key,
                    ActiveStatus::Inactive,
                    SYSTEM_USER,
                )?;
                report.types_deactivated.push(existing.type_key);
            }
        }

        self.state
            .set_system_value(super::LAST_SYNC_KEY, &Utc::now().to_rfc3339())
    }

    fn sync_item(
        &self,
        type_key: &str,
        item: &AttributeSyncItem,
        report: &mut SyncReport,
    ) -> Result<()> {
        let mut attribute_type = item.attribute_type.clone();
        attribute_type.type_key = type_key.to_string();
        self.state
            .upsert_attribute_type(&attribute_type, SYSTEM_USER)?;
        self.state
            .set_type_status(type_key, ActiveStatus::Active, SYSTEM_USER)?;
        report.types_saved += 1;

        let mut keep = HashSet::new();
        for code in &item.codes {
            let entry = match code_for_type(type_key, code) {
                Ok(entry) => entry,
                Err(reason) => {
                    reject(report, reason);
                    continue;
                }
            };
            self.state.upsert_attribute_code(&entry, SYSTEM_USER)?;
            self.state
                .set_code_status(type_key, &entry.code, ActiveStatus::Active, SYSTEM_USER)?;
            report.codes_saved += 1;
            keep.insert(entry.code);
        }

        let removed = self
            .state
            .deactivate_codes_except(type_key, &keep, SYSTEM_USER)?;
        report
            .codes_deactivated
            .extend(removed.into_iter().map(|code| format!("{type_key}|{code}")));
        Ok(())
    }
}

/// Valid items keyed by trimmed type key, in first-seen order.
fn merge_items_by_type(
    batch: &SyncBatch,
    report: &mut SyncReport,
) -> Vec<(String, AttributeSyncItem)> {
    let mut merged: Vec<(String, AttributeSyncItem)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for item in &batch.types {
        if let Err(reason) = validate_attribute_type(&item.attribute_type) {
            reject(report, reason);
            continue;
        }
        let type_key = item.attribute_type.type_key.trim().to_string();
        match positions.get(&type_key).copied() {
            Some(index) => {
                debug!(
                    target: "storefront.sync",
                    type_key = %type_key,
                    "merged repeated sync item"
                );
                let (_, existing) = &mut merged[index];
                existing.attribute_type = item.attribute_type.clone();
                existing.codes.extend(item.codes.iter().cloned());
            }
            None => {
                positions.insert(type_key.clone(), merged.len());
                merged.push((type_key, item.clone()));
            }
        }
    }
    merged
}

/// Fills in the item's type on codes that leave it blank and rejects codes
/// that name a different type.
fn code_for_type(type_key: &str, code: &CodeEntry) -> std::result::Result<CodeEntry, String> {
    let mut entry = code.clone();
    if entry.type_key.trim().is_empty() {
        entry.type_key = type_key.to_string();
    } else if entry.type_key != type_key {
        return Err(format!(
            "code {} is listed under type {type_key}",
            entry.key()
        ));
    }
    validate_code_entry(&entry)?;
    Ok(entry)
}

fn reject(report: &mut SyncReport, reason: String) {
    warn!(target: "storefront.sync", reason = %reason, "skipped sync record");
    report.rejected.push(reason);
}
