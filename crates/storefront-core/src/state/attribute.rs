use std::collections::HashSet;

use chrono::Utc;
use rusqlite::{OptionalExtension, Row, params};

use crate::cache::CodeSource;
use crate::error::Result;
use crate::models::{ActiveStatus, AttributeType, CodeEntry};

use super::SqliteStateStore;

const TYPE_COLUMNS: &str = "type_key, description, architecture, allow_multiple, important, \
                            required, visible, active_status, update_user, updated_at";
const CODE_COLUMNS: &str =
    "type_key, code, label, description, detail_url, active_status, update_user, updated_at";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeRecord {
    pub attribute_type: AttributeType,
    pub status: ActiveStatus,
    pub update_user: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRecord {
    pub entry: CodeEntry,
    pub status: ActiveStatus,
    pub update_user: String,
    pub updated_at: String,
}

impl SqliteStateStore {
    /// Inserts a new active type or updates the descriptive fields of an
    /// existing one. The status of an existing row is left as is.
    pub fn upsert_attribute_type(&self, attribute_type: &AttributeType, user: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                r"
                INSERT INTO attribute_type(
                  type_key, description, architecture, allow_multiple, important,
                  required, visible, active_status, create_user, update_user,
                  created_at, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9, ?10, ?10)
                ON CONFLICT(type_key) DO UPDATE SET
                  description = excluded.description,
                  architecture = excluded.architecture,
                  allow_multiple = excluded.allow_multiple,
                  important = excluded.important,
                  required = excluded.required,
                  visible = excluded.visible,
                  update_user = excluded.update_user,
                  updated_at = excluded.updated_at
                ",
                params![
                    attribute_type.type_key,
                    attribute_type.description,
                    attribute_type.architecture,
                    attribute_type.allow_multiple,
                    attribute_type.important,
                    attribute_type.required,
                    attribute_type.visible,
                    ActiveStatus::Active.as_str(),
                    user,
                    now,
                ],
            )?;
            Ok(())
        })
    }

    pub fn find_attribute_type(&self, type_key: &str) -> Result<Option<AttributeTypeRecord>> {
        self.with_conn(|conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {TYPE_COLUMNS} FROM attribute_type WHERE type_key = ?1"),
                    params![type_key],
                    type_record_from_row,
                )
                .optional()?;
            Ok(record)
        })
    }

    /// Every type regardless of status, ordered by key.
    pub fn list_attribute_types(&self) -> Result<Vec<AttributeTypeRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TYPE_COLUMNS} FROM attribute_type ORDER BY type_key ASC"
            ))?;
            let rows = stmt
                .query_map([], type_record_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_active_attribute_types(&self) -> Result<Vec<AttributeType>> {
        self.query_types(
            "WHERE active_status = ?1 ORDER BY type_key ASC",
            ActiveStatus::Active,
        )
    }

    pub fn find_required_types(&self) -> Result<Vec<AttributeType>> {
        self.query_types(
            "WHERE active_status = ?1 AND required = 1 ORDER BY type_key ASC",
            ActiveStatus::Active,
        )
    }

    fn query_types(&self, clause: &str, status: ActiveStatus) -> Result<Vec<AttributeType>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TYPE_COLUMNS} FROM attribute_type {clause}"))?;
            let rows = stmt
                .query_map(params![status.as_str()], type_record_from_row)?
                .map(|row| row.map(|record| record.attribute_type))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns `false` when no such type exists.
    pub fn set_type_status(&self, type_key: &str, status: ActiveStatus, user: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            let changed = conn.execute(
                r"
                UPDATE attribute_type
                SET active_status = ?2, update_user = ?3, updated_at = ?4
                WHERE type_key = ?1
                ",
                params![type_key, status.as_str(), user, now],
            )?;
            Ok(changed > 0)
        })
    }

    /// Inserts a new active code or updates label, description and detail URL
    /// of an existing one without touching its status.
    pub fn upsert_attribute_code(&self, entry: &CodeEntry, user: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                r"
                INSERT INTO attribute_code(
                  type_key, code, label, description, detail_url, active_status,
                  create_user, update_user, created_at, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?8)
                ON CONFLICT(type_key, code) DO UPDATE SET
                  label = excluded.label,
                  description = excluded.description,
                  detail_url = excluded.detail_url,
                  update_user = excluded.update_user,
                  updated_at = excluded.updated_at
                ",
                params![
                    entry.type_key,
                    entry.code,
                    entry.label,
                    entry.description,
                    entry.detail_url,
                    ActiveStatus::Active.as_str(),
                    user,
                    now,
                ],
            )?;
            Ok(())
        })
    }

    pub fn find_attribute_code(&self, type_key: &str, code: &str) -> Result<Option<CodeRecord>> {
        self.with_conn(|conn| {
            let record = conn
                .query_row(
                    &format!(
                        "SELECT {CODE_COLUMNS} FROM attribute_code WHERE type_key = ?1 AND code = ?2"
                    ),
                    params![type_key, code],
                    code_record_from_row,
                )
                .optional()?;
            Ok(record)
        })
    }

    pub fn list_active_codes(&self, type_key: &str) -> Result<Vec<CodeEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                r"
                SELECT {CODE_COLUMNS} FROM attribute_code
                WHERE type_key = ?1 AND active_status = ?2
                ORDER BY code ASC
                "
            ))?;
            let rows = stmt
                .query_map(
                    params![type_key, ActiveStatus::Active.as_str()],
                    code_record_from_row,
                )?
                .map(|row| row.map(|record| record.entry))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns `false` when no such code exists.
    pub fn set_code_status(
        &self,
        type_key: &str,
        code: &str,
        status: ActiveStatus,
        user: &str,
    ) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            let changed = conn.execute(
                r"
                UPDATE attribute_code
                SET active_status = ?3, update_user = ?4, updated_at = ?5
                WHERE type_key = ?1 AND code = ?2
                ",
                params![type_key, code, status.as_str(), user, now],
            )?;
            Ok(changed > 0)
        })
    }

    /// Deactivates every active code of `type_key` whose code is not in `keep`.
    /// Returns the deactivated codes.
    pub fn deactivate_codes_except(
        &self,
        type_key: &str,
        keep: &HashSet<String>,
        user: &str,
    ) -> Result<Vec<String>> {
        let now = Utc::now().to_rfc3339();
        self.with_tx(|tx| {
            let active = {
                let mut stmt = tx.prepare(
                    "SELECT code FROM attribute_code WHERE type_key = ?1 AND active_status = ?2",
                )?;
                let codes = stmt
                    .query_map(params![type_key, ActiveStatus::Active.as_str()], |row| {
                        row.get::<_, String>(0)
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                codes
            };
            let mut removed = Vec::new();
            for code in active.into_iter().filter(|code| !keep.contains(code)) {
                tx.execute(
                    r"
                    UPDATE attribute_code
                    SET active_status = ?3, update_user = ?4, updated_at = ?5
                    WHERE type_key = ?1 AND code = ?2
                    ",
                    params![
                        type_key,
                        code,
                        ActiveStatus::Inactive.as_str(),
                        user,
                        now
                    ],
                )?;
                removed.push(code);
            }
            removed.sort();
            Ok(removed)
        })
    }
}

impl CodeSource for SqliteStateStore {
    fn active_type_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .list_active_attribute_types()?
            .into_iter()
            .map(|attribute_type| attribute_type.type_key)
            .collect())
    }

    fn load_codes(&self, type_key: &str) -> Result<Vec<CodeEntry>> {
        self.list_active_codes(type_key)
    }
}

fn parse_status(raw: &str, column: usize) -> rusqlite::Result<ActiveStatus> {
    raw.parse::<ActiveStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            err.into(),
        )
    })
}

fn type_record_from_row(row: &Row<'_>) -> rusqlite::Result<AttributeTypeRecord> {
    let status = row.get::<_, String>(7)?;
    Ok(AttributeTypeRecord {
        attribute_type: AttributeType {
            type_key: row.get(0)?,
            description: row.get(1)?,
            architecture: row.get(2)?,
            allow_multiple: row.get(3)?,
            important: row.get(4)?,
            required: row.get(5)?,
            visible: row.get(6)?,
        },
        status: parse_status(&status, 7)?,
        update_user: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn code_record_from_row(row: &Row<'_>) -> rusqlite::Result<CodeRecord> {
    let status = row.get::<_, String>(5)?;
    Ok(CodeRecord {
        entry: CodeEntry {
            type_key: row.get(0)?,
            code: row.get(1)?,
            label: row.get(2)?,
            description: row.get(3)?,
            detail_url: row.get(4)?,
        },
        status: parse_status(&status, 5)?,
        update_user: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
