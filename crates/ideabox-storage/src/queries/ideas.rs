// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Idea record queries.

use std::str::FromStr;

use ideabox_core::{
    EnrichedPayload, IdeaFilter, IdeaId, IdeaRecord, IdeaStatus, IdeaSummary, IdeaboxError,
    Origin, Submission, Submitter,
};
use rusqlite::types::Type;
use rusqlite::{Row, params, params_from_iter};

use crate::database::{Database, map_tr_err};

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

const RECORD_COLUMNS: &str = "id, chat_id, message_id, submitter_id, submitter_username, \
     submitter_first_name, raw_text, enriched_json, status, admin_notes, created_at, updated_at";

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn record_from_row(row: &Row<'_>) -> Result<IdeaRecord, rusqlite::Error> {
    let enriched: Option<String> = row.get(7)?;
    let enrichment = enriched
        .map(|json| serde_json::from_str::<EnrichedPayload>(&json))
        .transpose()
        .map_err(|e| conversion_error(7, e))?;
    let status: String = row.get(8)?;
    let status = IdeaStatus::from_str(&status).map_err(|e| conversion_error(8, e))?;

    Ok(IdeaRecord {
        id: IdeaId(row.get(0)?),
        origin: Origin {
            chat_id: row.get(1)?,
            message_id: row.get(2)?,
        },
        submitter: Submitter {
            id: row.get(3)?,
            username: row.get(4)?,
            first_name: row.get(5)?,
        },
        raw_text: row.get(6)?,
        status,
        enrichment,
        admin_notes: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn select_by_id(conn: &rusqlite::Connection, id: i64) -> Result<Option<IdeaRecord>, rusqlite::Error> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM ideas WHERE id = ?1");
    match conn.query_row(&sql, params![id], record_from_row) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Inserts a submission as a new record and returns it as stored.
pub async fn create_record(db: &Database, submission: &Submission) -> Result<IdeaRecord, IdeaboxError> {
    let submission = submission.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO ideas (chat_id, message_id, submitter_id, submitter_username, \
                 submitter_first_name, raw_text, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    submission.origin.chat_id,
                    submission.origin.message_id,
                    submission.submitter.id,
                    submission.submitter.username,
                    submission.submitter.first_name,
                    submission.text,
                    IdeaStatus::New.to_string(),
                ],
            )?;
            let id = tx.last_insert_rowid();
            let record = select_by_id(&tx, id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_record(db: &Database, id: IdeaId) -> Result<Option<IdeaRecord>, IdeaboxError> {
    db.connection()
        .call(move |conn| select_by_id(conn, id.0))
        .await
        .map_err(map_tr_err)
}

/// Newest non-terminal records, projected for duplicate comparison.
pub async fn list_active_summaries(db: &Database, limit: usize) -> Result<Vec<IdeaSummary>, IdeaboxError> {
    let terminal: Vec<String> = IdeaStatus::TERMINAL.iter().map(|s| s.to_string()).collect();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, raw_text FROM ideas
                 WHERE status NOT IN (?1, ?2)
                 ORDER BY created_at DESC, id DESC LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![terminal[0], terminal[1], limit], |row| {
                Ok(IdeaSummary {
                    id: IdeaId(row.get(0)?),
                    title: row.get(1)?,
                    raw_text: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Writes the payload and its denormalized columns.
pub async fn attach_enrichment(
    db: &Database,
    id: IdeaId,
    payload: &EnrichedPayload,
) -> Result<(), IdeaboxError> {
    let json = serde_json::to_string(payload).map_err(|e| IdeaboxError::Storage {
        source: Box::new(e),
    })?;
    let components = serde_json::to_string(&payload.affected_components).map_err(|e| {
        IdeaboxError::Storage {
            source: Box::new(e),
        }
    })?;
    let title = payload.title.clone();
    let category = payload.category.to_string();
    let priority = payload.priority.to_string();
    let complexity = payload.complexity.to_string();

    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "UPDATE ideas SET enriched_json = ?1, title = ?2, category = ?3, priority = ?4, \
                     complexity = ?5, affected_components = ?6, updated_at = {NOW} WHERE id = ?7"
                ),
                params![json, title, category, priority, complexity, components, id.0],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if updated == 0 {
        return Err(IdeaboxError::NotFound {
            entity: "idea",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// WHERE clause and bind values for a moderation filter.
fn filter_clause(filter: &IdeaFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    let mut push = |column: &str, labels: Vec<String>| {
        if labels.is_empty() {
            return;
        }
        let placeholders = vec!["?"; labels.len()].join(", ");
        conditions.push(format!("{column} IN ({placeholders})"));
        values.extend(labels);
    };
    push("status", filter.statuses.iter().map(|s| s.to_string()).collect());
    push("category", filter.categories.iter().map(|c| c.to_string()).collect());
    push("priority", filter.priorities.iter().map(|p| p.to_string()).collect());

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

pub async fn list_records(db: &Database, filter: &IdeaFilter) -> Result<Vec<IdeaRecord>, IdeaboxError> {
    let (clause, values) = filter_clause(filter);
    let mut sql = format!("SELECT {RECORD_COLUMNS} FROM ideas{clause} ORDER BY created_at DESC, id DESC");
    match (filter.limit, filter.offset) {
        (Some(limit), offset) => sql.push_str(&format!(" LIMIT {limit} OFFSET {}", offset.unwrap_or(0))),
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }

    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), record_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn count_records(db: &Database, filter: &IdeaFilter) -> Result<u64, IdeaboxError> {
    let (clause, values) = filter_clause(filter);
    let sql = format!("SELECT COUNT(*) FROM ideas{clause}");
    let count: i64 = db
        .connection()
        .call(move |conn| conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0)))
        .await
        .map_err(map_tr_err)?;
    Ok(u64::try_from(count).unwrap_or(0))
}

pub async fn update_status(db: &Database, id: IdeaId, status: IdeaStatus) -> Result<bool, IdeaboxError> {
    let status = status.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!("UPDATE ideas SET status = ?1, updated_at = {NOW} WHERE id = ?2"),
                params![status, id.0],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed > 0)
}

pub async fn update_notes(db: &Database, id: IdeaId, notes: &str) -> Result<bool, IdeaboxError> {
    let notes = notes.to_string();
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!("UPDATE ideas SET admin_notes = ?1, updated_at = {NOW} WHERE id = ?2"),
                params![notes, id.0],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed > 0)
}

pub async fn delete_record(db: &Database, id: IdeaId) -> Result<bool, IdeaboxError> {
    let changed = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM ideas WHERE id = ?1", params![id.0]))
        .await
        .map_err(map_tr_err)?;
    Ok(changed > 0)
}
