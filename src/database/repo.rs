use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Statement};
use serde::Serialize;

use crate::artwork::fields::COLUMNS;
use crate::artwork::{ArtworkRecord, FieldValue, Row};
use crate::database::schema::{self, INDEXES, TABLE};
use crate::error::StoreError;

// Keeps IN (...) lists well below SQLite's bound-parameter limit.
const ID_CHUNK: usize = 500;

const EUROPEAN_PAINTING_DEPARTMENT: &str = "Painting and Sculpture of Europe";

/// A normalized row waiting for the next commit, with the document it came from.
#[derive(Debug, Clone)]
pub struct StagedRow {
    pub source: PathBuf,
    pub row: Row,
}

#[derive(Debug)]
pub struct WriteFailure {
    pub source: PathBuf,
    pub error: StoreError,
}

#[derive(Debug, Default)]
pub struct FlushOutcome {
    pub written: usize,
    pub failures: Vec<WriteFailure>,
}

/// The display fields collection enrichment needs for one artwork.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkSummary {
    pub id: i64,
    pub title: Option<String>,
    pub artist_display: Option<String>,
    pub date_display: Option<String>,
    pub medium_display: Option<String>,
    pub image_id: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
}

/// Selection over the store used to seed a collection.
#[derive(Debug, Clone, Default)]
pub struct CandidateQuery {
    pub departments: Vec<String>,
    pub date_from: Option<i64>,
    pub date_to: Option<i64>,
    pub public_domain_only: bool,
    pub require_image: bool,
    pub limit: Option<usize>,
}

/// Headline counts printed after a build or export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub total: i64,
    pub public_domain: i64,
    pub european_paintings: i64,
    pub public_domain_european_paintings: i64,
    pub public_domain_oil_on_canvas: i64,
}

/// Owns the SQLite connection and buffers upserts between commits.
pub struct ArtworkStore {
    conn: Connection,
    buffer: Vec<StagedRow>,
    buffer_limit: usize,
}

impl ArtworkStore {
    pub fn open(path: &Path, commit_interval: usize) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {:?}", path))?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .context("Failed to set journal mode")?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .context("Failed to set synchronous mode")?;
        conn.execute_batch(&schema::create_table_sql())
            .context("Failed to initialize schema")?;
        conn.execute_batch(INDEXES).context("Failed to create indexes")?;

        Ok(Self {
            conn,
            buffer: Vec::new(),
            buffer_limit: commit_interval.max(1),
        })
    }

    pub fn stage(&mut self, source: PathBuf, row: Row) {
        self.buffer.push(StagedRow { source, row });
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn should_flush(&self) -> bool {
        self.buffer.len() >= self.buffer_limit
    }

    /// Upserts every staged row in one transaction and commits it.
    ///
    /// A row that fails is reported and skipped; the rest of the batch is still
    /// committed. An error is returned only if the transaction itself fails, in
    /// which case the whole batch is lost.
    pub fn flush(&mut self) -> Result<FlushOutcome, StoreError> {
        let mut outcome = FlushOutcome::default();
        if self.buffer.is_empty() {
            return Ok(outcome);
        }

        let staged = std::mem::take(&mut self.buffer);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&schema::upsert_sql())?;
            for StagedRow { source, row } in staged {
                match write_row(&mut stmt, &row) {
                    Ok(()) => outcome.written += 1,
                    Err(error) => outcome.failures.push(WriteFailure { source, error }),
                }
            }
        }
        tx.commit()?;
        Ok(outcome)
    }

    pub fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", TABLE);
        self.conn
            .query_row(&sql, [], |row| row.get(0))
            .context("Failed to count artworks")
    }

    pub fn analyze(&self) -> Result<()> {
        self.conn.execute_batch("ANALYZE").context("Failed to analyze database")
    }

    pub fn summary(&self) -> Result<StoreSummary> {
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_public_domain = 1), 0),
                    COALESCE(SUM(department_title = ?1 AND classification_title = 'painting'), 0),
                    COALESCE(SUM(department_title = ?1 AND classification_title = 'painting'
                                 AND is_public_domain = 1), 0),
                    COALESCE(SUM(medium_display LIKE '%oil on canvas%' AND is_public_domain = 1), 0)
             FROM {}",
            TABLE
        );
        self.conn
            .query_row(&sql, params![EUROPEAN_PAINTING_DEPARTMENT], |row| {
                Ok(StoreSummary {
                    total: row.get(0)?,
                    public_domain: row.get(1)?,
                    european_paintings: row.get(2)?,
                    public_domain_european_paintings: row.get(3)?,
                    public_domain_oil_on_canvas: row.get(4)?,
                })
            })
            .context("Failed to summarize artworks")
    }

    /// Streams every stored row, in id order, as raw column values.
    pub fn for_each_row<F>(&self, mut f: F) -> Result<usize>
    where
        F: FnMut(&[SqlValue]) -> Result<()>,
    {
        let sql = format!("SELECT {} FROM {} ORDER BY id", schema::column_list(), TABLE);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut values = Vec::with_capacity(COLUMNS.len());
        let mut count = 0;
        while let Some(row) = rows.next()? {
            values.clear();
            for i in 0..COLUMNS.len() {
                values.push(row.get::<_, SqlValue>(i)?);
            }
            f(&values)?;
            count += 1;
        }
        Ok(count)
    }

    pub fn get(&self, id: i64) -> Result<Option<ArtworkRecord>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", schema::column_list(), TABLE);
        self.conn
            .query_row(&sql, params![id], read_record)
            .optional()
            .with_context(|| format!("Failed to load artwork {}", id))
    }

    /// Looks up display metadata for a set of ids. Unknown ids are simply
    /// absent from the result; no ordering is implied.
    pub fn fetch_summaries(&self, ids: &[i64]) -> Result<HashMap<i64, ArtworkSummary>> {
        let mut summaries = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(ID_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(",");
            let sql = format!(
                "SELECT id, title, artist_display, date_display, medium_display, image_id,
                        description, short_description
                 FROM {} WHERE id IN ({})",
                TABLE, placeholders
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok(ArtworkSummary {
                    id: row.get(0)?,
                    title: text_column(row, 1)?,
                    artist_display: text_column(row, 2)?,
                    date_display: text_column(row, 3)?,
                    medium_display: text_column(row, 4)?,
                    image_id: text_column(row, 5)?,
                    description: text_column(row, 6)?,
                    short_description: text_column(row, 7)?,
                })
            })?;
            for summary in rows {
                let summary = summary.context("Failed to read artwork summary")?;
                summaries.insert(summary.id, summary);
            }
        }

        Ok(summaries)
    }

    /// Full records matching `query`, ordered by start date then id.
    pub fn candidates(&self, query: &CandidateQuery) -> Result<Vec<ArtworkRecord>> {
        let mut clauses = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();

        if query.public_domain_only {
            clauses.push("is_public_domain = 1".to_string());
        }
        if query.require_image {
            clauses.push("image_id IS NOT NULL AND image_id != ''".to_string());
        }
        if !query.departments.is_empty() {
            clauses.push(format!(
                "department_title IN ({})",
                vec!["?"; query.departments.len()].join(",")
            ));
            args.extend(query.departments.iter().cloned().map(SqlValue::Text));
        }
        if let Some(from) = query.date_from {
            clauses.push("date_start >= ?".to_string());
            args.push(SqlValue::Integer(from));
        }
        if let Some(to) = query.date_to {
            clauses.push("date_start <= ?".to_string());
            args.push(SqlValue::Integer(to));
        }

        let mut sql = format!("SELECT {} FROM {}", schema::column_list(), TABLE);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY date_start, id");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            args.push(SqlValue::Integer(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(args.iter()), read_record)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read candidate artworks")?;
        Ok(records)
    }

    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> rusqlite::Result<()> {
        self.conn.flush_prepared_statement_cache();
        self.conn.execute_batch(sql)
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Vec<Vec<SqlValue>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", schema::column_list(), TABLE);
        let mut stmt = self.conn.prepare(&sql).unwrap();
        stmt.query_map([], |row| {
            (0..COLUMNS.len()).map(|i| row.get::<_, SqlValue>(i)).collect()
        })
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
    }
}

fn write_row(stmt: &mut Statement<'_>, row: &Row) -> Result<(), StoreError> {
    // A NULL id would be given a fresh rowid, so re-runs would duplicate the record.
    if row.id().is_none() {
        return Err(StoreError::MissingId);
    }
    stmt.execute(params_from_iter(row.sql_values()))?;
    Ok(())
}

fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArtworkRecord> {
    let mut values = Vec::with_capacity(COLUMNS.len());
    for (i, column) in COLUMNS.iter().enumerate() {
        let raw: SqlValue = row.get(i)?;
        values.push(FieldValue::from_sql(raw, column.kind));
    }
    Ok(Row::from_values(values).into_record())
}

fn text_column(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    let value: SqlValue = row.get(idx)?;
    Ok(match value {
        SqlValue::Null => None,
        SqlValue::Text(s) => Some(s),
        SqlValue::Integer(i) => Some(i.to_string()),
        SqlValue::Real(f) => Some(f.to_string()),
        SqlValue::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    })
}
