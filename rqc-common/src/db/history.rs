//! Classification history
//!
//! Every prediction, typed or uploaded, is appended here. Entries are
//! addressed by their 0-based position in recording order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::model::{ClassificationResult, ClassificationSummary, Label};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::{Error, Result};

/// Where a history entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySource {
    /// Single statement typed into the form
    Text,
    /// Row of an uploaded spreadsheet
    Upload,
}

impl HistorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistorySource::Text => "text",
            HistorySource::Upload => "upload",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "text" => Ok(HistorySource::Text),
            "upload" => Ok(HistorySource::Upload),
            other => Err(Error::Internal(format!("Unknown history source: {}", other))),
        }
    }
}

/// One recorded prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub requirement: String,
    pub prediction: Label,
    pub source: HistorySource,
    pub recorded_at: DateTime<Utc>,
}

/// One page of history, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub entries: Vec<HistoryEntry>,
    /// Position of the first entry on this page
    pub first_index: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_entries: i64,
}

type HistoryRow = (String, String, String, String);

/// History persistence
#[derive(Clone)]
pub struct HistoryStore {
    db: SqlitePool,
}

impl HistoryStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Record a single typed requirement
    pub async fn record_text(&self, requirement: &str, prediction: Label) -> Result<()> {
        self.record(HistorySource::Text, [(requirement, prediction)])
            .await
    }

    /// Record every row of an upload, in row order
    pub async fn record_results(&self, results: &[ClassificationResult]) -> Result<()> {
        self.record(
            HistorySource::Upload,
            results
                .iter()
                .map(|r| (r.row.text.as_str(), r.label))
                .collect::<Vec<_>>(),
        )
        .await
    }

    async fn record<'a, I>(&self, source: HistorySource, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Label)>,
    {
        let recorded_at = Utc::now().to_rfc3339();
        let mut tx = self.db.begin().await?;
        let mut count = 0usize;

        for (requirement, label) in entries {
            sqlx::query(
                "INSERT INTO history (requirement, label, source, recorded_at) VALUES (?, ?, ?, ?)",
            )
            .bind(requirement)
            .bind(label.as_str())
            .bind(source.as_str())
            .bind(&recorded_at)
            .execute(&mut *tx)
            .await?;
            count += 1;
        }

        tx.commit().await?;
        tracing::debug!(count, source = source.as_str(), "History entries recorded");
        Ok(())
    }

    /// Total number of entries
    pub async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM history")
            .fetch_one(&self.db)
            .await?;
        Ok(total)
    }

    /// Fetch one page of entries (page number is clamped into range)
    pub async fn page(&self, requested_page: i64) -> Result<HistoryPage> {
        let total_entries = self.count().await?;
        let pagination = calculate_pagination(total_entries, requested_page);

        let rows: Vec<HistoryRow> = sqlx::query_as(
            "SELECT requirement, label, source, recorded_at FROM history ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(PAGE_SIZE)
        .bind(pagination.offset)
        .fetch_all(&self.db)
        .await?;

        let entries = rows
            .into_iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(HistoryPage {
            entries,
            first_index: pagination.offset,
            page: pagination.page,
            page_size: PAGE_SIZE,
            total_pages: pagination.total_pages,
            total_entries,
        })
    }

    /// Remove the entry at 0-based position `index`
    pub async fn remove_at(&self, index: i64) -> Result<HistoryEntry> {
        if index < 0 {
            return Err(Error::NotFound(format!("History entry {} does not exist", index)));
        }

        let mut tx = self.db.begin().await?;

        let row: Option<(i64, String, String, String, String)> = sqlx::query_as(
            "SELECT id, requirement, label, source, recorded_at FROM history ORDER BY id LIMIT 1 OFFSET ?",
        )
        .bind(index)
        .fetch_optional(&mut *tx)
        .await?;

        let (id, requirement, label, source, recorded_at) = row.ok_or_else(|| {
            Error::NotFound(format!("History entry {} does not exist", index))
        })?;

        sqlx::query("DELETE FROM history WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(index, "History entry deleted");
        entry_from_row((requirement, label, source, recorded_at))
    }

    /// FR/NFR counts over the whole history
    pub async fn summary(&self) -> Result<ClassificationSummary> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT label, COUNT(*) FROM history GROUP BY label")
                .fetch_all(&self.db)
                .await?;

        let mut functional = 0u64;
        let mut non_functional = 0u64;
        for (label, count) in rows {
            match label.parse::<Label>() {
                Ok(Label::Functional) => functional += count as u64,
                Ok(Label::NonFunctional) => non_functional += count as u64,
                Err(e) => tracing::warn!(label = %label, error = %e, "Skipping unknown history label"),
            }
        }

        Ok(ClassificationSummary::new(functional, non_functional))
    }
}

fn entry_from_row((requirement, label, source, recorded_at): HistoryRow) -> Result<HistoryEntry> {
    let prediction = label
        .parse::<Label>()
        .map_err(|e| Error::Internal(format!("Corrupt history label: {}", e)))?;
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map_err(|e| Error::Internal(format!("Corrupt history timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(HistoryEntry {
        requirement,
        prediction,
        source: HistorySource::parse(&source)?,
        recorded_at,
    })
}
