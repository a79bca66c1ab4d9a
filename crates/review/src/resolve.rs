//! Document row resolution within a client bundle.
//!
//! Mutation targets arrive with whatever reference the caller has: a row id,
//! an external file id, or just a filename and upload date. Resolution walks
//! those rules in priority order and the first rule yielding exactly one
//! match wins. A rule matching more than one row is an explicit error, never
//! a silent first-match.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use veridoc_core::{EmailAddress, EngineError, EngineResult};

use crate::document::DocumentRow;

/// All reviewable documents for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBundle {
    pub client: EmailAddress,
    pub rows: Vec<DocumentRow>,
}

impl DocumentBundle {
    pub fn new(client: EmailAddress) -> Self {
        Self {
            client,
            rows: Vec::new(),
        }
    }

    /// Resolve a reference to the index of exactly one row.
    pub fn resolve(&self, reference: &DocumentRef) -> EngineResult<usize> {
        if let Some(row_id) = reference.row_id {
            if let Some(index) = self.resolve_rule(|row| row.row_id == row_id)? {
                return Ok(index);
            }
        }

        if let Some(file_id) = reference.external_file_id.as_deref() {
            let hit = self.resolve_rule(|row| row.external_file_id.as_deref() == Some(file_id))?;
            if let Some(index) = hit {
                return Ok(index);
            }
        }

        if let Some((name, date)) = reference.file_name_and_date.as_ref() {
            let hit = self.resolve_rule(|row| {
                row.file_name == *name && row.uploaded_at.date_naive() == *date
            })?;
            if let Some(index) = hit {
                return Ok(index);
            }
        }

        Err(EngineError::not_found())
    }

    /// Apply one rule: `Ok(Some(i))` on a unique hit, `Ok(None)` on zero
    /// hits (fall through to the next rule), `Conflict` on an ambiguous one.
    fn resolve_rule<F>(&self, rule: F) -> EngineResult<Option<usize>>
    where
        F: Fn(&DocumentRow) -> bool,
    {
        let mut hits = self.rows.iter().enumerate().filter(|(_, row)| rule(row));

        match (hits.next(), hits.next()) {
            (Some((index, _)), None) => Ok(Some(index)),
            (Some(_), Some(_)) => Err(EngineError::conflict(
                "document reference matches more than one row",
            )),
            (None, _) => Ok(None),
        }
    }
}

/// Priority-chained reference to a document row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DocumentRef {
    pub row_id: Option<Uuid>,
    pub external_file_id: Option<String>,
    pub file_name_and_date: Option<(String, NaiveDate)>,
}

impl DocumentRef {
    pub fn by_row_id(row_id: Uuid) -> Self {
        Self {
            row_id: Some(row_id),
            ..Default::default()
        }
    }

    pub fn by_external_file_id(file_id: impl Into<String>) -> Self {
        Self {
            external_file_id: Some(file_id.into()),
            ..Default::default()
        }
    }

    pub fn by_file_name_and_date(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            file_name_and_date: Some((name.into(), date)),
            ..Default::default()
        }
    }
}
