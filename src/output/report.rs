//! Report structures handed to the formatters

use crate::ledger::record::{ResponseLedger, ResponseRecord};
use serde::Serialize;

/// Previously recorded responses, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseListing {
    pub location: String,
    pub total: usize,
    pub records: Vec<ResponseRecord>,
}

impl ResponseListing {
    pub fn from_ledger(ledger: &ResponseLedger, location: impl Into<String>, limit: Option<usize>) -> Self {
        let records = ledger
            .sorted_for_display()
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Self {
            location: location.into(),
            total: ledger.len(),
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
