//! Persistence strategies for the response ledger

use crate::error::Result;
use crate::ledger::record::{ResponseLedger, ResponseRecord};
use serde::Serialize;
use std::future::Future;

/// Outcome of a successful append.
#[derive(Debug, Clone, Serialize)]
pub struct AppendReceipt {
    /// Ledger length after the append
    pub records: usize,
    pub location: String,
    /// Version token of the written blob, when the backend has one
    pub version: Option<String>,
    /// Number of read-modify-write rounds it took
    pub attempts: u32,
}

/// A ledger backend. Every append rewrites the full ledger.
pub trait ResponseStore {
    fn load(&self) -> impl Future<Output = Result<ResponseLedger>> + Send;

    fn append(&self, record: ResponseRecord) -> impl Future<Output = Result<AppendReceipt>> + Send;

    fn location(&self) -> String;
}
