//! Response ledger: records, CSV codec and persistence backends

pub mod backend;
pub mod github;
pub mod local;
pub mod record;
pub mod store;

pub use backend::LedgerBackend;
pub use github::{ContentApi, GitHubContentsApi, RemoteFile, RemoteLedgerStore};
pub use local::LocalLedgerStore;
pub use record::{ResponseLedger, ResponseRecord, LEDGER_HEADER, TIMESTAMP_FORMAT};
pub use store::{AppendReceipt, ResponseStore};
