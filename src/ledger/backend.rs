//! Store selection from configuration

use crate::config::{Config, StorageBackend};
use crate::error::Result;
use crate::ledger::github::{GitHubContentsApi, RemoteLedgerStore};
use crate::ledger::local::LocalLedgerStore;
use crate::ledger::record::{ResponseLedger, ResponseRecord};
use crate::ledger::store::{AppendReceipt, ResponseStore};
use log::debug;

/// The ledger backend chosen at startup.
pub enum LedgerBackend {
    Local(LocalLedgerStore),
    Remote(RemoteLedgerStore<GitHubContentsApi>),
}

impl LedgerBackend {
    /// Build the configured backend, or `kind` when given.
    pub fn from_config(config: &Config, kind: Option<StorageBackend>) -> Result<Self> {
        match kind.unwrap_or(config.storage.backend) {
            StorageBackend::Local => {
                debug!("Using local ledger at {}", config.storage.local_path.display());
                Ok(Self::Local(LocalLedgerStore::new(config.storage.local_path.clone())))
            }
            StorageBackend::Remote => {
                let token = config.github_token()?;
                let store = RemoteLedgerStore::github(config.storage.github.clone(), &token)?;
                debug!("Using remote ledger at {}", store.location());
                Ok(Self::Remote(store))
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl ResponseStore for LedgerBackend {
    async fn load(&self) -> Result<ResponseLedger> {
        match self {
            Self::Local(store) => store.load().await,
            Self::Remote(store) => store.load().await,
        }
    }

    async fn append(&self, record: ResponseRecord) -> Result<AppendReceipt> {
        match self {
            Self::Local(store) => store.append(record).await,
            Self::Remote(store) => store.append(record).await,
        }
    }

    fn location(&self) -> String {
        match self {
            Self::Local(store) => store.location(),
            Self::Remote(store) => store.location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;
    use crate::ledger::record::tests::sample_record;

    #[tokio::test]
    async fn test_local_backend_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.local_path = dir.path().join("responses.csv");

        let backend = LedgerBackend::from_config(&config, None).unwrap();
        assert!(!backend.is_remote());

        let receipt = backend
            .append(sample_record("Ana", "Lee", "2025-03-01 10:00:00"))
            .await
            .unwrap();
        assert_eq!(receipt.records, 1);
        assert_eq!(backend.load().await.unwrap().len(), 1);
    }

    #[test]
    fn test_remote_backend_requires_token() {
        let mut config = Config::default();
        config.storage.github.token_env = "COMPETENCY_SURVEY_TEST_UNSET_TOKEN".to_string();

        let err = LedgerBackend::from_config(&config, Some(StorageBackend::Remote))
            .err()
            .unwrap();
        assert!(matches!(err, SurveyError::Configuration(_)));
    }
}
