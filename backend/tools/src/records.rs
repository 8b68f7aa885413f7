//! Client record store: intake records and per-client portfolio revisions.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Rough urgency of a matter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    pub id: String,
    pub client_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub matter_description: String,
    pub matter_type: Option<String>,
    pub urgency: Option<Urgency>,
    pub created_at: DateTime<Utc>,
}

/// One recorded change to a client's portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRevision {
    pub number: u64,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub client_id: String,
    pub revisions: Vec<PortfolioRevision>,
}

/// Backend for client records. A production store owns its own locking.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_intake(&self, record: IntakeRecord) -> Result<IntakeRecord>;
    async fn get_intake(&self, id: &str) -> Result<Option<IntakeRecord>>;
    async fn portfolio(&self, client_id: &str) -> Result<PortfolioSnapshot>;
    /// Revision details and intake matters for the client containing `query`.
    async fn search(&self, client_id: &str, query: &str) -> Result<Vec<String>>;
    async fn append_revision(&self, client_id: &str, details: &str) -> Result<PortfolioRevision>;
}

/// In-memory record store.
pub struct InMemoryRecordStore {
    intakes: Arc<RwLock<HashMap<String, IntakeRecord>>>,
    portfolios: Arc<RwLock<HashMap<String, Vec<PortfolioRevision>>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self {
            intakes: Arc::new(RwLock::new(HashMap::new())),
            portfolios: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn intake_count(&self) -> usize {
        self.intakes.read().await.len()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn create_intake(&self, record: IntakeRecord) -> Result<IntakeRecord> {
        self.intakes
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_intake(&self, id: &str) -> Result<Option<IntakeRecord>> {
        Ok(self.intakes.read().await.get(id).cloned())
    }

    async fn portfolio(&self, client_id: &str) -> Result<PortfolioSnapshot> {
        let revisions = self
            .portfolios
            .read()
            .await
            .get(client_id)
            .cloned()
            .unwrap_or_default();
        Ok(PortfolioSnapshot {
            client_id: client_id.to_string(),
            revisions,
        })
    }

    async fn search(&self, client_id: &str, query: &str) -> Result<Vec<String>> {
        let needle = query.to_lowercase();
        let mut hits: Vec<String> = self
            .portfolios
            .read()
            .await
            .get(client_id)
            .map(|revs| {
                revs.iter()
                    .filter(|r| r.details.to_lowercase().contains(&needle))
                    .map(|r| format!("revision {}: {}", r.number, r.details))
                    .collect()
            })
            .unwrap_or_default();

        let intakes = self.intakes.read().await;
        let mut matters: Vec<&IntakeRecord> = intakes
            .values()
            .filter(|i| i.id == client_id || i.email.eq_ignore_ascii_case(client_id))
            .filter(|i| i.matter_description.to_lowercase().contains(&needle))
            .collect();
        matters.sort_by_key(|i| i.created_at);
        hits.extend(
            matters
                .into_iter()
                .map(|i| format!("intake {}: {}", i.id, i.matter_description)),
        );
        Ok(hits)
    }

    async fn append_revision(&self, client_id: &str, details: &str) -> Result<PortfolioRevision> {
        let mut portfolios = self.portfolios.write().await;
        let revisions = portfolios.entry(client_id.to_string()).or_default();
        let revision = PortfolioRevision {
            number: revisions.len() as u64 + 1,
            details: details.to_string(),
            recorded_at: Utc::now(),
        };
        revisions.push(revision.clone());
        Ok(revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn revisions_are_numbered_per_client() {
        let store = InMemoryRecordStore::new();
        assert_eq!(store.append_revision("c-1", "new address").await.unwrap().number, 1);
        assert_eq!(store.append_revision("c-1", "new phone").await.unwrap().number, 2);
        assert_eq!(store.append_revision("c-2", "first").await.unwrap().number, 1);
        assert_eq!(store.portfolio("c-1").await.unwrap().revisions.len(), 2);
    }

    #[tokio::test]
    async fn search_matches_revisions_case_insensitively() {
        let store = InMemoryRecordStore::new();
        store.append_revision("c-1", "Signed Lease addendum").await.unwrap();
        store.append_revision("c-1", "Paid retainer").await.unwrap();
        let hits = store.search("c-1", "lease").await.unwrap();
        assert_eq!(hits, vec!["revision 1: Signed Lease addendum".to_string()]);
    }
}
