//! Append-only audit journal of registry mutations
//!
//! Every successful mutation is recorded as `(sequence, time, actor, action)`.
//! Replaying a journal rebuilds the registry, which is how state survives
//! between separately confirmed deployment steps.

use crate::errors::*;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// A single registry mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalAction {
    Genesis { owner: Principal },
    SetAddress { name: String, address: Address },
    Reserve { name: String },
    Freeze { name: String },
    AddAlias { alias: String, canonical: String },
    RemoveAlias { alias: String },
    TransferOwnership { new_owner: Principal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRecord {
    pub sequence: u64,
    /// Unix seconds
    pub recorded_at: u64,
    pub actor: Principal,
    pub action: JournalAction,
}

impl JournalRecord {
    pub fn new(sequence: u64, actor: Principal, action: JournalAction) -> Self {
        Self {
            sequence,
            recorded_at: chrono::Utc::now().timestamp().max(0) as u64,
            actor,
            action,
        }
    }
}

/// Storage backend for journal records
pub trait JournalSink: Send + Sync {
    /// Durably append one record. Records arrive in sequence order.
    fn append(&mut self, record: &JournalRecord) -> Result<()>;

    /// All records in sequence order
    fn records(&self) -> Result<Vec<JournalRecord>>;
}

/// In-memory journal
#[derive(Debug, Clone, Default)]
pub struct MemoryJournal {
    records: Vec<JournalRecord>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<JournalRecord>) -> Self {
        Self { records }
    }
}

impl JournalSink for MemoryJournal {
    fn append(&mut self, record: &JournalRecord) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn records(&self) -> Result<Vec<JournalRecord>> {
        Ok(self.records.clone())
    }
}

/// Journal stored in a sled tree, keyed by big-endian sequence number
#[cfg(feature = "persistent")]
#[derive(Clone)]
pub struct SledJournal {
    db: sled::Db,
}

#[cfg(feature = "persistent")]
impl SledJournal {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = sled::open(path).map_err(|e| RegistryError::Journal(e.to_string()))?;
        Ok(Self { db })
    }
}

#[cfg(feature = "persistent")]
impl JournalSink for SledJournal {
    fn append(&mut self, record: &JournalRecord) -> Result<()> {
        let data = serde_json::to_vec(record)?;
        self.db
            .insert(record.sequence.to_be_bytes(), data)
            .map_err(|e| RegistryError::Journal(e.to_string()))?;
        self.db
            .flush()
            .map_err(|e| RegistryError::Journal(e.to_string()))?;
        Ok(())
    }

    fn records(&self) -> Result<Vec<JournalRecord>> {
        let mut records = Vec::new();
        for item in self.db.iter() {
            let (_, value) = item.map_err(|e| RegistryError::Journal(e.to_string()))?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}
