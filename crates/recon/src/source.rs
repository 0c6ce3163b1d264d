use std::collections::HashMap;

use crate::error::ReconError;
use crate::model::{HistoryRecord, ServiceBand};

/// Where the plan and machine histories come from.
///
/// Implementors do all their IO here; the engine only sees the snapshots.
pub trait ServiceSource {
    fn plan(&self) -> Result<Vec<ServiceBand>, ReconError>;

    fn history(&self, card_id: &str) -> Result<Vec<HistoryRecord>, ReconError>;
}

/// Plan and histories held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub plan: Option<Vec<ServiceBand>>,
    pub histories: HashMap<String, Vec<HistoryRecord>>,
}

impl MemorySource {
    pub fn new(plan: Vec<ServiceBand>) -> Self {
        Self {
            plan: Some(plan),
            histories: HashMap::new(),
        }
    }

    pub fn with_history(mut self, card_id: impl Into<String>, records: Vec<HistoryRecord>) -> Self {
        self.histories.insert(card_id.into(), records);
        self
    }
}

impl ServiceSource for MemorySource {
    fn plan(&self) -> Result<Vec<ServiceBand>, ReconError> {
        self.plan
            .clone()
            .ok_or_else(|| ReconError::not_found("service plan"))
    }

    fn history(&self, card_id: &str) -> Result<Vec<HistoryRecord>, ReconError> {
        self.histories
            .get(card_id)
            .cloned()
            .ok_or_else(|| ReconError::not_found(format!("history for card {card_id}")))
    }
}
