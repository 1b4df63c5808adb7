//! Record DTO.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Entity;

/// Processing state of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Processed,
}

/// A record as stored, published and returned by the API.
///
/// A body without `id` deserializes to the nil id (rejected by the store);
/// a body without `status` starts out pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Status,
}

impl Record {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            status: Status::Pending,
        }
    }

    pub fn set_processed(&mut self) {
        self.status = Status::Processed;
    }
}

impl Entity for Record {
    fn id(&self) -> Uuid {
        self.id
    }
}
