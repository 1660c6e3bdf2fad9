//! Opaque save-data records

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::ValidationError;

/// Number of session save slots per account
pub const SESSION_SLOTS: i16 = 5;

/// Session save slot (0-4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionSlot(i16);

impl SessionSlot {
    pub fn new(slot: i64) -> Result<Self, ValidationError> {
        i16::try_from(slot)
            .ok()
            .filter(|s| (0..SESSION_SLOTS).contains(s))
            .map(Self)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "slot".into(),
                min: 0,
                max: i64::from(SESSION_SLOTS - 1),
            })
    }

    pub fn get(&self) -> i16 {
        self.0
    }
}

/// Stored blob and when it was last written
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SaveRecord {
    pub data: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}
