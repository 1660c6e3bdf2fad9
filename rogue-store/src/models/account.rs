//! Account identity and credential types

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::ValidationError;

/// Maximum username length (matches `VARCHAR(32)`)
const MAX_USERNAME_LEN: usize = 32;

/// Validated username (1-32 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        if s.chars().count() > MAX_USERNAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_USERNAME_LEN,
            });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Password hash and salt as stored. The store never compares these.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub hash: [u8; 32],
    pub salt: [u8; 16],
}

impl Credentials {
    pub fn new(hash: [u8; 32], salt: [u8; 16]) -> Self {
        Self { hash, salt }
    }

    /// Rebuild from column bytes, rejecting anything not 32/16 bytes wide.
    pub fn from_slices(hash: &[u8], salt: &[u8]) -> Result<Self, ValidationError> {
        let hash = hash.try_into().map_err(|_| ValidationError::InvalidFormat {
            field: "hash".into(),
            reason: "must be 32 bytes",
        })?;
        let salt = salt.try_into().map_err(|_| ValidationError::InvalidFormat {
            field: "salt".into(),
            reason: "must be 16 bytes",
        })?;
        Ok(Self { hash, salt })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

/// Gameplay trainer/secret id pair, assigned once per account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerIds {
    pub trainer_id: i32,
    pub secret_id: i32,
}

impl TrainerIds {
    /// Fresh random 16-bit pair.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Self {
            trainer_id: i32::from(rng.gen::<u16>()),
            secret_id: i32::from(rng.gen::<u16>()),
        }
    }
}

/// Account record from database (credentials excluded)
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub trainer_ids: Option<TrainerIds>,
    pub registered: DateTime<Utc>,
    pub last_logged_in: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub banned: bool,
}
