//! Daily run and leaderboard types

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::ValidationError;

/// Leaderboard window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingCategory {
    /// Today's runs, best score first
    Daily,
    /// Sum of this week's runs (weeks start on Sunday, UTC)
    Weekly,
}

impl RankingCategory {
    pub fn code(&self) -> i32 {
        match self {
            Self::Daily => 0,
            Self::Weekly => 1,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(Self::Daily),
            1 => Ok(Self::Weekly),
            other => Err(ValidationError::InvalidVariant {
                field: "ranking category",
                value: other.to_string(),
            }),
        }
    }
}

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Ranking {
    pub rank: i64,
    pub username: String,
    pub score: i64,
    /// Always 0 for the weekly board
    pub wave: i32,
}

/// An account's best run for one day
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DailyRun {
    pub uuid: Uuid,
    pub date: NaiveDate,
    pub score: i32,
    pub wave: i32,
    /// When the current best score was first reached
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_codes() {
        assert_eq!(RankingCategory::from_code(0), Ok(RankingCategory::Daily));
        assert_eq!(RankingCategory::from_code(1), Ok(RankingCategory::Weekly));
        assert!(RankingCategory::from_code(2).is_err());
        assert!(RankingCategory::from_code(-1).is_err());
        assert_eq!(RankingCategory::Weekly.code(), 1);
    }
}
