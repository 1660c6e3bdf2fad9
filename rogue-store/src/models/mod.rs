//! Domain models with validation at construction
//!
//! Loose caller input (JSON stat payloads, legacy string codes, page
//! numbers) is validated when creating these types. Invalid input returns
//! ValidationError before anything reaches the store.

pub mod validation;
pub mod account;
pub mod token;
pub mod stats;
pub mod ranking;
pub mod pagination;
pub mod save;

pub use validation::ValidationError;
pub use account::{Account, Credentials, TrainerIds, Username};
pub use token::{SessionToken, TOKEN_LEN};
pub use stats::{AccountStats, StatCounter, StatCounters, VoucherDeltas, VoucherTier};
pub use ranking::{DailyRun, Ranking, RankingCategory};
pub use pagination::{page_count, Page, PAGE_SIZE};
pub use save::{SaveRecord, SessionSlot, SESSION_SLOTS};
