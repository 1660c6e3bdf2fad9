//! Repository implementations for store access
//!
//! Each repository follows these patterns:
//! - Single-statement upserts via ON CONFLICT (no check-then-insert)
//! - Constraint violations translated at the call site (unique → Conflict,
//!   foreign key → NotFound)
//! - Units of work only where a sequence must be all-or-nothing

pub mod accounts;
pub mod sessions;
pub mod stats;
pub mod daily;
pub mod saves;

pub use accounts::AccountRepo;
pub use sessions::{SessionRepo, SESSION_TTL_DAYS};
pub use stats::{StatsRepo, ACTIVE_WINDOW_MINUTES};
pub use daily::DailyRepo;
pub use saves::SaveDataRepo;
