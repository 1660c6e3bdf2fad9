//! Leaderboard pagination
//!
//! Pages are 1-indexed with a fixed size of ten rows.

use super::ValidationError;

/// Rows per leaderboard page
pub const PAGE_SIZE: u32 = 10;

/// A validated leaderboard page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page(u32);

impl Page {
    pub const FIRST: Page = Page(1);

    /// Page numbers start at 1.
    pub fn new(page: i64) -> Result<Self, ValidationError> {
        u32::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .map(Self)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "page".into(),
                min: 1,
                max: i64::from(u32::MAX),
            })
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> i64 {
        (i64::from(self.0) - 1) * i64::from(PAGE_SIZE)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> i64 {
        i64::from(PAGE_SIZE)
    }
}

/// Number of pages needed for `rows` eligible rows: `ceil(rows / 10)`.
pub fn page_count(rows: i64) -> i64 {
    if rows <= 0 {
        0
    } else {
        (rows + i64::from(PAGE_SIZE) - 1) / i64::from(PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_calculation() {
        assert_eq!(Page::new(1).unwrap().offset(), 0);
        assert_eq!(Page::new(2).unwrap().offset(), 10);
        assert_eq!(Page::new(5).unwrap().offset(), 40);
        assert_eq!(Page::FIRST.limit(), 10);
    }

    #[test]
    fn rejects_page_zero_and_negative() {
        assert!(Page::new(0).is_err());
        assert!(Page::new(-3).is_err());
    }

    #[test]
    fn page_counts() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(10), 1);
        assert_eq!(page_count(11), 2);
        assert_eq!(page_count(23), 3);
        assert_eq!(page_count(100), 10);
    }
}
