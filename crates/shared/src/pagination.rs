//! Offset pagination utilities.

use serde::Deserialize;

/// Response header carrying the total number of matches before pagination.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// Default page size used by comment and history listings.
pub const DEFAULT_LIMIT: i64 = 10;

/// Limit/offset window. `limit = None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

impl Page {
    pub fn new(limit: Option<i64>, offset: i64) -> Self {
        Self { limit, offset }
    }

    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Applies the window to an already filtered and sorted vector.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset.max(0)).unwrap_or(usize::MAX);
        let iter = items.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter
                .take(usize::try_from(limit.max(0)).unwrap_or(usize::MAX))
                .collect(),
            None => iter.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_page_returns_everything() {
        let page = Page::unlimited();
        assert_eq!(page.apply(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn test_limit_and_offset() {
        let page = Page::new(Some(2), 1);
        assert_eq!(page.apply(vec![1, 2, 3, 4]), vec![2, 3]);
    }

    #[test]
    fn test_offset_past_end() {
        let page = Page::new(Some(5), 10);
        assert!(page.apply(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn test_zero_limit() {
        let page = Page::new(Some(0), 0);
        assert!(page.apply(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn test_deserialize_defaults() {
        let page: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(page, Page::unlimited());

        let page: Page = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(page, Page::new(Some(5), 0));
    }
}
