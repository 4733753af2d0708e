use serde::Serialize;

/// One page of a filtered listing, with the totals the client needs to
/// render pagination controls.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: i64, request: &PageRequest) -> Self {
        let limit = request.limit();
        Self {
            items,
            total_items,
            // Ceiling division; zero matches yield zero pages, never a
            // division by zero.
            total_pages: (total_items + limit - 1) / limit,
            current_page: request.page(),
        }
    }
}

/// Sanitized pagination parameters.
///
/// `page` is clamped to at least 1 and `limit` to `1..=MAX_LIMIT`; the raw
/// query-string values are never used directly in SQL.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_the_ceiling_of_items_over_limit() {
        let request = PageRequest::new(Some(1), Some(10));
        assert_eq!(Page::new(vec![1, 2, 3], 21, &request).total_pages, 3);
        assert_eq!(Page::new(vec![1], 20, &request).total_pages, 2);
        assert_eq!(Page::new(vec![1], 1, &request).total_pages, 1);
    }

    #[test]
    fn zero_matches_yield_zero_pages() {
        let request = PageRequest::new(Some(1), Some(10));
        let page: Page<i64> = Page::new(vec![], 0, &request);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn out_of_range_parameters_are_clamped() {
        let request = PageRequest::new(Some(0), Some(-5));
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 1);

        let request = PageRequest::new(Some(-3), Some(10_000));
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), PageRequest::MAX_LIMIT);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
        assert_eq!(PageRequest::new(None, None).offset(), 0);
    }
}
