use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::utils::urls::with_page;

pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw `page` / `limit` query parameters
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Resolved window into a result set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

impl PageParams {
    pub fn resolve(&self, default_limit: i64) -> Result<PageRequest, ServiceError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(ServiceError::NotFound("Invalid page.".to_string()));
        }
        let limit = match self.limit {
            Some(limit) if limit >= 1 => limit.min(MAX_PAGE_SIZE),
            _ => default_limit,
        };
        // The window end must fit in i64 so offset arithmetic cannot overflow
        (page - 1)
            .checked_mul(limit)
            .and_then(|offset| offset.checked_add(limit))
            .ok_or_else(|| ServiceError::NotFound("Invalid page.".to_string()))?;
        Ok(PageRequest { page, limit })
    }
}

/// Page envelope with absolute links to the neighbouring pages
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Any page other than the first must contain at least one item
    pub fn new(
        results: Vec<T>,
        count: i64,
        request: PageRequest,
        current_url: &str,
    ) -> Result<Self, ServiceError> {
        if request.page > 1 && request.offset() >= count {
            return Err(ServiceError::NotFound("Invalid page.".to_string()));
        }

        let next = if request.offset() + request.limit < count {
            with_page(current_url, request.page + 1)
        } else {
            None
        };
        let previous = if request.page > 1 {
            with_page(current_url, request.page - 1)
        } else {
            None
        };

        Ok(Self {
            count,
            next,
            previous,
            results,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost/api/recipes?limit=2&page=2";

    #[test]
    fn test_resolve_defaults_and_caps() {
        let request = PageParams::default().resolve(6).unwrap();
        assert_eq!(request, PageRequest { page: 1, limit: 6 });
        assert_eq!(request.offset(), 0);

        let capped = PageParams { page: Some(3), limit: Some(1_000) }.resolve(6).unwrap();
        assert_eq!(capped.limit, MAX_PAGE_SIZE);
        assert_eq!(capped.offset(), 2 * MAX_PAGE_SIZE);

        let zero_limit = PageParams { page: None, limit: Some(0) }.resolve(6).unwrap();
        assert_eq!(zero_limit.limit, 6);

        assert!(PageParams { page: Some(0), limit: None }.resolve(6).is_err());
    }

    #[test]
    fn test_huge_page_is_not_found() {
        let result = PageParams { page: Some(i64::MAX), limit: None }.resolve(6);
        assert!(matches!(result, Err(ServiceError::NotFound(msg)) if msg == "Invalid page."));

        let result = PageParams { page: Some(i64::MAX / 100 + 2), limit: Some(100) }.resolve(6);
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        let last = PageParams { page: Some(1_000_000), limit: Some(100) }.resolve(6).unwrap();
        let page = Paginated::<i32>::new(vec![], 3, last, URL);
        assert!(matches!(page, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn test_links_in_the_middle() {
        let page = Paginated::new(vec![3, 4], 5, PageRequest { page: 2, limit: 2 }, URL).unwrap();
        assert_eq!(page.count, 5);
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost/api/recipes?limit=2&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost/api/recipes?limit=2")
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = Paginated::new(vec![5], 5, PageRequest { page: 3, limit: 2 }, URL).unwrap();
        assert!(page.next.is_none());
        assert!(page.previous.is_some());
    }

    #[test]
    fn test_page_past_the_end() {
        let result = Paginated::<i32>::new(vec![], 4, PageRequest { page: 3, limit: 2 }, URL);
        assert!(matches!(result, Err(ServiceError::NotFound(_))));

        // an empty first page is fine
        let empty = Paginated::<i32>::new(vec![], 0, PageRequest { page: 1, limit: 2 }, URL).unwrap();
        assert!(empty.next.is_none() && empty.previous.is_none());
    }

    #[test]
    fn test_map() {
        let page = Paginated::new(vec![1, 2], 2, PageRequest { page: 1, limit: 6 }, URL)
            .unwrap()
            .map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
    }
}
