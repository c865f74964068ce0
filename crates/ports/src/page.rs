//! Token-paginated listings.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::PortsError;

/// One page of a listing plus the token for the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Continuation token. Absent or empty on the last page.
    #[serde(default)]
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// The last page of a listing.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// A page followed by more.
    #[must_use]
    pub fn with_next(items: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(token.into()),
        }
    }

    /// Returns `true` if no further page should be requested.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.next_token.as_deref().is_none_or(str::is_empty)
    }
}

/// Request pages until the service stops returning a token, concatenating
/// items in server order.
///
/// `fetch` receives `None` for the first page and the previous page's token
/// afterwards. The first error aborts the listing.
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, PortsError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, PortsError>>,
{
    let mut items = Vec::new();
    let mut token = None;
    let mut pages = 0usize;
    loop {
        let page = fetch(token.take()).await?;
        pages += 1;
        let done = page.is_last();
        items.extend(page.items);
        if done {
            tracing::trace!(pages, items = items.len(), "listing complete");
            return Ok(items);
        }
        token = page.next_token;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pages() -> Vec<Page<u32>> {
        vec![
            Page::with_next(vec![1, 2], "t1"),
            Page::with_next(vec![3], "t2"),
            Page::last(vec![4, 5]),
        ]
    }

    #[tokio::test]
    async fn follows_tokens_in_order() {
        let pages = pages();
        let mut seen_tokens = Vec::new();
        let items = collect_pages(|token| {
            let idx = match token.as_deref() {
                None => 0,
                Some("t1") => 1,
                Some("t2") => 2,
                Some(other) => panic!("unexpected token {other}"),
            };
            seen_tokens.push(token);
            let page = pages[idx].clone();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            seen_tokens,
            vec![None, Some("t1".to_owned()), Some("t2".to_owned())]
        );
    }

    #[tokio::test]
    async fn empty_token_ends_listing() {
        let mut calls = 0;
        let items = collect_pages(|_| {
            calls += 1;
            async { Ok(Page::with_next(vec!["a"], "")) }
        })
        .await
        .unwrap();
        assert_eq!(items, vec!["a"]);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn error_aborts_listing() {
        let mut calls = 0;
        let result: Result<Vec<u32>, _> = collect_pages(|token| {
            calls += 1;
            async move {
                match token {
                    None => Ok(Page::with_next(vec![1], "t1")),
                    Some(_) => Err(PortsError::Connection("reset".into())),
                }
            }
        })
        .await;
        assert!(matches!(result, Err(PortsError::Connection(_))));
        assert_eq!(calls, 2);
    }
}
