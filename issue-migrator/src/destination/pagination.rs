//! Cursor pagination over `Link` response headers.
//!
//! A listing endpoint is modelled as a function from a cursor (`None` for the
//! first page, otherwise the `rel="next"` URL of the previous response) to a
//! [`Page`]. [`pages`] turns such a function into a lazy stream that yields
//! one item batch per request and ends when a page carries no next cursor.

use futures::stream::{self, Stream};
use std::future::Future;

/// One page of a listing plus the cursor of the following page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

/// Lazily walks every page reachable from the first one.
///
/// Nothing is requested until the stream is polled, and dropping the stream
/// stops the walk. Each call starts again from the first page.
pub fn pages<T, E, F, Fut>(mut fetch: F) -> impl Stream<Item = Result<Vec<T>, E>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    stream::try_unfold(Cursor::Start, move |cursor| {
        let request = match cursor {
            Cursor::Start => Some(fetch(None)),
            Cursor::Next(url) => Some(fetch(Some(url))),
            Cursor::Exhausted => None,
        };

        async move {
            let Some(request) = request else {
                return Ok(None);
            };
            let page = match request.await {
                Ok(page) => page,
                Err(e) => return Err(e),
            };
            let cursor = match page.next {
                Some(url) => Cursor::Next(url),
                None => Cursor::Exhausted,
            };
            Ok(Some((page.items, cursor)))
        }
    })
}

/// Extracts the `rel="next"` target from a `Link` header value.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim().replace(' ', "");
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')?
            .strip_suffix('>')
            .map(str::to_string)
    })
}
