//! Remote index: existing pages under the parent, keyed by title.
//!
//! Built once per run and read-only afterwards. Titles are the only identity
//! key, so when the store lists two pages with the same title the one listed
//! last wins. Such titles are recorded in [`RemoteIndex::duplicates`] and
//! logged.

use std::collections::{BTreeSet, HashMap};

use mdsync_core::PageId;

use crate::error::StoreError;
use crate::store::{DocumentStore, RemoteChild, LIST_PAGE_SIZE};

/// Title → page id snapshot of the parent container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteIndex {
    pages: HashMap<String, PageId>,
    duplicates: BTreeSet<String>,
    degraded: bool,
}

impl RemoteIndex {
    /// Fold a listing into an index, in listing order.
    ///
    /// Non-page entries and pages without a title are skipped.
    pub fn from_children<I>(children: I) -> Self
    where
        I: IntoIterator<Item = RemoteChild>,
    {
        children
            .into_iter()
            .filter(RemoteChild::is_page)
            .fold(Self::default(), |mut index, child| {
                if let Some(title) = child.title {
                    if index.pages.insert(title.clone(), child.id).is_some() {
                        index.duplicates.insert(title);
                    }
                }
                index
            })
    }

    /// An empty index standing in for a listing that failed.
    pub fn degraded() -> Self {
        Self {
            degraded: true,
            ..Self::default()
        }
    }

    pub fn get(&self, title: &str) -> Option<&PageId> {
        self.pages.get(title)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Titles that appeared more than once in the listing.
    pub fn duplicates(&self) -> impl Iterator<Item = &str> {
        self.duplicates.iter().map(String::as_str)
    }

    /// Whether the listing failed and every document will be created.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// List the parent's children and index its pages.
///
/// Fails open: a listing error yields a degraded, empty index and a warning,
/// never an error.
pub fn build_index<S>(store: &S, parent_id: &str) -> RemoteIndex
where
    S: DocumentStore + ?Sized,
{
    fail_open(store.list_children(parent_id, LIST_PAGE_SIZE))
}

fn fail_open(listing: Result<Vec<RemoteChild>, StoreError>) -> RemoteIndex {
    match listing {
        Ok(children) => {
            let index = RemoteIndex::from_children(children);
            for title in index.duplicates() {
                tracing::warn!("duplicate remote title \"{title}\": using the last listed page");
            }
            index
        }
        Err(err) => {
            tracing::warn!("could not list existing pages, treating every document as new: {err}");
            RemoteIndex::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(id: &str, title: &str) -> RemoteChild {
        RemoteChild {
            id: PageId::from(id),
            kind: "child_page".into(),
            title: Some(title.into()),
        }
    }

    #[test]
    fn indexes_only_titled_pages() {
        let index = RemoteIndex::from_children(vec![
            page("p1", "Intro"),
            RemoteChild {
                id: PageId::from("b1"),
                kind: "paragraph".into(),
                title: None,
            },
            RemoteChild {
                id: PageId::from("p2"),
                kind: "child_page".into(),
                title: None,
            },
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Intro"), Some(&PageId::from("p1")));
        assert!(!index.is_degraded());
    }

    #[test]
    fn last_listed_duplicate_wins() {
        let index = RemoteIndex::from_children(vec![
            page("first", "Same"),
            page("other", "Other"),
            page("last", "Same"),
        ]);
        assert_eq!(index.get("Same"), Some(&PageId::from("last")));
        assert_eq!(index.duplicates().collect::<Vec<_>>(), vec!["Same"]);
    }

    #[test]
    fn listing_failure_fails_open() {
        let index = fail_open(Err(StoreError::Transport {
            endpoint: "GET /blocks/x/children".into(),
            message: "connection refused".into(),
        }));
        assert!(index.is_empty());
        assert!(index.is_degraded());
    }
}
