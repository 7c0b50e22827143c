//! Paginated collections: `posts/feed`, `posts/profile/{id}`,
//! `comments/{post_id}`, `profiles/top`.

use std::collections::HashSet;

use crate::model::{Entity, Id, Page};

/// Where a locally created item goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Head,
    Tail,
}

/// An ordered, id-unique result list plus the cursor to its next page.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Next page; `None` once the listing is exhausted.
    pub cursor: Option<String>,
    /// First-page request the items came from.
    pub query: String,
    /// Unique per `load`; responses for any other generation are stale.
    pub generation: u64,
    /// First page in flight.
    pub loading: bool,
    /// A `load_more` is in flight.
    pub loading_more: bool,
    /// Message from the last failed fetch.
    pub error: Option<String>,
}

impl<T: Entity> Paginated<T> {
    /// Empty collection waiting for the first page of `query`.
    pub fn loading(query: impl Into<String>, generation: u64) -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            query: query.into(),
            generation,
            loading: true,
            loading_more: false,
            error: None,
        }
    }

    /// Loaded collection from a page already in hand.
    pub fn from_page(query: impl Into<String>, page: Page<T>) -> Self {
        let mut collection = Self::loading(query, 0);
        collection.loading = false;
        collection.merge_page(page);
        collection
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn get(&self, id: Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Append a page. Items already present keep their position and
    /// content; the page's cursor replaces the old one.
    pub fn merge_page(&mut self, page: Page<T>) {
        let mut seen: HashSet<Id> = self.items.iter().map(Entity::id).collect();
        for item in page.results {
            if seen.insert(item.id()) {
                self.items.push(item);
            }
        }
        self.cursor = page.next;
    }

    /// Apply `f` to the item with `id`. Returns whether it was found.
    pub fn patch(&mut self, id: Id, f: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    /// Insert a new item. An item whose id is already present is ignored.
    pub fn insert(&mut self, item: T, end: End) -> bool {
        if self.contains(item.id()) {
            return false;
        }
        match end {
            End::Head => self.items.insert(0, item),
            End::Tail => self.items.push(item),
        }
        true
    }

    pub fn remove(&mut self, id: Id) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }
}
