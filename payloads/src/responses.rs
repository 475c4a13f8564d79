use crate::Cursor;
use serde::{Deserialize, Serialize};

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
    /// Some endpoints report exhaustion explicitly instead of (or as well
    /// as) nulling the cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
}

impl<T> Page<T> {
    pub fn last(data: Vec<T>) -> Self {
        Self {
            data,
            next_cursor: None,
            has_next_page: Some(false),
        }
    }

    pub fn with_cursor(data: Vec<T>, cursor: Cursor) -> Self {
        Self {
            data,
            next_cursor: Some(cursor),
            has_next_page: Some(true),
        }
    }
}

/// Extract the cursor for the page after `last_page`, or `None` once the
/// listing is exhausted.
pub fn next_page_param<T>(last_page: &Page<T>) -> Option<Cursor> {
    if last_page.has_next_page == Some(false) {
        return None;
    }
    last_page
        .next_cursor
        .as_ref()
        .filter(|cursor| !cursor.0.is_empty())
        .cloned()
}
