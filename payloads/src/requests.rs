use crate::Cursor;
use serde::{Deserialize, Serialize};

/// Filter for the booking NFT listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingNftListingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl BookingNftListingQuery {
    pub fn for_recipient(recipient: impl Into<String>) -> Self {
        Self {
            recipient: Some(recipient.into()),
        }
    }
}

/// Query string for a single page request. Absent fields are left out of
/// the url entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingNftListingParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl BookingNftListingParams {
    pub fn new(query: &BookingNftListingQuery, cursor: Option<&Cursor>) -> Self {
        Self {
            recipient: query.recipient.clone(),
            cursor: cursor.cloned(),
        }
    }
}
