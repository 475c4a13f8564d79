pub mod api_client;
pub mod requests;
pub mod responses;

pub use api_client::{APIClient, ClientError};
pub use responses::{Page, next_page_param};

use derive_more::Display;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// On-chain object id of a booking NFT.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BookingNftId(pub String);

/// Opaque continuation token handed out by the listing endpoint.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cursor(pub String);

/// A booking NFT as returned by the API.
///
/// The booked nights run from `start_date` up to, but not including,
/// `end_date` (the check-out day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBookingNft {
    pub object_id: BookingNftId,
    /// Address of the account holding the NFT.
    pub recipient: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl ApiBookingNft {
    /// Total nights covered by the booking.
    pub fn nights(&self) -> i64 {
        nights_between(self.start_date, self.end_date)
    }

    /// Nights of the booking that have not been used up as of `today`.
    ///
    /// A booking that has not started yet counts every night; an ongoing
    /// booking counts tonight onwards; a finished booking counts zero.
    pub fn remaining_nights(&self, today: Date) -> i64 {
        let from = self.start_date.max(today);
        nights_between(from, self.end_date)
    }
}

fn nights_between(from: Date, to: Date) -> i64 {
    if to <= from {
        return 0;
    }
    i64::from((to - from).get_days())
}
