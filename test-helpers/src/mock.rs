//! Booking NFT fixtures for the mock indexer.
//!
//! Dates are laid out around [`NOW`], the instant the mocked time source
//! starts at, so the remaining nights of each fixture are known up front:
//!
//! ```text
//!            Dec 20      Jan 1 (today)        Jan 10       Feb 1
//! alice  |--past--|         |--ongoing--|        |--future--|
//! bob                                            |--future--|
//! ```

use jiff::civil::{Date, date};
use payloads::{ApiBookingNft, BookingNftId};
use uuid::Uuid;

/// Starting instant of the mocked clock.
pub const NOW: &str = "2025-01-01T12:00:00Z";

pub const ALICE: &str = "0xa11ce";
pub const BOB: &str = "0xb0b";
pub const CHARLIE: &str = "0xc4a711e";

/// A booking for `recipient` covering `nights` nights from `start`.
pub fn booking(recipient: &str, start: Date, nights: i32) -> ApiBookingNft {
    ApiBookingNft {
        object_id: BookingNftId(format!("0x{}", Uuid::new_v4().simple())),
        recipient: recipient.into(),
        start_date: start,
        end_date: start.saturating_add(jiff::Span::new().days(nights)),
    }
}

/// Alice's bookings: one finished, one ongoing, two upcoming.
///
/// Remaining nights as of [`NOW`]: 0, 4, 3 and 7, so her voting power is
/// [`ALICE_VOTING_POWER`].
pub fn alice_bookings() -> Vec<ApiBookingNft> {
    vec![
        // Dec 20 - Dec 27, fully used
        booking(ALICE, date(2024, 12, 20), 7),
        // Dec 30 - Jan 5, nights of Jan 1..=4 remain
        booking(ALICE, date(2024, 12, 30), 6),
        booking(ALICE, date(2025, 1, 10), 3),
        booking(ALICE, date(2025, 2, 1), 7),
    ]
}

pub const ALICE_VOTING_POWER: i64 = 14;

/// Bob's bookings: a single upcoming stay.
pub fn bob_bookings() -> Vec<ApiBookingNft> {
    vec![booking(BOB, date(2025, 1, 10), 5)]
}

pub const BOB_VOTING_POWER: i64 = 5;

/// `count` one-night stays for `recipient`, every other one already over.
pub fn many_bookings(recipient: &str, count: usize) -> Vec<ApiBookingNft> {
    (0..count)
        .map(|i| {
            let start = if i % 2 == 0 {
                date(2024, 11, 1)
            } else {
                date(2025, 3, 1)
            };
            booking(recipient, start, 1)
        })
        .collect()
}
