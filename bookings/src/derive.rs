use payloads::ApiBookingNft;

/// Aggregates computed from the fetched booking NFTs.
///
/// `voting_power` and `active` are `None` exactly when the list itself has
/// not resolved, so "not known yet" stays distinct from "known to be zero".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedState {
    pub last: Option<ApiBookingNft>,
    /// Sum of remaining nights over `active`.
    pub voting_power: Option<i64>,
    /// Bookings with at least one remaining night, in list order.
    pub active: Option<Vec<ApiBookingNft>>,
}

impl DerivedState {
    pub fn derive(
        records: Option<&[ApiBookingNft]>,
        remaining_nights: impl Fn(&ApiBookingNft) -> i64,
    ) -> Self {
        let Some(records) = records else {
            return Self::default();
        };

        let mut voting_power = 0;
        let mut active = Vec::new();
        for record in records {
            let nights = remaining_nights(record);
            if nights > 0 {
                voting_power += nights;
                active.push(record.clone());
            }
        }

        Self {
            last: records.last().cloned(),
            voting_power: Some(voting_power),
            active: Some(active),
        }
    }
}
