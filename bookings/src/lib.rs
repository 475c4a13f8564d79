pub mod config;
pub mod derive;
pub mod fetcher;
pub mod provider;
pub mod telemetry;
pub mod time;

pub use config::Config;
pub use derive::DerivedState;
pub use fetcher::{BookingSource, FetchStatus, PagedFetcher};
pub use provider::{
    Account, BookingsHandle, BookingsProvider, MyBookingNfts, ProviderError,
};
