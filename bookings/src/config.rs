use anyhow::Context;
use jiff::tz::TimeZone;
use std::time::Duration;

pub struct Config {
    /// Base url of the booking NFT indexer, e.g. `https://api.example.com/`
    pub api_endpoint: String,
    /// Account whose bookings are fetched. The CLI requires it; a provider
    /// embedded elsewhere gets the account from its wallet instead.
    pub account_address: Option<String>,
    /// Zone used to decide which calendar day it is when counting
    /// remaining nights.
    pub time_zone: TimeZone,
    /// Upper bound on a single page request.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        use std::env::var;

        let api_endpoint =
            var("API_ENDPOINT").context("API_ENDPOINT must be set")?;

        let account_address = var("ACCOUNT_ADDRESS")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let time_zone = match var("TIME_ZONE") {
            Ok(name) => TimeZone::get(&name)
                .with_context(|| format!("Unknown TIME_ZONE {name:?}"))?,
            Err(_) => TimeZone::UTC,
        };

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(
                secs.parse().context("REQUEST_TIMEOUT_SECS must be a number")?,
            ),
            Err(_) => Duration::from_secs(30),
        };

        Ok(Config {
            api_endpoint,
            account_address,
            time_zone,
            request_timeout,
        })
    }
}
