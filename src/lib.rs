//! A small blocking Rust client for Redfin's internal ("stingray") API.
//!
//! Every call is one HTTP GET. JSON bodies arrive behind a fixed 4-character
//! preamble that is stripped before parsing; the search export is returned as
//! raw CSV bytes. A few helpers reshape payloads (photo URLs, month-labelled
//! estimates, the region id of a search match).
//!
//! ## Quick start
//! - Redfin blocks requests without a browser-like user-agent. Set one via
//!   [`ClientConfig::with_user_agent`], the `REDFIN_USER_AGENT` environment
//!   variable, or a `.redfinrc` file (current directory or home directory).
//!
//! ```no_run
//! use anyhow::Result;
//! use redfin::{Client, PropertyType, Region, RegionType};
//!
//! fn main() -> Result<()> {
//!     let client = Client::from_env()?;
//!     let search = client.search("Albany, NY")?;
//!     let region_id = client.region_id_from_search(&search)?;
//!     let region = Region::new(RegionType::City, region_id);
//!     let trends = client.get_region_trends(&region, Some(PropertyType::House))?;
//!     println!("{trends:#}");
//!     Ok(())
//! }
//! ```
//!
//! The API is undocumented and may change without notice; payloads are returned
//! as [`serde_json::Value`] without schema validation.

#![forbid(unsafe_code)]

mod client;
mod config;
mod error;
mod params;
mod payload;
mod search;
mod util;

pub use client::{Client, ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use params::{
    HousingMarketGraph, ParamValue, Params, PropertyRef, PropertyType, Region, RegionType,
};
pub use payload::{
    ESTIMATE_WINDOW, MonthlyEstimate, label_estimates, month_labels, photo_urls,
    region_id_from_search,
};
pub use search::SearchResultsQuery;
