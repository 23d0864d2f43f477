//! db-rest departures adapter.
//!
//! [db-rest](https://github.com/derhuerst/db-rest) exposes Deutsche Bahn
//! departure boards as FPTF JSON. Key characteristics:
//! - Times are ISO 8601 with offset; `when` is the expected time and is
//!   absent for cancelled trips
//! - `delay` is in seconds and absent without real-time data
//! - Line names carry operator prefixes (`"Bus 146"`, `"STR 107"`) that the
//!   board does not show

mod client;
mod convert;
mod types;

pub use client::{DbRestAdapter, DbRestParams};
pub use convert::{ConversionError, ConvertOptions, convert_departures};
pub use types::{
    DeparturesResponse, FptfDeparture, FptfLine, FptfRemark, FptfStation, FptfStop,
};
