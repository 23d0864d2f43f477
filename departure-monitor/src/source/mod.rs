//! Source adapter contract.
//!
//! A source adapter talks to one physical backend and returns departures,
//! loose notices and side data in the canonical shape. Adapters are
//! grouped into [`SourcePath`]s: one logical feed with an ordered chain of
//! fallbacks (adapter plus ordered parameter sets to try).

mod adapter;
mod error;
mod path;

pub use adapter::{SideData, SourceAdapter, SourceData};
pub use error::AdapterError;
pub use path::SourcePath;
