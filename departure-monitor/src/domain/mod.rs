//! Canonical record types for the departure monitor.
//!
//! Every source adapter produces these types, whatever its upstream wire
//! format. Records live for one aggregation cycle only; nothing here
//! carries identity from one cycle to the next.

mod departure;
mod mode;
mod notice;

pub use departure::{CANCELLED_DELAY, Departure};
pub use mode::ModeOfTransport;
pub use notice::{Notice, NoticeCategory};
