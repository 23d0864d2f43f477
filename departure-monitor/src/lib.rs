//! Departure monitor aggregation engine.
//!
//! Collects departures from several independent transit backends at once,
//! merges them into one ranked list sized for a fixed-line display, and
//! synthesizes the rider-facing notices that go with it.

pub mod adapters;
pub mod board;
pub mod config;
pub mod domain;
pub mod engine;
pub mod source;

#[cfg(test)]
mod testing;
