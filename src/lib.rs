//! # Flora Host
//!
//! Relays the FloraPro device's Blynk virtual pins (environment, soil
//! moisture and real-time clock) to a small web dashboard.
//!
//! Every request to the dashboard polls all sixteen pins concurrently; a pin
//! that cannot be read shows up as 0 rather than failing the whole poll.

pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod relay;
pub mod scatter;
pub mod server;
