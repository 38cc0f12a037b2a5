//! # ranger-server
//!
//! HTTP server library for the ranger nearby-device tracker.
//!
//! This library provides the API handlers, shared state, and the registry
//! sweep task used by the `ranger-server` binary.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod api;
pub mod logging;
pub mod state;
pub mod sweep;
