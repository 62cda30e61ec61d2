//! aurrpc server library — configuration, routing, the query engine, and
//! the periodic jobs.
#![deny(warnings, clippy::all, clippy::pedantic)]
#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod handlers;
pub mod jobs;
pub mod limiter;
pub mod models;
pub mod params;
pub mod query;
pub mod router;
pub mod state;
