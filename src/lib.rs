//! Core library for the monday-tools command line application.
//!
//! The library drives Monday.com boards from spreadsheets: the API client
//! lives under [`api`], launch date arithmetic in [`dates`], the production
//! plan in [`plan`], tabular IO adapters under [`io`], department board
//! generation in [`generate`], and the two synchronisation workflows in
//! [`sync`] and [`duplicate`].

pub mod api;
pub mod config;
pub mod dates;
pub mod duplicate;
pub mod error;
pub mod generate;
pub mod io;
pub mod model;
pub mod plan;
pub mod sync;

pub use error::{Result, ToolError};
