// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! bucketsort: browser-driven image triage
//!
//! Images found under the input directories are shown one at a time and moved
//! into per-bucket folders under the output directory, with undo.

pub mod buckets;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod web;

pub use config::AppConfig;
pub use engine::Sorter;
pub use error::{Result, SortError};
