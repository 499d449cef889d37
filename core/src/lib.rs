//! pricer-core — pricing engine for a dropship seller-operations backend.
//!
//! The core turns raw supplier cost-feed rows into channel-specific sell
//! prices: feed bytes -> decoded text -> parsed rows -> normalized records
//! -> priced records -> output rows. Configuration (column mapping, margins,
//! fee tables, rounding mode) is supplied per invocation and never mutated
//! by the pipeline. Transport concerns (HTTP, UI) live elsewhere.

pub mod calculator;
pub mod config;
pub mod error;
pub mod feed;
pub mod fees;
pub mod mapping;
pub mod money;
pub mod normalize;
pub mod pipeline;
pub mod shipping;
pub mod store;
pub mod types;
