#![allow(clippy::cast_possible_truncation)]
//! Layout for Dashforge dashboards.
//!
//! Places charts on the platform's tile grid in declaration order.

mod grid;

pub use grid::{auto_place, GridPlacer, GridTemplate, LayoutItem};
