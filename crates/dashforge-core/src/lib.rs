//! Configuration resolution engine for Dashforge.
//!
//! Takes a sparse dashboard configuration plus a [`LayerStore`] of defaults
//! and produces one fully resolved attribute set per metric:
//!
//! - [`MetricCode`]: normalizes `market.PriceUsdClose` and
//!   `/market/price_usd_close` to one canonical key
//! - [`Pattern`]: `*` wildcards over canonical codes
//! - [`Resolver`]: applies layers in fixed precedence order
//! - [`Assembler`]: expands a [`DashboardConfig`] into a [`DashboardDocument`]
//!
//! Nothing in this crate touches the filesystem or network.

mod assemble;
mod code;
mod error;
mod layers;
mod pattern;
mod resolve;
mod value;

pub use assemble::{Assembler, DashboardConfig, DashboardDocument, DashboardMeta, MetricSpec};
pub use code::MetricCode;
pub use error::{Error, Result};
pub use layers::{CompositeKey, LayerStore, PatternRule};
pub use pattern::Pattern;
pub use resolve::{MetricEntry, ResolvedMetricConfig, Resolver};
pub use value::{attrs, overlay, AttrValue, Attributes};
