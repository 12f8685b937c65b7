//! Aggregation and layout core for interactive network-flow explorers.
//!
//! Feed a labeled flow table (CSV text) to [`pipeline::run`] and get back
//! a laid-out bipartite source/destination graph plus immutable render
//! records with feature-normalized visual channels. Drawing, input
//! widgets, and page chrome are the embedding application's job.

mod accumulate;
mod camera;
mod classify;
mod config;
mod error;
mod features;
mod fetch;
mod grouping;
mod layout;
pub mod metrics;
mod pipeline;
mod render;
mod table;

pub use self::accumulate::{Accumulator, EdgeRecord, FlowGraph, NodeAggregate, NodeKind};
pub use self::camera::Camera;
pub use self::classify::{classify, feature_snapshot, RowClass, RowFilter};
pub use self::config::{GraphSettings, ResolvedSettings};
pub use self::error::{ConfigError, FetchError};
pub use self::features::{Feature, FeatureStat, FeatureStats, FeatureVec};
pub use self::fetch::{fetch_metrics_table, fetch_table, DEFAULT_TIMEOUT};
pub use self::grouping::{GroupingContext, GroupingStrategy};
pub use self::layout::{node_radius, ForceLayout, ForceParams};
pub use self::metrics::FeatureQuality;
pub use self::pipeline::{run, RunOutput, Stage};
pub use self::render::{RenderEdge, RenderGraph, RenderNode};
pub use self::table::{RawRow, TableReader};
