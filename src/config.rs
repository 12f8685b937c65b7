use serde::{Deserialize, Serialize};

use crate::classify::RowFilter;
use crate::error::ConfigError;
use crate::features::Feature;
use crate::grouping::GroupingStrategy;

/// User-facing configuration for one aggregation run.
///
/// Feature channels are named by column so the struct round-trips through
/// persisted app state; `resolve` maps them to descriptors up front and
/// rejects unknown names before any row is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSettings {
    pub max_rows: usize,
    pub num_source_nodes: usize,
    pub num_dest_nodes: usize,
    pub grouping: GroupingStrategy,
    pub node_size_feature: String,
    pub edge_thickness_feature: String,
    pub edge_opacity_feature: String,
    pub filter_min_packets: f64,
    pub filter_min_bytes: f64,
    pub show_only_attacks: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            max_rows: 5000,
            num_source_nodes: 20,
            num_dest_nodes: 15,
            grouping: GroupingStrategy::default(),
            node_size_feature: Feature::BytesTotal.column().to_owned(),
            edge_thickness_feature: Feature::PacketsTotal.column().to_owned(),
            edge_opacity_feature: Feature::BytesTotal.column().to_owned(),
            filter_min_packets: 0.0,
            filter_min_bytes: 0.0,
            show_only_attacks: false,
        }
    }
}

impl GraphSettings {
    pub fn resolve(&self) -> Result<ResolvedSettings, ConfigError> {
        if self.num_source_nodes == 0 || self.num_dest_nodes == 0 {
            return Err(ConfigError::ZeroNodeCount);
        }
        if self.max_rows == 0 {
            return Err(ConfigError::ZeroRowCap);
        }
        let feature = |name: &str| {
            Feature::from_column(name)
                .ok_or_else(|| ConfigError::UnknownFeature(name.to_owned()))
        };
        Ok(ResolvedSettings {
            max_rows: self.max_rows,
            num_source_nodes: self.num_source_nodes,
            num_dest_nodes: self.num_dest_nodes,
            grouping: self.grouping,
            node_size_feature: feature(&self.node_size_feature)?,
            edge_thickness_feature: feature(&self.edge_thickness_feature)?,
            edge_opacity_feature: feature(&self.edge_opacity_feature)?,
            filter: RowFilter {
                min_packets: self.filter_min_packets,
                min_bytes: self.filter_min_bytes,
                attacks_only: self.show_only_attacks,
            },
        })
    }
}

/// Validated configuration with feature descriptors baked in.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSettings {
    pub max_rows: usize,
    pub num_source_nodes: usize,
    pub num_dest_nodes: usize,
    pub grouping: GroupingStrategy,
    pub node_size_feature: Feature,
    pub edge_thickness_feature: Feature,
    pub edge_opacity_feature: Feature,
    pub filter: RowFilter,
}
