use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::accumulate::{FlowGraph, NodeKind};
use crate::config::ResolvedSettings;
use crate::features::FeatureStats;
use crate::layout::{node_radius, ForceParams};

/// Final renderable node record; all values resolved, nothing mutated
/// after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: String,
    pub kind: NodeKind,
    pub pos: Pos2,
    pub radius: f32,
    pub is_attack_flagged: bool,
    pub dominant_attack_group: String,
    pub service: String,
    pub protocol: String,
    pub connection_count: u64,
    pub scanner_activity: u64,
    pub attacks_received: u64,
}

/// Final renderable edge with endpoint positions resolved and the
/// thickness/opacity channels normalized to [0,1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderEdge {
    pub source_pos: Pos2,
    pub target_pos: Pos2,
    pub is_attack: bool,
    pub attack_group: String,
    pub service: String,
    pub protocol: String,
    pub state: String,
    pub thickness: f64,
    pub opacity: f64,
}

/// Node-list/edge-list pair consumed by the drawing layer and the
/// inspector panel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    /// Resolves edge endpoints from frozen layout positions and applies
    /// feature normalization against the run's global statistics.
    pub fn build(
        g: &FlowGraph,
        stats: &FeatureStats,
        settings: &ResolvedSettings,
        params: &ForceParams,
    ) -> Self {
        let nodes = g
            .node_weights()
            .map(|n| RenderNode {
                id: n.id.clone(),
                kind: n.kind,
                pos: n.location,
                radius: node_radius(
                    n.features.get(settings.node_size_feature),
                    params.collide_scale,
                    params.collide_base_radius,
                ),
                is_attack_flagged: n.is_attack_flagged,
                dominant_attack_group: n.dominant_attack_group.clone(),
                service: n.service.clone(),
                protocol: n.protocol.clone(),
                connection_count: n.connection_count,
                scanner_activity: n.scanner_activity,
                attacks_received: n.attacks_received,
            })
            .collect();

        let thickness_stat = stats.get(settings.edge_thickness_feature);
        let opacity_stat = stats.get(settings.edge_opacity_feature);
        let edges = g
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = g.edge_endpoints(e)?;
                let edge = g.edge_weight(e)?;
                let source = g.node_weight(a)?;
                let target = g.node_weight(b)?;
                Some(RenderEdge {
                    source_pos: source.location,
                    target_pos: target.location,
                    is_attack: edge.is_attack,
                    attack_group: edge.attack_group.clone(),
                    service: edge.service.clone(),
                    protocol: edge.protocol.clone(),
                    state: edge.state.clone(),
                    thickness: thickness_stat
                        .normalized(edge.features.get(settings.edge_thickness_feature)),
                    opacity: opacity_stat
                        .normalized(edge.features.get(settings.edge_opacity_feature)),
                })
            })
            .collect();

        Self { nodes, edges }
    }
}
