use std::collections::HashMap;

use egui::Pos2;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::Directed;
use serde::{Deserialize, Serialize};

use crate::classify::RowClass;
use crate::features::{FeatureStats, FeatureVec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Source,
    Destination,
}

/// Accumulated statistics for one source or destination bucket.
///
/// Created on the first row that maps to its id and mutated additively by
/// every later row; never removed within a run. `location` starts at the
/// origin and is written by the layout engine, after which it is frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeAggregate {
    pub id: String,
    pub kind: NodeKind,
    pub connection_count: u64,
    pub is_attack_flagged: bool,
    /// Group of the most recent attack-flagged row mapped to this node
    /// (last-attack-wins, not a majority vote).
    pub dominant_attack_group: String,
    pub service: String,
    pub protocol: String,
    /// Source side: rows flagged as attack or scanner-looking activity.
    pub scanner_activity: u64,
    /// Destination side: attack rows received.
    pub attacks_received: u64,
    /// Running per-feature sums over all rows mapped to this node.
    pub features: FeatureVec,
    pub location: Pos2,
}

impl NodeAggregate {
    fn new(id: String, kind: NodeKind, class: &RowClass) -> Self {
        Self {
            id,
            kind,
            connection_count: 0,
            is_attack_flagged: false,
            dominant_attack_group: String::new(),
            service: class.service.clone(),
            protocol: class.protocol.clone(),
            scanner_activity: 0,
            attacks_received: 0,
            features: FeatureVec::default(),
            location: Pos2::ZERO,
        }
    }

    fn absorb(&mut self, class: &RowClass, snapshot: &FeatureVec) {
        self.connection_count += 1;
        self.features.add(snapshot);
        if class.is_attack {
            self.is_attack_flagged = true;
            self.dominant_attack_group = class.attack_group.clone();
            match self.kind {
                NodeKind::Source => self.scanner_activity += 1,
                NodeKind::Destination => self.attacks_received += 1,
            }
        }
    }
}

/// One admitted row, connecting its two node buckets. Feature values are
/// the row's own snapshot, not sums.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub is_attack: bool,
    pub attack_group: String,
    pub service: String,
    pub protocol: String,
    pub state: String,
    pub features: FeatureVec,
}

pub type FlowGraph = StableGraph<NodeAggregate, EdgeRecord, Directed>;

/// Per-run streaming accumulator. Owns all mutable aggregation state for
/// the duration of one run; a new run gets a new accumulator.
#[derive(Debug, Default)]
pub struct Accumulator {
    g: FlowGraph,
    ids: HashMap<String, NodeIndex>,
    stats: FeatureStats,
    admitted: usize,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one admitted row into the graph and the global statistics.
    /// Both endpoint nodes are created before the edge referencing them,
    /// so every edge always resolves.
    pub fn ingest(
        &mut self,
        source_id: String,
        dest_id: String,
        class: &RowClass,
        snapshot: &FeatureVec,
    ) {
        let src = self.ensure_node(source_id, NodeKind::Source, class);
        let dst = self.ensure_node(dest_id, NodeKind::Destination, class);
        if let Some(n) = self.g.node_weight_mut(src) {
            n.absorb(class, snapshot);
        }
        if let Some(n) = self.g.node_weight_mut(dst) {
            n.absorb(class, snapshot);
        }
        self.g.add_edge(
            src,
            dst,
            EdgeRecord {
                is_attack: class.is_attack,
                attack_group: class.attack_group.clone(),
                service: class.service.clone(),
                protocol: class.protocol.clone(),
                state: class.state.clone(),
                features: *snapshot,
            },
        );
        self.stats.observe_row(snapshot);
        self.admitted += 1;
    }

    fn ensure_node(&mut self, id: String, kind: NodeKind, class: &RowClass) -> NodeIndex {
        if let Some(idx) = self.ids.get(&id) {
            return *idx;
        }
        let idx = self
            .g
            .add_node(NodeAggregate::new(id.clone(), kind, class));
        self.ids.insert(id, idx);
        idx
    }

    pub fn admitted(&self) -> usize {
        self.admitted
    }

    /// Finalizes the statistics and freezes the graph.
    pub fn finish(mut self) -> (FlowGraph, FeatureStats) {
        self.stats.finalize();
        (self.g, self.stats)
    }
}
