use egui::{Pos2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::accumulate::{FlowGraph, NodeKind};
use crate::features::Feature;

/// Tuning constants for the force simulation.
///
/// The defaults work for mid-sized flow graphs; collision and charge
/// constants in particular are tuned per dataset variant, so they are
/// parameters here rather than constants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForceParams {
    /// Fixed integration budget; there is no convergence early-exit, so
    /// the cost of a run is deterministic.
    pub iterations: u32,
    pub link_distance: f32,
    pub link_strength: f32,
    pub charge_strength: f32,
    pub charge_max_distance: f32,
    pub center_strength: f32,
    pub collide_scale: f32,
    pub collide_base_radius: f32,
    pub axis_bias_strength: f32,
    /// Target |x| for the two node columns: sources settle around
    /// `-axis_offset`, destinations around `+axis_offset`.
    pub axis_offset: f32,
    pub velocity_decay: f32,
    pub max_step: f32,
    pub epsilon: f32,
    /// Seed for the initial-placement jitter; identical seeds give
    /// identical layouts for identical graphs.
    pub seed: u64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            iterations: 300,
            link_distance: 120.0,
            link_strength: 0.5,
            charge_strength: -250.0,
            charge_max_distance: 450.0,
            center_strength: 0.03,
            collide_scale: 0.15,
            collide_base_radius: 4.0,
            axis_bias_strength: 0.02,
            axis_offset: 300.0,
            velocity_decay: 0.6,
            max_step: 30.0,
            epsilon: 1e-3,
            seed: 42,
        }
    }
}

/// Radius used both for collision separation and for rendering node size.
pub fn node_radius(feature_sum: f64, scale: f32, base: f32) -> f32 {
    feature_sum.max(0.0).sqrt() as f32 * scale + base
}

/// Runs the whole simulation over a frozen node/edge topology and writes
/// final positions back into the graph. Owns all positions and velocities
/// while stepping.
#[derive(Debug, Default)]
pub struct ForceLayout {
    params: ForceParams,
}

impl ForceLayout {
    pub fn new(params: ForceParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    /// `size_feature` selects the per-node summed feature driving the
    /// collision radius. `on_step` is called every 30 iterations with
    /// (done, total).
    pub fn run(
        &self,
        g: &mut FlowGraph,
        size_feature: Feature,
        mut on_step: impl FnMut(u32, u32),
    ) {
        let p = &self.params;
        let indices: Vec<_> = g.node_indices().collect();
        if indices.is_empty() {
            return;
        }

        let kinds: Vec<NodeKind> = indices
            .iter()
            .filter_map(|i| g.node_weight(*i).map(|n| n.kind))
            .collect();
        let radii: Vec<f32> = indices
            .iter()
            .filter_map(|i| g.node_weight(*i))
            .map(|n| {
                node_radius(
                    n.features.get(size_feature),
                    p.collide_scale,
                    p.collide_base_radius,
                )
            })
            .collect();
        let edges: Vec<(usize, usize)> = g
            .edge_indices()
            .filter_map(|e| g.edge_endpoints(e))
            .map(|(a, b)| {
                (
                    indices.iter().position(|i| *i == a).unwrap_or(0),
                    indices.iter().position(|i| *i == b).unwrap_or(0),
                )
            })
            .collect();

        let mut pos = initial_positions(&kinds, p);
        let mut vel = vec![Vec2::ZERO; indices.len()];

        for iter in 0..p.iterations {
            apply_link(&pos, &mut vel, &edges, p);
            apply_charge(&pos, &mut vel, p);
            apply_center(&pos, &mut vel, p);
            apply_collide(&pos, &mut vel, &radii, p);
            apply_axis_bias(&pos, &mut vel, &kinds, p);
            integrate(&mut pos, &mut vel, p);

            let done = iter + 1;
            if done % 30 == 0 || done == p.iterations {
                on_step(done, p.iterations);
            }
        }

        for (i, idx) in indices.iter().enumerate() {
            if let Some(n) = g.node_weight_mut(*idx) {
                n.location = pos[i];
            }
        }
    }
}

/// Two columns by node kind, staggered by per-kind rank, with a small
/// seeded jitter so coincident nodes do not lock onto the same point.
fn initial_positions(kinds: &[NodeKind], p: &ForceParams) -> Vec<Pos2> {
    let mut rng = StdRng::seed_from_u64(p.seed);
    let mut rank = [0usize; 2];
    kinds
        .iter()
        .map(|kind| {
            let (column, slot) = match kind {
                NodeKind::Source => (-p.axis_offset, &mut rank[0]),
                NodeKind::Destination => (p.axis_offset, &mut rank[1]),
            };
            let y = *slot as f32 * 40.0;
            *slot += 1;
            Pos2::new(
                column + rng.random_range(-10.0..10.0),
                y + rng.random_range(-10.0..10.0),
            )
        })
        .collect()
}

/// Spring per edge toward the target separation; nodes with many edges
/// receive cumulative pull proportional to their degree.
fn apply_link(pos: &[Pos2], vel: &mut [Vec2], edges: &[(usize, usize)], p: &ForceParams) {
    for (a, b) in edges {
        let delta = pos[*b] - pos[*a];
        let distance = delta.length().max(p.epsilon);
        let displacement = (distance - p.link_distance) / distance * p.link_strength;
        let push = delta * displacement * 0.5;
        vel[*a] += push;
        vel[*b] -= push;
    }
}

/// Pairwise inverse-distance repulsion, capped at a maximum interaction
/// distance for tractability.
fn apply_charge(pos: &[Pos2], vel: &mut [Vec2], p: &ForceParams) {
    for i in 0..pos.len() {
        for j in (i + 1)..pos.len() {
            let delta = pos[i] - pos[j];
            let distance = delta.length().max(p.epsilon);
            if distance > p.charge_max_distance {
                continue;
            }
            let force = -p.charge_strength / distance;
            let dir = delta / distance;
            vel[i] += dir * force;
            vel[j] -= dir * force;
        }
    }
}

/// Weak pull of the set centroid toward the origin.
fn apply_center(pos: &[Pos2], vel: &mut [Vec2], p: &ForceParams) {
    let n = pos.len() as f32;
    let centroid = pos.iter().fold(Vec2::ZERO, |acc, q| acc + q.to_vec2()) / n;
    for v in vel.iter_mut() {
        *v -= centroid * p.center_strength;
    }
}

/// Pushes overlapping nodes apart to their combined collision radius.
fn apply_collide(pos: &[Pos2], vel: &mut [Vec2], radii: &[f32], p: &ForceParams) {
    for i in 0..pos.len() {
        for j in (i + 1)..pos.len() {
            let min_dist = radii[i] + radii[j];
            let delta = pos[i] - pos[j];
            let distance = delta.length().max(p.epsilon);
            if distance >= min_dist {
                continue;
            }
            let push = delta / distance * (min_dist - distance) * 0.5;
            vel[i] += push;
            vel[j] -= push;
        }
    }
}

/// Separates the bipartite halves into two columns and flattens the
/// vertical spread.
fn apply_axis_bias(pos: &[Pos2], vel: &mut [Vec2], kinds: &[NodeKind], p: &ForceParams) {
    for ((q, v), kind) in pos.iter().zip(vel.iter_mut()).zip(kinds.iter()) {
        let target_x = match kind {
            NodeKind::Source => -p.axis_offset,
            NodeKind::Destination => p.axis_offset,
        };
        v.x += (target_x - q.x) * p.axis_bias_strength;
        v.y += -q.y * p.axis_bias_strength;
    }
}

fn integrate(pos: &mut [Pos2], vel: &mut [Vec2], p: &ForceParams) {
    for (q, v) in pos.iter_mut().zip(vel.iter_mut()) {
        *v *= p.velocity_decay;
        let mut step = *v;
        if step.length() > p.max_step {
            step = step.normalized() * p.max_step;
        }
        let next = *q + step;
        if next.x.is_finite() && next.y.is_finite() {
            *q = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulate::Accumulator;
    use crate::classify::RowClass;
    use crate::features::FeatureVec;

    fn sample_class() -> RowClass {
        RowClass {
            is_attack: false,
            attack_group: "other".to_owned(),
            service: "http".to_owned(),
            protocol: "tcp".to_owned(),
            state: "FIN".to_owned(),
            packets_total: 1.0,
            bytes_total: 1.0,
        }
    }

    fn sample_graph() -> FlowGraph {
        let mut acc = Accumulator::new();
        let c = sample_class();
        let mut snap = FeatureVec::default();
        snap.set(Feature::BytesTotal, 100.0);
        acc.ingest("src_0".into(), "dest_0".into(), &c, &snap);
        acc.ingest("src_1".into(), "dest_0".into(), &c, &snap);
        acc.ingest("src_0".into(), "dest_1".into(), &c, &snap);
        acc.finish().0
    }

    #[test]
    fn layout_is_deterministic_for_fixed_seed() {
        let params = ForceParams {
            iterations: 60,
            ..Default::default()
        };
        let mut g1 = sample_graph();
        let mut g2 = sample_graph();
        ForceLayout::new(params).run(&mut g1, Feature::BytesTotal, |_, _| {});
        ForceLayout::new(params).run(&mut g2, Feature::BytesTotal, |_, _| {});
        for (a, b) in g1.node_weights().zip(g2.node_weights()) {
            assert_eq!(a.location, b.location);
        }
    }

    #[test]
    fn seed_changes_layout() {
        let mut g1 = sample_graph();
        let mut g2 = sample_graph();
        let base = ForceParams {
            iterations: 30,
            ..Default::default()
        };
        ForceLayout::new(base).run(&mut g1, Feature::BytesTotal, |_, _| {});
        ForceLayout::new(ForceParams { seed: 7, ..base }).run(
            &mut g2,
            Feature::BytesTotal,
            |_, _| {},
        );
        let moved = g1
            .node_weights()
            .zip(g2.node_weights())
            .any(|(a, b)| a.location != b.location);
        assert!(moved, "different seeds should perturb the layout");
    }

    #[test]
    fn sources_end_left_of_destinations() {
        let mut g = sample_graph();
        ForceLayout::new(ForceParams::default()).run(&mut g, Feature::BytesTotal, |_, _| {});
        for n in g.node_weights() {
            match n.kind {
                NodeKind::Source => assert!(n.location.x < 0.0, "{} at {:?}", n.id, n.location),
                NodeKind::Destination => {
                    assert!(n.location.x > 0.0, "{} at {:?}", n.id, n.location);
                }
            }
        }
    }

    #[test]
    fn progress_fires_every_thirty_iterations() {
        let mut g = sample_graph();
        let mut calls = Vec::new();
        ForceLayout::new(ForceParams::default()).run(&mut g, Feature::BytesTotal, |done, total| {
            calls.push((done, total));
        });
        assert_eq!(calls.len(), 10);
        assert_eq!(calls[0], (30, 300));
        assert_eq!(*calls.last().unwrap(), (300, 300));
    }

    #[test]
    fn positions_stay_finite() {
        let mut g = sample_graph();
        ForceLayout::new(ForceParams {
            charge_strength: -1e6,
            ..Default::default()
        })
        .run(&mut g, Feature::BytesTotal, |_, _| {});
        for n in g.node_weights() {
            assert!(n.location.x.is_finite() && n.location.y.is_finite());
        }
    }

    #[test]
    fn collision_radius_scales_with_feature() {
        let small = node_radius(0.0, 0.15, 4.0);
        let large = node_radius(10_000.0, 0.15, 4.0);
        assert_eq!(small, 4.0);
        assert!(large > small);
    }

    #[test]
    fn empty_graph_is_a_noop() {
        let mut g = FlowGraph::default();
        ForceLayout::new(ForceParams::default()).run(&mut g, Feature::BytesTotal, |_, _| {
            panic!("no progress expected for an empty graph");
        });
    }

    #[test]
    fn repulsion_pushes_nodes_apart() {
        let pos = vec![Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0)];
        let mut vel = vec![Vec2::ZERO; 2];
        apply_charge(&pos, &mut vel, &ForceParams::default());
        assert!(vel[0].x < 0.0);
        assert!(vel[1].x > 0.0);
    }

    #[test]
    fn link_pulls_distant_endpoints_together() {
        let pos = vec![Pos2::new(0.0, 0.0), Pos2::new(500.0, 0.0)];
        let mut vel = vec![Vec2::ZERO; 2];
        apply_link(&pos, &mut vel, &[(0, 1)], &ForceParams::default());
        assert!(vel[0].x > 0.0);
        assert!(vel[1].x < 0.0);
    }
}
