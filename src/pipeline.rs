use instant::Instant;
use log::info;

use crate::accumulate::{Accumulator, FlowGraph};
use crate::classify::{classify, feature_snapshot};
use crate::config::GraphSettings;
use crate::error::ConfigError;
use crate::features::FeatureStats;
use crate::grouping::GroupingContext;
use crate::layout::{ForceLayout, ForceParams};
use crate::render::RenderGraph;

/// Coarse progress stages reported during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Row filtering and aggregation; reported every 100 rows.
    Rows,
    /// Layout iterations; reported every 30 of the configured budget.
    Layout,
}

/// Everything one run produces. The graph and stats back the inspector
/// panel; the render graph is what the drawing layer consumes.
#[derive(Debug)]
pub struct RunOutput {
    pub graph: FlowGraph,
    pub stats: FeatureStats,
    pub render: RenderGraph,
}

/// Executes stages 2-5 over an in-memory table: classify and filter rows,
/// accumulate the bipartite graph and global statistics in one streaming
/// pass, run the layout, and build the render records.
///
/// All aggregation state lives in a fresh per-run accumulator; rerunning
/// with a changed configuration recomputes from scratch, nothing is
/// merged across runs. Configuration problems surface here before any row
/// is read; malformed data never aborts a run.
pub fn run(
    settings: &GraphSettings,
    params: &ForceParams,
    text: &str,
    mut progress: impl FnMut(Stage, f32),
) -> Result<RunOutput, ConfigError> {
    let resolved = settings.resolve()?;
    let started = Instant::now();

    let table = crate::table::TableReader::new(text, resolved.max_rows);
    let total_rows = table.row_count();
    let ctx = GroupingContext {
        num_source_nodes: resolved.num_source_nodes,
        num_dest_nodes: resolved.num_dest_nodes,
        total_rows,
    };

    let mut acc = Accumulator::new();
    for (i, row) in table.rows().enumerate() {
        let class = classify(&row);
        let visited = i + 1;
        if resolved.filter.admits(&class) {
            let snapshot = feature_snapshot(&row);
            // 1-based data-row ordinal, per the grouping contract
            let (source_id, dest_id) = resolved.grouping.assign(visited, &row, &class, &ctx);
            acc.ingest(source_id, dest_id, &class, &snapshot);
        }
        if visited % 100 == 0 || visited == total_rows {
            progress(Stage::Rows, percent(visited, total_rows));
        }
    }
    info!(
        "aggregated {} of {total_rows} rows under {:?} grouping",
        acc.admitted(),
        resolved.grouping
    );

    let (mut graph, stats) = acc.finish();
    ForceLayout::new(*params).run(&mut graph, resolved.node_size_feature, |done, total| {
        progress(Stage::Layout, percent(done as usize, total as usize));
    });

    let render = RenderGraph::build(&graph, &stats, &resolved, params);
    info!(
        "run finished: {} nodes, {} edges in {:.1?}",
        render.nodes.len(),
        render.edges.len(),
        started.elapsed()
    );

    Ok(RunOutput {
        graph,
        stats,
        render,
    })
}

fn percent(done: usize, total: usize) -> f32 {
    if total == 0 {
        return 100.0;
    }
    done as f32 / total as f32 * 100.0
}
