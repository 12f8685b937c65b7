use serde::{Deserialize, Serialize};

use crate::classify::{RowClass, DEST_PORT_COLUMN};
use crate::table::RawRow;

/// How rows are bucketed into source/destination nodes.
///
/// A closed set: exactly one strategy is active per run, and every variant
/// is a pure function of (row index, row content, context) to an id pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingStrategy {
    /// Round-robin over the configured node counts. The destination side
    /// prefers `dst_port % num_dest_nodes` when the port column parses.
    #[default]
    Modulo,
    /// Contiguous index ranges proportional to the total row count;
    /// approximates temporal grouping for time-ordered tables.
    Sequential,
    /// One destination bucket per distinct service (or literal port when
    /// the service tag is unhelpful). May produce more destination nodes
    /// than `num_dest_nodes`.
    Service,
}

/// Inputs a strategy needs beyond the row itself.
#[derive(Debug, Clone, Copy)]
pub struct GroupingContext {
    pub num_source_nodes: usize,
    pub num_dest_nodes: usize,
    /// Estimate of the total data rows in this run; drives the
    /// `Sequential` bucket widths.
    pub total_rows: usize,
}

fn bucket(index: usize, buckets: usize, total: usize) -> usize {
    if total == 0 || buckets == 0 {
        return 0;
    }
    (index * buckets / total).min(buckets - 1)
}

fn dest_port(row: &RawRow<'_, '_>) -> Option<u64> {
    row.get(DEST_PORT_COLUMN)?.parse::<u64>().ok()
}

impl GroupingStrategy {
    /// Maps a row to its (source id, destination id) pair. `row_index` is
    /// the 1-based data-row ordinal (the row's line number minus the
    /// header), which is what the bucket arithmetic is defined over.
    pub fn assign(
        self,
        row_index: usize,
        row: &RawRow<'_, '_>,
        class: &RowClass,
        ctx: &GroupingContext,
    ) -> (String, String) {
        let ns = ctx.num_source_nodes.max(1);
        let nd = ctx.num_dest_nodes.max(1);
        match self {
            GroupingStrategy::Modulo => {
                let src = format!("src_{}", row_index % ns);
                let dst = match dest_port(row) {
                    Some(port) => format!("dest_{}", port as usize % nd),
                    None => format!("dest_{}", row_index % nd),
                };
                (src, dst)
            }
            GroupingStrategy::Sequential => {
                let ordinal = row_index.saturating_sub(1);
                let src = format!("src_{}", bucket(ordinal, ns, ctx.total_rows));
                let dst = format!("dest_{}", bucket(ordinal, nd, ctx.total_rows));
                (src, dst)
            }
            GroupingStrategy::Service => {
                let src = format!("src_{}", row_index % ns);
                let dst = if class.service != "other" && class.service != "-" {
                    format!("svc_{}", class.service)
                } else if let Some(port) = dest_port(row) {
                    format!("port_{port}")
                } else {
                    format!("dest_{}", row_index % nd)
                };
                (src, dst)
            }
        }
    }
}
