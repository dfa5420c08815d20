//! Optional row balancing.
//!
//! Moves nodes down toward the middle of the rows their transitions lead to
//! and the rows they are fed from, so fan-outs spread above and below the
//! node instead of hanging beneath it. This is a best-effort cosmetic pass:
//! it only ever moves rows down, the sweep counts are capped, and it may
//! put two nodes into the same cell.

use super::types::{GridCell, Node};

/// Alternate transition and feed balancing for at most `passes` rounds.
/// Returns the total number of row moves; `row_count` is raised to cover
/// any row pushed past it.
pub(super) fn balance_vertical<P>(
    nodes: &[Node<P>],
    cells: &mut [GridCell],
    row_count: &mut usize,
    passes: usize,
) -> usize {
    let targets: Vec<Vec<usize>> = nodes
        .iter()
        .map(|node| node.connections.iter().map(|id| id.0).collect())
        .collect();
    let feeds = collect_feeds(nodes);
    let max_sweeps = nodes.len() + 1;

    let mut total = 0;
    let mut rounds = 0;
    let mut changes = 1;
    while changes > 0 && rounds < passes {
        changes = balance_toward(&targets, cells, row_count, max_sweeps, 1);
        total += changes;
        if changes > 0 {
            changes = balance_toward(&feeds, cells, row_count, max_sweeps, 2);
            total += changes;
        }
        rounds += 1;
    }
    tracing::debug!(rounds, moves = total, "balanced rows");
    total
}

/// Inbound sources of every node, one entry per connection. Self-loops are
/// not feeds.
fn collect_feeds<P>(nodes: &[Node<P>]) -> Vec<Vec<usize>> {
    let mut feeds = vec![Vec::new(); nodes.len()];
    for (source, node) in nodes.iter().enumerate() {
        for next in &node.connections {
            if next.0 != source {
                feeds[next.0].push(source);
            }
        }
    }
    feeds
}

/// Center each node on the row range covered by its `neighbors`.
///
/// Only ranges spanning at least `min_range` rows are considered. When the
/// range is even there is no middle row, so neighbors at or below the new
/// row are pushed down one to make room.
fn balance_toward(
    neighbors: &[Vec<usize>],
    cells: &mut [GridCell],
    row_count: &mut usize,
    max_sweeps: usize,
    min_range: usize,
) -> usize {
    let mut changes = 0;
    let mut sweeps = 0;
    let mut sweep_changes = 1;

    while sweep_changes > 0 && sweeps < max_sweeps {
        sweep_changes = 0;
        for (id, list) in neighbors.iter().enumerate() {
            let rows = list.iter().map(|&other| cells[other].row);
            let (Some(min), Some(max)) = (rows.clone().min(), rows.max()) else {
                continue;
            };

            let range = max - min + 1;
            let balanced = min + range / 2;
            if range < min_range || balanced <= cells[id].row {
                continue;
            }

            cells[id].row = balanced;
            sweep_changes += 1;

            if range % 2 == 0 {
                for &other in list {
                    if other != id && cells[other].row >= balanced {
                        cells[other].row += 1;
                        *row_count = (*row_count).max(cells[other].row);
                    }
                }
            }
        }
        changes += sweep_changes;
        sweeps += 1;
    }
    changes
}
