//! Horizontal pass: assigns each node the column of the deepest path the
//! traversal reaches it by.

use super::types::{GridCell, Node, NodeId};

/// Walk from `start` assigning columns, starting at `first_column`.
///
/// A node is pushed out whenever a path arrives with a larger candidate
/// column, and its descendants are walked again. Nodes on the current path
/// are never re-entered, so loops stop at their back edge and every column
/// stays bounded by the length of a simple path. Returns the largest column
/// assigned.
pub(super) fn assign_columns<P>(
    nodes: &[Node<P>],
    cells: &mut [GridCell],
    start: NodeId,
    first_column: usize,
) -> usize {
    let mut column_count = 0;
    // (node, its column, index of the next connection to visit)
    let mut stack: Vec<(NodeId, usize, usize)> = Vec::new();
    if enter(cells, start, first_column, &mut column_count) {
        stack.push((start, first_column, 0));
    }

    while let Some(frame) = stack.last_mut() {
        let (id, column, next_idx) = *frame;
        let Some(&next) = nodes[id.0].connections.get(next_idx) else {
            cells[id.0].on_path = false;
            stack.pop();
            continue;
        };
        frame.2 += 1;
        if cells[next.0].on_path {
            continue;
        }
        if enter(cells, next, column + 1, &mut column_count) {
            stack.push((next, column + 1, 0));
        }
    }

    column_count
}

/// Move `id` out to `candidate` if that is further than its current column.
/// Returns whether its connections need walking.
fn enter(cells: &mut [GridCell], id: NodeId, candidate: usize, column_count: &mut usize) -> bool {
    let cell = &mut cells[id.0];
    if cell.column >= candidate {
        // someone already pushed this node out at least as far
        return false;
    }

    tracing::trace!(node = %id, from = cell.column, to = candidate, "column");
    cell.column = candidate;
    cell.traversed = true;
    cell.on_path = true;
    *column_count = (*column_count).max(candidate);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(count: usize, edges: &[(usize, usize)]) -> Vec<Node<usize>> {
        let mut nodes: Vec<Node<usize>> = (0..count).map(Node::new).collect();
        for &(from, to) in edges {
            nodes[from].connections.push(NodeId(to));
        }
        nodes
    }

    fn columns(nodes: &[Node<usize>]) -> Vec<usize> {
        let mut cells = vec![GridCell::default(); nodes.len()];
        assign_columns(nodes, &mut cells, NodeId(0), 1);
        cells.iter().map(|cell| cell.column).collect()
    }

    #[test]
    fn chain_gets_consecutive_columns() {
        let nodes = graph(4, &[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(columns(&nodes), vec![1, 2, 3, 4]);
    }

    #[test]
    fn longest_path_wins_over_shortcut() {
        // 0 -> 2 is visited first, then 0 -> 1 -> 2 pushes 2 out
        let nodes = graph(4, &[(0, 2), (0, 1), (1, 2), (2, 3)]);
        assert_eq!(columns(&nodes), vec![1, 2, 3, 4]);
    }

    #[test]
    fn loops_stop_at_the_back_edge() {
        let nodes = graph(3, &[(0, 1), (1, 2), (2, 0), (2, 1)]);
        assert_eq!(columns(&nodes), vec![1, 2, 3]);
    }

    #[test]
    fn self_loop_keeps_first_column() {
        let nodes = graph(1, &[(0, 0)]);
        assert_eq!(columns(&nodes), vec![1]);
    }

    #[test]
    fn reports_largest_column() {
        let nodes = graph(3, &[(0, 1), (0, 2), (1, 2)]);
        let mut cells = vec![GridCell::default(); nodes.len()];
        assert_eq!(assign_columns(&nodes, &mut cells, NodeId(0), 1), 3);
    }

    #[test]
    fn later_component_does_not_pull_nodes_in() {
        let nodes = graph(4, &[(0, 1), (1, 2), (3, 2)]);
        let mut cells = vec![GridCell::default(); nodes.len()];
        assign_columns(&nodes, &mut cells, NodeId(0), 1);
        assign_columns(&nodes, &mut cells, NodeId(3), 1);
        assert_eq!(cells[2].column, 3);
        assert_eq!(cells[3].column, 1);
    }

    #[test]
    fn long_chain_does_not_exhaust_the_stack() {
        let count = 100_000;
        let edges: Vec<(usize, usize)> = (1..count).map(|i| (i - 1, i)).collect();
        let nodes = graph(count, &edges);
        let mut cells = vec![GridCell::default(); count];
        assert_eq!(assign_columns(&nodes, &mut cells, NodeId(0), 1), count);
        assert_eq!(cells[count - 1].column, count);
        assert!(cells.iter().all(|cell| !cell.on_path));
    }
}
