//! Vertical pass: rows and subtree heights.
//!
//! The first unplaced connection of a node shares its row; every further
//! fan-out branch is stacked below the rows taken by the branches before it.
//! Join targets are placed by whichever parent reaches them first.

use super::types::{GridCell, Node, NodeId};

/// Walk from `start` placing it at `first_row`. Returns the largest row
/// assigned, or 0 when `start` already had a row.
pub(super) fn assign_rows<P>(
    nodes: &[Node<P>],
    cells: &mut [GridCell],
    start: NodeId,
    first_row: usize,
) -> usize {
    let mut row_count = 0;
    cells[start.0].traversed = true;
    if cells[start.0].row > 0 {
        return row_count;
    }
    place(cells, start, first_row, &mut row_count);

    let mut stack = vec![Frame {
        id: start,
        row: first_row,
        next_idx: 0,
        height: 0,
    }];
    while let Some(frame) = stack.last_mut() {
        if let Some(&next) = nodes[frame.id.0].connections.get(frame.next_idx) {
            frame.next_idx += 1;
            let target = &mut cells[next.0];
            if target.row == 0 && !target.traversed {
                target.traversed = true;
                let row = frame.row + frame.height;
                place(cells, next, row, &mut row_count);
                stack.push(Frame {
                    id: next,
                    row,
                    next_idx: 0,
                    height: 0,
                });
            }
            continue;
        }

        // a node with no fan-out still occupies its own row
        let height = frame.height.max(1);
        cells[frame.id.0].layout_height = height;
        stack.pop();
        if let Some(parent) = stack.last_mut() {
            parent.height += height;
        }
    }

    row_count
}

/// A node whose connections are being walked. `height` sums the rows taken
/// by the branches placed so far.
struct Frame {
    id: NodeId,
    row: usize,
    next_idx: usize,
    height: usize,
}

fn place(cells: &mut [GridCell], id: NodeId, row: usize, row_count: &mut usize) {
    tracing::trace!(node = %id, row, "row");
    cells[id.0].row = row;
    *row_count = (*row_count).max(row);
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

    fn rows(nodes: &[Node<usize>]) -> Vec<(usize, usize)> {
        let mut cells = vec![GridCell::default(); nodes.len()];
        assign_rows(nodes, &mut cells, NodeId(0), 1);
        cells
            .iter()
            .map(|cell| (cell.row, cell.layout_height))
            .collect()
    }

    #[test]
    fn chain_stays_on_one_row() {
        let nodes = graph(3, &[(0, 1), (1, 2)]);
        assert_eq!(rows(&nodes), vec![(1, 1), (1, 1), (1, 1)]);
    }

    #[test]
    fn fan_out_stacks_children() {
        let nodes = graph(4, &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(rows(&nodes), vec![(1, 3), (1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn nested_fan_out_reserves_subtree_height() {
        // 1 fans out into two rows, so 2 starts below both
        let nodes = graph(5, &[(0, 1), (0, 2), (1, 3), (1, 4)]);
        assert_eq!(
            rows(&nodes),
            vec![(1, 3), (1, 2), (3, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn join_target_is_placed_once() {
        let nodes = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert_eq!(rows(&nodes), vec![(1, 2), (1, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn cycles_terminate() {
        let nodes = graph(2, &[(0, 1), (1, 0), (1, 1)]);
        assert_eq!(rows(&nodes), vec![(1, 1), (1, 1)]);
    }

    #[test]
    fn reports_largest_row() {
        let nodes = graph(4, &[(0, 1), (0, 2), (0, 3)]);
        let mut cells = vec![GridCell::default(); nodes.len()];
        assert_eq!(assign_rows(&nodes, &mut cells, NodeId(0), 1), 3);
    }

    #[test]
    fn start_with_a_row_is_left_alone() {
        let nodes = graph(2, &[(0, 1)]);
        let mut cells = vec![GridCell::default(); nodes.len()];
        cells[0].row = 4;
        assert_eq!(assign_rows(&nodes, &mut cells, NodeId(0), 1), 0);
        assert_eq!(cells[1].row, 0);
    }

    #[test]
    fn long_chain_does_not_exhaust_the_stack() {
        let count = 100_000;
        let mut edges: Vec<(usize, usize)> = (1..count).map(|i| (i - 1, i)).collect();
        edges.extend([(0, count - 1), (1, 0), (0, count)]);
        let nodes = graph(count + 1, &edges);
        let mut cells = vec![GridCell::default(); nodes.len()];
        assert_eq!(assign_rows(&nodes, &mut cells, NodeId(0), 1), 2);
        assert!(cells[..count].iter().all(|cell| cell.row == 1));
        // the chain is the first branch, so the extra child lands below it
        assert_eq!(cells[count].row, 2);
        assert_eq!(cells[0].layout_height, 2);
    }
}
