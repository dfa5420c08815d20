//! Grid layout for workflow and state diagrams.
//!
//! A diagram is a list of [`Node`]s with ordered outbound connections. The
//! layout runs in two walks from a single root: the horizontal walk gives
//! every node the column of the deepest path that reaches it, the vertical
//! walk gives it a row, stacking fan-out branches below each other. Cells
//! are then sized to their largest node and nodes are centered inside them.
//!
//! Typical use: add one node per model object, connect them, call
//! [`StateDiagram::layout`], then copy each node's placement back into the
//! model.

mod balance;
mod error;
mod ranking;
mod rows;
mod sizing;
mod types;

pub use error::LayoutError;
pub use sizing::{CharCountSizer, FontMetricsSizer, NodeSize, NodeSizeCalculator, SizeRequest};
pub use types::{Grid, GridCell, LayoutSummary, Node, NodeId, Placement};

use crate::config::LayoutConfig;

pub struct StateDiagram<P> {
    nodes: Vec<Node<P>>,
    config: LayoutConfig,
    sizer: Option<Box<dyn NodeSizeCalculator>>,
    cells: Vec<GridCell>,
    grid: Grid,
}

impl<P> Default for StateDiagram<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: std::fmt::Debug> std::fmt::Debug for StateDiagram<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDiagram")
            .field("nodes", &self.nodes)
            .field("config", &self.config)
            .field("custom_sizer", &self.sizer.is_some())
            .field("grid", &self.grid)
            .finish()
    }
}

impl<P> StateDiagram<P> {
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            nodes: Vec::new(),
            config,
            sizer: None,
            cells: Vec::new(),
            grid: Grid::default(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut LayoutConfig {
        &mut self.config
    }

    pub fn set_vertical(&mut self, vertical: bool) {
        self.config.vertical = vertical;
    }

    pub fn set_include_labels(&mut self, include: bool) {
        self.config.include_labels = include;
    }

    pub fn set_node_width(&mut self, width: u32) {
        self.config.node_width = width;
    }

    pub fn set_node_height(&mut self, height: u32) {
        self.config.node_height = height;
    }

    pub fn set_font_width(&mut self, width: u32) {
        self.config.font_width = width;
    }

    pub fn set_font_height(&mut self, height: u32) {
        self.config.font_height = height;
    }

    pub fn set_balance(&mut self, balance: bool) {
        self.config.balance = balance;
    }

    /// Replace the default character-count sizing.
    pub fn set_node_size_calculator(&mut self, sizer: Box<dyn NodeSizeCalculator>) {
        self.sizer = Some(sizer);
    }

    pub fn clear_node_size_calculator(&mut self) {
        self.sizer = None;
    }

    // ---------------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------------

    pub fn add_node(&mut self, node: Node<P>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn add(&mut self, peer: P) -> NodeId {
        self.add_node(Node::new(peer))
    }

    /// Add a directed connection. Duplicates and self-loops are allowed.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), LayoutError> {
        self.check_id(to)?;
        let node = self
            .nodes
            .get_mut(from.0)
            .ok_or(LayoutError::UnknownNode(from))?;
        node.connections.push(to);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<P>> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<P>> {
        self.nodes.get_mut(id.0)
    }

    pub fn nodes(&self) -> &[Node<P>] {
        &self.nodes
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find the node built from `peer`.
    ///
    /// Linear scan, which is fine for workflow-sized diagrams.
    pub fn find_node(&self, peer: &P) -> Option<NodeId>
    where
        P: PartialEq,
    {
        self.nodes
            .iter()
            .position(|node| node.peer() == peer)
            .map(NodeId)
    }

    // ---------------------------------------------------------------------
    // Layout state
    // ---------------------------------------------------------------------

    /// Grid cell of a node from the most recent layout steps.
    pub fn cell(&self, id: NodeId) -> Option<&GridCell> {
        self.cells.get(id.0)
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Clear every scratch cell and the grid tables.
    pub fn init_layout(&mut self) {
        self.cells.clear();
        self.cells.resize(self.nodes.len(), GridCell::default());
        self.grid.clear();
    }

    pub fn reset_traversal(&mut self) {
        for cell in &mut self.cells {
            cell.traversed = false;
            cell.on_path = false;
        }
    }

    /// Pick the node the walks start from: the first node flagged as root,
    /// else the only node without inbound connections, else the first node.
    pub fn find_root(&self) -> Option<NodeId> {
        if let Some(index) = self.nodes.iter().position(Node::is_root) {
            return Some(NodeId(index));
        }
        let roots = self.find_roots();
        if let [only] = roots.as_slice() {
            return Some(*only);
        }
        // several sources: list order is what the caller built, trust it
        (!self.nodes.is_empty()).then_some(NodeId(0))
    }

    /// All nodes without inbound connections, in list order.
    pub fn find_roots(&self) -> Vec<NodeId> {
        let mut targeted = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for next in &node.connections {
                targeted[next.0] = true;
            }
        }
        targeted
            .iter()
            .enumerate()
            .filter(|(_, targeted)| !**targeted)
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    /// Horizontal walk from `root`, then from every node it did not reach.
    pub fn assign_columns(&mut self, root: NodeId) -> Result<(), LayoutError> {
        self.check_id(root)?;
        self.ensure_cells();
        let mut column_count =
            ranking::assign_columns(&self.nodes, &mut self.cells, root, 1);
        for index in 0..self.nodes.len() {
            if self.cells[index].column == 0 {
                tracing::debug!(node = %NodeId(index), "unreachable from root, laying out separately");
                let count = ranking::assign_columns(&self.nodes, &mut self.cells, NodeId(index), 1);
                column_count = column_count.max(count);
            }
        }
        self.grid.column_count = column_count;
        Ok(())
    }

    /// Vertical walk from `root`, then from every node it did not reach,
    /// each below everything placed so far.
    pub fn assign_rows(&mut self, root: NodeId) -> Result<(), LayoutError> {
        self.check_id(root)?;
        self.ensure_cells();
        let mut row_count = rows::assign_rows(&self.nodes, &mut self.cells, root, 1);
        for index in 0..self.nodes.len() {
            if self.cells[index].row == 0 {
                let count =
                    rows::assign_rows(&self.nodes, &mut self.cells, NodeId(index), row_count + 1);
                row_count = row_count.max(count);
            }
        }
        self.grid.row_count = row_count;
        Ok(())
    }

    /// Optional cosmetic pass, see the `balance` module. Returns the number
    /// of row moves.
    pub fn balance_vertical(&mut self) -> usize {
        self.ensure_cells();
        balance::balance_vertical(
            &self.nodes,
            &mut self.cells,
            &mut self.grid.row_count,
            self.config.balance_passes,
        )
    }

    /// Swap rows and columns, switching between left-to-right and
    /// top-to-bottom flow.
    pub fn rotate(&mut self) {
        for cell in &mut self.cells {
            std::mem::swap(&mut cell.row, &mut cell.column);
        }
        let grid = &mut self.grid;
        std::mem::swap(&mut grid.row_count, &mut grid.column_count);
    }

    /// Size the cells and write each node's placement.
    pub fn calculate_sizes(&mut self) -> Vec<NodeSize> {
        self.ensure_cells();
        let sizer: &dyn NodeSizeCalculator = match &self.sizer {
            Some(sizer) => sizer.as_ref(),
            None => &CharCountSizer,
        };
        sizing::calculate_sizes(&self.nodes, &self.cells, &mut self.grid, &self.config, sizer)
    }

    pub fn assign_coordinates(&mut self, sizes: &[NodeSize]) {
        sizing::assign_coordinates(&mut self.nodes, &self.cells, sizes, &self.grid, &self.config);
    }

    /// Run the full layout.
    ///
    /// An empty diagram is reported as an error and leaves every node
    /// untouched; no graph shape makes this panic.
    pub fn layout(&mut self) -> Result<LayoutSummary, LayoutError> {
        self.init_layout();
        for node in &mut self.nodes {
            node.placement = None;
        }

        if self.nodes.is_empty() {
            tracing::warn!("unable to lay out diagram, no nodes");
            return Err(LayoutError::EmptyDiagram);
        }
        let Some(root) = self.find_root() else {
            tracing::warn!("unable to lay out diagram, no root");
            return Err(LayoutError::NoRoot);
        };

        self.assign_columns(root)?;
        self.reset_traversal();
        self.assign_rows(root)?;

        if self.config.balance {
            self.balance_vertical();
        }

        // the walks produce a left-to-right layout
        if self.config.vertical {
            self.rotate();
        }

        let sizes = self.calculate_sizes();
        self.assign_coordinates(&sizes);
        self.trace_grid();

        let (width, height) = sizing::diagram_extent(&self.grid, &self.config);
        let summary = LayoutSummary {
            root,
            rows: self.grid.row_count,
            columns: self.grid.column_count,
            width,
            height,
        };
        tracing::debug!(?summary, nodes = self.nodes.len(), "layout complete");
        Ok(summary)
    }

    fn check_id(&self, id: NodeId) -> Result<(), LayoutError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(LayoutError::UnknownNode(id))
        }
    }

    fn ensure_cells(&mut self) {
        if self.cells.len() != self.nodes.len() {
            self.cells.resize(self.nodes.len(), GridCell::default());
        }
    }

    fn trace_grid(&self) {
        tracing::debug!(
            column_widths = ?self.grid.column_widths,
            column_offsets = ?self.grid.column_offsets,
            row_heights = ?self.grid.row_heights,
            row_offsets = ?self.grid.row_offsets,
            "grid"
        );
    }
}
