use std::fmt;

use serde::Serialize;

/// Index of a node inside the `StateDiagram` that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Final pixel box assigned to a node by `StateDiagram::layout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One box of the diagram.
///
/// The `peer` is the caller's handle back to whatever model object the node
/// was built from. The engine never looks inside it; it is only compared by
/// `StateDiagram::find_node`.
#[derive(Debug, Clone)]
pub struct Node<P> {
    peer: P,
    root: bool,
    label: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    pub(crate) connections: Vec<NodeId>,
    pub(crate) placement: Option<Placement>,
}

impl<P> Node<P> {
    pub fn new(peer: P) -> Self {
        Self {
            peer,
            root: false,
            label: None,
            width: None,
            height: None,
            connections: Vec::new(),
            placement: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.set_label(label);
        self
    }

    pub fn peer(&self) -> &P {
        &self.peer
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    pub fn set_root(&mut self, root: bool) {
        self.root = root;
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    pub fn clear_label(&mut self) {
        self.label = None;
    }

    /// Width fixed by the caller, if any. Zero clears the preset.
    pub fn preset_width(&self) -> Option<u32> {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = (width > 0).then_some(width);
    }

    pub fn preset_height(&self) -> Option<u32> {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = (height > 0).then_some(height);
    }

    /// Outbound connections in insertion order.
    pub fn connections(&self) -> &[NodeId] {
        &self.connections
    }

    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn x(&self) -> i32 {
        self.placement.map(|p| p.x).unwrap_or(0)
    }

    pub fn y(&self) -> i32 {
        self.placement.map(|p| p.y).unwrap_or(0)
    }

    /// Laid out width, or the preset width before the first layout.
    pub fn width(&self) -> u32 {
        self.placement
            .map(|p| p.width)
            .or(self.width)
            .unwrap_or(0)
    }

    pub fn height(&self) -> u32 {
        self.placement
            .map(|p| p.height)
            .or(self.height)
            .unwrap_or(0)
    }
}

/// Per-node scratch state owned by the layout passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GridCell {
    /// 1-based row, 0 while unassigned.
    pub row: usize,
    /// 1-based column, 0 while unassigned.
    pub column: usize,
    /// Number of rows the node's subtree occupies.
    pub layout_height: usize,
    #[serde(skip)]
    pub(crate) traversed: bool,
    #[serde(skip)]
    pub(crate) on_path: bool,
}

/// Cell sizes and offsets computed by the sizing step.
///
/// All tables are indexed by row or column number. Slot 0 belongs to the
/// "unassigned" row/column and is normally empty. The offset tables carry
/// one extra trailing entry marking the far edge of the last cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub row_count: usize,
    pub column_count: usize,
    pub column_widths: Vec<u32>,
    pub row_heights: Vec<u32>,
    pub column_offsets: Vec<i32>,
    pub row_offsets: Vec<i32>,
}

impl Grid {
    pub(crate) fn clear(&mut self) {
        self.row_count = 0;
        self.column_count = 0;
        self.column_widths.clear();
        self.row_heights.clear();
        self.column_offsets.clear();
        self.row_offsets.clear();
    }
}

/// Result of a successful `StateDiagram::layout` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutSummary {
    pub root: NodeId,
    pub rows: usize,
    pub columns: usize,
    /// Overall extent of the diagram in pixels.
    pub width: u32,
    pub height: u32,
}
