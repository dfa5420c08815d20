//! Node sizing, cell packing and pixel coordinate assignment.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::text_metrics::measure_text_width;

use super::types::{Grid, GridCell, Node, Placement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NodeSize {
    pub width: u32,
    pub height: u32,
}

/// What a size calculator gets to see of a node.
#[derive(Debug, Clone, Copy)]
pub struct SizeRequest<'a> {
    pub label: Option<&'a str>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl<'a> SizeRequest<'a> {
    pub fn from_node<P>(node: &'a Node<P>) -> Self {
        Self {
            label: node.label(),
            width: node.preset_width(),
            height: node.preset_height(),
        }
    }
}

/// Computes the pixel size of a node before it is packed into the grid.
///
/// Implementations should honour preset sizes on the request; the engine
/// does not second-guess what they return.
pub trait NodeSizeCalculator {
    fn calculate_node_size(&self, node: &SizeRequest<'_>, config: &LayoutConfig) -> NodeSize;
}

impl<F> NodeSizeCalculator for F
where
    F: Fn(&SizeRequest<'_>, &LayoutConfig) -> NodeSize,
{
    fn calculate_node_size(&self, node: &SizeRequest<'_>, config: &LayoutConfig) -> NodeSize {
        self(node, config)
    }
}

/// Default sizing: fixed node size plus a per-character allowance for labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharCountSizer;

impl NodeSizeCalculator for CharCountSizer {
    fn calculate_node_size(&self, node: &SizeRequest<'_>, config: &LayoutConfig) -> NodeSize {
        let height = node.height.unwrap_or_else(|| default_height(config));
        let width = node.width.unwrap_or_else(|| {
            let label_width = match node.label {
                Some(label) if config.include_labels => {
                    let chars = u32::try_from(label.chars().count()).unwrap_or(u32::MAX);
                    config.effective_font_width().saturating_mul(chars)
                }
                _ => 0,
            };
            config.effective_node_width().saturating_add(label_width)
        });
        NodeSize { width, height }
    }
}

/// Sizing that measures labels with a real font.
///
/// Falls back to [`CharCountSizer`] for labels when the font family cannot
/// be resolved on this system.
#[derive(Debug, Clone)]
pub struct FontMetricsSizer {
    pub font_family: String,
    pub font_size: f32,
}

impl FontMetricsSizer {
    pub fn new(font_family: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_family: font_family.into(),
            font_size,
        }
    }
}

impl NodeSizeCalculator for FontMetricsSizer {
    fn calculate_node_size(&self, node: &SizeRequest<'_>, config: &LayoutConfig) -> NodeSize {
        let fallback = CharCountSizer.calculate_node_size(node, config);
        if node.width.is_some() || !config.include_labels {
            return fallback;
        }
        let Some(label) = node.label else {
            return fallback;
        };
        let Some(measured) = measure_text_width(label, self.font_size, &self.font_family) else {
            tracing::debug!(family = %self.font_family, "font not found, using character widths");
            return fallback;
        };
        let label_width = measured.ceil().max(0.0) as u32;
        NodeSize {
            width: config.effective_node_width().saturating_add(label_width),
            height: fallback.height,
        }
    }
}

fn default_height(config: &LayoutConfig) -> u32 {
    let mut height = config.effective_node_height();
    if config.include_labels {
        height = height.saturating_add(config.effective_font_height());
    }
    height
}

/// Size every node, then derive per-column widths, per-row heights and the
/// offset tables.
pub(super) fn calculate_sizes<P>(
    nodes: &[Node<P>],
    cells: &[GridCell],
    grid: &mut Grid,
    config: &LayoutConfig,
    sizer: &dyn NodeSizeCalculator,
) -> Vec<NodeSize> {
    let columns = cells
        .iter()
        .map(|cell| cell.column)
        .max()
        .unwrap_or(0)
        .max(grid.column_count);
    let rows = cells
        .iter()
        .map(|cell| cell.row)
        .max()
        .unwrap_or(0)
        .max(grid.row_count);

    grid.column_widths = vec![0; columns + 1];
    grid.row_heights = vec![0; rows + 1];

    let mut sizes = Vec::with_capacity(nodes.len());
    for (node, cell) in nodes.iter().zip(cells) {
        let size = sizer.calculate_node_size(&SizeRequest::from_node(node), config);
        let width = &mut grid.column_widths[cell.column];
        *width = (*width).max(size.width);
        let height = &mut grid.row_heights[cell.row];
        *height = (*height).max(size.height);
        sizes.push(size);
    }

    calculate_offsets(grid, config);
    sizes
}

fn calculate_offsets(grid: &mut Grid, config: &LayoutConfig) {
    grid.column_offsets = running_offsets(&grid.column_widths, config.left_pad, config.column_gap);
    grid.row_offsets = running_offsets(&grid.row_heights, config.top_pad, config.row_gap);
}

fn running_offsets(sizes: &[u32], start: i32, gap: u32) -> Vec<i32> {
    let mut offsets = Vec::with_capacity(sizes.len() + 1);
    let mut last = start;
    for size in sizes {
        offsets.push(last);
        last = last.saturating_add(to_i32(*size)).saturating_add(to_i32(gap));
    }
    offsets.push(last);
    offsets
}

/// Center every node inside its cell and write the result back.
pub(super) fn assign_coordinates<P>(
    nodes: &mut [Node<P>],
    cells: &[GridCell],
    sizes: &[NodeSize],
    grid: &Grid,
    config: &LayoutConfig,
) {
    // nodes sit one character to the right so labels have room to overhang
    let column_margin = to_i32(config.effective_font_width());
    let row_margin = 0;

    // tables may be stale if the caller skipped sizing; treat missing slots as empty
    let lookup_offset = |table: &[i32], index: usize| table.get(index).copied().unwrap_or(0);
    let lookup_size = |table: &[u32], index: usize| table.get(index).copied().unwrap_or(0);

    for ((node, cell), size) in nodes.iter_mut().zip(cells).zip(sizes) {
        let row_height = lookup_size(&grid.row_heights, cell.row).max(size.height);
        let y = lookup_offset(&grid.row_offsets, cell.row)
            .saturating_add(row_margin)
            .saturating_add(to_i32((row_height - size.height) / 2));

        let column_width = lookup_size(&grid.column_widths, cell.column).max(size.width);
        let x = lookup_offset(&grid.column_offsets, cell.column)
            .saturating_add(column_margin)
            .saturating_add(to_i32((column_width - size.width) / 2));

        node.placement = Some(Placement {
            x,
            y,
            width: size.width,
            height: size.height,
        });
    }
}

/// Overall pixel extent of the packed grid.
pub(super) fn diagram_extent(grid: &Grid, config: &LayoutConfig) -> (u32, u32) {
    let right = grid
        .column_offsets
        .last()
        .copied()
        .unwrap_or(0)
        .saturating_add(to_i32(config.effective_font_width()));
    let bottom = grid
        .row_offsets
        .last()
        .copied()
        .unwrap_or(0)
        .saturating_add(config.top_pad.max(0));
    (right.max(0) as u32, bottom.max(0) as u32)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
