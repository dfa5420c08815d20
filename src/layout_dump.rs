use crate::layout::{Grid, LayoutSummary, StateDiagram};
use serde::Serialize;
use std::fmt::Display;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Serializable snapshot of a finished layout, for debugging and for tools
/// that want the raw grid rather than a picture.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub direction: String,
    pub root: String,
    pub rows: usize,
    pub columns: usize,
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<NodeDump>,
    pub grid: Grid,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: Option<String>,
    pub row: usize,
    pub column: usize,
    pub layout_height: usize,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub connections: Vec<String>,
}

impl LayoutDump {
    pub fn from_diagram<P: Display>(diagram: &StateDiagram<P>, summary: &LayoutSummary) -> Self {
        let name = |index: usize| {
            diagram
                .nodes()
                .get(index)
                .map(|node| node.peer().to_string())
                .unwrap_or_default()
        };

        let nodes = diagram
            .nodes()
            .iter()
            .zip(diagram.cells())
            .map(|(node, cell)| NodeDump {
                id: node.peer().to_string(),
                label: node.label().map(str::to_string),
                row: cell.row,
                column: cell.column,
                layout_height: cell.layout_height,
                x: node.x(),
                y: node.y(),
                width: node.width(),
                height: node.height(),
                connections: node.connections().iter().map(|id| name(id.index())).collect(),
            })
            .collect();

        LayoutDump {
            direction: if diagram.config().vertical {
                "TopDown".to_string()
            } else {
                "LeftRight".to_string()
            },
            root: name(summary.root.index()),
            rows: summary.rows,
            columns: summary.columns,
            width: summary.width,
            height: summary.height,
            nodes,
            grid: diagram.grid().clone(),
        }
    }
}

pub fn write_layout_dump<P: Display>(
    path: &Path,
    diagram: &StateDiagram<P>,
    summary: &LayoutSummary,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_diagram(diagram, summary);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
