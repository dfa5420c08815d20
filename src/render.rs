//! SVG preview of a laid out diagram.
//!
//! Nodes are drawn as rounded boxes at their placement; connections are
//! straight arrows between box borders. Intended for checking a layout by
//! eye, not as a full diagram renderer.

use crate::config::RenderConfig;
use crate::layout::{LayoutSummary, Placement, StateDiagram};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Display;
use std::path::Path;

pub fn render_svg<P: Display>(
    diagram: &StateDiagram<P>,
    summary: &LayoutSummary,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let margin = config.margin.max(0.0);
    let width = summary.width as f32 + margin * 2.0;
    let height = summary.height as f32 + margin * 2.0;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker></defs>",
        theme.line_color
    ));
    svg.push_str(&format!("<g transform=\"translate({margin} {margin})\">"));

    for (id, node) in diagram.node_ids().zip(diagram.nodes()) {
        let Some(from) = node.placement() else {
            continue;
        };
        for &target in node.connections() {
            if target == id {
                svg.push_str(&loop_path(from, &theme.line_color));
                continue;
            }
            let Some(to) = diagram.node(target).and_then(|n| n.placement()) else {
                continue;
            };
            svg.push_str(&edge_path(from, to, &theme.line_color));
        }
    }

    for (id, node) in diagram.node_ids().zip(diagram.nodes()) {
        let Some(p) = node.placement() else {
            continue;
        };
        let (stroke, stroke_width) = if id == summary.root {
            (&theme.root_border, 2.0)
        } else {
            (&theme.node_border, 1.2)
        };
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"6\" ry=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            p.x, p.y, p.width, p.height, theme.node_fill, stroke, stroke_width
        ));
        let text = match node.label() {
            Some(label) => label.to_string(),
            None => node.peer().to_string(),
        };
        let (cx, cy) = center(p);
        svg.push_str(&format!(
            "<text x=\"{cx:.1}\" y=\"{cy:.1}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&text)
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

/// Small arc over the top edge of the box.
fn loop_path(p: Placement, color: &str) -> String {
    let (cx, _) = center(p);
    let top = p.y as f32;
    let quarter = p.width as f32 / 4.0;
    let (left, right, lift) = (cx - quarter, cx + quarter, top - 18.0);
    format!(
        "<path d=\"M {left:.1} {top:.1} C {left:.1} {lift:.1} {right:.1} {lift:.1} {right:.1} {top:.1}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>"
    )
}

fn edge_path(from: Placement, to: Placement, color: &str) -> String {
    let start = border_point(from, center(to));
    let end = border_point(to, center(from));
    format!(
        "<path d=\"M {:.1} {:.1} L {:.1} {:.1}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>",
        start.0, start.1, end.0, end.1
    )
}

fn center(p: Placement) -> (f32, f32) {
    (
        p.x as f32 + p.width as f32 / 2.0,
        p.y as f32 + p.height as f32 / 2.0,
    )
}

/// Point where the segment from the center of `p` toward `toward` leaves
/// the box.
fn border_point(p: Placement, toward: (f32, f32)) -> (f32, f32) {
    let (cx, cy) = center(p);
    let dx = toward.0 - cx;
    let dy = toward.1 - cy;
    if dx == 0.0 && dy == 0.0 {
        return (cx, cy);
    }
    let half_w = p.width as f32 / 2.0;
    let half_h = p.height as f32 / 2.0;
    let scale_x = if dx != 0.0 { half_w / dx.abs() } else { f32::INFINITY };
    let scale_y = if dy != 0.0 { half_h / dy.abs() } else { f32::INFINITY };
    let scale = scale_x.min(scale_y).min(1.0);
    (cx + dx * scale, cy + dy * scale)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let fallback = usvg::Size::from_wh(800.0, 600.0)
        .ok_or_else(|| anyhow::anyhow!("invalid fallback size"))?;
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height).unwrap_or(fallback);

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_svg_basic() {
        let mut diagram = StateDiagram::new();
        let a = diagram.add("Draft".to_string());
        let b = diagram.add("Sent & filed".to_string());
        diagram.connect(a, b).unwrap();
        diagram.connect(b, b).unwrap();
        let summary = diagram.layout().unwrap();

        let svg = render_svg(&diagram, &summary, &Theme::modern(), &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Draft"));
        assert!(svg.contains("Sent &amp; filed"));
        assert_eq!(svg.matches("marker-end").count(), 2);
        assert!(svg.contains("<g transform=\"translate(10 10)\">"));
        assert_eq!(svg.matches("<rect x=").count(), 2);
        assert_eq!(svg.matches("<text ").count(), 2);
    }

    #[test]
    fn border_point_stays_on_the_box() {
        let p = Placement {
            x: 0,
            y: 0,
            width: 40,
            height: 20,
        };
        let close = |a: (f32, f32), b: (f32, f32)| (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3;
        assert!(close(border_point(p, (100.0, 10.0)), (40.0, 10.0)));
        assert!(close(border_point(p, (20.0, -50.0)), (20.0, 0.0)));
        assert!(close(border_point(p, (20.0, 12.0)), (20.0, 12.0)));
    }
}
