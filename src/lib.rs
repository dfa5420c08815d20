//! Grid layout engine for state and workflow diagrams, with a small SVG
//! preview renderer and a `sdlayout` command line front end.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use layout::{
    LayoutError, LayoutSummary, Node, NodeId, NodeSize, NodeSizeCalculator, Placement,
    StateDiagram,
};
pub use layout_dump::LayoutDump;
pub use parser::{ParseError, parse_diagram};
pub use render::render_svg;
pub use theme::Theme;

/// Theme and layout settings for one-call rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self {
            theme: Theme::plain(),
            ..Self::default()
        }
    }

    pub fn modern() -> Self {
        Self::default()
    }
}

/// Parse and lay out a diagram without rendering it.
pub fn layout_diagram(
    code: &str,
    layout: LayoutConfig,
) -> anyhow::Result<(StateDiagram<String>, LayoutSummary)> {
    let parsed = parse_diagram(code)?;
    let mut diagram = parsed.graph.to_state_diagram(layout)?;
    let summary = diagram.layout()?;
    Ok((diagram, summary))
}

pub fn render_with_options(code: &str, options: RenderOptions) -> anyhow::Result<String> {
    let (diagram, summary) = layout_diagram(code, options.layout)?;
    Ok(render_svg(&diagram, &summary, &options.theme, &options.render))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_text_diagram() {
        let svg = render_with_options(
            "stateDiagram-v2\n[*] --> Open\nOpen --> Closed\nClosed --> Open",
            RenderOptions::modern(),
        )
        .unwrap();
        assert!(svg.contains("Open"));
        assert!(svg.contains("Closed"));
    }

    #[test]
    fn empty_input_is_an_error() {
        let err = layout_diagram("stateDiagram-v2\n", LayoutConfig::default()).unwrap_err();
        assert!(err.downcast_ref::<LayoutError>().is_some());
    }
}
