use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Font width used for label sizing when none is configured.
pub const DEFAULT_FONT_WIDTH: u32 = 8;
pub const DEFAULT_FONT_HEIGHT: u32 = 16;

/// Node size used when neither the node nor a size calculator provides one.
pub const DEFAULT_NODE_WIDTH: u32 = 30;
pub const DEFAULT_NODE_HEIGHT: u32 = 30;

pub const DEFAULT_LEFT_PAD: i32 = 20;
pub const DEFAULT_TOP_PAD: i32 = 10;
pub const DEFAULT_BALANCE_PASSES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Flow top-to-bottom instead of left-to-right.
    pub vertical: bool,
    /// Factor node labels into the default node size.
    pub include_labels: bool,
    pub node_width: u32,
    pub node_height: u32,
    pub font_width: u32,
    pub font_height: u32,
    /// Space before the first column. Leaves room for labels that overhang
    /// their node.
    pub left_pad: i32,
    pub top_pad: i32,
    pub column_gap: u32,
    pub row_gap: u32,
    /// Run the balancing passes after row assignment.
    pub balance: bool,
    pub balance_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            vertical: false,
            include_labels: false,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            font_width: DEFAULT_FONT_WIDTH,
            font_height: DEFAULT_FONT_HEIGHT,
            left_pad: DEFAULT_LEFT_PAD,
            top_pad: DEFAULT_TOP_PAD,
            column_gap: 0,
            row_gap: 0,
            balance: false,
            balance_passes: DEFAULT_BALANCE_PASSES,
        }
    }
}

impl LayoutConfig {
    pub fn effective_node_width(&self) -> u32 {
        non_zero_or(self.node_width, DEFAULT_NODE_WIDTH)
    }

    pub fn effective_node_height(&self) -> u32 {
        non_zero_or(self.node_height, DEFAULT_NODE_HEIGHT)
    }

    pub fn effective_font_width(&self) -> u32 {
        non_zero_or(self.font_width, DEFAULT_FONT_WIDTH)
    }

    pub fn effective_font_height(&self) -> u32 {
        non_zero_or(self.font_height, DEFAULT_FONT_HEIGHT)
    }
}

fn non_zero_or(value: u32, fallback: u32) -> u32 {
    if value > 0 { value } else { fallback }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    /// Blank border added around the laid out diagram.
    pub margin: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            margin: 10.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub theme: Theme,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    layout: Option<LayoutOverrides>,
    theme_variables: Option<ThemeOverrides>,
    render: Option<RenderOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    vertical: Option<bool>,
    include_labels: Option<bool>,
    node_width: Option<u32>,
    node_height: Option<u32>,
    font_width: Option<u32>,
    font_height: Option<u32>,
    left_pad: Option<i32>,
    top_pad: Option<i32>,
    column_gap: Option<u32>,
    row_gap: Option<u32>,
    balance: Option<bool>,
    balance_passes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeOverrides {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    root_border: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOverrides {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
}

/// Load configuration from a JSON or JSON5 file. Missing keys keep their
/// defaults; no path means all defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "plain" | "default" => config.theme = Theme::plain(),
            "modern" => config.theme = Theme::modern(),
            other => tracing::warn!(theme = other, "unknown theme, keeping default"),
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.vertical {
            target.vertical = v;
        }
        if let Some(v) = layout.include_labels {
            target.include_labels = v;
        }
        if let Some(v) = layout.node_width {
            target.node_width = v;
        }
        if let Some(v) = layout.node_height {
            target.node_height = v;
        }
        if let Some(v) = layout.font_width {
            target.font_width = v;
        }
        if let Some(v) = layout.font_height {
            target.font_height = v;
        }
        if let Some(v) = layout.left_pad {
            target.left_pad = v;
        }
        if let Some(v) = layout.top_pad {
            target.top_pad = v;
        }
        if let Some(v) = layout.column_gap {
            target.column_gap = v;
        }
        if let Some(v) = layout.row_gap {
            target.row_gap = v;
        }
        if let Some(v) = layout.balance {
            target.balance = v;
        }
        if let Some(v) = layout.balance_passes {
            target.balance_passes = v;
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            theme.node_border = v;
        }
        if let Some(v) = vars.root_border {
            theme.root_border = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            theme.line_color = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.margin {
            config.render.margin = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.layout, LayoutConfig::default());
        assert_eq!(config.layout.node_width, DEFAULT_NODE_WIDTH);
    }

    #[test]
    fn json5_overrides_layout_and_theme() {
        let config = parse_config(
            r##"{
                // relaxed syntax is accepted
                theme: "plain",
                layout: { vertical: true, fontWidth: 7, balance: true },
                themeVariables: { lineColor: "#123456" },
                render: { margin: 4 },
            }"##,
        )
        .unwrap();
        assert!(config.layout.vertical);
        assert!(config.layout.balance);
        assert_eq!(config.layout.font_width, 7);
        assert_eq!(config.layout.node_height, DEFAULT_NODE_HEIGHT);
        assert_eq!(config.theme.line_color, "#123456");
        assert_eq!(config.render.margin, 4.0);
    }

    #[test]
    fn zero_sizes_fall_back_to_defaults() {
        let config = LayoutConfig {
            node_width: 0,
            font_height: 0,
            ..LayoutConfig::default()
        };
        assert_eq!(config.effective_node_width(), DEFAULT_NODE_WIDTH);
        assert_eq!(config.effective_font_height(), DEFAULT_FONT_HEIGHT);
    }

    #[test]
    fn rejects_malformed_file() {
        assert!(parse_config("{ layout: ").is_err());
    }
}
