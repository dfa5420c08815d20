use serde::Deserialize;
use state_diagram_layout::{LayoutDump, RenderOptions, layout_diagram, render_with_options};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateDiagramOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    vertical: Option<bool>,
    include_labels: Option<bool>,
    balance: Option<bool>,
}

fn build_render_options(options: StateDiagramOptions) -> RenderOptions {
    let mut render_options = if matches!(options.theme.as_deref(), Some("default" | "plain")) {
        RenderOptions::plain()
    } else {
        RenderOptions::modern()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(vertical) = options.vertical {
        render_options.layout.vertical = vertical;
    }
    if let Some(include_labels) = options.include_labels {
        render_options.layout.include_labels = include_labels;
    }
    if let Some(balance) = options.balance {
        render_options.layout.balance = balance;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<StateDiagramOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<StateDiagramOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(StateDiagramOptions::default()),
    }
}

#[wasm_bindgen]
pub fn render_state_diagram_svg(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_with_options(code, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Grid and node placements as JSON, for callers that draw the diagram
/// themselves.
#[wasm_bindgen]
pub fn layout_state_diagram_json(code: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    let (diagram, summary) = layout_diagram(code, render_options.layout)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    serde_json::to_string(&LayoutDump::from_diagram(&diagram, &summary))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
