//! Diagram input formats.
//!
//! Text input follows a small subset of Mermaid's state diagram syntax:
//!
//! ```text
//! stateDiagram-v2
//! direction LR
//! [*] --> Submitted
//! state "Manager review" as Review
//! Submitted --> Review --> Approved
//! Review --> Rejected : deny
//! Approved : Provisioned
//! Rejected --> [*]
//! ```
//!
//! Input starting with `{` is read as a JSON5 document instead.

use crate::ir::{Direction, Graph};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

const TERMINAL: &str = "[*]";

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^stateDiagram(?:-v2)?$").unwrap());
static DIRECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^direction\s+(\S+)$").unwrap());
static STATE_AS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^state\s+"([^"]*)"\s+as\s+(\S+)$"#).unwrap());
static STATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^state\s+(\S+)$").unwrap());
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^\s:]+)\s*:\s*(.*)$").unwrap());
static ARROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-{1,2}>\s*").unwrap());
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("invalid diagram document: {0}")]
    Document(#[from] json5::Error),
    #[error("unknown direction '{0}'")]
    Direction(String),
}

fn syntax(line: usize, message: impl Into<String>) -> ParseError {
    ParseError::Syntax {
        line,
        message: message.into(),
    }
}

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub graph: Graph,
}

pub fn parse_diagram(input: &str) -> Result<ParseOutput, ParseError> {
    let graph = if input.trim_start().starts_with('{') {
        parse_document(input)?
    } else {
        parse_text(input)?
    };
    tracing::debug!(
        nodes = graph.nodes().len(),
        edges = graph.edges.len(),
        "parsed diagram"
    );
    Ok(ParseOutput { graph })
}

fn parse_text(input: &str) -> Result<Graph, ParseError> {
    let mut graph = Graph::new();

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() || HEADER_RE.is_match(line) {
            continue;
        }

        if let Some(caps) = DIRECTION_RE.captures(line) {
            let token = &caps[1];
            graph.direction = Some(
                Direction::from_token(token)
                    .ok_or_else(|| ParseError::Direction(token.to_string()))?,
            );
            continue;
        }

        if let Some(caps) = STATE_AS_RE.captures(line) {
            let id = checked_id(&caps[2], line_no)?;
            graph.ensure_node(id).label = Some(caps[1].to_string());
            continue;
        }

        if let Some(caps) = STATE_RE.captures(line) {
            let id = checked_id(&caps[1], line_no)?;
            graph.ensure_node(id);
            continue;
        }

        if ARROW_RE.is_match(transition_body(line)) {
            parse_transition(&mut graph, line, line_no)?;
            continue;
        }

        if let Some(caps) = DESCRIPTION_RE.captures(line) {
            let id = checked_id(&caps[1], line_no)?;
            let label = caps[2].trim();
            let node = graph.ensure_node(id);
            if !label.is_empty() {
                node.label = Some(label.to_string());
            }
            continue;
        }

        let id = checked_id(line, line_no)?;
        graph.ensure_node(id);
    }

    Ok(graph)
}

/// `A --> B --> C [: label]`. A leading `[*]` marks the first state as a
/// root; a trailing `[*]` only declares the state before it. Transition
/// labels do not take part in layout and are dropped.
fn parse_transition(graph: &mut Graph, line: &str, line_no: usize) -> Result<(), ParseError> {
    let parts: Vec<&str> = ARROW_RE
        .split(transition_body(line))
        .map(str::trim)
        .collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(syntax(line_no, "transition is missing a state"));
    }

    let last = parts.len() - 1;
    let mut previous: Option<&str> = None;
    for (pos, part) in parts.iter().enumerate() {
        if *part == TERMINAL {
            match pos {
                0 => {}
                p if p == last => {}
                _ => return Err(syntax(line_no, "[*] may only start or end a transition")),
            }
            continue;
        }
        let id = checked_id(part, line_no)?;
        if pos == 1 && parts[0] == TERMINAL {
            graph.ensure_node(id).root = true;
        }
        match previous {
            Some(from) => graph.add_edge(from, id),
            None => {
                graph.ensure_node(id);
            }
        }
        previous = Some(id);
    }
    Ok(())
}

/// Everything before the transition label, if any.
fn transition_body(line: &str) -> &str {
    line.split_once(':').map_or(line, |(body, _label)| body)
}

fn checked_id(id: &str, line_no: usize) -> Result<&str, ParseError> {
    if ID_RE.is_match(id) {
        Ok(id)
    } else {
        Err(syntax(line_no, format!("invalid state name '{id}'")))
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("%%") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

#[derive(Debug, Deserialize)]
struct DiagramDocument {
    direction: Option<String>,
    #[serde(default)]
    nodes: Vec<NodeDocument>,
    #[serde(default)]
    edges: Vec<EdgeDocument>,
}

#[derive(Debug, Deserialize)]
struct NodeDocument {
    id: String,
    label: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    root: bool,
    #[serde(default)]
    connections: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EdgeDocument {
    from: String,
    to: String,
}

fn parse_document(input: &str) -> Result<Graph, ParseError> {
    let document: DiagramDocument = json5::from_str(input)?;
    let mut graph = Graph::new();

    if let Some(token) = document.direction.as_deref() {
        let direction = Direction::from_token(token)
            .ok_or_else(|| ParseError::Direction(token.to_string()))?;
        graph.direction = Some(direction);
    }

    for node in &document.nodes {
        let decl = graph.ensure_node(&node.id);
        decl.label = node.label.clone();
        decl.width = node.width;
        decl.height = node.height;
        decl.root = node.root;
    }
    for node in &document.nodes {
        for target in &node.connections {
            graph.add_edge(&node.id, target);
        }
    }
    for edge in &document.edges {
        graph.add_edge(&edge.from, &edge.to);
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(graph: &Graph) -> Vec<&str> {
        graph.nodes().iter().map(|n| n.id.as_str()).collect()
    }

    fn edges(graph: &Graph) -> Vec<(&str, &str)> {
        graph
            .edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect()
    }

    #[test]
    fn parse_basic_state_diagram() {
        let input = "stateDiagram-v2\n[*] --> Idle\nIdle --> Active : start\nstate \"Waiting\" as Wait\nWait --> Active\nActive --> [*]";
        let graph = parse_diagram(input).unwrap().graph;
        assert_eq!(ids(&graph), vec!["Idle", "Active", "Wait"]);
        assert_eq!(edges(&graph), vec![("Idle", "Active"), ("Wait", "Active")]);
        assert!(graph.node("Idle").unwrap().root);
        assert_eq!(graph.node("Wait").unwrap().label.as_deref(), Some("Waiting"));
    }

    #[test]
    fn parse_chained_transitions() {
        let graph = parse_diagram("A --> B -> C\nC --> A").unwrap().graph;
        assert_eq!(edges(&graph), vec![("A", "B"), ("B", "C"), ("C", "A")]);
    }

    #[test]
    fn parse_description_and_direction() {
        let input = "direction TB\nReview : Manager review %% shown in the box\nReview --> Done";
        let graph = parse_diagram(input).unwrap().graph;
        assert_eq!(graph.direction, Some(Direction::TopDown));
        assert_eq!(
            graph.node("Review").unwrap().label.as_deref(),
            Some("Manager review")
        );
    }

    #[test]
    fn arrows_inside_descriptions_are_text() {
        let graph = parse_diagram("Route : left -> right").unwrap().graph;
        assert!(graph.edges.is_empty());
        assert_eq!(
            graph.node("Route").unwrap().label.as_deref(),
            Some("left -> right")
        );
    }

    #[test]
    fn bare_state_name_declares_node() {
        let graph = parse_diagram("Lonely\nstate Other").unwrap().graph;
        assert_eq!(ids(&graph), vec!["Lonely", "Other"]);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn rejects_terminal_in_the_middle() {
        let err = parse_diagram("A --> [*] --> B").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
    }

    #[test]
    fn rejects_dangling_arrow() {
        let err = parse_diagram("ok\nA --> ").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 2, .. }));
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = parse_diagram("direction sideways").unwrap_err();
        assert!(matches!(err, ParseError::Direction(_)));
    }

    #[test]
    fn parse_json5_document() {
        let input = r#"{
            direction: "LR",
            nodes: [
                { id: "start", label: "Start", root: true, connections: ["approve"] },
                { id: "approve", width: 90 },
            ],
            edges: [ { from: "approve", to: "end" } ],
        }"#;
        let graph = parse_diagram(input).unwrap().graph;
        assert_eq!(graph.direction, Some(Direction::LeftRight));
        assert_eq!(ids(&graph), vec!["start", "approve", "end"]);
        assert_eq!(edges(&graph), vec![("start", "approve"), ("approve", "end")]);
        assert!(graph.node("start").unwrap().root);
        assert_eq!(graph.node("approve").unwrap().width, Some(90));
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(matches!(
            parse_diagram("{ nodes: [ { label: 1 } ] }"),
            Err(ParseError::Document(_))
        ));
    }
}
