use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::layout::{LayoutError, Node, NodeId, StateDiagram};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopDown,
    LeftRight,
}

impl Direction {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" => Some(Self::TopDown),
            "LR" => Some(Self::LeftRight),
            _ => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        self == Self::TopDown
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDecl {
    pub id: String,
    pub label: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub root: bool,
}

impl NodeDecl {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            label: None,
            width: None,
            height: None,
            root: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// A parsed diagram. Nodes and edges keep declaration order, which decides
/// traversal order during layout.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub direction: Option<Direction>,
    nodes: Vec<NodeDecl>,
    index: HashMap<String, usize>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[NodeDecl] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&NodeDecl> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Declare `id` if it is new and return its entry.
    pub fn ensure_node(&mut self, id: &str) -> &mut NodeDecl {
        let idx = match self.index.get(id) {
            Some(&idx) => idx,
            None => {
                let idx = self.nodes.len();
                self.nodes.push(NodeDecl::new(id));
                self.index.insert(id.to_string(), idx);
                idx
            }
        };
        &mut self.nodes[idx]
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.ensure_node(from);
        self.ensure_node(to);
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    /// Build a layout diagram whose peers are the node ids. An explicit
    /// direction in the graph overrides `config.vertical`.
    pub fn to_state_diagram(
        &self,
        mut config: LayoutConfig,
    ) -> Result<StateDiagram<String>, LayoutError> {
        if let Some(direction) = self.direction {
            config.vertical = direction.is_vertical();
        }
        let mut diagram = StateDiagram::with_config(config);
        let mut ids: HashMap<&str, NodeId> = HashMap::with_capacity(self.nodes.len());
        for decl in &self.nodes {
            let mut node = Node::new(decl.id.clone());
            if let Some(label) = &decl.label {
                node.set_label(label.clone());
            }
            node.set_width(decl.width.unwrap_or(0));
            node.set_height(decl.height.unwrap_or(0));
            node.set_root(decl.root);
            ids.insert(decl.id.as_str(), diagram.add_node(node));
        }
        for edge in &self.edges {
            // both ends were declared by add_edge
            if let (Some(&from), Some(&to)) = (ids.get(edge.from.as_str()), ids.get(edge.to.as_str())) {
                diagram.connect(from, to)?;
            }
        }
        Ok(diagram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_node_keeps_first_declaration_order() {
        let mut graph = Graph::new();
        graph.add_edge("b", "a");
        graph.ensure_node("c").label = Some("Cee".to_string());
        graph.ensure_node("b").root = true;
        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!(graph.node("b").unwrap().root);
        assert_eq!(graph.node("c").unwrap().label.as_deref(), Some("Cee"));
    }

    #[test]
    fn converts_to_layout_diagram() {
        let mut graph = Graph::new();
        graph.direction = Some(Direction::TopDown);
        graph.add_edge("start", "review");
        graph.add_edge("review", "done");
        graph.ensure_node("review").width = Some(80);

        let diagram = graph.to_state_diagram(LayoutConfig::default()).unwrap();
        assert!(diagram.config().vertical);
        assert_eq!(diagram.len(), 3);
        let review = diagram.find_node(&"review".to_string()).unwrap();
        let node = diagram.node(review).unwrap();
        assert_eq!(node.preset_width(), Some(80));
        assert_eq!(node.connections().len(), 1);
    }
}
