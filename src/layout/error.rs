use thiserror::Error;

use super::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unable to lay out diagram: no nodes")]
    EmptyDiagram,
    #[error("unable to lay out diagram: no root")]
    NoRoot,
    #[error("node {0} does not belong to this diagram")]
    UnknownNode(NodeId),
}
