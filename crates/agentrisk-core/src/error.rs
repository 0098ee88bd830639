use thiserror::Error;

/// Rejections raised when a graph is constructed or loaded.
///
/// Anything not listed here (empty run sets, zero generative nodes, nodes
/// without outgoing edges) is a defined-behavior edge case, not an error.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphError {
    #[error("graph has no nodes")]
    Empty,

    #[error("start node `{0}` is not present in the graph")]
    MissingStart(String),

    #[error("edge `{from}` -> `{to}` references unknown node `{to}`")]
    DanglingEdge { from: String, to: String },

    #[error("node `{node}`: failure probability {value} outside [0, 1]")]
    FailureProbOutOfRange { node: String, value: f64 },

    #[error("node `{node}`: loop cap must be at least 1")]
    ZeroLoopCap { node: String },
}
