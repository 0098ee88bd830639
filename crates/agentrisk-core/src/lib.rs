pub mod analysis;
pub mod entropy;
pub mod error;
pub mod graph;
pub mod rng;
pub mod simulate;

// Core types
pub type F = f64;
pub use graph::{Graph, Node, NodeKind};

// Structural pass
pub use analysis::{find_drivers, Drivers};
pub use entropy::{score, EntropyLevel, EntropyMetrics};

// Behavioral pass
pub use rng::RunRng;
pub use simulate::{simulate, simulate_from, Disposition, Handoff, RunOutcome};

pub use error::GraphError;
