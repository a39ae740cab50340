//! Input documents and the validated model built from them.

pub mod document;
pub mod loader;
pub mod topology;

pub use document::{NodeId, NodeKind};
pub use loader::{Network, load_network};
pub use topology::{Topology, TopologyEdge};
