//! Graph module: the node arena and the algorithms that run over it.
//!
//! A graph is a typed directed acyclic graph whose nodes instantiate catalog
//! definitions and whose edges run from an output pin to an input pin.

pub mod connection;
pub mod document;
pub mod iteration;
pub mod pruning;
pub mod structure;
pub mod topology;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used types
pub use connection::{Connected, Connection};
pub use document::GraphDocument;
pub use iteration::{ChainLink, IterationOptions, PatternIterator};
pub use pruning::{PruneReport, ReachabilityPruner};
pub use structure::{Frame, Graph, GraphNode, GraphReference, InputParameter, Position};
pub use topology::{TopologicalSorter, TopologyAnalyzer};
