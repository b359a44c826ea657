//! Arc/node topology of a survey area.
//!
//! Boundary segments (from [derive_linework] or supplied directly) are turned into a
//! [TopologyBatch] holding a node table, an arc table, and the arc list of every polygon. The batch
//! is mutated in place by simplification and acute angle removal, then read concurrently during
//! reassembly.
mod batch;
mod builder;
pub(crate) mod linework;
mod types;

pub use batch::{CollapseOutcome, CollapsePlan, NodeMerge, TopologyBatch};
pub use builder::{build_topology, BoundarySegment};
pub use linework::{derive_linework, LineworkOptions};
pub use types::{Arc, ArcEnd, ArcId, End, Node, NodeId, Orientation, PolygonRecord};
