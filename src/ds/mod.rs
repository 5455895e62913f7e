pub mod freq_table;
pub mod node_arena;

pub use freq_table::FreqTable;
pub use node_arena::{Node, NodeArena, NodeId};
