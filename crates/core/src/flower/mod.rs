//! The flower hierarchy: output data model plus the materialisation
//! algorithm that populates it from a finished cactus graph.

pub mod materialise;
pub mod model;

pub use materialise::materialise;
pub use model::{Block, BlockId, Chain, ChainId, End, EndId, EndKind, Flower, FlowerId, FlowerModel, Group, GroupId, Link, LinkId};
