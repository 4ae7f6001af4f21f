//! Spatial partitioning data structures
//!
//! Broadphase indexing for the dynamics world.

mod octree;

pub use octree::{Octree, OctreeConfig, OctreeEntry, OctreeNode};
