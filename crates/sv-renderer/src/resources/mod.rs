//! Scene resource management.
//!
//! Meshes and materials are stored once and referenced from nodes through
//! copyable handles. Pools count references so that template clones share
//! geometry and releasing the last user frees it.

mod material;
mod mesh;
mod pool;

pub use material::*;
pub use mesh::*;
pub use pool::{PoolHandle, ResourcePool};
