pub(crate) mod bounds;
pub(crate) mod format;
pub(crate) mod geometry;
pub(crate) mod graph;
pub(crate) mod object;

pub use bounds::*;
pub use format::*;
pub use geometry::*;
pub use graph::*;
pub use object::*;
