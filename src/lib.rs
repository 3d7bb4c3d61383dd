pub mod error;
pub mod math;
pub mod mesh;
mod monotone;
pub mod sweep;
pub mod tessellator;

pub use error::{Result, TessellatorError};
pub use sweep::WindingRule;
pub use tessellator::{tessellate, Outlines, Tessellator, Triangles};
