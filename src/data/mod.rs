//! Values carried between nodes.

mod features;
mod table;
mod value;

pub use features::*;
pub use table::*;
pub use value::*;
