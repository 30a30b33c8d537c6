pub mod canvas;
pub mod conversion;
pub mod definition;
pub mod results;

pub use canvas::*;
pub use conversion::*;
pub use definition::*;
pub use results::*;
