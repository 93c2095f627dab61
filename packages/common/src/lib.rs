pub mod error;
pub mod io;
pub mod result;
pub mod visitor;

pub use error::*;
pub use io::*;
pub use result::*;
pub use visitor::*;
