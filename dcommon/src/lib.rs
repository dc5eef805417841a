mod database;
mod interning;
mod result;

pub use database::*;
pub use interning::*;
pub use result::*;
