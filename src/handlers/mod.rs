pub mod parse;
pub mod problems;

pub use parse::*;
pub use problems::*;
