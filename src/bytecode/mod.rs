//! Parsing and storing numeric programs.

mod parser;
mod program;

pub use self::parser::parse_binary_program;
pub use self::program::Program;
