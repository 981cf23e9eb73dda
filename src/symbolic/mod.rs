//! Parsing and storing mnemonic source programs.

pub mod parser;
pub mod program;
pub mod references;
pub mod token;

pub use self::parser::{parse_statements, suggest_mnemonic};
pub use self::program::{
    Argument, Label, NullaryInstruction, Program, Statement, UnaryInstruction,
};
pub use self::references::highlight_symbol;
