//! A crate for the imaginary ten-instruction accumulator machine used in
//! teaching the basics of computer architecture.
//!
//! The machine has a single data register, an instruction register, a program counter
//! and 100 memory cells holding decimal values in `[-999, 999]`. Addresses 98 and 99
//! hold the constants `zero` and `one`.
//!
//! Currently this crate provides the functionality to:
//! - Parse mnemonic assembly (`read`, `store x`, `loop: gotop loop`, ...) into statements,
//!   collecting every error as a [Diagnostic](error::Diagnostic).
//! - Assemble the statements into a numeric program.
//! - Read and write the numeric program format, one value per line.
//! - Find every occurrence of the label or variable under a cursor.
//! - Execute numeric programs one fetch or execute phase at a time.
//!
//! # Example
//! ```
//! use accumulator::{
//!     symbolic::Program,
//!     emulator::{Emulator, CpuState, StopReason},
//! };
//!
//! // Reads numbers and writes them back until a zero is read.
//! let source = r#"
//!     loop:
//!         read
//!         gotoz end   // stop on zero
//!         write
//!         goto loop
//!     end:
//!         stop
//! "#;
//!
//! // Parse the source. Parsing never fails, errors are collected into the program.
//! let symbolic = Program::parse(source);
//! assert!(symbolic.is_valid());
//!
//! // Assemble into the numeric program.
//! let program = symbolic.compile().expect("program should assemble");
//! assert_eq!(program.words, vec![800, 604, 900, 500, 0]);
//!
//! // Load it into an emulator and provide some input.
//! let mut emulator = Emulator::new(&program.words)
//!     .expect("program should fit into memory");
//! emulator.push_input(vec![3, -4, 0]);
//!
//! emulator.run(1000);
//!
//! assert_eq!(emulator.output.values(), &[3, -4]);
//! assert_eq!(emulator.cpu, CpuState::Stopped(StopReason::Stop));
//! ```
//!
//! # Executables
//!
//! ## `accrun`
//!
//! Enabled with the `accrun` (or `tools`) feature. Assembles a `.asm` file or reads
//! a numeric program and runs it with the given input values.
//!
//! ```text
//! $ accrun countdown.asm --input 3
//! 3
//! 2
//! 1
//! ```
pub mod assembler;
pub mod bytecode;
pub mod emulator;
pub mod error;
pub mod event;
pub mod instruction;
pub mod parsing;
pub mod source_map;
pub mod symbol_table;
pub mod symbolic;
