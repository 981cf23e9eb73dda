use std::fmt;

use crate::emulator::Memory;
use crate::error::{Diagnostic, LoadError};
use crate::instruction::{Address, Instruction, Word};

use super::parser::parse_binary_program;

/// A numeric program: the initial contents of memory addresses `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub words: Vec<Word>,
}

impl Program {
    /// Parses the textual numeric format, one value per line.
    pub fn parse(source: &str) -> Result<Program, Vec<Diagnostic>> {
        parse_binary_program(source).map(|words| Program { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Builds the initial memory image for this program.
    pub fn to_memory(&self) -> Result<Memory, LoadError> {
        Memory::load(&self.words)
    }

    /// Decodes every word, as the machine would if it executed it.
    pub fn disassemble(&self) -> Vec<(Address, Word, Instruction)> {
        self.words
            .iter()
            .enumerate()
            .map(|(addr, word)| (addr, *word, Instruction::decode(*word)))
            .collect()
    }
}

impl From<Vec<Word>> for Program {
    fn from(words: Vec<Word>) -> Program {
        Program { words }
    }
}

/// Writes the program in the format read by [Program::parse].
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for word in &self.words {
            writeln!(f, "{}", word)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_program_reads_back() {
        let program = Program::from(vec![800, 490, -5, 0]);
        let text = program.to_string();

        assert_eq!(text, "800\n490\n-5\n0\n");
        assert_eq!(Program::parse(&text), Ok(program));
    }

    #[test]
    fn disassemble() {
        let program = Program::from(vec![303, 900, 0, 42]);

        assert_eq!(
            program.disassemble(),
            vec![
                (0, 303, Instruction::Load(3)),
                (1, 900, Instruction::Write),
                (2, 0, Instruction::Stop),
                (3, 42, Instruction::Stop),
            ]
        );
    }
}
