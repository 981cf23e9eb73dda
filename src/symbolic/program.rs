use crate::assembler::{self, Assembly};
use crate::bytecode;
use crate::error::Diagnostic;
use crate::instruction::{NullaryOp, OperandKind, UnaryOp};
use crate::parsing::{Position, SourceSpan};

use super::parser::parse_statements;
use super::references::highlight_symbol;

/// A symbolic operand: the name of a variable or a label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub span: SourceSpan,
}

/// Declares `name` as the address of the next instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    /// Covers the name only, not the trailing `:`.
    pub span: SourceSpan,
}

/// `READ`, `WRITE` or `STOP`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NullaryInstruction {
    /// The mnemonic as it was written.
    pub mnemonic: String,
    pub op: NullaryOp,
    pub span: SourceSpan,
}

/// An instruction with a variable or label operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnaryInstruction {
    /// The mnemonic as it was written.
    pub mnemonic: String,
    pub op: UnaryOp,
    pub span: SourceSpan,
    /// `None` when the operand was missing or malformed.
    pub arg: Option<Argument>,
}

impl UnaryInstruction {
    /// Span of the mnemonic, extended over the operand if there is one.
    pub fn full_span(&self) -> SourceSpan {
        match self.arg {
            Some(ref arg) => self.span.join(&arg.span),
            None => self.span,
        }
    }
}

/// One parsed line of mnemonic source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Label(Label),
    Nullary(NullaryInstruction),
    Unary(UnaryInstruction),
}

impl Statement {
    pub fn is_instruction(&self) -> bool {
        match self {
            Statement::Label(_) => false,
            Statement::Nullary(_) | Statement::Unary(_) => true,
        }
    }

    /// Span of the statement including its operand.
    pub fn span(&self) -> SourceSpan {
        match self {
            Statement::Label(label) => label.span,
            Statement::Nullary(ins) => ins.span,
            Statement::Unary(ins) => ins.full_span(),
        }
    }

    /// The operand together with what it refers to.
    pub fn argument(&self) -> Option<(&Argument, OperandKind)> {
        match self {
            Statement::Unary(UnaryInstruction {
                arg: Some(arg), op, ..
            }) => Some((arg, op.operand_kind())),
            _ => None,
        }
    }
}

/// A parsed mnemonic source file.
///
/// Parsing never fails: the statements that could be recovered are kept along
/// with every diagnostic found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    pub fn parse(source: &str) -> Program {
        let (statements, diagnostics) = parse_statements(source);

        Program {
            statements,
            diagnostics,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Spans of every occurrence of the symbol under the cursor.
    pub fn highlight(&self, pos: Position) -> Vec<SourceSpan> {
        highlight_symbol(&self.statements, pos)
    }

    /// Assembles the program into its numeric form.
    ///
    /// Parse diagnostics take precedence: if there are any, they are returned
    /// without running the assembler.
    pub fn compile(&self) -> Result<bytecode::Program, Vec<Diagnostic>> {
        self.compile_program().map(|assembly| assembly.program)
    }

    /// Like [Program::compile], but keeps the symbol table and the source map.
    pub fn compile_program(&self) -> Result<Assembly, Vec<Diagnostic>> {
        if !self.diagnostics.is_empty() {
            return Err(self.diagnostics.clone());
        }

        assembler::assemble_program(&self.statements)
    }
}
