use std::fmt::{self, Display};

use itertools::Itertools;

use crate::instruction::{NullaryOp, OperandKind, UnaryOp};
use crate::parsing::SourceSpan;

/// Broad classes of static errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Malformed identifiers and numeric literals.
    Lexical,
    /// Unknown instructions, missing or surplus operands.
    Structural,
    /// Duplicate labels, undefined symbols.
    Semantic,
    /// Programs that do not fit into memory.
    Capacity,
}

/// The reason of a [Diagnostic].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ExpectedLabelName,
    InvalidLabelName,
    UnexpectedTokenAfterLabel {
        token: String,
    },
    UnknownInstruction {
        token: String,
    },
    UnexpectedArgument {
        op: NullaryOp,
    },
    ExpectedArgument {
        op: UnaryOp,
    },
    InvalidArgumentName {
        kind: OperandKind,
    },
    UnexpectedAdditionalArgument,

    TooManyInstructions,
    DuplicateLabel,
    TooManyVariables,
    NoSuchSymbol {
        kind: OperandKind,
    },

    UnexpectedValue,
    InvalidValue,
    ValueOutOfRange,
    ProgramTooLong,
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        match self {
            ErrorKind::InvalidLabelName
            | ErrorKind::InvalidArgumentName { .. }
            | ErrorKind::InvalidValue
            | ErrorKind::ValueOutOfRange => Category::Lexical,

            ErrorKind::ExpectedLabelName
            | ErrorKind::UnexpectedTokenAfterLabel { .. }
            | ErrorKind::UnknownInstruction { .. }
            | ErrorKind::UnexpectedArgument { .. }
            | ErrorKind::ExpectedArgument { .. }
            | ErrorKind::UnexpectedAdditionalArgument
            | ErrorKind::UnexpectedValue => Category::Structural,

            ErrorKind::DuplicateLabel | ErrorKind::NoSuchSymbol { .. } => Category::Semantic,

            ErrorKind::TooManyInstructions
            | ErrorKind::TooManyVariables
            | ErrorKind::ProgramTooLong => Category::Capacity,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::ExpectedLabelName => write!(f, "Expected label name"),
            ErrorKind::InvalidLabelName => write!(f, "Invalid label name"),
            ErrorKind::UnexpectedTokenAfterLabel { token } => {
                write!(f, "Unexpected token \"{}\" after label", token)
            }
            ErrorKind::UnknownInstruction { .. } => write!(f, "Unknown instruction"),
            ErrorKind::UnexpectedArgument { op } => {
                write!(f, "Unexpected argument to {} instruction", op)
            }
            ErrorKind::ExpectedArgument { op } => write!(
                f,
                "Expected {} argument to {} instruction",
                op.operand_kind(),
                op
            ),
            ErrorKind::InvalidArgumentName { kind } => write!(f, "Invalid {} name", kind),
            ErrorKind::UnexpectedAdditionalArgument => write!(f, "Unexpected additional argument"),
            ErrorKind::TooManyInstructions => write!(f, "Too many instructions"),
            ErrorKind::DuplicateLabel => write!(f, "Duplicate label"),
            ErrorKind::TooManyVariables => write!(f, "Too many variables"),
            ErrorKind::NoSuchSymbol { kind } => write!(f, "No such {}", kind),
            ErrorKind::UnexpectedValue => write!(f, "Unexpected value"),
            ErrorKind::InvalidValue => write!(f, "Invalid Value"),
            ErrorKind::ValueOutOfRange => write!(f, "Value out of range"),
            ErrorKind::ProgramTooLong => write!(f, "Program too long to fit into memory"),
        }
    }
}

/// A static error found while parsing or assembling a program.
///
/// Diagnostics are always collected, never raised; every parser returns its
/// best-effort result alongside them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub span: SourceSpan,
    pub kind: ErrorKind,
}

impl Diagnostic {
    pub fn new(span: SourceSpan, kind: ErrorKind) -> Diagnostic {
        Diagnostic { span, kind }
    }

    /// The human readable message, as shown by an editor.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.span.line + 1,
            self.span.start_col + 1,
            self.kind
        )
    }
}

/// Formats a list of diagnostics one per line.
pub fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics.iter().join("\n")
}

/// Error returned when a numeric program cannot be loaded into memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The program has more words than there are free memory cells.
    TooLong { length: usize },
    /// A word is outside of `[-999, 999]`.
    ValueOutOfRange { address: usize, value: i32 },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::TooLong { length } => write!(
                f,
                "program of {} words does not fit into memory (at most {})",
                length,
                crate::emulator::MAX_PROGRAM_LENGTH
            ),
            LoadError::ValueOutOfRange { address, value } => {
                write!(f, "value {} at address {} is out of range", value, address)
            }
        }
    }
}

impl std::error::Error for LoadError {}
