//! Finding every occurrence of the symbol under a cursor.
//!
//! Labels and variables live in separate namespaces: a label declaration is
//! never an occurrence of a variable with the same name.

use crate::instruction::OperandKind;
use crate::parsing::{Position, SourceSpan};

use super::program::Statement;

/// Determines the symbol under the cursor, if there is one.
fn symbol_at(statements: &[Statement], pos: Position) -> Option<(&str, OperandKind)> {
    statements.iter().find_map(|statement| match statement {
        Statement::Label(label) if label.span.contains(pos) => {
            Some((label.name.as_str(), OperandKind::Label))
        }
        _ => match statement.argument() {
            Some((arg, kind)) if arg.span.contains(pos) => Some((arg.name.as_str(), kind)),
            _ => None,
        },
    })
}

/// Spans of every occurrence of the symbol under `pos`, in document order.
///
/// Names are compared case-insensitively. Returns an empty list if the cursor
/// is not on a label declaration or an operand.
pub fn highlight_symbol(statements: &[Statement], pos: Position) -> Vec<SourceSpan> {
    let (name, kind) = match symbol_at(statements, pos) {
        Some(symbol) => symbol,
        None => return Vec::new(),
    };

    let name = name.to_lowercase();

    statements
        .iter()
        .filter_map(|statement| match statement {
            Statement::Label(label) if kind == OperandKind::Label => {
                Some((&label.name, label.span))
            }
            _ => match statement.argument() {
                Some((arg, arg_kind)) if arg_kind == kind => Some((&arg.name, arg.span)),
                _ => None,
            },
        })
        .filter(|(candidate, _)| candidate.to_lowercase() == name)
        .map(|(_, span)| span)
        .collect()
}
