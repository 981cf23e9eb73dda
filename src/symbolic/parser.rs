//! Line based parser for the mnemonic source format.
//!
//! Every line is parsed on its own. A line holds either a label declaration
//! (`name:`), an instruction with its operand, or nothing at all. Text after
//! `//` is a comment.

use edit_distance::edit_distance;

use crate::error::{Diagnostic, ErrorKind};
use crate::instruction::{OpCode, OperandKind};

use super::program::{Argument, Label, NullaryInstruction, Statement, UnaryInstruction};
use super::token::{tokenize_line, Word};
use crate::parsing::SourceSpan;

/// Largest edit distance for which [suggest_mnemonic] still proposes something.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Checks that `name` matches `[A-Za-z][A-Za-z0-9_]*`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Finds the mnemonic closest to an unknown instruction word.
pub fn suggest_mnemonic(word: &str) -> Option<&'static str> {
    let word = word.to_lowercase();

    OpCode::ALL
        .iter()
        .map(|op| (edit_distance(&word, op.mnemonic()), op.mnemonic()))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, mnemonic)| mnemonic)
}

/// Result of parsing a single line.
#[derive(Debug, Default)]
pub struct ParsedLine {
    pub statement: Option<Statement>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedLine {
    fn error(&mut self, span: SourceSpan, kind: ErrorKind) {
        self.diagnostics.push(Diagnostic::new(span, kind));
    }
}

fn parse_label(first: &Word, rest: &[Word], out: &mut ParsedLine) {
    let name = &first.text[..first.text.len() - 1];
    let span = SourceSpan {
        end_col: first.span.end_col - 1,
        ..first.span
    };

    if name.is_empty() {
        out.error(first.span, ErrorKind::ExpectedLabelName);
    } else if !is_identifier(name) {
        out.error(span, ErrorKind::InvalidLabelName);
    } else {
        out.statement = Some(Statement::Label(Label {
            name: name.to_string(),
            span,
        }));
    }

    for word in rest {
        out.error(
            word.span,
            ErrorKind::UnexpectedTokenAfterLabel {
                token: word.text.to_string(),
            },
        );
    }
}

fn parse_instruction(first: &Word, rest: &[Word], out: &mut ParsedLine) {
    let opcode = match OpCode::from_mnemonic(first.text) {
        Some(opcode) => opcode,
        None => {
            out.error(
                first.span,
                ErrorKind::UnknownInstruction {
                    token: first.text.to_string(),
                },
            );
            return;
        }
    };

    match opcode {
        OpCode::Nullary(op) => {
            for word in rest {
                out.error(word.span, ErrorKind::UnexpectedArgument { op });
            }

            out.statement = Some(Statement::Nullary(NullaryInstruction {
                mnemonic: first.text.to_string(),
                op,
                span: first.span,
            }));
        }
        OpCode::Unary(op) => {
            let arg = match rest.first() {
                None => {
                    out.error(first.span, ErrorKind::ExpectedArgument { op });
                    None
                }
                Some(word) if is_identifier(word.text) => Some(Argument {
                    name: word.text.to_string(),
                    span: word.span,
                }),
                Some(word) => {
                    let kind: OperandKind = op.operand_kind();
                    out.error(word.span, ErrorKind::InvalidArgumentName { kind });
                    None
                }
            };

            for word in rest.iter().skip(1) {
                out.error(word.span, ErrorKind::UnexpectedAdditionalArgument);
            }

            out.statement = Some(Statement::Unary(UnaryInstruction {
                mnemonic: first.text.to_string(),
                op,
                span: first.span,
                arg,
            }));
        }
    }
}

/// Parses line number `line` of a source file.
pub fn parse_line(line: usize, text: &str) -> ParsedLine {
    let words = tokenize_line(line, text);
    let mut out = ParsedLine::default();

    let (first, rest) = match words.split_first() {
        Some(split) => split,
        None => return out,
    };

    if first.text.ends_with(':') {
        parse_label(first, rest, &mut out);
    } else {
        parse_instruction(first, rest, &mut out);
    }

    out
}

/// Parses a whole source file into statements and diagnostics, both in line order.
pub fn parse_statements(source: &str) -> (Vec<Statement>, Vec<Diagnostic>) {
    let mut statements = Vec::new();
    let mut diagnostics = Vec::new();

    for (number, text) in source.split('\n').enumerate() {
        let parsed = parse_line(number, text);

        statements.extend(parsed.statement);
        diagnostics.extend(parsed.diagnostics);
    }

    (statements, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{NullaryOp, UnaryOp};

    fn single(text: &str) -> ParsedLine {
        parse_line(0, text)
    }

    fn messages(parsed: &ParsedLine) -> Vec<String> {
        parsed.diagnostics.iter().map(Diagnostic::message).collect()
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("x"));
        assert!(is_identifier("Loop_2"));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("_x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn label() {
        let parsed = single("  loop:");

        assert!(parsed.diagnostics.is_empty());
        assert_eq!(
            parsed.statement,
            Some(Statement::Label(Label {
                name: "loop".into(),
                span: SourceSpan::new(0, 2, 6),
            }))
        );
    }

    #[test]
    fn label_errors() {
        let parsed = single(":");
        assert_eq!(parsed.statement, None);
        assert_eq!(messages(&parsed), vec!["Expected label name"]);
        assert_eq!(parsed.diagnostics[0].span, SourceSpan::new(0, 0, 1));

        let parsed = single("1abc:");
        assert_eq!(parsed.statement, None);
        assert_eq!(messages(&parsed), vec!["Invalid label name"]);
        assert_eq!(parsed.diagnostics[0].span, SourceSpan::new(0, 0, 4));
    }

    #[test]
    fn tokens_after_label() {
        let parsed = single("start: load x");

        assert!(parsed.statement.is_some());
        assert_eq!(
            messages(&parsed),
            vec![
                "Unexpected token \"load\" after label",
                "Unexpected token \"x\" after label",
            ]
        );
        assert_eq!(parsed.diagnostics[1].span, SourceSpan::new(0, 12, 13));
    }

    #[test]
    fn nullary() {
        let parsed = single("Write");

        assert!(parsed.diagnostics.is_empty());
        assert_eq!(
            parsed.statement,
            Some(Statement::Nullary(NullaryInstruction {
                mnemonic: "Write".into(),
                op: NullaryOp::Write,
                span: SourceSpan::new(0, 0, 5),
            }))
        );

        let parsed = single("stop now please");
        assert!(parsed.statement.is_some());
        assert_eq!(
            messages(&parsed),
            vec![
                "Unexpected argument to STOP instruction",
                "Unexpected argument to STOP instruction",
            ]
        );
    }

    #[test]
    fn unary() {
        let parsed = single("\tGOTOZ done // exit");

        assert!(parsed.diagnostics.is_empty());
        assert_eq!(
            parsed.statement,
            Some(Statement::Unary(UnaryInstruction {
                mnemonic: "GOTOZ".into(),
                op: UnaryOp::GotoZ,
                span: SourceSpan::new(0, 1, 6),
                arg: Some(Argument {
                    name: "done".into(),
                    span: SourceSpan::new(0, 7, 11),
                }),
            }))
        );
    }

    #[test]
    fn unary_missing_argument() {
        let parsed = single("load");

        assert_eq!(messages(&parsed), vec!["Expected variable argument to LOAD instruction"]);
        assert_eq!(parsed.diagnostics[0].span, SourceSpan::new(0, 0, 4));

        match parsed.statement {
            Some(Statement::Unary(ins)) => assert_eq!(ins.arg, None),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn unary_invalid_argument() {
        let parsed = single("goto 12 x");

        assert_eq!(
            messages(&parsed),
            vec!["Invalid label name", "Unexpected additional argument"]
        );
        assert_eq!(parsed.diagnostics[0].span, SourceSpan::new(0, 5, 7));
        assert_eq!(parsed.diagnostics[1].span, SourceSpan::new(0, 8, 9));

        match parsed.statement {
            Some(Statement::Unary(ins)) => assert_eq!(ins.arg, None),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn unknown_instruction() {
        let parsed = single("jump somewhere");

        assert_eq!(parsed.statement, None);
        assert_eq!(messages(&parsed), vec!["Unknown instruction"]);
        assert_eq!(parsed.diagnostics[0].span, SourceSpan::new(0, 0, 4));
    }

    #[test]
    fn whole_file_keeps_line_order() {
        let source = "read\n\n  // comment\nfoo bar\nstore x\nwrite 1\n";
        let (statements, diagnostics) = parse_statements(source);

        assert_eq!(statements.len(), 3);
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].span.line, 3);
        assert_eq!(diagnostics[1].span.line, 5);
        assert_eq!(statements[1].span(), SourceSpan::new(4, 0, 7));
    }

    #[test]
    fn suggestions() {
        assert_eq!(suggest_mnemonic("lod"), Some("load"));
        assert_eq!(suggest_mnemonic("GOTOX"), Some("goto"));
        assert_eq!(suggest_mnemonic("xyzzy"), None);
    }
}
