use nom::{
    IResult,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::digit1,
    combinator::{all_consuming, map, opt, recognize},
    sequence::{pair, preceded},
};

use crate::emulator::{MAX_PROGRAM_LENGTH, WORD_MAX, WORD_MIN};
use crate::error::{Diagnostic, ErrorKind};
use crate::instruction::Word;
use crate::parsing::{offset_of, SourceSpan};

/// Takes the next whitespace separated token.
fn token(input: &str) -> IResult<&str, &str> {
    preceded(
        take_while(char::is_whitespace),
        take_while1(|c: char| !c.is_whitespace()),
    )(input)
}

/// Parses a whole token as a signed decimal literal.
///
/// Literals that do not fit into an `i64` parse as `None`; they are out of range either way.
fn literal(input: &str) -> IResult<&str, Option<i64>> {
    all_consuming(map(
        recognize(pair(opt(tag("-")), digit1)),
        |digits: &str| digits.parse::<i64>().ok(),
    ))(input)
}

/// Splits a line into its tokens and their spans.
fn tokens(number: usize, line: &str) -> Vec<(&str, SourceSpan)> {
    let mut rest = line;
    let mut tokens = Vec::new();

    while let Ok((next, word)) = token(rest) {
        let end = offset_of(line, next);
        let start = end - word.len();

        tokens.push((word, SourceSpan::from_byte_range(number, line, start..end)));
        rest = next;
    }

    tokens
}

/// Checks that `token` is a literal within the word range.
fn value(token: &str) -> Result<Word, ErrorKind> {
    match literal(token) {
        Err(_) => Err(ErrorKind::InvalidValue),
        Ok((_, Some(value))) if WORD_MIN as i64 <= value && value <= WORD_MAX as i64 => {
            Ok(value as Word)
        }
        Ok((_, _)) => Err(ErrorKind::ValueOutOfRange),
    }
}

/// Parses the numeric program format: at most one decimal value per line.
///
/// Blank lines are skipped. Every malformed line is reported, and the program
/// is only returned if there were no errors.
pub fn parse_binary_program(source: &str) -> Result<Vec<Word>, Vec<Diagnostic>> {
    let mut words = Vec::new();
    let mut diagnostics = Vec::new();
    let mut too_long = false;

    for (number, line) in source.split('\n').enumerate() {
        let tokens = tokens(number, line);

        let (first, span) = match tokens.first() {
            Some(token) => *token,
            None => continue,
        };

        let word = match value(first) {
            Ok(word) => word,
            Err(kind) => {
                diagnostics.push(Diagnostic::new(span, kind));
                continue;
            }
        };

        if let Some((_, span)) = tokens.get(1) {
            diagnostics.push(Diagnostic::new(*span, ErrorKind::UnexpectedValue));
            continue;
        }

        if words.len() < MAX_PROGRAM_LENGTH {
            words.push(word);
        } else if !too_long {
            too_long = true;
            diagnostics.push(Diagnostic::new(span, ErrorKind::ProgramTooLong));
        }
    }

    if diagnostics.is_empty() {
        Ok(words)
    } else {
        Err(diagnostics)
    }
}
