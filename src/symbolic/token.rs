//! Tokenizer for single lines of mnemonic source.

use logos::{Lexer, Logos};

use std::fmt;

use crate::parsing::SourceSpan;

/// Tokens of a mnemonic source line. Anything between whitespace is a word.
///
/// Whitespace is Unicode whitespace, as in `char::is_whitespace`, matching the
/// numeric program parser.
#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token<'a> {
    /// Never produced for well-formed UTF-8 input; whitespace is skipped here.
    #[error]
    #[regex(r"\s+", logos::skip)]
    Error,

    /// A run of non-whitespace characters.
    #[regex(r"\S+", Lexer::slice)]
    Word(&'a str),
}

impl<'t> fmt::Display for Token<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Error => write!(f, "<error>"),
            Token::Word(word) => write!(f, "{}", word),
        }
    }
}

/// A word together with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub span: SourceSpan,
}

/// Removes a `//` comment from the end of a line.
pub fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(start) => &line[..start],
        None => line,
    }
}

/// Splits line number `line` into words, with comments removed.
pub fn tokenize_line(line: usize, text: &str) -> Vec<Word> {
    let code = strip_comment(text);
    let mut lexer = Token::lexer(code);
    let mut words = Vec::new();

    while let Some(token) = lexer.next() {
        if let Token::Word(word) = token {
            words.push(Word {
                text: word,
                span: SourceSpan::from_byte_range(line, text, lexer.span()),
            });
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<&str> {
        tokenize_line(0, line).into_iter().map(|w| w.text).collect()
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(texts("  load\tx  "), vec!["load", "x"]);
        assert_eq!(texts(""), Vec::<&str>::new());
        assert_eq!(texts(" \t \r"), Vec::<&str>::new());
    }

    #[test]
    fn strips_comments() {
        assert_eq!(texts("add x // increment"), vec!["add", "x"]);
        assert_eq!(texts("add x//y"), vec!["add", "x"]);
        assert_eq!(texts("// only a comment"), Vec::<&str>::new());
        assert_eq!(texts("a/b"), vec!["a/b"]);
    }

    #[test]
    fn splits_on_unicode_whitespace() {
        assert_eq!(texts("load\u{a0}x"), vec!["load", "x"]);
        assert_eq!(texts("\u{3000}write\u{2003}"), vec!["write"]);

        let words = tokenize_line(0, "load\u{a0}x");
        assert_eq!(words[1].span, SourceSpan::new(0, 5, 6));

        let separators = ['\u{a0}', '\u{2003}', '\u{3000}', '\u{85}', '\u{b}'];
        for c in separators.iter() {
            assert!(c.is_whitespace());
            assert_eq!(texts(&format!("add{}x", c)), vec!["add", "x"], "{:?}", c);
        }
    }

    #[test]
    fn keeps_columns() {
        let words = tokenize_line(3, "   store   counter");

        assert_eq!(words[0].span, SourceSpan::new(3, 3, 8));
        assert_eq!(words[1].span, SourceSpan::new(3, 11, 18));
    }
}
