//! Lexer for the CFF language.
//!
//! Converts source text into a stream of [`Token`]s by longest match over a
//! fixed table of patterns. Ties on length go to the pattern listed first.
//! Characters no pattern accepts become one-character
//! [`TokenKind::LexicalError`] tokens; scanning itself never fails.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::token::{Token, TokenKind};

/// Candidate patterns in tie-break priority order.
const TOKEN_PATTERNS: &[(TokenKind, &str)] = &[
    // Literals
    (TokenKind::FloatConst, r"^[0-9]*\.[0-9]+"),
    (TokenKind::IntConst, r"^[0-9]+"),
    (TokenKind::StringConst, r#"^"[^"]*""#),
    (TokenKind::CharConst, r"^'[^']*'"),
    // Keywords
    (TokenKind::Name, r"^name"),
    (TokenKind::Platform, r"^platform"),
    (TokenKind::Initial, r"^initial"),
    (TokenKind::State, r"^state"),
    (TokenKind::Goto, r"^goto"),
    (TokenKind::When, r"^when"),
    (TokenKind::Performing, r"^performing"),
    (TokenKind::Exit, r"^exit"),
    (TokenKind::Int, r"^int"),
    (TokenKind::Float, r"^float"),
    (TokenKind::Boolean, r"^boolean"),
    (TokenKind::String, r"^string"),
    (TokenKind::Char, r"^char"),
    (TokenKind::True, r"^true"),
    (TokenKind::False, r"^false"),
    // Names
    (TokenKind::VariableName, r"^[a-zA-Z_][a-zA-Z0-9_]*"),
    // Punctuation
    (TokenKind::LParen, r"^\("),
    (TokenKind::RParen, r"^\)"),
    (TokenKind::LBrace, r"^\{"),
    (TokenKind::RBrace, r"^\}"),
    (TokenKind::LtEq, r"^<="),
    (TokenKind::GtEq, r"^>="),
    (TokenKind::Lt, r"^<"),
    (TokenKind::Gt, r"^>"),
    (TokenKind::Comma, r"^,"),
    (TokenKind::Colon, r"^:"),
    (TokenKind::Semicolon, r"^;"),
    (TokenKind::Assign, r"^:="),
    // Operators
    (TokenKind::Plus, r"^\+"),
    (TokenKind::Star, r"^\*"),
    (TokenKind::Minus, r"^-"),
    (TokenKind::Slash, r"^/"),
    (TokenKind::EqEq, r"^=="),
    (TokenKind::NotEq, r"^!="),
];

/// Whitespace, block comments and line comments.
const SKIP_PATTERNS: &[&str] = &[
    r"^[\n\t\r ]+",
    r"^/\*([^*]|\*+[^*/])*\*+/",
    r"^//[^\n\r]*([\n\r]|$)",
];

fn token_patterns() -> &'static [(TokenKind, Regex)] {
    static PATTERNS: OnceLock<Vec<(TokenKind, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TOKEN_PATTERNS
            .iter()
            .map(|&(kind, pattern)| {
                (kind, Regex::new(pattern).expect("token patterns are valid regexes"))
            })
            .collect()
    })
}

fn skip_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SKIP_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("skip patterns are valid regexes"))
            .collect()
    })
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Scan the whole input. The result always ends with exactly one
    /// [`TokenKind::EndOfFile`] token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        self.skip_ignored();
        while !self.is_at_end() {
            let (kind, len) = match self.longest_match() {
                Some(best) => best,
                None => (TokenKind::LexicalError, self.next_char_len()),
            };

            tokens.push(Token {
                kind,
                lexeme: self.rest()[..len].to_string(),
                index: tokens.len(),
                line: self.line,
                col: self.col,
            });
            self.advance(len);
            self.skip_ignored();
        }

        tokens.push(Token {
            kind: TokenKind::EndOfFile,
            lexeme: String::new(),
            index: tokens.len(),
            line: self.line,
            col: self.col,
        });

        let errors = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::LexicalError)
            .count();
        debug!("scanned {} tokens ({errors} lexical errors)", tokens.len());

        tokens
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Kind and length of the longest candidate match at the cursor.
    /// A later pattern only wins by being strictly longer.
    fn longest_match(&self) -> Option<(TokenKind, usize)> {
        let rest = self.rest();
        let mut best: Option<(TokenKind, usize)> = None;

        for (kind, regex) in token_patterns() {
            let len = regex.find(rest).map_or(0, |m| m.end());
            if len > best.map_or(0, |(_, l)| l) {
                best = Some((*kind, len));
            }
        }

        best
    }

    fn next_char_len(&self) -> usize {
        self.rest().chars().next().map_or(1, char::len_utf8)
    }

    /// Skip whitespace and comments until none of them match, since a
    /// comment can be followed by more whitespace and vice versa.
    fn skip_ignored(&mut self) {
        loop {
            let mut skipped = false;
            for regex in skip_patterns() {
                if let Some(m) = regex.find(self.rest()) {
                    if m.end() > 0 {
                        self.advance(m.end());
                        skipped = true;
                    }
                }
            }
            if !skipped {
                break;
            }
        }
    }

    fn advance(&mut self, len: usize) {
        for ch in self.source[self.pos..self.pos + len].chars() {
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        self.pos += len;
    }
}
