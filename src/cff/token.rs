//! Token types for the CFF lexer.

use serde::Serialize;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// Position of this token in the token stream.
    pub index: usize,
    pub line: usize,
    pub col: usize,
}

impl Token {
    /// Human-readable description used in "expected X but found Y" messages.
    pub fn description(&self) -> String {
        match self.kind {
            TokenKind::LexicalError => format!("lexical error '{}'", self.lexeme),
            kind => kind.description().to_string(),
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Keywords
    Name,
    Platform,
    Initial,
    State,
    Goto,
    When,
    Performing,
    Exit,
    Int,
    Float,
    Boolean,
    String,
    Char,
    True,
    False,

    // Literals
    IntConst,
    FloatConst,
    StringConst,
    CharConst,

    VariableName,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Semicolon,
    Assign, // :=

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,

    // Special
    EndOfFile,
    LexicalError,
}

impl TokenKind {
    pub fn description(self) -> &'static str {
        match self {
            TokenKind::Name => "'name'",
            TokenKind::Platform => "'platform'",
            TokenKind::Initial => "'initial'",
            TokenKind::State => "'state'",
            TokenKind::Goto => "'goto'",
            TokenKind::When => "'when'",
            TokenKind::Performing => "'performing'",
            TokenKind::Exit => "'exit'",
            TokenKind::Int => "'int'",
            TokenKind::Float => "'float'",
            TokenKind::Boolean => "'boolean'",
            TokenKind::String => "'string'",
            TokenKind::Char => "'char'",
            TokenKind::True => "true const",
            TokenKind::False => "false const",
            TokenKind::IntConst => "int const",
            TokenKind::FloatConst => "float const",
            TokenKind::StringConst => "string const",
            TokenKind::CharConst => "char const",
            TokenKind::VariableName => "variable name",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Assign => "':='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::EndOfFile => "end of file",
            TokenKind::LexicalError => "lexical error",
        }
    }
}
