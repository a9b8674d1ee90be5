//! Token dispatch table for expression parsing.
//!
//! Maps each [`TokenKind`] to its prefix rule (the token starts an
//! expression), its infix rule (the token continues one) and its binding
//! power. This is the only place expression-forming tokens are registered;
//! the precedence-climbing loop in the parser never branches on token kinds.

use super::ast::{ArithOp, CompareOp, ConstKind, Expr};
use super::error::CompileError;
use super::parser::Parser;
use super::token::TokenKind;

pub type PrefixRule = fn(&mut Parser) -> Result<Expr, CompileError>;
pub type InfixRule = fn(&mut Parser, Expr) -> Result<Expr, CompileError>;

pub const BP_NONE: u8 = 0;
pub const BP_COMPARISON: u8 = 30;
pub const BP_TERM: u8 = 50;
pub const BP_FACTOR: u8 = 60;
pub const BP_GROUP: u8 = 80;

#[derive(Clone, Copy)]
pub struct ParseRule {
    pub prefix: Option<PrefixRule>,
    pub infix: Option<InfixRule>,
    pub binding_power: u8,
}

impl ParseRule {
    const NONE: ParseRule = ParseRule {
        prefix: None,
        infix: None,
        binding_power: BP_NONE,
    };

    const fn prefix(rule: PrefixRule) -> Self {
        Self {
            prefix: Some(rule),
            infix: None,
            binding_power: BP_NONE,
        }
    }

    const fn infix(rule: InfixRule, binding_power: u8) -> Self {
        Self {
            prefix: None,
            infix: Some(rule),
            binding_power,
        }
    }
}

pub fn rule(kind: TokenKind) -> ParseRule {
    match kind {
        TokenKind::IntConst
        | TokenKind::FloatConst
        | TokenKind::StringConst
        | TokenKind::CharConst
        | TokenKind::True
        | TokenKind::False => ParseRule::prefix(Parser::parse_constant),
        TokenKind::VariableName => ParseRule::prefix(Parser::parse_variable_expr),
        // `(` binds tightly but has no infix rule, so `a (b)` is rejected
        // rather than silently ending the expression.
        TokenKind::LParen => ParseRule {
            prefix: Some(Parser::parse_nested_expr),
            infix: None,
            binding_power: BP_GROUP,
        },
        TokenKind::Plus | TokenKind::Minus => ParseRule::infix(Parser::parse_operator, BP_TERM),
        TokenKind::Star | TokenKind::Slash => ParseRule::infix(Parser::parse_operator, BP_FACTOR),
        TokenKind::Lt
        | TokenKind::Gt
        | TokenKind::LtEq
        | TokenKind::GtEq
        | TokenKind::EqEq
        | TokenKind::NotEq => ParseRule::infix(Parser::parse_comparison, BP_COMPARISON),
        _ => ParseRule::NONE,
    }
}

pub fn const_kind(kind: TokenKind) -> Option<ConstKind> {
    match kind {
        TokenKind::IntConst => Some(ConstKind::Int),
        TokenKind::FloatConst => Some(ConstKind::Float),
        TokenKind::StringConst => Some(ConstKind::String),
        TokenKind::CharConst => Some(ConstKind::Char),
        TokenKind::True | TokenKind::False => Some(ConstKind::Bool),
        _ => None,
    }
}

pub fn arith_op(kind: TokenKind) -> Option<ArithOp> {
    match kind {
        TokenKind::Plus => Some(ArithOp::Add),
        TokenKind::Minus => Some(ArithOp::Sub),
        TokenKind::Star => Some(ArithOp::Mul),
        TokenKind::Slash => Some(ArithOp::Div),
        _ => None,
    }
}

pub fn compare_op(kind: TokenKind) -> Option<CompareOp> {
    match kind {
        TokenKind::EqEq => Some(CompareOp::Eq),
        TokenKind::NotEq => Some(CompareOp::Ne),
        TokenKind::Lt => Some(CompareOp::Lt),
        TokenKind::LtEq => Some(CompareOp::Le),
        TokenKind::Gt => Some(CompareOp::Gt),
        TokenKind::GtEq => Some(CompareOp::Ge),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_powers_are_ordered() {
        assert_eq!(rule(TokenKind::EqEq).binding_power, 30);
        assert_eq!(rule(TokenKind::Plus).binding_power, 50);
        assert_eq!(rule(TokenKind::Minus).binding_power, 50);
        assert_eq!(rule(TokenKind::Star).binding_power, 60);
        assert_eq!(rule(TokenKind::Slash).binding_power, 60);
        assert_eq!(rule(TokenKind::LParen).binding_power, 80);
    }

    #[test]
    fn operands_have_prefix_rules_only() {
        for kind in [
            TokenKind::IntConst,
            TokenKind::FloatConst,
            TokenKind::StringConst,
            TokenKind::CharConst,
            TokenKind::True,
            TokenKind::False,
            TokenKind::VariableName,
        ] {
            let r = rule(kind);
            assert!(r.prefix.is_some(), "{kind:?} should start an expression");
            assert!(r.infix.is_none(), "{kind:?} should not continue one");
            assert_eq!(r.binding_power, 0);
        }
    }

    #[test]
    fn operators_have_infix_rules_only() {
        for kind in [
            TokenKind::Plus,
            TokenKind::Star,
            TokenKind::Lt,
            TokenKind::NotEq,
        ] {
            let r = rule(kind);
            assert!(r.prefix.is_none());
            assert!(r.infix.is_some());
        }
    }

    #[test]
    fn structural_tokens_have_no_rules() {
        for kind in [
            TokenKind::Semicolon,
            TokenKind::Performing,
            TokenKind::RParen,
            TokenKind::EndOfFile,
            TokenKind::LexicalError,
        ] {
            let r = rule(kind);
            assert!(r.prefix.is_none() && r.infix.is_none());
            assert_eq!(r.binding_power, 0);
        }
    }

    #[test]
    fn operator_mappings() {
        assert_eq!(arith_op(TokenKind::Slash), Some(ArithOp::Div));
        assert_eq!(compare_op(TokenKind::GtEq), Some(CompareOp::Ge));
        assert_eq!(const_kind(TokenKind::False), Some(ConstKind::Bool));
        assert_eq!(arith_op(TokenKind::Lt), None);
    }
}
