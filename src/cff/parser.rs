//! Parser for the CFF language.
//!
//! Recursive descent over the structural grammar (one method per
//! production) with precedence climbing for expressions. Per-token
//! expression behaviour comes from [`dispatch`](super::dispatch).
//! The first mismatch aborts the parse; there is no recovery.

use log::debug;

use super::ast::*;
use super::dispatch;
use super::error::CompileError;
use super::token::{Token, TokenKind};

/// Deepest expression tree the parser builds. Every later pass walks
/// expressions recursively, so this also bounds their stack use.
pub const MAX_EXPR_DEPTH: usize = 256;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Active `parse_expr` calls.
    depth: usize,
    /// Tree depth of the expression most recently returned by a rule.
    last_depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::EndOfFile) {
            let (line, col) = tokens.last().map_or((1, 1), |t| (t.line, t.col));
            tokens.push(Token {
                kind: TokenKind::EndOfFile,
                lexeme: String::new(),
                index: tokens.len(),
                line,
                col,
            });
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
            last_depth: 0,
        }
    }

    pub fn parse(&mut self) -> Result<UnresolvedProgram, CompileError> {
        let program = self.parse_program()?;
        debug!(
            "parsed program `{}`: {} declarations, {} states",
            program.name.name,
            program.decls.len(),
            program.states.len()
        );
        Ok(program)
    }

    // --- Structure ---

    /// `"name" ":" ident ";" platform decls states endOfFile`
    pub fn parse_program(&mut self) -> Result<UnresolvedProgram, CompileError> {
        self.expect(TokenKind::Name)?;
        self.expect(TokenKind::Colon)?;
        let name = self.parse_variable()?;
        self.expect(TokenKind::Semicolon)?;

        let platform = self.parse_platform()?;
        let decls = self.parse_decls()?;
        let states = self.parse_states()?;
        self.expect_end()?;

        Ok(UnresolvedProgram {
            name,
            platform,
            decls,
            states,
        })
    }

    /// `"platform" ":" ident ";"`
    pub fn parse_platform(&mut self) -> Result<Platform, CompileError> {
        self.expect(TokenKind::Platform)?;
        self.expect(TokenKind::Colon)?;
        let name = self.parse_variable()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Platform { name })
    }

    /// Declarations run until the first state (or the end of input, for a
    /// program without states).
    pub fn parse_decls(&mut self) -> Result<Vec<Decl>, CompileError> {
        let mut decls = Vec::new();
        while !self.check(TokenKind::Initial)
            && !self.check(TokenKind::State)
            && !self.check(TokenKind::EndOfFile)
        {
            decls.push(self.parse_decl()?);
        }
        Ok(decls)
    }

    /// `type ident ";"`
    pub fn parse_decl(&mut self) -> Result<Decl, CompileError> {
        let ty = self.parse_type()?;
        let name = self.parse_variable()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Decl { ty, name })
    }

    fn parse_type(&mut self) -> Result<DeclType, CompileError> {
        let ty = match self.peek().kind {
            TokenKind::Int => DeclType::Int,
            TokenKind::Float => DeclType::Float,
            TokenKind::Boolean => DeclType::Boolean,
            TokenKind::String => DeclType::String,
            TokenKind::Char => DeclType::Char,
            _ => return Err(self.error_expected("a type")),
        };
        self.advance();
        Ok(ty)
    }

    pub fn parse_states(&mut self) -> Result<Vec<State>, CompileError> {
        let mut states = Vec::new();
        while !self.check(TokenKind::EndOfFile) {
            states.push(self.parse_state()?);
        }
        Ok(states)
    }

    /// `["initial"] "state" ":" ident "{" transitions "}"`
    pub fn parse_state(&mut self) -> Result<State, CompileError> {
        let is_initial = self.match_kind(TokenKind::Initial);
        self.expect(TokenKind::State)?;
        self.expect(TokenKind::Colon)?;
        let name = self.parse_variable()?;
        self.expect(TokenKind::LBrace)?;
        let transitions = self.parse_transitions()?;
        self.expect(TokenKind::RBrace)?;

        Ok(State {
            name,
            transitions,
            is_initial,
        })
    }

    pub fn parse_transitions(&mut self) -> Result<Vec<Transition>, CompileError> {
        let mut transitions = Vec::new();
        while !self.check(TokenKind::RBrace) {
            transitions.push(self.parse_transition()?);
        }
        Ok(transitions)
    }

    /// `"goto" ident "when" expr "performing" "{" stmts "}" ";"`
    /// or `"exit" "when" expr "performing" "{" stmts "}" ";"`
    pub fn parse_transition(&mut self) -> Result<Transition, CompileError> {
        let kind = if self.match_kind(TokenKind::Goto) {
            TransitionKind::Goto {
                target: self.parse_variable()?,
            }
        } else {
            self.expect(TokenKind::Exit)?;
            TransitionKind::Exit
        };

        self.expect(TokenKind::When)?;
        let guard = self.parse_expr(dispatch::BP_NONE)?;
        self.expect(TokenKind::Performing)?;
        self.expect(TokenKind::LBrace)?;
        let body = self.parse_stmts()?;
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Semicolon)?;

        Ok(Transition { guard, body, kind })
    }

    pub fn parse_stmts(&mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        Ok(stmts)
    }

    /// `ident ":=" expr ";"`
    pub fn parse_stmt(&mut self) -> Result<Stmt, CompileError> {
        let lhs = self.parse_variable()?;
        self.expect(TokenKind::Assign)?;
        let rhs = self.parse_expr(dispatch::BP_NONE)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt { lhs, rhs })
    }

    fn parse_variable(&mut self) -> Result<Variable, CompileError> {
        let token = self.expect(TokenKind::VariableName)?;
        Ok(Variable::new(token.lexeme.clone()))
    }

    // --- Expressions ---

    /// Precedence climbing: keep folding infix operators into `left` while
    /// the next token binds tighter than `min_bp`.
    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, CompileError> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let expr = self.parse_expr_at(min_bp);
        self.depth -= 1;
        expr
    }

    fn parse_expr_at(&mut self, min_bp: u8) -> Result<Expr, CompileError> {
        let prefix = dispatch::rule(self.peek().kind)
            .prefix
            .ok_or_else(|| self.error_expected("an expression"))?;
        let mut left = prefix(self)?;
        let mut left_depth = self.last_depth;

        loop {
            let rule = dispatch::rule(self.peek().kind);
            if rule.binding_power <= min_bp {
                break;
            }
            let infix = rule
                .infix
                .ok_or_else(|| self.error_expected("an operator"))?;
            left = infix(self, left)?;
            left_depth = 1 + left_depth.max(self.last_depth);
            if left_depth > MAX_EXPR_DEPTH {
                return Err(self.too_deep());
            }
        }

        self.last_depth = left_depth;
        Ok(left)
    }

    pub(crate) fn parse_constant(&mut self) -> Result<Expr, CompileError> {
        let token = self.advance();
        let kind = dispatch::const_kind(token.kind).ok_or_else(|| {
            CompileError::internal(format!("{} is not a constant", token.description()))
        })?;
        let expr = Expr::constant(kind, token.lexeme.clone());
        self.last_depth = 1;
        Ok(expr)
    }

    pub(crate) fn parse_variable_expr(&mut self) -> Result<Expr, CompileError> {
        let variable = self.parse_variable()?;
        self.last_depth = 1;
        Ok(Expr::Variable(variable))
    }

    /// `"(" expr ")"`
    pub(crate) fn parse_nested_expr(&mut self) -> Result<Expr, CompileError> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expr(dispatch::BP_NONE)?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    pub(crate) fn parse_operator(&mut self, left: Expr) -> Result<Expr, CompileError> {
        let kind = self.advance().kind;
        let op = dispatch::arith_op(kind).ok_or_else(|| {
            CompileError::internal(format!("{} is not an arithmetic operator", kind.description()))
        })?;
        let right = self.parse_expr(dispatch::rule(kind).binding_power)?;
        Ok(Expr::operator(op, left, right))
    }

    pub(crate) fn parse_comparison(&mut self, left: Expr) -> Result<Expr, CompileError> {
        let kind = self.advance().kind;
        let op = dispatch::compare_op(kind).ok_or_else(|| {
            CompileError::internal(format!("{} is not a comparison operator", kind.description()))
        })?;
        let right = self.parse_expr(dispatch::rule(kind).binding_power)?;
        Ok(Expr::comparison(op, left, right))
    }

    // --- Utility methods ---

    /// Require that all input has been consumed.
    pub fn expect_end(&mut self) -> Result<(), CompileError> {
        self.expect(TokenKind::EndOfFile).map(|_| ())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.tokens[idx].kind != TokenKind::EndOfFile {
            self.pos = idx + 1;
        }
        &self.tokens[idx]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.description()))
        }
    }

    fn too_deep(&self) -> CompileError {
        let t = self.peek();
        CompileError::syntax("a less deeply nested expression", t.description(), t.line, t.col)
    }

    fn error_expected(&self, expected: &str) -> CompileError {
        let t = self.peek();
        match t.kind {
            TokenKind::LexicalError => CompileError::lexical(&t.lexeme, expected, t.line, t.col),
            _ => CompileError::syntax(expected, t.description(), t.line, t.col),
        }
    }
}
