//! CFF compiler — source text → tokens → AST → resolved AST → C++ machine.

pub mod ast;
pub mod codegen;
pub mod dispatch;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolve;
pub mod token;

pub use ast::*;
pub use codegen::{CodegenOptions, GeneratedMachine};
pub use error::{CompileError, ErrorKind};
pub use resolve::{Diagnostic, ProgramCounts, ResolvedProgram};

use lexer::Lexer;
use parser::Parser;

/// A successfully compiled program together with its generated documents.
#[derive(Debug, Clone)]
pub struct CompiledMachine {
    pub program: ResolvedProgram,
    pub output: GeneratedMachine,
}

/// The CFF compiler.
///
/// Each call builds its own lexer and parser, so compiles never share state.
pub struct Compiler;

impl Compiler {
    /// Parse CFF source into an unresolved program.
    pub fn parse(source: &str) -> Result<UnresolvedProgram, CompileError> {
        let tokens = Lexer::new(source).tokenize();
        Parser::new(tokens).parse()
    }

    /// Parse source consisting of a single expression.
    pub fn parse_expr(source: &str) -> Result<Expr, CompileError> {
        let mut parser = Parser::new(Lexer::new(source).tokenize());
        let expr = parser.parse_expr(dispatch::BP_NONE)?;
        parser.expect_end()?;
        Ok(expr)
    }

    pub fn resolve(program: UnresolvedProgram) -> ResolvedProgram {
        resolve::resolve(program)
    }

    /// Parse and resolve.
    pub fn analyze(source: &str) -> Result<ResolvedProgram, CompileError> {
        Ok(Self::resolve(Self::parse(source)?))
    }

    /// Parse, resolve and generate with default file names.
    pub fn compile(source: &str) -> Result<CompiledMachine, CompileError> {
        Self::compile_with(source, &CodegenOptions::default())
    }

    pub fn compile_with(
        source: &str,
        options: &CodegenOptions,
    ) -> Result<CompiledMachine, CompileError> {
        let program = Self::analyze(source)?;
        let output = codegen::generate(&program, options)?;
        Ok(CompiledMachine { program, output })
    }
}

/// Outcome of [`compile`]: either a resolved program or an error message.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub ok: bool,
    pub ast: Option<ResolvedProgram>,
    pub error_message: String,
    error: Option<CompileError>,
}

impl CompileResult {
    pub fn error(&self) -> Option<&CompileError> {
        self.error.as_ref()
    }
}

impl From<Result<ResolvedProgram, CompileError>> for CompileResult {
    fn from(result: Result<ResolvedProgram, CompileError>) -> Self {
        match result {
            Ok(program) => Self {
                ok: true,
                ast: Some(program),
                error_message: String::new(),
                error: None,
            },
            Err(err) => Self {
                ok: false,
                ast: None,
                error_message: err.to_string(),
                error: Some(err),
            },
        }
    }
}

/// Compile `text` into a resolved program.
pub fn compile(text: &str) -> CompileResult {
    Compiler::analyze(text).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "\
name: Doubler;
platform: IntegerComputer;
initial state: Run {
    exit when true performing { output := input * 2; };
}
";

    #[test]
    fn compile_success() {
        let result = compile(PROGRAM);
        assert!(result.ok);
        assert!(result.error_message.is_empty());
        assert!(result.error().is_none());
        let program = result.ast.unwrap();
        assert_eq!(program.name(), "Doubler");
        assert_eq!(program.platform(), "IntegerComputer");
        assert_eq!(program.num_var_uses(), 2);
    }

    #[test]
    fn compile_failure_carries_message_and_error() {
        let result = compile("name: Broken platform: P;");
        assert!(!result.ok);
        assert!(result.ast.is_none());
        assert_eq!(
            result.error_message,
            "[1:14] expected ';' but found 'platform'"
        );
        assert_eq!(result.error().map(CompileError::kind), Some(ErrorKind::Syntax));
    }

    #[test]
    fn compile_failure_on_lexical_error() {
        let result = compile("name: M; platform: P; state: S { exit when x # 1 performing { }; }");
        assert!(!result.ok);
        assert_eq!(result.error().map(CompileError::kind), Some(ErrorKind::Lexical));
    }

    #[test]
    fn compile_reports_overly_nested_guard() {
        let guard = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
        let result = compile(&format!(
            "name: M; platform: P; state: S {{ exit when {guard} performing {{ }}; }}"
        ));
        assert!(!result.ok);
        assert_eq!(result.error().map(CompileError::kind), Some(ErrorKind::Syntax));
        assert!(result
            .error_message
            .contains("expected a less deeply nested expression"));
    }

    #[test]
    fn compile_reports_overly_long_assignment() {
        let rhs = vec!["x"; 20_000].join(" + ");
        let result = compile(&format!(
            "name: M; platform: P; state: S {{ exit when true performing {{ y := {rhs}; }}; }}"
        ));
        assert!(!result.ok);
        assert!(result
            .error_message
            .contains("expected a less deeply nested expression"));
    }

    #[test]
    fn parse_expr_requires_whole_input() {
        assert!(Compiler::parse_expr("1 + 2 * 3").is_ok());
        let err = Compiler::parse_expr("1 + 2 )").unwrap_err();
        assert_eq!(err.to_string(), "[1:7] expected end of file but found ')'");
    }

    #[test]
    fn compiler_produces_both_documents() {
        let compiled = Compiler::compile(PROGRAM).unwrap();
        assert!(compiled.output.header.contains("class Doubler { \n"));
        assert!(compiled
            .output
            .implementation
            .contains("platform->set_output( platform->get_input() * 2 );"));
        assert_eq!(compiled.program.num_states(), 1);
    }

    #[test]
    fn two_phase_api() {
        let unresolved = Compiler::parse(PROGRAM).unwrap();
        assert_eq!(unresolved.states.len(), 1);
        let resolved = Compiler::resolve(unresolved);
        assert_eq!(resolved.counts().variable_uses, 2);
    }
}
