//! Semantic resolution.
//!
//! A single pass over an [`UnresolvedProgram`] that builds the symbol table
//! from the declarations, marks every variable in statements and guards as
//! [`Origin::Local`] or [`Origin::Platform`], and caches the program's
//! declaration, state and variable-use counts.

use std::collections::BTreeSet;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

use super::ast::*;

/// Whole-program statistics computed once during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgramCounts {
    pub decls: usize,
    pub states: usize,
    /// Every variable occurrence in statement left-hand sides, right-hand
    /// sides and guards.
    pub variable_uses: usize,
}

/// Suspicious but legal constructs. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum Diagnostic {
    #[error("variable `{name}` is declared more than once")]
    DuplicateDecl { name: String },

    #[error("state `{extra}` is marked initial but `{first}` already is; `{first}` is used")]
    MultipleInitialStates { first: String, extra: String },

    #[error("state `{state}` has a goto to `{target}`, which is not a state")]
    UnknownGotoTarget { state: String, target: String },
}

/// A program whose variables all carry an origin. Only [`resolve`] builds
/// one, so holding a `ResolvedProgram` means resolution has happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProgram {
    name: Variable,
    platform: Platform,
    decls: Vec<Decl>,
    states: Vec<State>,
    symbols: BTreeSet<String>,
    counts: ProgramCounts,
    diagnostics: Vec<Diagnostic>,
}

impl ResolvedProgram {
    pub fn name(&self) -> &str {
        &self.name.name
    }

    pub fn platform(&self) -> &str {
        &self.platform.name.name
    }

    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Names declared by the program.
    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }

    pub fn counts(&self) -> ProgramCounts {
        self.counts
    }

    pub fn num_var_decls(&self) -> usize {
        self.counts.decls
    }

    pub fn num_states(&self) -> usize {
        self.counts.states
    }

    pub fn num_var_uses(&self) -> usize {
        self.counts.variable_uses
    }

    /// The first state marked `initial`, if any.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.iter().find(|s| s.is_initial)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

pub fn resolve(program: UnresolvedProgram) -> ResolvedProgram {
    let UnresolvedProgram {
        name,
        platform,
        decls,
        mut states,
    } = program;
    let mut diagnostics = Vec::new();

    // 1. Symbol table.
    let mut symbols = BTreeSet::new();
    for decl in &decls {
        if !symbols.insert(decl.name.name.clone()) {
            diagnostics.push(Diagnostic::DuplicateDecl {
                name: decl.name.name.clone(),
            });
        }
    }

    // 2. Variable origins and uses.
    let mut variable_uses = 0;
    let mut mark = |v: &mut Variable| {
        v.resolve(symbols.contains(&v.name));
        variable_uses += 1;
    };
    for state in &mut states {
        for transition in &mut state.transitions {
            for stmt in &mut transition.body {
                mark(&mut stmt.lhs);
                stmt.rhs.for_each_variable_mut(&mut mark);
            }
            transition.guard.for_each_variable_mut(&mut mark);
        }
    }

    // 3. State count.
    let counts = ProgramCounts {
        decls: decls.len(),
        states: states.len(),
        variable_uses,
    };

    check_states(&states, &mut diagnostics);
    for diagnostic in &diagnostics {
        warn!("{}: {diagnostic}", name.name);
    }
    debug!(
        "resolved `{}`: {} decls, {} states, {} variable uses",
        name.name, counts.decls, counts.states, counts.variable_uses
    );

    ResolvedProgram {
        name,
        platform,
        decls,
        states,
        symbols,
        counts,
        diagnostics,
    }
}

fn check_states(states: &[State], diagnostics: &mut Vec<Diagnostic>) {
    let mut initial: Option<&str> = None;
    for state in states.iter().filter(|s| s.is_initial) {
        match initial {
            None => initial = Some(state.name.name.as_str()),
            Some(first) => diagnostics.push(Diagnostic::MultipleInitialStates {
                first: first.to_string(),
                extra: state.name.name.clone(),
            }),
        }
    }

    let names: BTreeSet<&str> = states.iter().map(|s| s.name.name.as_str()).collect();
    for state in states {
        for target in state.transitions.iter().filter_map(Transition::target) {
            if !names.contains(target.name.as_str()) {
                diagnostics.push(Diagnostic::UnknownGotoTarget {
                    state: state.name.name.clone(),
                    target: target.name.clone(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cff::lexer::Lexer;
    use crate::cff::parser::Parser;

    fn resolved(src: &str) -> ResolvedProgram {
        let tokens = Lexer::new(src).tokenize();
        resolve(Parser::new(tokens).parse().unwrap())
    }

    const SUM_OF_SQUARES: &str = "\
name: SumOfSquares;
platform: IntegerComputer;
int i;
int s;
initial state: Start {
    goto Compute when true performing { i := 0; s := 0; };
}
state: Compute {
    goto Compute when i <= input performing { s := s + i * i; i := i + 1; };
    exit when true performing { output := s; };
}
";

    fn collect_origins(program: &ResolvedProgram) -> Vec<(String, Origin)> {
        let mut out = Vec::new();
        let mut states = program.states().to_vec();
        for state in &mut states {
            for t in &mut state.transitions {
                for stmt in &mut t.body {
                    out.push((stmt.lhs.name.clone(), stmt.lhs.origin()));
                    stmt.rhs
                        .for_each_variable_mut(&mut |v| out.push((v.name.clone(), v.origin())));
                }
                t.guard
                    .for_each_variable_mut(&mut |v| out.push((v.name.clone(), v.origin())));
            }
        }
        out
    }

    #[test]
    fn counts_match_sum_of_squares() {
        let program = resolved(SUM_OF_SQUARES);
        assert_eq!(
            program.counts(),
            ProgramCounts {
                decls: 2,
                states: 2,
                variable_uses: 12
            }
        );
        assert_eq!(program.num_var_decls(), 2);
        assert_eq!(program.num_states(), 2);
        assert_eq!(program.num_var_uses(), 12);
    }

    #[test]
    fn declared_names_are_local_others_platform() {
        let program = resolved(SUM_OF_SQUARES);
        let origins = collect_origins(&program);
        assert_eq!(origins.len(), 12);
        for (name, origin) in origins {
            match name.as_str() {
                "i" | "s" => assert_eq!(origin, Origin::Local, "{name}"),
                "input" | "output" => assert_eq!(origin, Origin::Platform, "{name}"),
                other => panic!("unexpected variable {other}"),
            }
        }
    }

    #[test]
    fn symbol_table_holds_declarations() {
        let program = resolved(SUM_OF_SQUARES);
        let symbols: Vec<&str> = program.symbols().iter().map(String::as_str).collect();
        assert_eq!(symbols, vec!["i", "s"]);
    }

    #[test]
    fn counts_for_single_state_program() {
        let program = resolved(
            "name: BigWeek; platform: BulkBag; int i; char n; boolean b; \
             initial state: Compute { \
               goto Compute when i <= input performing { s := s + 1; }; \
               exit when s > 100 performing { i := i + 1; }; }",
        );
        assert_eq!(program.num_var_uses(), 7);
        assert_eq!(program.num_var_decls(), 3);
        assert_eq!(program.num_states(), 1);
    }

    #[test]
    fn counts_without_decls() {
        let program = resolved(
            "name: BigWeek; platform: BulkBag; \
             initial state: Huge { goto Literally when true performing { output := input * input; }; } \
             state: Compute { goto Compute when i <= input performing { s := s + 1; }; \
               exit when s > 100 performing { i := i + 1; }; }",
        );
        assert_eq!(program.num_var_uses(), 10);
        assert_eq!(program.num_var_decls(), 0);
        assert_eq!(program.num_states(), 2);
    }

    #[test]
    fn empty_program_counts_are_zero() {
        let program = resolved("name: Idle; platform: P;");
        assert_eq!(
            program.counts(),
            ProgramCounts {
                decls: 0,
                states: 0,
                variable_uses: 0
            }
        );
        assert!(program.initial_state().is_none());
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn goto_targets_and_names_stay_unresolved() {
        let program = resolved(SUM_OF_SQUARES);
        let start = &program.states()[0];
        assert_eq!(start.name.origin(), Origin::Unresolved);
        assert_eq!(
            start.transitions[0].target().map(Variable::origin),
            Some(Origin::Unresolved)
        );
    }

    #[test]
    fn initial_state_is_found() {
        let program = resolved(SUM_OF_SQUARES);
        assert_eq!(
            program.initial_state().map(|s| s.name.name.as_str()),
            Some("Start")
        );
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn diagnostics_for_suspicious_programs() {
        let program = resolved(
            "name: M; platform: P; int x; int x; \
             initial state: A { goto Nowhere when true performing { }; } \
             initial state: B { }",
        );
        assert_eq!(
            program.diagnostics(),
            &[
                Diagnostic::DuplicateDecl {
                    name: "x".to_string()
                },
                Diagnostic::MultipleInitialStates {
                    first: "A".to_string(),
                    extra: "B".to_string()
                },
                Diagnostic::UnknownGotoTarget {
                    state: "A".to_string(),
                    target: "Nowhere".to_string()
                },
            ]
        );
        assert_eq!(program.initial_state().map(|s| s.name.name.as_str()), Some("A"));
        assert_eq!(program.num_var_decls(), 2);
    }
}
