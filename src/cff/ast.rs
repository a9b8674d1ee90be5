//! Abstract Syntax Tree for CFF programs.
//!
//! Every list production (declarations, states, transitions, statements) is
//! an ordered `Vec` in source order; an empty list is simply empty.
//! The tree is produced by the parser as an [`UnresolvedProgram`] and turned
//! into a [`ResolvedProgram`](super::resolve::ResolvedProgram) by the resolver,
//! which is the only place a [`Variable`]'s origin is ever written.

use serde::Serialize;

/// Where a variable's storage lives in the generated machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Origin {
    Unresolved,
    /// Not declared by the program; reached through platform getters/setters.
    Platform,
    /// Declared by the program; a field on the generated machine.
    Local,
}

/// A use of a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    origin: Origin,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: Origin::Unresolved,
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Record where this variable lives. Only the resolver calls this, once
    /// per node.
    pub(crate) fn resolve(&mut self, is_local: bool) {
        debug_assert_eq!(
            self.origin,
            Origin::Unresolved,
            "variable `{}` resolved twice",
            self.name
        );
        self.origin = if is_local {
            Origin::Local
        } else {
            Origin::Platform
        };
    }
}

/// The literal class of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstKind {
    Int,
    Float,
    String,
    Char,
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// An expression tree. Each node owns its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A literal, kept as its raw lexeme (quotes included for strings/chars).
    Constant { kind: ConstKind, text: String },
    Variable(Variable),
    Operator {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Comparison {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(kind: ConstKind, text: impl Into<String>) -> Self {
        Expr::Constant {
            kind,
            text: text.into(),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(Variable::new(name))
    }

    pub fn operator(op: ArithOp, left: Expr, right: Expr) -> Self {
        Expr::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn comparison(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Call `f` on every variable in this expression, left to right.
    pub fn for_each_variable_mut(&mut self, f: &mut impl FnMut(&mut Variable)) {
        match self {
            Expr::Constant { .. } => {}
            Expr::Variable(v) => f(v),
            Expr::Operator { left, right, .. } | Expr::Comparison { left, right, .. } => {
                left.for_each_variable_mut(f);
                right.for_each_variable_mut(f);
            }
        }
    }
}

/// `lhs := rhs;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stmt {
    pub lhs: Variable,
    pub rhs: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TransitionKind {
    Goto { target: Variable },
    Exit,
}

/// One guarded alternative of a state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub guard: Expr,
    pub body: Vec<Stmt>,
    pub kind: TransitionKind,
}

impl Transition {
    pub fn is_exit(&self) -> bool {
        matches!(self.kind, TransitionKind::Exit)
    }

    pub fn target(&self) -> Option<&Variable> {
        match &self.kind {
            TransitionKind::Goto { target } => Some(target),
            TransitionKind::Exit => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    pub name: Variable,
    pub transitions: Vec<Transition>,
    pub is_initial: bool,
}

/// Declared type of a machine-local variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeclType {
    Int,
    Float,
    Boolean,
    String,
    Char,
}

impl DeclType {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclType::Int => "int",
            DeclType::Float => "float",
            DeclType::Boolean => "boolean",
            DeclType::String => "string",
            DeclType::Char => "char",
        }
    }

    /// Field type in the generated declaration document.
    pub fn cpp_type(self) -> &'static str {
        match self {
            DeclType::Int => "int",
            DeclType::Float => "float",
            DeclType::Boolean => "bool",
            DeclType::String => "std::string",
            DeclType::Char => "char",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decl {
    pub ty: DeclType,
    pub name: Variable,
}

/// The external runtime type the machine is driven by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Platform {
    pub name: Variable,
}

/// A freshly parsed program. No variable has an origin yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnresolvedProgram {
    pub name: Variable,
    pub platform: Platform,
    pub decls: Vec<Decl>,
    pub states: Vec<State>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_variable_is_unresolved() {
        let v = Variable::new("x");
        assert_eq!(v.origin(), Origin::Unresolved);
    }

    #[test]
    fn resolve_sets_origin() {
        let mut local = Variable::new("i");
        local.resolve(true);
        assert_eq!(local.origin(), Origin::Local);

        let mut remote = Variable::new("input");
        remote.resolve(false);
        assert_eq!(remote.origin(), Origin::Platform);
    }

    #[test]
    fn for_each_variable_visits_left_to_right() {
        let mut expr = Expr::comparison(
            CompareOp::Le,
            Expr::variable("i"),
            Expr::operator(
                ArithOp::Add,
                Expr::variable("input"),
                Expr::constant(ConstKind::Int, "1"),
            ),
        );
        let mut seen = Vec::new();
        expr.for_each_variable_mut(&mut |v| seen.push(v.name.clone()));
        assert_eq!(seen, vec!["i", "input"]);
    }

    #[test]
    fn operator_symbols() {
        assert_eq!(ArithOp::Div.symbol(), "/");
        assert_eq!(CompareOp::Ne.symbol(), "!=");
        assert_eq!(CompareOp::Ge.symbol(), ">=");
    }

    #[test]
    fn decl_types_map_to_cpp() {
        assert_eq!(DeclType::Boolean.keyword(), "boolean");
        assert_eq!(DeclType::Boolean.cpp_type(), "bool");
        assert_eq!(DeclType::String.cpp_type(), "std::string");
        assert_eq!(DeclType::Int.cpp_type(), "int");
    }

    #[test]
    fn transition_target() {
        let goto = Transition {
            guard: Expr::constant(ConstKind::Bool, "true"),
            body: Vec::new(),
            kind: TransitionKind::Goto {
                target: Variable::new("Next"),
            },
        };
        assert!(!goto.is_exit());
        assert_eq!(goto.target().map(|v| v.name.as_str()), Some("Next"));

        let exit = Transition {
            kind: TransitionKind::Exit,
            ..goto
        };
        assert!(exit.is_exit());
        assert!(exit.target().is_none());
    }
}
