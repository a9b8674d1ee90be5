//! Code generator — renders a resolved program as a C++ class.
//!
//! Produces two documents: a declaration (header) and an implementation.
//! The machine gets one method per state; each method announces itself to
//! the platform, then runs the state's transitions as a first-match
//! `if`/`else if` cascade. Nothing here mutates the tree.

use log::debug;

use super::ast::*;
use super::error::CompileError;
use super::resolve::ResolvedProgram;

/// File names the generated documents refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenOptions {
    /// Name the implementation uses to include the declaration document.
    pub header_file: String,
    /// Header declaring the platform runtime types.
    pub runtime_header: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            header_file: "Machine.h".to_string(),
            runtime_header: "RunTime.h".to_string(),
        }
    }
}

impl CodegenOptions {
    /// Include guard derived from the header name: `Machine.h` → `MACHINE_H`.
    /// A leading digit gets a `_` prefix so the guard stays a valid macro name.
    pub fn header_guard(&self) -> String {
        let guard: String = self
            .header_file
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        match guard.chars().next() {
            Some(c) if c.is_ascii_digit() => format!("_{guard}"),
            Some(_) => guard,
            None => "_".to_string(),
        }
    }
}

/// The two generated documents.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedMachine {
    pub header: String,
    pub implementation: String,
}

pub fn generate(
    program: &ResolvedProgram,
    options: &CodegenOptions,
) -> Result<GeneratedMachine, CompileError> {
    let header = render_header(program, options);
    let implementation = render_implementation(program, options)?;
    debug!(
        "generated `{}`: header {} bytes, implementation {} bytes",
        program.name(),
        header.len(),
        implementation.len()
    );
    Ok(GeneratedMachine {
        header,
        implementation,
    })
}

// --- Declaration document ---

fn render_header(program: &ResolvedProgram, options: &CodegenOptions) -> String {
    let name = program.name();
    let platform = program.platform();
    let guard = options.header_guard();
    let mut out = String::new();

    out.push_str(&format!("#ifndef {guard}\n#define {guard}\n"));
    out.push_str(&format!("class {name} {{ \n"));
    out.push_str("\tpublic: \n");
    out.push_str(&format!("\t\t{name}({platform} *platform);\n"));
    out.push_str(&format!("\t\t~{name}();\n"));

    for decl in program.decls() {
        out.push_str(&format!("\t\t{} {};\n", decl.ty.cpp_type(), decl.name.name));
    }

    if program.states().is_empty() {
        out.push_str("\n\t\t// No states\n");
    }
    for state in program.states() {
        out.push_str(&format!("\t\tvoid {}();\n", state.name.name));
    }

    out.push_str("\tprivate:\n");
    out.push_str(&format!("\t\t{platform} *platform;\n"));
    out.push_str("};\n\n");
    out.push_str("int main(int argc, char **argv);\n\n");
    out.push_str("#endif\n");
    out
}

// --- Implementation document ---

fn render_implementation(
    program: &ResolvedProgram,
    options: &CodegenOptions,
) -> Result<String, CompileError> {
    let name = program.name();
    let platform = program.platform();
    let mut out = String::new();

    out.push_str(&format!("#include \"{}\"\n", options.runtime_header));
    out.push_str(&format!("#include \"{}\"\n", options.header_file));

    out.push_str(&format!("{name}::{name}({platform} *p) {{\n"));
    out.push_str("\tthis->platform = p;\n");
    out.push_str("};\n");
    out.push_str(&format!("{name}::~{name}() {{}}\n\n"));

    if program.states().is_empty() {
        out.push_str("\n\t\t// No states\n");
    }
    for state in program.states() {
        out.push_str(&format!("void {name}::{}() {{\n", state.name.name));
        out.push_str("\tplatform->enter_state();\n\n");
        out.push_str(&render_transitions(&state.transitions)?);
        out.push_str("}\n\n");
    }

    out.push_str(&render_main(program));
    out.push_str("\n\n\n");
    Ok(out)
}

fn render_transitions(transitions: &[Transition]) -> Result<String, CompileError> {
    if transitions.is_empty() {
        return Ok("\n\t\t// No transitions\n".to_string());
    }

    let mut out = String::new();
    for (i, transition) in transitions.iter().enumerate() {
        let branch = if i == 0 { "\tif " } else { "else if " };
        out.push_str(&format!("{branch}({}) {{\n", render_expr(&transition.guard)?));
        out.push_str(&render_stmts(&transition.body)?);
        out.push_str("\t\tplatform->next_state();\n");
        if let Some(target) = transition.target() {
            out.push_str(&format!("\t\t{}();\n", target.name));
        }
        out.push_str("\t} ");
    }
    out.push('\n');
    Ok(out)
}

fn render_stmts(stmts: &[Stmt]) -> Result<String, CompileError> {
    if stmts.is_empty() {
        return Ok("\t\t// No statements\n".to_string());
    }

    let mut out = String::new();
    for stmt in stmts {
        let rhs = render_expr(&stmt.rhs)?;
        let line = match stmt.lhs.origin() {
            Origin::Platform => format!("\t\tplatform->set_{}({rhs});\n", stmt.lhs.name),
            Origin::Local => format!("\t\tthis->{} = {rhs};\n", stmt.lhs.name),
            Origin::Unresolved => return Err(unresolved(&stmt.lhs)),
        };
        out.push_str(&line);
    }
    Ok(out)
}

/// Binary nodes are padded with a space on every side, so nested
/// expressions come out as e.g. ` this->s +  this->i * this->i  `.
pub fn render_expr(expr: &Expr) -> Result<String, CompileError> {
    Ok(match expr {
        Expr::Constant { text, .. } => text.clone(),
        Expr::Variable(v) => match v.origin() {
            Origin::Platform => format!("platform->get_{}()", v.name),
            Origin::Local => format!("this->{}", v.name),
            Origin::Unresolved => return Err(unresolved(v)),
        },
        Expr::Operator { op, left, right } => {
            binary(render_expr(left)?, op.symbol(), render_expr(right)?)
        }
        Expr::Comparison { op, left, right } => {
            binary(render_expr(left)?, op.symbol(), render_expr(right)?)
        }
    })
}

fn binary(left: String, symbol: &str, right: String) -> String {
    format!(" {left} {symbol} {right} ")
}

fn unresolved(v: &Variable) -> CompileError {
    CompileError::internal(format!("variable `{}` reached code generation unresolved", v.name))
}

fn render_main(program: &ResolvedProgram) -> String {
    let name = program.name();
    let platform = program.platform();

    let initial_call = if program.states().is_empty() {
        "// No initial state (empty)\n".to_string()
    } else {
        match program.initial_state() {
            Some(state) => format!("machine->{}();", state.name.name),
            None => "// No initial state (not declared)".to_string(),
        }
    };

    let mut out = String::new();
    out.push_str("int main(int argc, char **argv) {\n\n");
    out.push_str(&format!(
        "\t{platform} *platform = new {platform}(argc, argv);\n\n"
    ));
    out.push_str(&format!("\t{name} *machine = new {name}(platform);\n"));
    out.push_str(&format!("\t{initial_call}\n\n"));
    out.push_str("\treturn 0;\n");
    out.push_str("}\n");
    out
}
