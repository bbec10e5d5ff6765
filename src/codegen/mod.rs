//! C code generation.
//!
//! Lowers a typechecked [Program] to C99 text. Struct values are heap
//! pointers: every struct gets a forward typedef (so self-referential and
//! mutually referential shapes work regardless of declaration order), an
//! `sl_X_alloc` constructor and a NULL-safe recursive `sl_X_free`.
//!
//! Ownership of an allocation is move-only: initializing or assigning from
//! a variable moves it, and allocation field initializers move their
//! operands. Call arguments are lent, not moved: the callee borrows its
//! struct params and never frees them, so the caller stays responsible. A
//! struct-typed field read borrows rather than moves. An owning expression
//! must be received by a declaration, an assignment, a return, a field
//! initializer or an expression statement; in any other position it is
//! rejected, as is returning a value the function does not own. Moving out
//! of a variable that outlives the current scope clears it to NULL, so the
//! owner's scope-exit free stays correct on paths where the move ran. At
//! every scope exit the still-owned locals of that scope are freed in
//! reverse declaration order; `return` frees all owned locals of the
//! function except the one being returned, and `break` frees everything up
//! to and including the loop body. Same typed program in, byte-identical C
//! out.

mod codegen_error;
mod scope;

#[cfg(test)]
mod codegen_tests;

use crate::ast::*;
use crate::source::Sourced;
use rustc_hash::FxHashMap;
use scope::{ScopeKind, ScopeStack};
use std::fmt::Write;

pub use codegen_error::{CodegenError, Result};

const INDENT: &str = "    ";

/// Generates the C translation of a typechecked program.
pub fn generate(program: &Program) -> Result<String> {
    Codegen::new(program).generate(program)
}

struct Codegen {
    out: String,
    depth: usize,
    scopes: ScopeStack,
    structs: FxHashMap<Identifier, StructDef>,
    // variables from enclosing scopes moved out of by the statement being
    // generated, cleared to NULL once the statement is emitted
    pending_clears: Vec<Identifier>,
    in_main: bool,
}

impl Codegen {
    fn new(program: &Program) -> Self {
        let structs = program
            .struct_defs
            .iter()
            .map(|struct_def| (struct_def.name.value.clone(), struct_def.clone()))
            .collect();
        Self {
            out: String::new(),
            depth: 0,
            scopes: ScopeStack::default(),
            structs,
            pending_clears: Vec::new(),
            in_main: false,
        }
    }

    fn generate(mut self, program: &Program) -> Result<String> {
        self.line("#include <stdio.h>")?;
        self.line("#include <stdlib.h>")?;

        if !program.struct_defs.is_empty() {
            self.blank();
            for struct_def in &program.struct_defs {
                self.line(&format!("typedef struct {0} {0};", struct_def.name.value))?;
            }
        }
        for struct_def in &program.struct_defs {
            self.blank();
            self.gen_struct_definition(struct_def)?;
        }

        if !(program.struct_defs.is_empty() && program.function_defs.is_empty()) {
            self.blank();
            for struct_def in &program.struct_defs {
                self.line(&format!("{};", alloc_signature(struct_def)))?;
                self.line(&format!("{};", free_signature(struct_def)))?;
            }
            for function_def in &program.function_defs {
                self.line(&format!("{};", function_signature(function_def)))?;
            }
        }

        for struct_def in &program.struct_defs {
            self.blank();
            self.gen_alloc_helper(struct_def)?;
            self.blank();
            self.gen_free_helper(struct_def)?;
        }
        for function_def in &program.function_defs {
            self.blank();
            self.gen_function(function_def)?;
        }

        self.blank();
        self.gen_main(&program.statements)?;

        Ok(self.out)
    }

    fn gen_struct_definition(&mut self, struct_def: &StructDef) -> Result<()> {
        self.line(&format!("struct {} {{", struct_def.name.value))?;
        self.depth += 1;
        // C99 forbids an empty member list
        if struct_def.fields.is_empty() {
            self.line("char sl_empty;")?;
        }
        for field in &struct_def.fields {
            self.line(&format!(
                "{} {};",
                c_type(&field.param_type.value),
                field.name.value
            ))?;
        }
        self.depth -= 1;
        self.line("};")
    }

    fn gen_alloc_helper(&mut self, struct_def: &StructDef) -> Result<()> {
        let name = &struct_def.name.value;
        self.line(&format!("{} {{", alloc_signature(struct_def)))?;
        self.depth += 1;
        self.line(&format!("{name}* sl_object = malloc(sizeof({name}));"))?;
        for field in &struct_def.fields {
            self.line(&format!("sl_object->{0} = {0};", field.name.value))?;
        }
        self.line("return sl_object;")?;
        self.depth -= 1;
        self.line("}")
    }

    fn gen_free_helper(&mut self, struct_def: &StructDef) -> Result<()> {
        self.line(&format!("{} {{", free_signature(struct_def)))?;
        self.depth += 1;
        self.line("if (value == NULL) {")?;
        self.depth += 1;
        self.line("return;")?;
        self.depth -= 1;
        self.line("}")?;
        for field in &struct_def.fields {
            if let Some(field_struct) = field.param_type.value.struct_name() {
                self.line(&format!(
                    "sl_{field_struct}_free(value->{});",
                    field.name.value
                ))?;
            }
        }
        self.line("free(value);")?;
        self.depth -= 1;
        self.line("}")
    }

    fn gen_function(&mut self, function_def: &FunctionDef) -> Result<()> {
        self.line(&format!("{} {{", function_signature(function_def)))?;
        self.scopes.enter(ScopeKind::Function);
        // struct params are borrowed from the caller, never freed here
        for param in &function_def.params {
            if let Some(struct_name) = param.param_type.value.struct_name() {
                self.scopes
                    .declare(param.name.value.clone(), struct_name.clone(), false);
            }
        }
        self.depth += 1;
        for stmt in &function_def.body.statements {
            self.gen_statement(stmt)?;
        }
        let frees = self.scopes.exit();
        if !ends_with_jump(&function_def.body.statements) {
            self.emit_frees(&frees)?;
        }
        self.depth -= 1;
        self.line("}")
    }

    fn gen_main(&mut self, statements: &[Stmt]) -> Result<()> {
        self.in_main = true;
        self.line("int main(void) {")?;
        self.scopes.enter(ScopeKind::Function);
        self.depth += 1;
        for stmt in statements {
            self.gen_statement(stmt)?;
        }
        let frees = self.scopes.exit();
        if !ends_with_jump(statements) {
            self.emit_frees(&frees)?;
            self.line("return 0;")?;
        }
        self.depth -= 1;
        self.line("}")
    }

    fn gen_statement(&mut self, stmt: &Stmt) -> Result<()> {
        self.gen_statement_kind(&stmt.kind)?;
        self.flush_clears()
    }

    fn gen_statement_kind(&mut self, kind: &StmtKind) -> Result<()> {
        match kind {
            StmtKind::VarDec {
                var_type,
                name,
                init,
            } => {
                let value = self.exp_to_c(init)?;
                let owned = self.owns_value(init);
                self.line(&format!(
                    "{} {} = {value};",
                    c_type(&var_type.value),
                    name.value
                ))?;
                self.consume_if_var(init);
                if let Some(struct_name) = var_type.value.struct_name() {
                    self.scopes
                        .declare(name.value.clone(), struct_name.clone(), owned);
                }
                Ok(())
            }
            StmtKind::Assign { name, value } => self.gen_assign(name, value),
            StmtKind::If {
                condition,
                then,
                els,
            } => {
                let cond = self.exp_to_c(condition)?;
                self.line(&format!("if ({cond}) {{"))?;
                self.gen_arm(then, ScopeKind::Block)?;
                if let Some(els) = els {
                    self.line("} else {")?;
                    self.gen_arm(els, ScopeKind::Block)?;
                }
                self.line("}")
            }
            StmtKind::While { condition, body } => {
                let cond = self.exp_to_c(condition)?;
                self.line(&format!("while ({cond}) {{"))?;
                self.gen_arm(body, ScopeKind::Loop)?;
                self.line("}")
            }
            StmtKind::Break => {
                let frees = self.scopes.pending_at_break();
                self.emit_frees(&frees)?;
                self.line("break;")
            }
            StmtKind::Return(None) => {
                let frees = self.scopes.pending_at_return(None);
                self.emit_frees(&frees)?;
                self.line(if self.in_main { "return 0;" } else { "return;" })
            }
            StmtKind::Return(Some(exp)) => self.gen_return_value(exp),
            StmtKind::Println(exp) => {
                let is_int = *resolved_type(exp)? == TypeKind::Int;
                let value = self.exp_to_c(exp)?;
                if is_int {
                    self.line(&format!("printf(\"%d\", {value});"))
                } else {
                    self.line(&format!(
                        "printf(\"%s\", ({value}) ? \"true\" : \"false\");"
                    ))
                }
            }
            StmtKind::Exp(exp) => {
                let ty = resolved_type(exp)?.clone();
                let value = self.exp_to_c(exp)?;
                // an owning result nobody receives is freed on the spot
                if exp.is_owning() {
                    if let TypeKind::Struct(Some(struct_name)) = &ty {
                        return self.line(&format!("sl_{struct_name}_free({value});"));
                    }
                }
                self.line(&format!("{value};"))
            }
            StmtKind::Block(block) => {
                self.line("{")?;
                self.gen_scope_body(&block.statements, ScopeKind::Block)?;
                self.line("}")
            }
        }
    }

    fn gen_assign(&mut self, name: &Sourced<Identifier>, value: &Exp) -> Result<()> {
        let rendered = self.exp_to_c(value)?;
        let Some(struct_name) = self.scopes.struct_name(&name.value) else {
            return self.line(&format!("{} = {rendered};", name.value));
        };

        let owned_after = self.owns_value(value);
        let self_assign = value.as_var().is_some_and(|var| *var == name.value);
        let target_consumed = self.pending_clears.contains(&name.value);

        // free the old value unless the right-hand side consumed it
        if self.scopes.is_owned(&name.value) && !self_assign && !target_consumed {
            self.line("{")?;
            self.depth += 1;
            self.line(&format!("{struct_name}* sl_tmp = {rendered};"))?;
            self.line(&format!("sl_{struct_name}_free({});", name.value))?;
            self.line(&format!("{} = sl_tmp;", name.value))?;
            self.depth -= 1;
            self.line("}")?;
        } else {
            self.line(&format!("{} = {rendered};", name.value))?;
        }
        if !self_assign {
            self.consume_if_var(value);
        }
        // the assignment itself repopulates the target
        self.pending_clears.retain(|cleared| *cleared != name.value);
        self.scopes.set_owned(&name.value, owned_after);
        Ok(())
    }

    fn gen_return_value(&mut self, exp: &Exp) -> Result<()> {
        let ty = resolved_type(exp)?.clone();
        if matches!(ty, TypeKind::Struct(_)) && !self.owns_value(exp) {
            return Err(CodegenError::ReturnedBorrow(exp.source.text().to_string()));
        }

        let escaping = exp.as_var().cloned();
        let value = self.exp_to_c(exp)?;
        // anything moved into the return value escapes with it and must not
        // be freed here; its owning scope keeps it for the paths that stay
        let mut frees = self.scopes.pending_at_return(escaping.as_deref());
        let moved_out = std::mem::take(&mut self.pending_clears);
        frees.retain(|(name, _)| !moved_out.contains(name));

        if frees.is_empty() || escaping.is_some() {
            self.emit_frees(&frees)?;
            self.line(&format!("return {value};"))
        } else {
            // capture the value before freeing anything it might read
            self.line("{")?;
            self.depth += 1;
            self.line(&format!("{} sl_ret = {value};", c_type(&ty)))?;
            self.emit_frees(&frees)?;
            self.line("return sl_ret;")?;
            self.depth -= 1;
            self.line("}")
        }
    }

    /// Emits the body of an `if`/`while` arm inside the braces the caller
    /// printed, opening one scope. A block arm contributes its statements
    /// directly so the output is not double-braced.
    fn gen_arm(&mut self, stmt: &Stmt, kind: ScopeKind) -> Result<()> {
        match &stmt.kind {
            StmtKind::Block(block) => self.gen_scope_body(&block.statements, kind),
            _ => self.gen_scope_body(std::slice::from_ref(stmt), kind),
        }
    }

    fn gen_scope_body(&mut self, statements: &[Stmt], kind: ScopeKind) -> Result<()> {
        self.scopes.enter(kind);
        self.depth += 1;
        for stmt in statements {
            self.gen_statement(stmt)?;
        }
        let frees = self.scopes.exit();
        if !ends_with_jump(statements) {
            self.emit_frees(&frees)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn exp_to_c(&mut self, exp: &Exp) -> Result<String> {
        let rendered = match &exp.kind {
            ExpKind::IntLiteral(value) => value.to_string(),
            ExpKind::BoolLiteral(true) => String::from("1"),
            ExpKind::BoolLiteral(false) => String::from("0"),
            ExpKind::Null => String::from("NULL"),
            ExpKind::Var(name) => name.clone(),
            ExpKind::Unary(op, inner) => {
                format!("{}{}", op.symbol(), self.exp_to_c(inner)?)
            }
            ExpKind::Binary(op, left, right) => {
                ensure_bound(left)?;
                ensure_bound(right)?;
                format!(
                    "{} {} {}",
                    self.exp_to_c(left)?,
                    op.symbol(),
                    self.exp_to_c(right)?
                )
            }
            ExpKind::Dot(receiver, field) => {
                ensure_bound(receiver)?;
                format!("{}->{}", self.exp_to_c(receiver)?, field.value)
            }
            ExpKind::Paren(inner) => format!("({})", self.exp_to_c(inner)?),
            ExpKind::Call(name, args) => {
                // arguments are lent, so no ownership changes here
                let mut rendered_args = Vec::new();
                for arg in args {
                    ensure_bound(arg)?;
                    rendered_args.push(self.exp_to_c(arg)?);
                }
                format!("{}({})", name.value, rendered_args.join(", "))
            }
            ExpKind::New(alloc) => self.struct_alloc_to_c(alloc)?,
        };
        Ok(rendered)
    }

    fn struct_alloc_to_c(&mut self, alloc: &StructAlloc) -> Result<String> {
        let struct_name = &alloc.struct_name.value;
        let struct_def = self
            .structs
            .get(struct_name)
            .expect("typechecker resolved the struct")
            .clone();

        // the alloc helper takes fields in declaration order
        let mut args = Vec::new();
        for field in &struct_def.fields {
            let init = alloc
                .fields
                .iter()
                .find(|init| init.name.value == field.name.value)
                .expect("typechecker covered every field");
            args.push(self.exp_to_c(&init.value)?);
            self.consume_if_var(&init.value);
        }
        Ok(format!("sl_{struct_name}_alloc({})", args.join(", ")))
    }

    /// A struct variable handed over as a value loses ownership. A variable
    /// from an enclosing scope is cleared after the statement instead, so
    /// the scope that owns it frees NULL on paths where the move ran.
    fn consume_if_var(&mut self, exp: &Exp) {
        let Some(name) = exp.as_var() else { return };
        if self.scopes.struct_name(name).is_none() {
            return;
        }
        if self.scopes.in_innermost(name) {
            self.scopes.mark_moved(name);
        } else {
            self.pending_clears.push(name.clone());
        }
    }

    // ownership state stays untouched: on paths that skipped the move the
    // owning scope still frees the value, and NULL is safe to free
    fn flush_clears(&mut self) -> Result<()> {
        for name in std::mem::take(&mut self.pending_clears) {
            self.line(&format!("{name} = NULL;"))?;
        }
        Ok(())
    }

    /// Whether `exp` yields a value the receiving slot will own. Aliasing an
    /// unowned variable (a borrowed param, or one already moved out) yields
    /// another borrow; null counts as owned since the free helpers are
    /// NULL-safe.
    fn owns_value(&self, exp: &Exp) -> bool {
        exp.is_owning()
            || exp.is_null()
            || exp.as_var().is_some_and(|name| self.scopes.is_owned(name))
    }

    fn emit_frees(&mut self, frees: &[(Identifier, Identifier)]) -> Result<()> {
        for (name, struct_name) in frees {
            self.line(&format!("sl_{struct_name}_free({name});"))?;
        }
        Ok(())
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}{text}", INDENT.repeat(self.depth))?;
        Ok(())
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }
}

fn resolved_type(exp: &Exp) -> Result<&TypeKind> {
    exp.ty
        .as_ref()
        .ok_or_else(|| CodegenError::UntypedExpression(exp.source.text().to_string()))
}

/// An owning struct expression is only legal where something receives it: a
/// declaration, an assignment, a return, a field initializer or a bare
/// expression statement. In any other position nothing would free it.
fn ensure_bound(exp: &Exp) -> Result<()> {
    if exp.is_owning() && matches!(exp.ty, Some(TypeKind::Struct(_))) {
        return Err(CodegenError::UnboundAllocation(
            exp.source.text().to_string(),
        ));
    }
    Ok(())
}

fn ends_with_jump(statements: &[Stmt]) -> bool {
    matches!(
        statements.last().map(|stmt| &stmt.kind),
        Some(StmtKind::Return(_) | StmtKind::Break)
    )
}

fn c_type(ty: &TypeKind) -> String {
    match ty {
        TypeKind::Int | TypeKind::Bool => String::from("int"),
        TypeKind::Void => String::from("void"),
        TypeKind::Struct(Some(name)) => format!("{name}*"),
        TypeKind::Struct(None) => String::from("void*"),
    }
}

fn param_list(params: &[Param]) -> String {
    if params.is_empty() {
        return String::from("void");
    }
    params
        .iter()
        .map(|param| format!("{} {}", c_type(&param.param_type.value), param.name.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn alloc_signature(struct_def: &StructDef) -> String {
    format!(
        "{0}* sl_{0}_alloc({1})",
        struct_def.name.value,
        param_list(&struct_def.fields)
    )
}

fn free_signature(struct_def: &StructDef) -> String {
    format!("void sl_{0}_free({0}* value)", struct_def.name.value)
}

fn function_signature(function_def: &FunctionDef) -> String {
    format!(
        "{} {}({})",
        c_type(&function_def.return_type.value),
        function_def.name.value,
        param_list(&function_def.params)
    )
}
