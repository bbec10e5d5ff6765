//! Single-pass typechecker.
//!
//! Struct and function definitions are indexed up front, so self-referential
//! structs, mutual recursion and use-before-definition all resolve. Every
//! expression's resolved-type slot is filled bottom-up; statements are
//! checked against a scope chain of name-to-type tables. The top-level
//! statement list is checked as the body of a `void` function.

mod returns;
mod type_error;


use crate::ast::*;
use crate::source::{Source, Sourced};
use returns::{block_status, ReturnStatus};
use rustc_hash::FxHashMap;

pub use type_error::{InnerTypeError, Result, TypeError};

/// Typechecks `program`, returning it with every expression's type slot
/// filled in, or the first type error found.
pub fn typecheck(mut program: Program) -> Result<Program> {
    let mut checker = Typechecker::new(&program)?;

    for struct_def in &program.struct_defs {
        checker.check_struct_def(struct_def)?;
    }
    for function_def in &mut program.function_defs {
        checker.check_function_def(function_def)?;
    }

    checker.return_type = TypeKind::Void;
    checker.enter_scope();
    for stmt in &mut program.statements {
        checker.check_statement(stmt)?;
    }
    checker.exit_scope();

    Ok(program)
}

#[derive(Debug, Clone)]
struct FunctionSignature {
    params: Vec<TypeKind>,
    return_type: TypeKind,
}

#[derive(Debug)]
struct Typechecker {
    structs: FxHashMap<Identifier, StructDef>,
    functions: FxHashMap<Identifier, FunctionSignature>,
    scopes: Vec<FxHashMap<Identifier, TypeKind>>,
    loop_depth: usize,
    return_type: TypeKind,
}

impl Typechecker {
    fn new(program: &Program) -> Result<Self> {
        let mut structs = FxHashMap::default();
        for struct_def in &program.struct_defs {
            let name = struct_def.name.value.clone();
            if structs.insert(name.clone(), struct_def.clone()).is_some() {
                return Err(InnerTypeError::DuplicateStructDefinition(name).within(
                    "struct definition",
                    &struct_def.source,
                    &struct_def.name.source,
                ));
            }
        }

        let mut functions = FxHashMap::default();
        for function_def in &program.function_defs {
            let name = function_def.name.value.clone();
            let signature = FunctionSignature {
                params: function_def
                    .params
                    .iter()
                    .map(|p| p.param_type.value.clone())
                    .collect(),
                return_type: function_def.return_type.value.clone(),
            };
            if functions.insert(name.clone(), signature).is_some() {
                return Err(InnerTypeError::DuplicateFunctionDefinition(name).within(
                    "function definition",
                    &function_def.source,
                    &function_def.name.source,
                ));
            }
        }

        Ok(Self {
            structs,
            functions,
            scopes: Vec::new(),
            loop_depth: 0,
            return_type: TypeKind::Void,
        })
    }

    fn check_struct_def(&self, struct_def: &StructDef) -> Result<()> {
        let mut seen = FxHashMap::default();
        for field in &struct_def.fields {
            let name = &field.name;
            if seen.insert(name.value.clone(), ()).is_some() {
                return Err(InnerTypeError::DuplicateField(name.value.clone()).within(
                    "struct definition",
                    &struct_def.source,
                    &name.source,
                ));
            }
            if field.param_type.value == TypeKind::Void {
                return Err(InnerTypeError::VoidField(name.value.clone()).within(
                    "struct definition",
                    &struct_def.source,
                    &field.param_type.source,
                ));
            }
            self.ensure_declared_type(&field.param_type, "struct definition", &struct_def.source)?;
        }
        Ok(())
    }

    fn check_function_def(&mut self, function_def: &mut FunctionDef) -> Result<()> {
        let mut seen = FxHashMap::default();
        for param in &function_def.params {
            let name = &param.name;
            if seen.insert(name.value.clone(), ()).is_some() {
                return Err(InnerTypeError::DuplicateParam(name.value.clone()).within(
                    "function definition",
                    &function_def.source,
                    &name.source,
                ));
            }
            if param.param_type.value == TypeKind::Void {
                return Err(InnerTypeError::VoidVariable(name.value.clone()).within(
                    "function definition",
                    &function_def.source,
                    &param.param_type.source,
                ));
            }
            self.ensure_declared_type(
                &param.param_type,
                "function definition",
                &function_def.source,
            )?;
        }
        self.ensure_declared_type(
            &function_def.return_type,
            "function definition",
            &function_def.source,
        )?;

        self.return_type = function_def.return_type.value.clone();
        self.loop_depth = 0;

        // params share the body's outermost scope, so a local cannot
        // redeclare a parameter name
        self.enter_scope();
        for param in &function_def.params {
            self.declare(&param.name, param.param_type.value.clone(), &function_def.source)?;
        }
        for stmt in &mut function_def.body.statements {
            self.check_statement(stmt)?;
        }
        self.exit_scope();

        if self.return_type != TypeKind::Void
            && block_status(&function_def.body) != ReturnStatus::Always
        {
            return Err(
                InnerTypeError::MissingReturn(function_def.name.value.clone()).within(
                    "function definition",
                    &function_def.source,
                    &function_def.name.source,
                ),
            );
        }
        Ok(())
    }

    fn check_statement(&mut self, stmt: &mut Stmt) -> Result<()> {
        let source = stmt.source.clone();
        match &mut stmt.kind {
            StmtKind::VarDec {
                var_type,
                name,
                init,
            } => {
                if var_type.value == TypeKind::Void {
                    return Err(InnerTypeError::VoidVariable(name.value.clone()).within(
                        "variable declaration",
                        &source,
                        &var_type.source,
                    ));
                }
                self.ensure_declared_type(var_type, "variable declaration", &source)?;
                let init_type = self.check_exp(init)?;
                if !var_type.value.accepts(&init_type) {
                    return Err(InnerTypeError::MismatchedType {
                        expected: var_type.value.clone(),
                        got: init_type,
                    }
                    .within("variable declaration", &source, &init.source));
                }
                self.declare(name, var_type.value.clone(), &source)
            }
            StmtKind::Assign { name, value } => {
                let Some(declared) = self.lookup(&name.value).cloned() else {
                    return Err(InnerTypeError::UndeclaredVariable(name.value.clone()).within(
                        "assignment",
                        &source,
                        &name.source,
                    ));
                };
                let value_type = self.check_exp(value)?;
                if !declared.accepts(&value_type) {
                    return Err(InnerTypeError::MismatchedType {
                        expected: declared,
                        got: value_type,
                    }
                    .within("assignment", &source, &value.source));
                }
                Ok(())
            }
            StmtKind::If {
                condition,
                then,
                els,
            } => {
                self.check_condition(condition, "if statement", &source)?;
                self.enter_scope();
                self.check_statement(then)?;
                self.exit_scope();
                if let Some(els) = els {
                    self.enter_scope();
                    self.check_statement(els)?;
                    self.exit_scope();
                }
                Ok(())
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition, "while statement", &source)?;
                self.loop_depth += 1;
                self.enter_scope();
                self.check_statement(body)?;
                self.exit_scope();
                self.loop_depth -= 1;
                Ok(())
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    return Err(InnerTypeError::BreakOutsideLoop.within(
                        "break statement",
                        &source,
                        &source,
                    ));
                }
                Ok(())
            }
            StmtKind::Return(exp) => {
                let expected = self.return_type.clone();
                match exp {
                    Some(exp) => {
                        let got = self.check_exp(exp)?;
                        if !expected.accepts(&got) {
                            return Err(InnerTypeError::MismatchedType { expected, got }
                                .within("return statement", &source, &exp.source));
                        }
                    }
                    None => {
                        if expected != TypeKind::Void {
                            return Err(InnerTypeError::MismatchedType {
                                expected,
                                got: TypeKind::Void,
                            }
                            .within("return statement", &source, &source));
                        }
                    }
                }
                Ok(())
            }
            StmtKind::Println(exp) => {
                let ty = self.check_exp(exp)?;
                if !matches!(ty, TypeKind::Int | TypeKind::Bool) {
                    return Err(InnerTypeError::PrintlnType(ty).within(
                        "println statement",
                        &source,
                        &exp.source,
                    ));
                }
                Ok(())
            }
            StmtKind::Exp(exp) => self.check_exp(exp).map(|_| ()),
            StmtKind::Block(block) => {
                self.enter_scope();
                for stmt in &mut block.statements {
                    self.check_statement(stmt)?;
                }
                self.exit_scope();
                Ok(())
            }
        }
    }

    fn check_condition(&mut self, condition: &mut Exp, being_checked: &str, parent: &Source) -> Result<()> {
        let ty = self.check_exp(condition)?;
        if ty == TypeKind::Bool {
            Ok(())
        } else {
            Err(InnerTypeError::ConditionNotBool(ty).within(
                being_checked,
                parent,
                &condition.source,
            ))
        }
    }

    fn check_exp(&mut self, exp: &mut Exp) -> Result<TypeKind> {
        let source = exp.source.clone();
        let ty = match &mut exp.kind {
            ExpKind::IntLiteral(_) => TypeKind::Int,
            ExpKind::BoolLiteral(_) => TypeKind::Bool,
            ExpKind::Null => TypeKind::Struct(None),
            ExpKind::Var(name) => match self.lookup(name) {
                Some(ty) => ty.clone(),
                None => {
                    return Err(InnerTypeError::UndeclaredVariable(name.clone()).within(
                        "expression",
                        &source,
                        &source,
                    ))
                }
            },
            ExpKind::Unary(op, inner) => {
                let got = self.check_exp(inner)?;
                if got != TypeKind::Bool {
                    return Err(InnerTypeError::BadUnaryOperand { op: *op, got }.within(
                        "expression",
                        &source,
                        &inner.source,
                    ));
                }
                TypeKind::Bool
            }
            ExpKind::Binary(op, left, right) => {
                let left_type = self.check_exp(left)?;
                let right_type = self.check_exp(right)?;
                self.binary_result(*op, left_type, right_type, &source)?
            }
            ExpKind::Dot(receiver, field) => {
                let receiver_type = self.check_exp(receiver)?;
                let Some(struct_name) = receiver_type.struct_name().cloned() else {
                    return Err(InnerTypeError::NotAStruct(receiver_type).within(
                        "field access",
                        &source,
                        &receiver.source,
                    ));
                };
                let struct_def = &self.structs[&struct_name];
                let Some(declared) = struct_def.field(&field.value) else {
                    return Err(InnerTypeError::NoSuchField {
                        struct_name,
                        field: field.value.clone(),
                    }
                    .within("field access", &source, &field.source));
                };
                declared.param_type.value.clone()
            }
            ExpKind::Paren(inner) => self.check_exp(inner)?,
            ExpKind::Call(name, args) => {
                let Some(signature) = self.functions.get(&name.value).cloned() else {
                    return Err(InnerTypeError::UndeclaredFunction(name.value.clone()).within(
                        "function call",
                        &source,
                        &name.source,
                    ));
                };
                if signature.params.len() != args.len() {
                    return Err(InnerTypeError::WrongArgumentCount {
                        function: name.value.clone(),
                        expected: signature.params.len(),
                        got: args.len(),
                    }
                    .within("function call", &source, &source));
                }
                for (param_type, arg) in signature.params.iter().zip(args.iter_mut()) {
                    let got = self.check_exp(arg)?;
                    if !param_type.accepts(&got) {
                        return Err(InnerTypeError::MismatchedType {
                            expected: param_type.clone(),
                            got,
                        }
                        .within("function call", &source, &arg.source));
                    }
                }
                signature.return_type
            }
            ExpKind::New(alloc) => self.check_struct_alloc(alloc, &source)?,
        };

        exp.ty = Some(ty.clone());
        Ok(ty)
    }

    fn check_struct_alloc(&mut self, alloc: &mut StructAlloc, source: &Source) -> Result<TypeKind> {
        let struct_name = alloc.struct_name.value.clone();
        let Some(struct_def) = self.structs.get(&struct_name).cloned() else {
            return Err(InnerTypeError::UndeclaredStruct(struct_name).within(
                "struct allocation",
                source,
                &alloc.struct_name.source,
            ));
        };

        let mut seen = FxHashMap::default();
        for init in &mut alloc.fields {
            let field_name = init.name.value.clone();
            let Some(declared) = struct_def.field(&field_name) else {
                return Err(InnerTypeError::NoSuchField {
                    struct_name,
                    field: field_name,
                }
                .within("struct allocation", source, &init.name.source));
            };
            if seen.insert(field_name.clone(), ()).is_some() {
                return Err(InnerTypeError::DuplicateFieldInit(field_name).within(
                    "struct allocation",
                    source,
                    &init.name.source,
                ));
            }
            let got = self.check_exp(&mut init.value)?;
            if !declared.param_type.value.accepts(&got) {
                return Err(InnerTypeError::MismatchedType {
                    expected: declared.param_type.value.clone(),
                    got,
                }
                .within("struct allocation", source, &init.value.source));
            }
        }

        for field in &struct_def.fields {
            if !seen.contains_key(&field.name.value) {
                return Err(InnerTypeError::MissingFieldInit {
                    struct_name,
                    field: field.name.value.clone(),
                }
                .within("struct allocation", source, &alloc.struct_name.source));
            }
        }

        Ok(TypeKind::Struct(Some(struct_name)))
    }

    fn binary_result(
        &self,
        op: BinaryOp,
        left: TypeKind,
        right: TypeKind,
        source: &Source,
    ) -> Result<TypeKind> {
        let ok = if op.is_logical() {
            // C truthiness at runtime, so integer operands are fine
            is_truthy_operand(&left) && is_truthy_operand(&right)
        } else if op.is_equality() {
            left.equality_comparable_to(&right)
        } else {
            // comparison and arithmetic are int-only
            left == TypeKind::Int && right == TypeKind::Int
        };

        if !ok {
            return Err(InnerTypeError::BadOperands { op, left, right }.within(
                "expression",
                source,
                source,
            ));
        }

        if op.is_arithmetic() {
            Ok(TypeKind::Int)
        } else {
            Ok(TypeKind::Bool)
        }
    }

    fn ensure_declared_type(
        &self,
        ty: &Type,
        being_checked: &str,
        parent: &Source,
    ) -> Result<()> {
        if let TypeKind::Struct(Some(name)) = &ty.value {
            if !self.structs.contains_key(name) {
                return Err(InnerTypeError::UndeclaredStruct(name.clone()).within(
                    being_checked,
                    parent,
                    &ty.source,
                ));
            }
        }
        Ok(())
    }

    fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(
        &mut self,
        name: &Sourced<Identifier>,
        ty: TypeKind,
        parent: &Source,
    ) -> Result<()> {
        let scope = self
            .scopes
            .last_mut()
            .expect("scope stack is never empty while checking");
        if scope.insert(name.value.clone(), ty).is_some() {
            return Err(
                InnerTypeError::VariableRedeclaration(name.value.clone()).within(
                    "variable declaration",
                    parent,
                    &name.source,
                ),
            );
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Option<&TypeKind> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

fn is_truthy_operand(ty: &TypeKind) -> bool {
    matches!(ty, TypeKind::Int | TypeKind::Bool)
}
