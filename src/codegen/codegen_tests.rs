use super::*;
use crate::lexer::lex;
use crate::parser::parse;
use crate::typechecker::typecheck;

fn typed(input: &str) -> Program {
    let tokens = lex(input).expect("input should lex");
    let program = parse(&tokens).expect("input should parse");
    typecheck(program).expect("input should typecheck")
}

fn gen(input: &str) -> String {
    generate(&typed(input)).expect("codegen should succeed")
}

fn gen_err(input: &str) -> CodegenError {
    generate(&typed(input)).expect_err("codegen should reject")
}

fn index_of(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in:\n{haystack}"))
}

#[test]
fn test_minimal_program() {
    let expected = "#include <stdio.h>\n\
                    #include <stdlib.h>\n\
                    \n\
                    int main(void) {\n\
                    \x20   printf(\"%d\", 3);\n\
                    \x20   return 0;\n\
                    }\n";
    assert_eq!(expected, gen("println(3);"));
}

#[test]
fn test_println_bool_prints_words() {
    let generated = gen("println(true);");
    assert!(generated.contains("printf(\"%s\", (1) ? \"true\" : \"false\");"));
}

#[test]
fn test_logical_condition_lowers_to_c_truthiness() {
    let generated = gen("if (6 || 0) { println(3); }");
    assert!(generated.contains("if (6 || 0) {"));

    let generated = gen("if (6 && 0) { println(3); }");
    assert!(generated.contains("if (6 && 0) {"));
}

#[test]
fn test_struct_definition_and_helpers() {
    let generated = gen("struct Node { int value; Node rest; }\nprintln(0);");
    assert!(generated.contains("typedef struct Node Node;"));
    assert!(generated.contains("struct Node {\n    int value;\n    Node* rest;\n};"));
    assert!(generated.contains("Node* sl_Node_alloc(int value, Node* rest);"));
    assert!(generated.contains("void sl_Node_free(Node* value);"));
    assert!(generated.contains("if (value == NULL) {"));
    assert!(generated.contains("sl_Node_free(value->rest);"));
    assert!(generated.contains("free(value);"));
}

#[test]
fn test_forward_typedefs_precede_struct_bodies() {
    let generated = gen("struct A { B b; }\nstruct B { int x; }\nprintln(0);");
    assert!(index_of(&generated, "typedef struct B B;") < index_of(&generated, "struct A {"));
}

#[test]
fn test_prototypes_precede_definitions() {
    let generated = gen("func zero(): int { return 0; }\nprintln(zero());");
    assert!(index_of(&generated, "int zero(void);") < index_of(&generated, "int zero(void) {"));
}

#[test]
fn test_unreceived_allocation_is_freed_at_scope_exit() {
    let generated = gen("struct P { int x; }\nP p = new P { x: 1 };\nprintln(0);");
    assert!(generated.contains("P* p = sl_P_alloc(1);"));
    assert!(index_of(&generated, "sl_P_free(p);") < index_of(&generated, "return 0;"));
}

#[test]
fn test_initializing_from_variable_moves_ownership() {
    let generated = gen(
        "struct P { int x; }\n\
         P a = new P { x: 1 };\n\
         P b = a;\n\
         println(0);",
    );
    assert!(generated.contains("sl_P_free(b);"));
    assert!(!generated.contains("sl_P_free(a);"));
}

#[test]
fn test_returned_local_escapes_frees() {
    let generated = gen(
        "struct P { int x; }\n\
         func make(): P { P p = new P { x: 1 }; return p; }\n\
         println(0);",
    );
    assert!(generated.contains("return p;"));
    assert!(!generated.contains("sl_P_free(p);"));
}

#[test]
fn test_call_lends_argument_to_callee() {
    let generated = gen(
        "struct P { int x; }\n\
         func take(P p): int { return 0; }\n\
         P a = new P { x: 1 };\n\
         int r = take(a);\n\
         println(r);",
    );
    // the callee borrows p, so the caller still frees a after the call
    assert!(!generated.contains("sl_P_free(p);"));
    assert!(index_of(&generated, "int r = take(a);") < index_of(&generated, "sl_P_free(a);"));
}

#[test]
fn test_break_frees_loop_locals() {
    let generated = gen(
        "struct P { int x; }\n\
         while (true) {\n\
             P p = new P { x: 1 };\n\
             break;\n\
         }\n\
         println(0);",
    );
    assert!(generated.contains("while (1) {"));
    assert!(generated.contains("sl_P_free(p);\n        break;"));
}

#[test]
fn test_overwriting_owned_variable_frees_old_value() {
    let generated = gen(
        "struct P { int x; }\n\
         P a = new P { x: 1 };\n\
         a = new P { x: 2 };\n\
         println(0);",
    );
    assert!(generated.contains("P* sl_tmp = sl_P_alloc(2);"));
    assert!(index_of(&generated, "sl_P_free(a);") < index_of(&generated, "a = sl_tmp;"));
}

#[test]
fn test_discarded_owning_result_is_freed_immediately() {
    let generated = gen(
        "struct P { int x; }\n\
         func make(): P { return new P { x: 1 }; }\n\
         make();",
    );
    assert!(generated.contains("sl_P_free(make());"));
}

#[test]
fn test_rejects_returning_a_borrowed_parameter() {
    let error = gen_err(
        "struct P { int x; }\n\
         func id(P p): P { return p; }\n\
         println(0);",
    );
    assert_eq!(CodegenError::ReturnedBorrow(String::from("p")), error);
}

#[test]
fn test_rejects_returning_a_field_read() {
    let error = gen_err(
        "struct Node { int value; Node rest; }\n\
         func tail(Node n): Node { return n.rest; }\n\
         println(0);",
    );
    assert_eq!(CodegenError::ReturnedBorrow(String::from("n.rest")), error);
}

#[test]
fn test_returning_a_null_initialized_local_is_owned() {
    let generated = gen(
        "struct P { int x; }\n\
         func none(): P { P p = null; return p; }\n\
         println(0);",
    );
    assert!(generated.contains("return p;"));
}

#[test]
fn test_rejects_allocation_compared_in_condition() {
    let error = gen_err(
        "struct P { int x; }\n\
         if (new P { x: 1 } == null) { println(0); }",
    );
    assert_eq!(
        CodegenError::UnboundAllocation(String::from("new P { x: 1 }")),
        error
    );
}

#[test]
fn test_rejects_allocation_as_call_argument() {
    let error = gen_err(
        "struct P { int x; }\n\
         func take(P p): int { return 0; }\n\
         println(take(new P { x: 1 }));",
    );
    assert_eq!(
        CodegenError::UnboundAllocation(String::from("new P { x: 1 }")),
        error
    );
}

#[test]
fn test_move_in_branch_clears_the_source_variable() {
    let generated = gen(
        "struct P { int x; }\n\
         P a = new P { x: 1 };\n\
         if (true) {\n\
             P b = a;\n\
         }\n\
         println(0);",
    );
    // the branch that ran the move leaves NULL behind, so the free of a at
    // the end of main is safe on both paths
    assert!(index_of(&generated, "P* b = a;") < index_of(&generated, "a = NULL;"));
    assert!(generated.contains("sl_P_free(b);"));
    assert!(generated.contains("sl_P_free(a);"));
}

#[test]
fn test_empty_struct_body_is_padded() {
    let generated = gen("struct Empty {}\nprintln(0);");
    assert!(generated.contains("struct Empty {\n    char sl_empty;\n};"));
}

#[test]
fn test_field_access_lowers_to_arrow() {
    let generated = gen("struct P { int x; }\nP p = new P { x: 5 };\nprintln(p.x);");
    assert!(generated.contains("printf(\"%d\", p->x);"));
}

#[test]
fn test_else_branch_lowering() {
    let generated = gen("if (true) { println(1); } else { println(2); }");
    assert!(generated.contains("} else {"));
}

#[test]
fn test_generation_is_deterministic() {
    let program = typed(
        "struct Node { int value; Node rest; }\n\
         func length(Node list): int {\n\
             if (list == null) { return 0; }\n\
             return 1 + length(list.rest);\n\
         }\n\
         Node n = new Node { value: 7, rest: null };\n\
         println(length(n));",
    );
    let first = generate(&program).expect("codegen should succeed");
    let second = generate(&program).expect("codegen should succeed");
    assert_eq!(first, second);
}
