use super::*;
use crate::ast::*;
use crate::lexer::lex;
use crate::source::{Source, SourcePosition, Sourced};

fn parse_program(input: &str) -> Program {
    let tokens = lex(input).expect("input should lex");
    parse(&tokens).expect("input should parse")
}

fn parse_err(input: &str) -> ParseError {
    let tokens = lex(input).expect("input should lex");
    parse(&tokens).expect_err("input should not parse")
}

fn first_statement(input: &str) -> Stmt {
    let mut program = parse_program(input);
    assert!(!program.statements.is_empty(), "no statements in {input:?}");
    program.statements.remove(0)
}

// Expected trees are compared structurally, so placeholder spans will do.
fn sourced<T>(value: T) -> Sourced<T> {
    Sourced::new(value, Source::empty())
}

fn name(s: &str) -> Sourced<Identifier> {
    sourced(String::from(s))
}

fn exp(kind: ExpKind) -> Exp {
    Exp::new(kind, Source::empty())
}

fn int(value: i32) -> Exp {
    exp(ExpKind::IntLiteral(value))
}

fn var(s: &str) -> Exp {
    exp(ExpKind::Var(String::from(s)))
}

fn binary(op: BinaryOp, left: Exp, right: Exp) -> Exp {
    exp(ExpKind::Binary(op, Box::new(left), Box::new(right)))
}

fn param(type_kind: TypeKind, param_name: &str) -> Param {
    Param {
        param_type: sourced(type_kind),
        name: name(param_name),
    }
}

fn struct_type(s: &str) -> TypeKind {
    TypeKind::Struct(Some(String::from(s)))
}

#[test]
fn test_vardec_statement() {
    let stmt = first_statement("int x = 6;");
    let expected = StmtKind::VarDec {
        var_type: sourced(TypeKind::Int),
        name: name("x"),
        init: int(6),
    };
    assert_eq!(Stmt::new(expected, Source::empty()), stmt);
}

#[test]
fn test_struct_typed_vardec() {
    let stmt = first_statement("Node list = null;");
    let expected = StmtKind::VarDec {
        var_type: sourced(struct_type("Node")),
        name: name("list"),
        init: exp(ExpKind::Null),
    };
    assert_eq!(Stmt::new(expected, Source::empty()), stmt);
}

#[test]
fn test_assignment_statement() {
    let stmt = first_statement("x = x + 1;");
    let expected = StmtKind::Assign {
        name: name("x"),
        value: binary(BinaryOp::Add, var("x"), int(1)),
    };
    assert_eq!(Stmt::new(expected, Source::empty()), stmt);
}

#[test]
fn test_bare_expression_statement() {
    let stmt = first_statement("reverse(list);");
    let expected = StmtKind::Exp(exp(ExpKind::Call(name("reverse"), vec![var("list")])));
    assert_eq!(Stmt::new(expected, Source::empty()), stmt);
}

#[test]
fn test_struct_definition() {
    let program = parse_program("struct Node {\n    int value;\n    Node rest;\n}");
    let expected = StructDef {
        name: name("Node"),
        fields: vec![
            param(TypeKind::Int, "value"),
            param(struct_type("Node"), "rest"),
        ],
        source: Source::empty(),
    };
    assert_eq!(vec![expected], program.struct_defs);
}

#[test]
fn test_empty_struct_definition() {
    let program = parse_program("struct Empty {}");
    assert_eq!(1, program.struct_defs.len());
    assert!(program.struct_defs[0].fields.is_empty());
}

#[test]
fn test_function_definition() {
    let program = parse_program("func add(int a, int b): int { return a + b; }");
    let function = &program.function_defs[0];

    assert_eq!(name("add"), function.name);
    assert_eq!(
        vec![param(TypeKind::Int, "a"), param(TypeKind::Int, "b")],
        function.params
    );
    assert_eq!(sourced(TypeKind::Int), function.return_type);

    let expected_return = StmtKind::Return(Some(binary(BinaryOp::Add, var("a"), var("b"))));
    assert_eq!(
        vec![Stmt::new(expected_return, Source::empty())],
        function.body.statements
    );
}

#[test]
fn test_definition_order_is_structs_then_functions_then_statements() {
    let program = parse_program(
        "struct P { int x; }\nfunc zero(): int { return 0; }\nprintln(zero());",
    );
    assert_eq!(1, program.struct_defs.len());
    assert_eq!(1, program.function_defs.len());
    assert_eq!(1, program.statements.len());
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let stmt = first_statement("int r = 1 + 2 * 3;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let expected = binary(
        BinaryOp::Add,
        int(1),
        binary(BinaryOp::Multiply, int(2), int(3)),
    );
    assert_eq!(expected, init);
}

#[test]
fn test_additive_is_left_associative() {
    let stmt = first_statement("int r = 10 - 4 - 3;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let expected = binary(
        BinaryOp::Subtract,
        binary(BinaryOp::Subtract, int(10), int(4)),
        int(3),
    );
    assert_eq!(expected, init);
}

#[test]
fn test_comparison_binds_tighter_than_logical() {
    let stmt = first_statement("bool r = a < b && c == d;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let expected = binary(
        BinaryOp::And,
        binary(BinaryOp::LessThan, var("a"), var("b")),
        binary(BinaryOp::Equals, var("c"), var("d")),
    );
    assert_eq!(expected, init);
}

#[test]
fn test_and_binds_tighter_than_or() {
    let stmt = first_statement("bool r = a || b && c;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let expected = binary(
        BinaryOp::Or,
        var("a"),
        binary(BinaryOp::And, var("b"), var("c")),
    );
    assert_eq!(expected, init);
}

#[test]
fn test_parens_are_kept_as_nodes() {
    let stmt = first_statement("int r = (1 + 2) * 3;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let grouped = exp(ExpKind::Paren(Box::new(binary(
        BinaryOp::Add,
        int(1),
        int(2),
    ))));
    let expected = binary(BinaryOp::Multiply, grouped, int(3));
    assert_eq!(expected, init);
}

#[test]
fn test_dot_chains_left_associatively() {
    let stmt = first_statement("int r = list.rest.value;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let inner = exp(ExpKind::Dot(Box::new(var("list")), name("rest")));
    let expected = exp(ExpKind::Dot(Box::new(inner), name("value")));
    assert_eq!(expected, init);
}

#[test]
fn test_not_applies_to_postfix_expression() {
    let stmt = first_statement("bool r = !list.done;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let dot = exp(ExpKind::Dot(Box::new(var("list")), name("done")));
    let expected = exp(ExpKind::Unary(UnaryOp::Not, Box::new(dot)));
    assert_eq!(expected, init);
}

#[test]
fn test_struct_allocation() {
    let stmt = first_statement("Node n = new Node { value: 1, rest: null };");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    let expected = exp(ExpKind::New(StructAlloc {
        struct_name: name("Node"),
        fields: vec![
            FieldInit {
                name: name("value"),
                value: int(1),
            },
            FieldInit {
                name: name("rest"),
                value: exp(ExpKind::Null),
            },
        ],
    }));
    assert_eq!(expected, init);
}

#[test]
fn test_else_attaches_to_nearest_if() {
    let stmt = first_statement("if (a) if (b) x = 1; else x = 2;");
    let StmtKind::If { els: outer_els, then, .. } = stmt.kind else {
        panic!("expected an if");
    };
    assert!(outer_els.is_none());
    let StmtKind::If { els: inner_els, .. } = then.kind else {
        panic!("expected a nested if");
    };
    assert!(inner_els.is_some());
}

#[test]
fn test_return_without_value() {
    let stmt = first_statement("return;");
    assert_eq!(Stmt::new(StmtKind::Return(None), Source::empty()), stmt);
}

#[test]
fn test_while_with_break() {
    let stmt = first_statement("while (true) { break; }");
    let StmtKind::While { body, .. } = stmt.kind else {
        panic!("expected a while");
    };
    let StmtKind::Block(block) = body.kind else {
        panic!("expected a block body");
    };
    assert_eq!(
        vec![Stmt::new(StmtKind::Break, Source::empty())],
        block.statements
    );
}

#[test]
fn test_statement_spans_are_byte_exact() {
    let stmt = first_statement("int x = 6;");
    assert_eq!("int x = 6;", stmt.source.text());

    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    assert_eq!("6", init.source.text());
}

#[test]
fn test_expression_spans_cover_operators() {
    let stmt = first_statement("int r = 1 + 2 * 3;");
    let StmtKind::VarDec { init, .. } = stmt.kind else {
        panic!("expected a vardec");
    };
    assert_eq!("1 + 2 * 3", init.source.text());

    let ExpKind::Binary(_, _, right) = init.kind else {
        panic!("expected a binary expression");
    };
    assert_eq!("2 * 3", right.source.text());
}

#[test]
fn test_rejects_chained_comparison() {
    let error = parse_err("bool r = a < b < c;");
    let expected =
        InnerParseError::ChainedComparison(Token::LessThan).at(SourcePosition::new(1, 16));
    assert_eq!(expected, error);
}

#[test]
fn test_rejects_out_of_range_int_literal() {
    let error = parse_err("int big = 2147483648;");
    let expected = InnerParseError::IntLiteralOutOfRange(String::from("2147483648"))
        .at(SourcePosition::new(1, 11));
    assert_eq!(expected, error);
}

#[test]
fn test_rejects_missing_semicolon() {
    let error = parse_err("int x = 6 7;");
    let expected = InnerParseError::ExpectedButGot(
        Token::Semicolon,
        Token::IntLiteral(String::from("7")),
    )
    .at(SourcePosition::new(1, 11));
    assert_eq!(expected, error);
}

#[test]
fn test_rejects_leftover_closing_brace() {
    let error = parse_err("println(1); }");
    let expected = InnerParseError::ExpectedStatementButGot(Token::RightBrace)
        .at(SourcePosition::new(1, 13));
    assert_eq!(expected, error);
}

#[test]
fn test_rejects_struct_after_statements() {
    // definitions come first; a later `struct` keyword cannot start a statement
    let error = parse_err("println(1); struct P { int x; }");
    let expected =
        InnerParseError::ExpectedStatementButGot(Token::Struct).at(SourcePosition::new(1, 13));
    assert_eq!(expected, error);
}

#[test]
fn test_rejects_truncated_input() {
    let error = parse_err("int x = ");
    let expected = InnerParseError::UnexpectedEof.at(SourcePosition::new(1, 8));
    assert_eq!(expected, error);
}

#[test]
fn test_rejects_keyword_as_variable_name() {
    let error = parse_err("int while = 6;");
    let expected =
        InnerParseError::ExpectedIdentifierButGot(Token::While).at(SourcePosition::new(1, 5));
    assert_eq!(expected, error);
}
