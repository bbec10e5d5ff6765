//! Recursive-descent, precedence-climbing parser.
//!
//! Each grammar production is a `parse_x` function over a shared [Cursor];
//! once a production has committed (consumed a leading keyword or symbol),
//! failure to complete it is a located syntax error rather than a fallback
//! to another alternative. Statement alternatives are tried in a fixed
//! order: for a leading identifier, assignment wins over variable
//! declaration, which wins over a bare expression statement.

mod cursor;
mod parse_error;

#[cfg(test)]
mod parser_tests;

use crate::ast::*;
use crate::lexer::Token;
use crate::source::Sourced;
use cursor::Cursor;

pub use parse_error::{InnerParseError, ParseError, Result};

/// Parses a whole token stream into a [Program], consuming every token.
pub fn parse(tokens: &[Sourced<Token>]) -> Result<Program> {
    let mut cursor = Cursor::new(tokens);

    let mut struct_defs = Vec::new();
    while cursor.peek() == Some(&Token::Struct) {
        struct_defs.push(parse_struct_def(&mut cursor)?);
    }

    let mut function_defs = Vec::new();
    while cursor.peek() == Some(&Token::Func) {
        function_defs.push(parse_function_def(&mut cursor)?);
    }

    let mut statements = Vec::new();
    while !cursor.at_end() {
        statements.push(parse_statement(&mut cursor)?);
    }

    Ok(Program {
        struct_defs,
        function_defs,
        statements,
    })
}

fn parse_identifier(cursor: &mut Cursor) -> Result<Sourced<Identifier>> {
    let next = cursor.next_or_error()?;
    if let Token::Identifier(name) = &next.value {
        Ok(Sourced::new(name.clone(), next.source.clone()))
    } else {
        let position = next.source.start();
        Err(InnerParseError::ExpectedIdentifierButGot(next.value.clone()).at(position))
    }
}

fn parse_type(cursor: &mut Cursor) -> Result<Type> {
    let next = cursor.next_or_error()?;
    let kind = match &next.value {
        Token::Int => TypeKind::Int,
        Token::Bool => TypeKind::Bool,
        Token::Void => TypeKind::Void,
        Token::Identifier(name) => TypeKind::Struct(Some(name.clone())),
        other => {
            let position = next.source.start();
            return Err(InnerParseError::ExpectedTypeButGot(other.clone()).at(position));
        }
    };
    Ok(Sourced::new(kind, next.source.clone()))
}

/// `type ID`, shared by struct fields and function parameters.
fn parse_param(cursor: &mut Cursor) -> Result<Param> {
    let param_type = parse_type(cursor)?;
    let name = parse_identifier(cursor)?;
    Ok(Param { param_type, name })
}

fn parse_struct_def(cursor: &mut Cursor) -> Result<StructDef> {
    let start = cursor.index();
    cursor.expect(&Token::Struct)?;
    let name = parse_identifier(cursor)?;
    cursor.expect(&Token::LeftBrace)?;

    let mut fields = Vec::new();
    while cursor.take_if(&Token::RightBrace).is_none() {
        let field = parse_param(cursor)?;
        cursor.expect(&Token::Semicolon)?;
        fields.push(field);
    }

    Ok(StructDef {
        name,
        fields,
        source: cursor.source_from(start),
    })
}

fn parse_function_def(cursor: &mut Cursor) -> Result<FunctionDef> {
    let start = cursor.index();
    cursor.expect(&Token::Func)?;
    let name = parse_identifier(cursor)?;
    cursor.expect(&Token::LeftParen)?;
    let params = parse_params(cursor)?;
    cursor.expect(&Token::RightParen)?;
    cursor.expect(&Token::Colon)?;
    let return_type = parse_type(cursor)?;
    let body = parse_block(cursor)?;

    Ok(FunctionDef {
        name,
        params,
        return_type,
        body,
        source: cursor.source_from(start),
    })
}

fn parse_params(cursor: &mut Cursor) -> Result<Vec<Param>> {
    let mut params = Vec::new();
    if cursor.peek() != Some(&Token::RightParen) {
        loop {
            params.push(parse_param(cursor)?);
            if cursor.take_if(&Token::Comma).is_none() {
                break;
            }
        }
    }
    Ok(params)
}

fn parse_block(cursor: &mut Cursor) -> Result<Block> {
    let start = cursor.index();
    cursor.expect(&Token::LeftBrace)?;

    let mut statements = Vec::new();
    while cursor.take_if(&Token::RightBrace).is_none() {
        statements.push(parse_statement(cursor)?);
    }

    Ok(Block::new(statements, cursor.source_from(start)))
}

fn parse_statement(cursor: &mut Cursor) -> Result<Stmt> {
    let peek = &cursor.peek_or_error()?.value;
    match peek {
        Token::If => parse_if(cursor),
        Token::While => parse_while(cursor),
        Token::Break => parse_break(cursor),
        Token::Return => parse_return(cursor),
        Token::Println => parse_println(cursor),
        Token::LeftBrace => parse_block_statement(cursor),
        Token::Int | Token::Bool | Token::Void => parse_vardec(cursor),
        Token::Identifier(_) => parse_assign_vardec_or_exp(cursor),
        Token::IntLiteral(_)
        | Token::True
        | Token::False
        | Token::Null
        | Token::New
        | Token::Not
        | Token::LeftParen => parse_exp_statement(cursor),
        other => {
            let position = cursor.peek_or_error()?.source.start();
            Err(InnerParseError::ExpectedStatementButGot(other.clone()).at(position))
        }
    }
}

/// A statement beginning with an identifier is an assignment if `=` comes
/// next, a struct-typed variable declaration if another identifier comes
/// next, and a bare expression statement otherwise.
fn parse_assign_vardec_or_exp(cursor: &mut Cursor) -> Result<Stmt> {
    match cursor.peek_nth(1) {
        Some(Token::Assign) => parse_assign(cursor),
        Some(Token::Identifier(_)) => parse_vardec(cursor),
        _ => parse_exp_statement(cursor),
    }
}

fn parse_vardec(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    let var_type = parse_type(cursor)?;
    let name = parse_identifier(cursor)?;
    cursor.expect(&Token::Assign)?;
    let init = parse_exp(cursor)?;
    cursor.expect(&Token::Semicolon)?;

    let kind = StmtKind::VarDec {
        var_type,
        name,
        init,
    };
    Ok(Stmt::new(kind, cursor.source_from(start)))
}

fn parse_assign(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    let name = parse_identifier(cursor)?;
    cursor.expect(&Token::Assign)?;
    let value = parse_exp(cursor)?;
    cursor.expect(&Token::Semicolon)?;

    Ok(Stmt::new(
        StmtKind::Assign { name, value },
        cursor.source_from(start),
    ))
}

fn parse_if(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    cursor.expect(&Token::If)?;
    cursor.expect(&Token::LeftParen)?;
    let condition = parse_exp(cursor)?;
    cursor.expect(&Token::RightParen)?;
    let then = parse_statement(cursor).map(Box::new)?;

    // a trailing `else` attaches to the nearest unmatched `if`
    let else_present = cursor.take_if(&Token::Else).is_some();
    let els = else_present
        .then(|| parse_statement(cursor))
        .transpose()?
        .map(Box::new);

    let kind = StmtKind::If {
        condition,
        then,
        els,
    };
    Ok(Stmt::new(kind, cursor.source_from(start)))
}

fn parse_while(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    cursor.expect(&Token::While)?;
    cursor.expect(&Token::LeftParen)?;
    let condition = parse_exp(cursor)?;
    cursor.expect(&Token::RightParen)?;
    let body = parse_statement(cursor).map(Box::new)?;

    Ok(Stmt::new(
        StmtKind::While { condition, body },
        cursor.source_from(start),
    ))
}

fn parse_break(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    cursor.expect(&Token::Break)?;
    cursor.expect(&Token::Semicolon)?;
    Ok(Stmt::new(StmtKind::Break, cursor.source_from(start)))
}

fn parse_return(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    cursor.expect(&Token::Return)?;
    let exp = parse_optional_exp(cursor, &Token::Semicolon)?;
    Ok(Stmt::new(StmtKind::Return(exp), cursor.source_from(start)))
}

fn parse_optional_exp(cursor: &mut Cursor, delim: &Token) -> Result<Option<Exp>> {
    let not_met_delim = cursor.take_if(delim).is_none();
    let exp = not_met_delim.then(|| parse_exp(cursor)).transpose()?;

    if not_met_delim {
        cursor.expect(delim)?;
    }

    Ok(exp)
}

fn parse_println(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    cursor.expect(&Token::Println)?;
    cursor.expect(&Token::LeftParen)?;
    let exp = parse_exp(cursor)?;
    cursor.expect(&Token::RightParen)?;
    cursor.expect(&Token::Semicolon)?;
    Ok(Stmt::new(StmtKind::Println(exp), cursor.source_from(start)))
}

fn parse_block_statement(cursor: &mut Cursor) -> Result<Stmt> {
    let block = parse_block(cursor)?;
    let source = block.source.clone();
    Ok(Stmt::new(StmtKind::Block(block), source))
}

fn parse_exp_statement(cursor: &mut Cursor) -> Result<Stmt> {
    let start = cursor.index();
    let exp = parse_exp(cursor)?;
    cursor.expect(&Token::Semicolon)?;
    Ok(Stmt::new(StmtKind::Exp(exp), cursor.source_from(start)))
}

fn binary(cursor: &Cursor, start: usize, op: BinaryOp, left: Exp, right: Exp) -> Exp {
    Exp::new(
        ExpKind::Binary(op, Box::new(left), Box::new(right)),
        cursor.source_from(start),
    )
}

fn parse_exp(cursor: &mut Cursor) -> Result<Exp> {
    parse_or(cursor)
}

fn parse_or(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let mut left = parse_and(cursor)?;
    while cursor.take_if(&Token::OrOr).is_some() {
        let right = parse_and(cursor)?;
        left = binary(cursor, start, BinaryOp::Or, left, right);
    }
    Ok(left)
}

fn parse_and(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let mut left = parse_equality(cursor)?;
    while cursor.take_if(&Token::AndAnd).is_some() {
        let right = parse_equality(cursor)?;
        left = binary(cursor, start, BinaryOp::And, left, right);
    }
    Ok(left)
}

fn parse_equality(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let mut left = parse_relational(cursor)?;
    loop {
        let op = match cursor.peek() {
            Some(Token::EqualsEquals) => BinaryOp::Equals,
            Some(Token::NotEquals) => BinaryOp::NotEquals,
            _ => break,
        };
        cursor.bump();
        let right = parse_relational(cursor)?;
        left = binary(cursor, start, op, left, right);
    }
    Ok(left)
}

fn relational_op(token: &Token) -> Option<BinaryOp> {
    match token {
        Token::LessThan => Some(BinaryOp::LessThan),
        Token::LessThanEquals => Some(BinaryOp::LessThanEquals),
        Token::GreaterThan => Some(BinaryOp::GreaterThan),
        Token::GreaterThanEquals => Some(BinaryOp::GreaterThanEquals),
        _ => None,
    }
}

/// Relational operators are non-associative: at most one application, and a
/// second one immediately after is a dedicated syntax error.
fn parse_relational(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let left = parse_additive(cursor)?;

    let Some(op) = cursor.peek().and_then(relational_op) else {
        return Ok(left);
    };
    cursor.bump();
    let right = parse_additive(cursor)?;

    if cursor.peek().is_some_and(Token::is_relational) {
        let next = cursor.peek_or_error()?;
        let position = next.source.start();
        return Err(InnerParseError::ChainedComparison(next.value.clone()).at(position));
    }

    Ok(binary(cursor, start, op, left, right))
}

fn parse_additive(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let mut left = parse_multiplicative(cursor)?;
    loop {
        let op = match cursor.peek() {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Subtract,
            _ => break,
        };
        cursor.bump();
        let right = parse_multiplicative(cursor)?;
        left = binary(cursor, start, op, left, right);
    }
    Ok(left)
}

fn parse_multiplicative(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let mut left = parse_unary(cursor)?;
    loop {
        let op = match cursor.peek() {
            Some(Token::Star) => BinaryOp::Multiply,
            Some(Token::Slash) => BinaryOp::Divide,
            _ => break,
        };
        cursor.bump();
        let right = parse_unary(cursor)?;
        left = binary(cursor, start, op, left, right);
    }
    Ok(left)
}

fn parse_unary(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    if cursor.take_if(&Token::Not).is_some() {
        let inner = parse_dot(cursor).map(Box::new)?;
        Ok(Exp::new(
            ExpKind::Unary(UnaryOp::Not, inner),
            cursor.source_from(start),
        ))
    } else {
        parse_dot(cursor)
    }
}

fn parse_dot(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let mut left = parse_primary(cursor)?;
    while cursor.take_if(&Token::Dot).is_some() {
        let field = parse_identifier(cursor)?;
        left = Exp::new(
            ExpKind::Dot(Box::new(left), field),
            cursor.source_from(start),
        );
    }
    Ok(left)
}

fn parse_primary(cursor: &mut Cursor) -> Result<Exp> {
    let next = cursor.peek_or_error()?.clone();
    let position = next.source.start();

    match &next.value {
        Token::IntLiteral(text) => {
            let value: i32 = text
                .parse()
                .map_err(|_| InnerParseError::IntLiteralOutOfRange(text.clone()).at(position))?;
            cursor.bump();
            Ok(Exp::new(ExpKind::IntLiteral(value), next.source))
        }
        Token::True => {
            cursor.bump();
            Ok(Exp::new(ExpKind::BoolLiteral(true), next.source))
        }
        Token::False => {
            cursor.bump();
            Ok(Exp::new(ExpKind::BoolLiteral(false), next.source))
        }
        Token::Null => {
            cursor.bump();
            Ok(Exp::new(ExpKind::Null, next.source))
        }
        Token::Identifier(_) => parse_var_or_call(cursor),
        Token::LeftParen => parse_paren(cursor),
        Token::New => parse_struct_alloc(cursor),
        other => Err(InnerParseError::ExpectedExpressionButGot(other.clone()).at(position)),
    }
}

fn parse_var_or_call(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    let name = parse_identifier(cursor)?;

    if cursor.take_if(&Token::LeftParen).is_some() {
        let args = parse_arguments(cursor)?;
        cursor.expect(&Token::RightParen)?;
        Ok(Exp::new(
            ExpKind::Call(name, args),
            cursor.source_from(start),
        ))
    } else {
        let source = name.source.clone();
        Ok(Exp::new(ExpKind::Var(name.value), source))
    }
}

fn parse_arguments(cursor: &mut Cursor) -> Result<Vec<Exp>> {
    let mut args = Vec::new();
    if cursor.peek() != Some(&Token::RightParen) {
        loop {
            args.push(parse_exp(cursor)?);
            if cursor.take_if(&Token::Comma).is_none() {
                break;
            }
        }
    }
    Ok(args)
}

fn parse_paren(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    cursor.expect(&Token::LeftParen)?;
    let inner = parse_exp(cursor).map(Box::new)?;
    cursor.expect(&Token::RightParen)?;
    Ok(Exp::new(ExpKind::Paren(inner), cursor.source_from(start)))
}

fn parse_struct_alloc(cursor: &mut Cursor) -> Result<Exp> {
    let start = cursor.index();
    cursor.expect(&Token::New)?;
    let struct_name = parse_identifier(cursor)?;
    cursor.expect(&Token::LeftBrace)?;

    let mut fields = Vec::new();
    if cursor.peek() != Some(&Token::RightBrace) {
        loop {
            let name = parse_identifier(cursor)?;
            cursor.expect(&Token::Colon)?;
            let value = parse_exp(cursor)?;
            fields.push(FieldInit { name, value });
            if cursor.take_if(&Token::Comma).is_none() {
                break;
            }
        }
    }
    cursor.expect(&Token::RightBrace)?;

    Ok(Exp::new(
        ExpKind::New(StructAlloc {
            struct_name,
            fields,
        }),
        cursor.source_from(start),
    ))
}
