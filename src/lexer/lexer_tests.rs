use super::*;
use crate::source::SourcePosition;

fn lex_tokens(input: &str) -> Vec<Token> {
    lex(input)
        .expect("input should lex")
        .into_iter()
        .map(|sourced| sourced.value)
        .collect()
}

fn ident(name: &str) -> Token {
    Token::Identifier(String::from(name))
}

fn int(literal: &str) -> Token {
    Token::IntLiteral(String::from(literal))
}

#[test]
fn test_basic_vardec() {
    let tokens = lex_tokens("int x = 6;");
    let expected = vec![
        Token::Int,
        ident("x"),
        Token::Assign,
        int("6"),
        Token::Semicolon,
    ];
    assert_eq!(expected, tokens);
}

#[test]
fn test_reserved_words_win_over_identifiers() {
    let tokens = lex_tokens("struct func while breaker");
    let expected = vec![Token::Struct, Token::Func, Token::While, ident("breaker")];
    assert_eq!(expected, tokens);
}

#[test]
fn test_maximal_munch_double_equals() {
    assert_eq!(vec![Token::EqualsEquals], lex_tokens("=="));
    assert_eq!(vec![Token::LessThanEquals], lex_tokens("<="));
    assert_eq!(
        vec![Token::Assign, Token::EqualsEquals, Token::Assign],
        lex_tokens("= == =")
    );
    assert_eq!(
        vec![Token::LessThan, Token::Assign],
        lex_tokens("< =")
    );
}

#[test]
fn test_int_literals() {
    assert_eq!(vec![int("0")], lex_tokens("0"));
    assert_eq!(vec![int("1234")], lex_tokens("1234"));
}

#[test]
fn test_rejects_stray_characters() {
    for input in ["|", "&", "$"] {
        let c = input.chars().next().expect("non-empty input");
        let lexed = lex(input);
        let expected = Err(InnerLexError::UnexpectedChar(c).at(SourcePosition::START));
        assert_eq!(expected, lexed, "lexing {input:?}");
    }
}

#[test]
fn test_rejects_leading_underscore() {
    let lexed = lex("_a");
    let expected = Err(InnerLexError::UnexpectedChar('_').at(SourcePosition::START));
    assert_eq!(expected, lexed);
}

#[test]
fn test_rejects_digit_run_into_letters() {
    let lexed = lex("1234r");
    let expected =
        Err(InnerLexError::BadIntLiteral(String::from("1234r")).at(SourcePosition::START));
    assert_eq!(expected, lexed);
}

#[test]
fn test_rejects_leading_zero() {
    let lexed = lex("0123");
    let expected =
        Err(InnerLexError::BadIntLiteral(String::from("0123")).at(SourcePosition::START));
    assert_eq!(expected, lexed);
}

#[test]
fn test_error_position_is_tracked() {
    let lexed = lex("int x = 6;\nint y = $;");
    let expected = Err(InnerLexError::UnexpectedChar('$').at(SourcePosition::new(2, 9)));
    assert_eq!(expected, lexed);
}

#[test]
fn test_spans_bound_matched_text() {
    let tokens = lex("if (a <= 10)").expect("input should lex");
    let le = &tokens[3];
    assert_eq!(Token::LessThanEquals, le.value);
    assert_eq!("<=", le.source.text());
    assert_eq!(SourcePosition::new(1, 7), le.source.start());
    assert_eq!(SourcePosition::new(1, 9), le.source.end());
}

#[test]
fn test_round_trip_rebuilds_input() {
    let input = "struct Node {\n    int value;\n    Node rest;\n}\n\nfunc length(Node list): int {\n    return 0;\n}\n\nprintln(length(null));";
    let tokens = lex(input).expect("input should lex");
    let sources: Vec<Source> = tokens.into_iter().map(|t| t.source).collect();
    let joined = Source::join(&sources);
    assert_eq!(input, joined.text());
}
