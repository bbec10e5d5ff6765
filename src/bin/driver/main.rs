mod args;
mod driver_error;

use args::Args;
use driver_error::DriverError;
use std::fs;
use structlang::*;

type BoxedError = Box<dyn std::error::Error>;

#[cfg(feature = "lexer")]
fn tokenize(source: &str, args: &Args) -> Result<lexer::Tokens, BoxedError> {
    let tokens = lexer::lex(source).map_err(DriverError::from)?;
    if args.lex {
        dbg!(&tokens);
    }
    Ok(tokens)
}

#[cfg(feature = "parser")]
fn parse(tokens: &lexer::Tokens, args: &Args) -> Result<ast::Program, BoxedError> {
    let program = parser::parse(tokens).map_err(DriverError::from)?;
    if args.parse {
        dbg!(&program);
    }
    Ok(program)
}

#[cfg(feature = "typechecker")]
fn check(program: ast::Program, args: &Args) -> Result<ast::Program, BoxedError> {
    let typed = typechecker::typecheck(program).map_err(DriverError::from)?;
    if args.check {
        dbg!(&typed);
    }
    Ok(typed)
}

#[cfg(feature = "codegen")]
fn emit(typed: &ast::Program, args: &Args) -> Result<(), BoxedError> {
    let Some(output) = args.output.as_ref() else {
        return Err(DriverError::MissingOutputFile.into());
    };
    if !output.extension().is_some_and(|ext| ext == "c") {
        let filename = output.to_string_lossy().to_string();
        Err(DriverError::BadOutputExtension(filename))?;
    }

    let c_text = codegen::generate(typed).map_err(DriverError::from)?;
    fs::write(output, c_text).map_err(DriverError::from)?;
    Ok(())
}

#[allow(unused_variables)]
pub fn main() -> Result<(), BoxedError> {
    let args = Args::parse();

    let extension_ok = args
        .input
        .extension()
        .is_some_and(|ext| ext == "sl" || ext == "txt");
    if !extension_ok {
        let filename = args.input.to_string_lossy().to_string();
        Err(DriverError::BadInputExtension(filename))?;
    }
    let source = fs::read_to_string(&args.input).map_err(DriverError::from)?;

    #[cfg(feature = "lexer")]
    let tokens = tokenize(&source, &args)?;

    #[cfg(feature = "lexer")]
    if args.lex {
        return Ok(());
    }

    #[cfg(feature = "parser")]
    let program = parse(&tokens, &args)?;

    #[cfg(feature = "parser")]
    if args.parse {
        return Ok(());
    }

    #[cfg(feature = "typechecker")]
    let typed = check(program, &args)?;

    #[cfg(feature = "typechecker")]
    if args.check {
        return Ok(());
    }

    #[cfg(feature = "codegen")]
    emit(&typed, &args)?;

    Ok(())
}
