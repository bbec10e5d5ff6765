#![deny(unused_must_use)]
#![warn(clippy::pedantic)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod ast;
#[cfg(feature = "codegen")]
pub mod codegen;
#[cfg(feature = "lexer")]
pub mod lexer;
#[cfg(feature = "parser")]
pub mod parser;
pub mod source;
#[cfg(feature = "typechecker")]
pub mod typechecker;
