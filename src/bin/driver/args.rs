use std::env;
use std::path::PathBuf;
use std::process::exit;

#[derive(Default)]
pub struct Args {
    #[cfg(feature = "lexer")]
    pub lex: bool,

    #[cfg(feature = "parser")]
    pub parse: bool,

    #[cfg(feature = "typechecker")]
    pub check: bool,

    pub input: PathBuf,
    pub output: Option<PathBuf>,
}

impl Args {
    pub fn parse() -> Self {
        let env_args = env::args();
        let mut args = Self::default();
        let mut input = None;
        let mut output = None;

        for arg in env_args.skip(1) {
            match arg.as_str() {
                #[cfg(feature = "lexer")]
                "--lex" => args.lex = true,
                #[cfg(feature = "parser")]
                "--parse" => args.parse = true,
                #[cfg(feature = "typechecker")]
                "--check" => args.check = true,
                "-h" | "--help" => Self::usage(),
                _ => {
                    if input.is_none() {
                        input = Some(PathBuf::from(arg));
                    } else if output.is_none() {
                        output = Some(PathBuf::from(arg));
                    } else {
                        Self::usage();
                    }
                }
            }
        }
        args.input = input.unwrap_or_else(|| Self::usage());
        args.output = output;
        args
    }

    fn usage() -> ! {
        let cmd0 = env::args().next().unwrap_or("slc".to_owned());
        let usage_msg = format!("Usage: {cmd0} [OPTIONS] FILE [OUT.c]\n");
        let options = [
            "Options:\n",
            "  -h, --help             Show this message\n",
            #[cfg(feature = "lexer")]
            "      --lex              Stop after lexing\n",
            #[cfg(feature = "parser")]
            "      --parse            Stop after parsing\n",
            #[cfg(feature = "typechecker")]
            "      --check            Stop after typechecking\n",
        ];

        print!("Struct language compiler\n\n{usage_msg}\n");
        options.into_iter().for_each(|o| print!("{o}"));

        exit(0)
    }
}
