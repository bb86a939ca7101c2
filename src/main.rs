//! `llamac`: driver for the Llama compiler front-end.

use std::error::Error;
use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Parser as CliParser;

use llama_lang::diagnostics::{shared, Logger};
use llama_lang::lexer::Lexer;
use llama_lang::parser::Parser;
use llama_lang::sem;

#[derive(CliParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// The input file. If omitted, input is read from stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// The output file; receives the parsed AST as JSON on success.
    #[arg(short, long, default_value = "a.out")]
    output: PathBuf,

    /// Build the lexer and parser, then exit.
    #[arg(long, alias = "pp")]
    prepare: bool,

    /// Log each lexed token along with its file position.
    #[arg(long, alias = "lv")]
    lexer_verbose: bool,

    /// Log parser progress while parsing.
    #[arg(long, alias = "pv")]
    parser_verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    let level = if args.lexer_verbose || args.parser_verbose {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    simple_logger::init_with_level(level).unwrap();

    let (label, data) = match &args.input {
        Some(path) => (path.display().to_string(), fs::read_to_string(path)?),
        None => {
            println!("Reading from stdin (type <EOF> to end):");
            let mut data = String::new();
            std::io::stdin().read_to_string(&mut data)?;
            ("<stdin>".to_string(), data)
        }
    };

    let logger = shared(Logger::console(label));
    let mut parser = Parser::new(logger.clone()).with_verbose(args.parser_verbose);
    let mut lexer = Lexer::new(&data, logger.clone()).with_verbose(args.lexer_verbose);

    if args.prepare {
        return Ok(());
    }

    let program = parser.parse_with_lexer(&mut lexer);
    sem::analyze(&program, &logger);

    let success = logger.borrow().success();
    if success {
        fs::write(&args.output, serde_json::to_string_pretty(&program)?)?;
    }

    std::process::exit(if success { 0 } else { 1 });
}
