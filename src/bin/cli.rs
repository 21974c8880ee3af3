// CLI binary — exiting on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use blockscript::compiler::{self, lexer, parser};
use blockscript::debug::{DebugSink, Level, NoopSink, StderrSink};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "blockscript-cli", about = "Block DSL → JavaScript headless compiler", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Log pipeline stages to stderr
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a source file to JavaScript
    Build {
        /// Input file, or `-` for stdin
        input: String,
        /// Write output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Dump the token stream
    Tokens { input: String },
    /// Dump the parsed program
    Ast { input: String },
    /// Compile and report warnings without emitting code
    Check { input: String },
}

// ── Helpers ──────────────────────────────────────────────────────

fn read_source(input: &str) -> String {
    if input == "-" {
        let mut buffer = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut buffer) {
            eprintln!("Error: failed to read stdin: {e}");
            process::exit(1);
        }
        buffer
    } else {
        fs::read_to_string(input).unwrap_or_else(|e| {
            eprintln!("Error: failed to read {input}: {e}");
            process::exit(1);
        })
    }
}

fn print_warnings(warnings: &[blockscript::Warning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

// ── Main ─────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    let sink: Box<dyn DebugSink> = if cli.verbose {
        Box::new(StderrSink::new(Level::Debug))
    } else {
        Box::new(NoopSink)
    };

    match cli.command {
        Commands::Build { input, output } => {
            let source = read_source(&input);
            match compiler::compile_with(&source, sink.as_ref()) {
                Ok(out) => {
                    print_warnings(&out.warnings);
                    if cli.json {
                        let json = serde_json::json!({
                            "js": out.js,
                            "warnings": out.warnings,
                        });
                        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
                    } else if let Some(path) = output {
                        if let Err(e) = fs::write(&path, &out.js) {
                            eprintln!("Error: failed to write {}: {e}", path.display());
                            process::exit(1);
                        }
                        eprintln!("Wrote {}", path.display());
                    } else {
                        print!("{}", out.js);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            }
        }
        Commands::Tokens { input } => {
            let source = read_source(&input);
            let (tokens, warnings) = lexer::tokenize(&source);
            print_warnings(&warnings);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&tokens).unwrap_or_default()
                );
            } else {
                for token in tokens {
                    println!("{token}");
                }
            }
        }
        Commands::Ast { input } => {
            let source = read_source(&input);
            let (tokens, lex_warnings) = lexer::tokenize(&source);
            let (program, parse_warnings) = parser::parse(tokens);
            print_warnings(&lex_warnings);
            print_warnings(&parse_warnings);
            println!("{program:#?}");
        }
        Commands::Check { input } => {
            let source = read_source(&input);
            match compiler::compile_with(&source, sink.as_ref()) {
                Ok(out) => {
                    print_warnings(&out.warnings);
                    println!("ok: {} warning(s)", out.warnings.len());
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    process::exit(1);
                }
            }
        }
    }
}
