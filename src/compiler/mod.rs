#[allow(clippy::indexing_slicing)]
pub mod ast;
pub mod codegen;
pub mod error;
#[allow(clippy::indexing_slicing)]
pub mod lexer;
pub mod parser;

use std::panic::{self, AssertUnwindSafe};

use crate::debug::{DebugSink, NoopSink};
use error::{CompileError, Warning};

/// Generated JavaScript plus the lenient-skip warnings collected on the way.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub js: String,
    pub warnings: Vec<Warning>,
}

/// Compile DSL source into JavaScript with no debug output.
pub fn compile(source: &str) -> Result<CompileOutput, CompileError> {
    compile_with(source, &NoopSink)
}

/// Compile DSL source, reporting pipeline progress to `sink`.
///
/// source → lex → parse → generate → `CompileOutput`
///
/// The stages are total for any input; a fault escaping them is caught here
/// and converted into the single generic error, so callers always get
/// exactly one of generated output or an error — never a mixture.
pub fn compile_with(source: &str, sink: &dyn DebugSink) -> Result<CompileOutput, CompileError> {
    panic::catch_unwind(AssertUnwindSafe(|| run_pipeline(source, sink))).map_err(|_| {
        CompileError::Internal {
            message: "compilation failed unexpectedly".to_string(),
        }
    })
}

fn run_pipeline(source: &str, sink: &dyn DebugSink) -> CompileOutput {
    let (tokens, mut warnings) = lexer::tokenize(source);
    sink.debug(&format!("lexed {} tokens", tokens.len()));

    let (program, parse_warnings) = parser::parse(tokens);
    sink.debug(&format!(
        "parsed {} scripts, {} variables, {} lists",
        program.scripts.len(),
        program.variables.len(),
        program.lists.len()
    ));
    warnings.extend(parse_warnings);

    let (js, generate_warnings) = codegen::generate(&program);
    warnings.extend(generate_warnings);

    for warning in &warnings {
        sink.warn(&warning.to_string());
    }
    sink.info(&format!("generated {} bytes of JavaScript", js.len()));

    CompileOutput { js, warnings }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::debug::{Level, MemorySink};

    #[test]
    fn compilation_is_deterministic() {
        let source = "var score = 5 when flagClicked repeat 3 move 10";
        let first = compile(source).unwrap();
        let second = compile(source).unwrap();
        assert_eq!(first.js, second.js);
    }

    #[test]
    fn declaration_then_assignment() {
        let out = compile("var score = 5 when flagClicked set score 10").unwrap();
        assert!(out.js.contains("let score = 5;"));
        assert!(out.js.contains("score = 10;"));
    }

    #[test]
    fn stray_symbols_do_not_change_the_output() {
        let clean = compile("").unwrap();
        let noisy = compile("@@@").unwrap();
        assert_eq!(clean.js, noisy.js);
        assert!(!noisy.warnings.is_empty());
    }

    #[test]
    fn unknown_top_level_token_warns_but_compiles() {
        let out = compile("bogus when flagClicked move 10").unwrap();
        assert!(out.js.contains(".move(10);"));
        assert!(out.warnings.iter().any(|w| w.message.contains("bogus")));
    }

    #[test]
    fn sink_choice_does_not_affect_the_output() {
        let source = "when flagClicked say \"hi\" 2";
        let silent = compile(source).unwrap();
        let observed = compile_with(source, &MemorySink::new()).unwrap();
        assert_eq!(silent.js, observed.js);
    }

    #[test]
    fn memory_sink_records_stage_progress() {
        let sink = MemorySink::new();
        compile_with("when flagClicked move 10", &sink).unwrap();
        let entries = sink.entries();
        assert!(entries
            .iter()
            .any(|(level, msg)| *level == Level::Debug && msg.contains("lexed")));
        assert!(entries
            .iter()
            .any(|(level, msg)| *level == Level::Info && msg.contains("generated")));
    }

    #[test]
    fn warnings_are_reported_through_the_sink() {
        let sink = MemorySink::new();
        compile_with("@@@", &sink).unwrap();
        assert!(sink
            .entries()
            .iter()
            .any(|(level, _)| *level == Level::Warn));
    }
}
