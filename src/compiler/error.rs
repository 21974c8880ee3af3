use std::fmt;

use serde::Serialize;

/// The single error the pipeline can produce. The stages themselves are
/// total for any input; only a fault escaping the pipeline is reported, as
/// one generic message with no structured detail.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum CompileError {
    Internal { message: String },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Internal { message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for CompileError {}

/// Pipeline stage a warning was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningStage {
    Lexer,
    Parser,
    Generator,
}

impl WarningStage {
    fn label(self) -> &'static str {
        match self {
            WarningStage::Lexer => "lexer",
            WarningStage::Parser => "parser",
            WarningStage::Generator => "generator",
        }
    }
}

/// A lenient-skip note. Skips never fail compilation; they are collected
/// and returned alongside the generated output.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    pub stage: WarningStage,
    pub message: String,
}

impl Warning {
    pub fn lexer(message: impl Into<String>) -> Self {
        Self {
            stage: WarningStage::Lexer,
            message: message.into(),
        }
    }

    pub fn parser(message: impl Into<String>) -> Self {
        Self {
            stage: WarningStage::Parser,
            message: message.into(),
        }
    }

    pub fn generator(message: impl Into<String>) -> Self {
        Self {
            stage: WarningStage::Generator,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage.label(), self.message)
    }
}
