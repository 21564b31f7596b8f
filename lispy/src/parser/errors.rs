use pest::iterators::Pair;
use std::fmt;

/// Location of a construct in the source text (1-based lines and columns).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub source_text: Option<String>,
}

impl SourceSpan {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
            source_text: None,
        }
    }

    pub fn with_source_text(mut self, source_text: String) -> Self {
        self.source_text = Some(source_text);
        self
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_column)
    }
}

// Helper function to convert pest span to our SourceSpan
pub fn pest_span_to_source_span(span: pest::Span) -> SourceSpan {
    let (start_line, start_column) = span.start_pos().line_col();
    let (end_line, end_column) = span.end_pos().line_col();
    SourceSpan::new(start_line, start_column, end_line, end_column)
        .with_source_text(span.as_str().to_string())
}

// Helper function to create SourceSpan from a Pair
pub fn pair_to_source_span(pair: &Pair<super::Rule>) -> SourceSpan {
    pest_span_to_source_span(pair.as_span())
}

pub fn invalid_input_error(message: &str, pair: &Pair<super::Rule>) -> PestParseError {
    PestParseError::InvalidInput {
        message: message.to_string(),
        span: Some(pair_to_source_span(pair)),
    }
}

pub fn invalid_literal_error(message: &str, pair: &Pair<super::Rule>) -> PestParseError {
    PestParseError::InvalidLiteral {
        message: message.to_string(),
        span: Some(pair_to_source_span(pair)),
    }
}

fn at(span: &Option<SourceSpan>) -> String {
    match span {
        Some(span) => format!(" at {}", span),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PestParseError {
    #[error("Expected {expected}, found {found}{}", at(.span))]
    UnexpectedRule {
        expected: String,
        found: String,
        span: Option<SourceSpan>,
    },

    #[error("{message}{}", at(.span))]
    InvalidInput {
        message: String,
        span: Option<SourceSpan>,
    },

    #[error("Invalid literal: {message}{}", at(.span))]
    InvalidLiteral {
        message: String,
        span: Option<SourceSpan>,
    },

    #[error("Invalid escape sequence {sequence}{}", at(.span))]
    InvalidEscapeSequence {
        sequence: String,
        span: Option<SourceSpan>,
    },

    /// A special form with the wrong number of children
    #[error("Arity mismatch in {form}: expected {expected} arguments, got {actual}{}", at(.span))]
    SpecialFormArity {
        form: String,
        expected: String,
        actual: usize,
        span: Option<SourceSpan>,
    },

    #[error(transparent)]
    PestError(#[from] pest::error::Error<super::Rule>),
}
