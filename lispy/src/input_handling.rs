// Input handling for the lispy-repl binary
// Resolves where program text comes from: a string, a file, stdin or the interactive prompt

use clap::ValueEnum;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Input source types supported by the binary
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum InputSource {
    /// Interactive REPL mode
    Interactive,
    /// Execute a string directly
    String,
    /// Execute a file
    File,
    /// Read from stdin pipe
    Pipe,
}

/// Configuration for input handling
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub source: InputSource,
    pub file_path: Option<PathBuf>,
    pub string_content: Option<String>,
    pub verbose: bool,
}

impl InputConfig {
    /// Create a new input config for file input
    pub fn from_file(file_path: PathBuf, verbose: bool) -> Self {
        Self {
            source: InputSource::File,
            file_path: Some(file_path),
            string_content: None,
            verbose,
        }
    }

    /// Create a new input config for string input
    pub fn from_string(content: String, verbose: bool) -> Self {
        Self {
            source: InputSource::String,
            file_path: None,
            string_content: Some(content),
            verbose,
        }
    }

    /// Create a new input config for pipe input
    pub fn from_pipe(verbose: bool) -> Self {
        Self {
            source: InputSource::Pipe,
            file_path: None,
            string_content: None,
            verbose,
        }
    }

    /// Builds the config for a non-interactive source after checking that the
    /// argument it needs was given.
    pub fn from_args(
        source: InputSource,
        file_path: Option<PathBuf>,
        string_content: Option<String>,
        verbose: bool,
    ) -> Result<Self, InputError> {
        validate_input_args(&source, &file_path, &string_content)?;
        match source {
            InputSource::File => file_path
                .map(|path| Self::from_file(path, verbose))
                .ok_or(InputError::MissingFileArgument),
            InputSource::String => string_content
                .map(|content| Self::from_string(content, verbose))
                .ok_or(InputError::MissingStringArgument),
            InputSource::Pipe => Ok(Self::from_pipe(verbose)),
            InputSource::Interactive => Err(InputError::InteractiveNotSupported),
        }
    }
}

/// Result of reading input content
#[derive(Debug)]
pub struct InputContent {
    pub content: String,
    pub source_name: String,
}

/// Read input content based on the configuration
pub fn read_input_content(config: &InputConfig) -> Result<InputContent, InputError> {
    let (content, source_name) = match config.source {
        InputSource::File => {
            let file_path = config
                .file_path
                .as_ref()
                .ok_or(InputError::MissingFileArgument)?;
            let content = fs::read_to_string(file_path).map_err(|error| InputError::FileRead {
                path: file_path.clone(),
                error,
            })?;
            (content, file_path.to_string_lossy().to_string())
        }
        InputSource::String => {
            let content = config
                .string_content
                .clone()
                .ok_or(InputError::MissingStringArgument)?;
            (content, "<string>".to_string())
        }
        InputSource::Pipe => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .map_err(InputError::StdinRead)?;
            (content, "<stdin>".to_string())
        }
        InputSource::Interactive => return Err(InputError::InteractiveNotSupported),
    };

    if config.verbose {
        tracing::info!(source = %source_name, bytes = content.len(), "read program input");
    }

    Ok(InputContent {
        content,
        source_name,
    })
}

/// Validate input arguments for a given source type
pub fn validate_input_args(
    source: &InputSource,
    file_path: &Option<PathBuf>,
    string_content: &Option<String>,
) -> Result<(), InputError> {
    match source {
        InputSource::File if file_path.is_none() => Err(InputError::MissingFileArgument),
        InputSource::String if string_content.is_none() => Err(InputError::MissingStringArgument),
        _ => Ok(()),
    }
}

/// Errors that can occur during input handling
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("--file argument required when using --input file")]
    MissingFileArgument,

    #[error("--string argument required when using --input string")]
    MissingStringArgument,

    #[error("Error reading file '{}': {error}", .path.display())]
    FileRead { path: PathBuf, error: io::Error },

    #[error("Error reading from stdin: {0}")]
    StdinRead(io::Error),

    #[error("Interactive mode not supported in this context")]
    InteractiveNotSupported,
}
