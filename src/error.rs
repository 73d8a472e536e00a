use std::fs::File;
use std::io::BufReader;

/// Error types that can occur during network operations
///
/// # Variants
///
/// - `ForwardPassNotRun` - Indicates that no batch has been propagated through the network yet
/// - `InputValidationError` - indicates the input data provided does not meet the expected shape, size, or validation rules
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    ForwardPassNotRun,
    InputValidationError(String),
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::ForwardPassNotRun => {
                write!(
                    f,
                    "No forward pass has been run. Prediction requires propagated data in the output layer."
                )
            }
            NetworkError::InputValidationError(msg) => write!(f, "Input validation error: {}", msg),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Input/Output error types that can occur during model serialization and file operations
///
/// # Variants
///
/// - `StdIoError` - Wraps standard I/O errors from file system operations (reading, writing, file access)
/// - `FormatError` - A malformed or truncated model file: bad integer token, bad hexadecimal float token, or fewer lines than the declared architecture requires
#[derive(Debug)]
pub enum IoError {
    StdIoError(std::io::Error),
    FormatError(String),
}

impl IoError {
    pub fn load_in_buf_reader(path: &str) -> Result<BufReader<File>, IoError> {
        let file = File::open(path).map_err(IoError::StdIoError)?;
        Ok(BufReader::new(file))
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::StdIoError(e) => write!(f, "IO error: {}", e),
            IoError::FormatError(msg) => write!(f, "Model format error: {}", msg),
        }
    }
}

impl std::error::Error for IoError {}
