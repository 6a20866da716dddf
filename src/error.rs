//! Application-level error with a process exit code.
//!
//! Exit codes:
//! - 2: input, usage, or schema problems
//! - 3: no usable rows
//! - 4: output/internal failures

use crate::adjust::AdjustError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AdjustError> for AppError {
    fn from(err: AdjustError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_maps_to_input_exit_code() {
        let err: AppError = AdjustError::Schema { column: "Close Price" }.into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Missing required column: `Close Price`");
    }
}
