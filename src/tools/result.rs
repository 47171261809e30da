//! Tool execution result: text plus error flag.

/// Result of executing a tool. Errors are ordinary results with `is_error` set;
/// the caller distinguishes kinds only by text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub text: String,
    pub is_error: bool,
}

impl ToolResult {
    #[inline]
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    #[inline]
    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            text: msg.into(),
            is_error: true,
        }
    }

    /// Fold an operation outcome: `label: error` on failure, `success` text otherwise.
    pub fn from_outcome<T, E: std::fmt::Display>(
        outcome: Result<T, E>,
        label: &str,
        success: impl FnOnce(T) -> String,
    ) -> Self {
        match outcome {
            Ok(v) => Self::ok(success(v)),
            Err(e) => Self::error(format!("{label}: {e}")),
        }
    }
}
