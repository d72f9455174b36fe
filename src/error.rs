/// Everything that can go wrong while parsing or running a sam command.
#[derive(Debug, thiserror::Error)]
pub enum SamError {
    /// Malformed command text. `offset` is the byte offset into the command string.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },

    /// A regular-expression address found nothing anywhere in the buffer.
    #[error("pattern not found: {pattern}")]
    NoMatch { pattern: String },

    /// The external filter process failed, timed out, or could not be started.
    #[error("pipe command `{command}` failed: {detail}")]
    Pipe { command: String, detail: String },

    /// Overlapping changes reached the applicator. Never caused by user input
    /// alone; signals a broken evaluator invariant.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("empty command")]
    EmptyCommand,

    #[error("no current buffer")]
    NoBuffer,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SamError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        SamError::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// True for invariant violations, as opposed to errors caused by the user's input.
    pub fn is_internal(&self) -> bool {
        matches!(self, SamError::Internal(_))
    }
}
