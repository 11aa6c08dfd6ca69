use thiserror::Error;

/// Configuration errors raised while assembling a route tree
///
/// All of them are fatal for the tree being built. In a dev reload the
/// previously built tree stays active (see [`crate::TreeSlot`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("duplicate route `{path}`: defined by `{first}` and `{second}`")]
    DuplicateRoute {
        path: String,
        first: String,
        second: String,
    },

    #[error("missing root layout: no `__layout` file found at `/`")]
    MissingRootLayout,

    #[error("malformed route descriptor `{file_path}`: {reason}")]
    MalformedDescriptor { file_path: String, reason: String },
}

impl TreeError {
    pub(crate) fn malformed(file_path: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDescriptor {
            file_path: file_path.to_string(),
            reason: reason.into(),
        }
    }
}
