use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Broad classes of failures, as seen by a caller navigating a dataset.
///
/// Several [`ErrorKind`] variants map onto the same category, e.g. both an
/// irregular shape and a zero slice step are [`ErrorCategory::Value`] errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// An index outside `[-n, n-1]`, or navigation of an empty view.
    Index,
    /// The operation is not available in the current load mode.
    Unsupported,
    /// A navigated field is absent on one or more elements.
    Attribute,
    /// Elements disagree on the kind of a navigated field, or a value has
    /// the wrong kind for the requested operation.
    Type,
    /// The argument or the data shape is unsuitable (zero step, ragged data).
    Value,
    /// The data returned by a collaborator is malformed, or a collaborator failed.
    Backend,
    /// A violated internal invariant. Not recoverable.
    Internal,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::IndexOutOfRange { .. } | ErrorKind::EmptyView { .. } => {
                ErrorCategory::Index
            }
            ErrorKind::Unsupported { .. } => ErrorCategory::Unsupported,
            ErrorKind::MissingAttribute { .. } => ErrorCategory::Attribute,
            ErrorKind::KindMismatch { .. } => ErrorCategory::Type,
            ErrorKind::InvalidArgument { .. }
            | ErrorKind::InvalidOperation { .. }
            | ErrorKind::IrregularShape { .. } => ErrorCategory::Value,
            ErrorKind::InvalidFormat { .. } | ErrorKind::Backend { .. } => ErrorCategory::Backend,
            ErrorKind::Inconsistent { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns `true` for internal-consistency failures, which indicate a bug
    /// rather than a condition the caller can recover from.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }

    pub fn invalid_format(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn index_out_of_range(path: impl Into<String>, index: isize, len: usize) -> Error {
        Error(
            ErrorKind::IndexOutOfRange {
                path: path.into(),
                index,
                len,
            }
            .into(),
        )
    }

    pub fn empty_view(path: impl Into<String>, field: impl Into<String>) -> Error {
        Error(
            ErrorKind::EmptyView {
                path: path.into(),
                field: field.into(),
            }
            .into(),
        )
    }

    pub fn unsupported(operation: impl Into<String>, reason: impl Into<String>) -> Error {
        Error(
            ErrorKind::Unsupported {
                operation: operation.into(),
                reason: reason.into(),
            }
            .into(),
        )
    }

    pub fn missing_attribute(
        path: impl Into<String>,
        field: impl Into<String>,
        missing: Vec<usize>,
        total: usize,
    ) -> Error {
        Error(
            ErrorKind::MissingAttribute {
                path: path.into(),
                field: field.into(),
                missing,
                total,
            }
            .into(),
        )
    }

    pub fn kind_mismatch(
        path: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::KindMismatch {
                path: path.into(),
                field: field.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn irregular_shape(path: impl Into<String>, level: usize, lengths: Vec<usize>) -> Error {
        Error(
            ErrorKind::IrregularShape {
                path: path.into(),
                level,
                lengths,
            }
            .into(),
        )
    }

    pub fn inconsistent(
        path: impl Into<String>,
        index: usize,
        message: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::Inconsistent {
                path: path.into(),
                index,
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn backend<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Backend {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("index {index} is out of range for '{path}' with {len} elements")]
    IndexOutOfRange {
        path: String,
        index: isize,
        len: usize,
    },

    #[error("cannot access '{field}' on '{path}': the view has no elements")]
    EmptyView { path: String, field: String },

    #[error("unsupported operation {operation}: {reason}")]
    Unsupported { operation: String, reason: String },

    #[error(
        "'{field}' is missing on {} of {total} elements of '{path}' (elements {})",
        missing.len(),
        format_positions(missing)
    )]
    MissingAttribute {
        path: String,
        field: String,
        /// Depth-first leaf positions of the elements lacking the field.
        missing: Vec<usize>,
        total: usize,
    },

    #[error("'{path}.{field}': {message}")]
    KindMismatch {
        path: String,
        field: String,
        message: String,
    },

    #[error(
        "'{path}' cannot be densified: dimension {level} is irregular (lengths {})",
        format_positions(lengths)
    )]
    IrregularShape {
        path: String,
        level: usize,
        lengths: Vec<usize>,
    },

    #[error("invalid storage format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("internal consistency failure at '{path}' (element {index}): {message}")]
    Inconsistent {
        path: String,
        index: usize,
        message: String,
    },

    #[error("backend error: {context}")]
    Backend {
        context: String,
        source: StdErrorBoxed,
    },
}

fn format_positions(positions: &[usize]) -> String {
    const MAX_SHOWN: usize = 16;
    let shown = positions
        .iter()
        .take(MAX_SHOWN)
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if positions.len() > MAX_SHOWN {
        format!("[{shown}, ...]")
    } else {
        format!("[{shown}]")
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_attribute_message_names_elements() {
        let err = Error::missing_attribute("profiles_1d[:]", "x", vec![3], 5);
        assert_eq!(err.category(), ErrorCategory::Attribute);
        let message = err.to_string();
        assert!(message.contains("'x'"), "{message}");
        assert!(message.contains("1 of 5"), "{message}");
        assert!(message.contains("[3]"), "{message}");
    }

    #[test]
    fn test_irregular_shape_message_is_truncated() {
        let lengths = (0..40).collect::<Vec<_>>();
        let err = Error::irregular_shape("units[:].element", 1, lengths);
        assert_eq!(err.category(), ErrorCategory::Value);
        let message = err.to_string();
        assert!(message.contains("dimension 1"), "{message}");
        assert!(message.ends_with("...])"), "{message}");
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            Error::index_out_of_range("a", 10, 3).category(),
            ErrorCategory::Index
        );
        assert_eq!(Error::empty_view("a", "b").category(), ErrorCategory::Index);
        assert_eq!(
            Error::unsupported("slice", "lazy").category(),
            ErrorCategory::Unsupported
        );
        assert_eq!(
            Error::kind_mismatch("a", "b", "mixed").category(),
            ErrorCategory::Type
        );
        assert_eq!(
            Error::invalid_arg("step", "zero").category(),
            ErrorCategory::Value
        );
        assert_eq!(
            Error::invalid_format("a", "b").category(),
            ErrorCategory::Backend
        );
        let fatal = Error::inconsistent("a", 1, "leaf missing");
        assert!(fatal.is_fatal());
        assert!(!Error::invalid_arg("a", "b").is_fatal());
    }
}
