use thiserror::Error;

use crate::value::NodeKind;

/// The broad category of a [`BencodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input is malformed.
    Invalid,
    /// The input is well-formed but exceeds what this engine accepts.
    Unsupported,
    /// The underlying source or sink failed.
    Io,
    /// The operation was cancelled before it completed.
    Cancelled,
}

/// Errors produced while parsing or encoding bencode.
///
/// Parse errors carry the byte offset where the offending token began and,
/// when known, the kind of node being parsed. A caller can always tell
/// corrupt input ([`ErrorKind::Invalid`]) apart from input that is valid but
/// too large for this engine ([`ErrorKind::Unsupported`]).
#[derive(Debug, Error)]
pub enum BencodeError {
    /// Syntactically malformed input.
    #[error("invalid {} at offset {position}: {message}", node_label(.node))]
    Invalid {
        /// Byte offset of the offending token.
        position: u64,
        /// The node being parsed, if any.
        node: Option<NodeKind>,
        /// What was expected and what was found.
        message: String,
        /// The child error this one adds context to.
        #[source]
        source: Option<Box<BencodeError>>,
    },

    /// Well-formed input outside the engine's safe envelope.
    #[error("unsupported {} at offset {position}: {message}", node_label(.node))]
    Unsupported {
        /// Byte offset of the offending token.
        position: u64,
        /// The node being parsed, if any.
        node: Option<NodeKind>,
        /// Which limit was exceeded.
        message: String,
    },

    /// The source or sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The parse was cancelled while waiting for input.
    #[error("operation cancelled")]
    Cancelled,
}

fn node_label(node: &Option<NodeKind>) -> &'static str {
    match node {
        Some(NodeKind::ByteString) => "byte string",
        Some(NodeKind::Integer) => "integer",
        Some(NodeKind::List) => "list",
        Some(NodeKind::Dictionary) => "dictionary",
        None => "bencode",
    }
}

impl BencodeError {
    pub(crate) fn invalid(position: u64, node: Option<NodeKind>, message: impl Into<String>) -> Self {
        BencodeError::Invalid {
            position,
            node,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn unsupported(
        position: u64,
        node: Option<NodeKind>,
        message: impl Into<String>,
    ) -> Self {
        BencodeError::Unsupported {
            position,
            node,
            message: message.into(),
        }
    }

    /// Re-raises an invalid child error with extra context.
    ///
    /// Only [`ErrorKind::Invalid`] errors are wrapped; unsupported, I/O and
    /// cancellation errors pass through unchanged so their kind survives.
    pub(crate) fn context(self, position: u64, node: NodeKind, message: impl Into<String>) -> Self {
        match self {
            inner @ BencodeError::Invalid { .. } => BencodeError::Invalid {
                position,
                node: Some(node),
                message: message.into(),
                source: Some(Box::new(inner)),
            },
            other => other,
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BencodeError::Invalid { .. } => ErrorKind::Invalid,
            BencodeError::Unsupported { .. } => ErrorKind::Unsupported,
            BencodeError::Io(_) => ErrorKind::Io,
            BencodeError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Returns true if the input was malformed.
    pub fn is_invalid(&self) -> bool {
        self.kind() == ErrorKind::Invalid
    }

    /// Returns true if the input was valid but outside the supported limits.
    pub fn is_unsupported(&self) -> bool {
        self.kind() == ErrorKind::Unsupported
    }

    /// Returns the byte offset this error refers to, if it is a parse error.
    pub fn position(&self) -> Option<u64> {
        match self {
            BencodeError::Invalid { position, .. } | BencodeError::Unsupported { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }

    /// Returns the kind of node that was being parsed, if known.
    pub fn node(&self) -> Option<NodeKind> {
        match self {
            BencodeError::Invalid { node, .. } | BencodeError::Unsupported { node, .. } => *node,
            _ => None,
        }
    }

    /// Follows the chain of wrapped errors down to the one that started it.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbencode::decode;
    ///
    /// let err = decode(b"d3:keyi01ee").unwrap_err();
    /// assert_eq!(err.position(), Some(6));
    /// assert_eq!(err.innermost().position(), Some(6));
    /// assert!(err.innermost().to_string().contains("leading zeros"));
    /// ```
    pub fn innermost(&self) -> &BencodeError {
        let mut current = self;
        while let BencodeError::Invalid {
            source: Some(inner),
            ..
        } = current
        {
            current = inner;
        }
        current
    }
}
