//! Parser limits and tuning parameters.

/// Default maximum nesting depth of lists and dictionaries.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Largest byte string accepted by default (2^31 - 1 bytes).
pub const MAX_STRING_LENGTH: usize = i32::MAX as usize;

/// Maximum number of digits in a byte string length prefix.
///
/// Eleven digits would describe a string of at least 10GB.
pub const MAX_LENGTH_DIGITS: usize = 10;

/// Maximum number of digits in an integer, excluding the sign.
pub const MAX_INTEGER_DIGITS: usize = 19;

/// Size of each segment the async reader requests from its source.
pub const DEFAULT_SEGMENT_SIZE: usize = 8 * 1024;

/// Upper bound on the write buffer used by async encoding.
pub const MAX_WRITE_BUFFER: usize = 64 * 1024;

/// Limits applied while parsing.
///
/// # Examples
///
/// ```
/// use rbencode::{ParserConfig, SliceReader, Parser};
///
/// let config = ParserConfig::default().with_max_depth(2);
/// let mut parser = Parser::new(SliceReader::new(&b"llli1eeee"[..])).with_config(config);
/// assert!(parser.parse_blocking().unwrap_err().is_unsupported());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of nested lists and dictionaries.
    pub max_depth: usize,
    /// Maximum byte string length, capped at [`MAX_STRING_LENGTH`].
    pub max_string_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_string_length: MAX_STRING_LENGTH,
        }
    }
}

impl ParserConfig {
    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the maximum byte string length.
    ///
    /// Values above [`MAX_STRING_LENGTH`] are clamped to it.
    pub fn with_max_string_length(mut self, max_string_length: usize) -> Self {
        self.max_string_length = max_string_length.min(MAX_STRING_LENGTH);
        self
    }
}
