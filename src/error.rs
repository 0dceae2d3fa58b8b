use thiserror::Error;

/// Errors raised while building distribution parameters or string generators.
///
/// Drawing from an already built generator never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A Zipf population must contain at least one rank
    #[error("zipf population must contain at least one element")]
    EmptyPopulation,

    /// Theta outside `[0, 1)`, including the `theta == 1` singularity
    #[error("zipf theta must lie in [0, 1), got {0}")]
    InvalidTheta(f64),

    /// Alpha outside `[1, inf)`
    #[error("zipf alpha must be finite and at least 1, got {0}")]
    InvalidAlpha(f64),

    /// Charset is empty or too large for the 256-entry stretch table
    #[error("charset must hold between 1 and {max} characters, got {len}")]
    InvalidCharset { len: usize, max: usize },

    /// Uniform length range with `min > max`
    #[error("length range {min}..={max} is empty")]
    InvalidLengthRange { min: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_value() {
        assert_eq!(Error::InvalidTheta(1.0).to_string(), "zipf theta must lie in [0, 1), got 1");
        assert_eq!(
            Error::InvalidCharset { len: 0, max: 128 }.to_string(),
            "charset must hold between 1 and 128 characters, got 0"
        );
    }
}
