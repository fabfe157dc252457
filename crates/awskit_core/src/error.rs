//! Error types shared by the SSM and Step Functions modules.

/// Main error type for parameter and execution operations.
///
/// Validation variants carry the exact message shown to the user; remote
/// failures carry the operation name and the rendered SDK error chain.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Template path does not end in `.yaml` or `.yml`
    #[error("Template file must have .yaml or .yml extension")]
    TemplateExtension,

    /// Template file could not be opened or read
    #[error("could not read template '{path}': {source}")]
    TemplateRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// ARN does not match the state-machine ARN format
    #[error("Invalid ARN: {0}")]
    InvalidArn(String),

    /// Start/stop dates violate the redrive eligibility window
    #[error("Start and stop dates must be within the last {max_days} days, and start date must be before stop date")]
    DateWindow { max_days: i64 },

    /// Date string matched none of the accepted formats
    #[error("Could not parse date time: {0}")]
    UnparsableDate(String),

    /// Replace rule is not of the form `s/PATTERN/REPLACEMENT/`
    #[error("replace rule must have the form s/PATTERN/REPLACEMENT/, got '{0}'")]
    MalformedRewrite(String),

    /// Replace rule pattern is not a valid regular expression
    #[error("invalid replace pattern '{pattern}': {source}")]
    RewritePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A remote call failed outside the tolerant fan-out paths
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    /// The user declined a confirmation prompt
    #[error("aborted by user")]
    Aborted,
}

impl Error {
    /// Wraps a remote failure, rendering the full error chain into the
    /// message so nested SDK causes are not lost.
    pub fn api(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Api {
            operation,
            message: err.to_string(),
        }
    }

    /// True for errors caused by user input rather than remote state.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TemplateExtension
                | Self::InvalidArn(_)
                | Self::DateWindow { .. }
                | Self::UnparsableDate(_)
                | Self::MalformedRewrite(_)
                | Self::RewritePattern { .. }
        )
    }
}
