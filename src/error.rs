//! Error types for reading chart descriptions

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("failed to read chart description: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML or a field of the wrong type
    #[error("invalid TOML: {message}")]
    Toml { message: String, span: Option<Span> },

    /// Well-formed TOML that does not describe a chart
    #[error("invalid chart description: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for DescriptionError {
    fn from(err: toml::de::Error) -> Self {
        DescriptionError::Toml {
            message: err.message().trim_end().to_string(),
            span: err.span(),
        }
    }
}

impl DescriptionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        DescriptionError::Invalid(message.into())
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let report = match self {
            DescriptionError::Io(_) => return self.to_string(),
            DescriptionError::Toml { message, span } => {
                let span = span.clone().unwrap_or(0..0);
                Report::build(ReportKind::Error, filename, span.start)
                    .with_message("invalid TOML")
                    .with_label(
                        Label::new((filename, span))
                            .with_message(message)
                            .with_color(Color::Red),
                    )
                    .finish()
            }
            DescriptionError::Invalid(message) => Report::build(ReportKind::Error, filename, 0)
                .with_message(message)
                .finish(),
        };

        let mut buf = Vec::new();
        if report
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}
