//! Error handling for the charm helpers
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** from the library, so callers can react to the
//!    exact failure ([`CharmError`])
//! 2. **User-friendly messages** at the CLI boundary, with details and an
//!    actionable suggestion ([`ErrorContext`], [`user_friendly_error`])
//!
//! Nothing in the library logs-and-swallows a failure. Every error is
//! propagated unchanged and the hook layer decides whether to abort.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wsgi_charm::core::{CharmError, user_friendly_error};
//!
//! let error = CharmError::UnresolvedVariables {
//!     names: vec!["db_host".to_string()],
//!     rounds: 2,
//!     suggestions: vec![],
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::file_error::FileOperationError;

/// Convenience alias used across the library
pub type Result<T, E = CharmError> = std::result::Result<T, E>;

/// The main error type for charm helper operations
#[derive(Error, Debug)]
pub enum CharmError {
    /// Resolution stopped making progress while some referenced variables
    /// were still undefined. Retrying with the same input cannot help.
    #[error("Undefined variables: {}", .names.join(", "))]
    UnresolvedVariables {
        /// Sorted names of the variables that never got a value
        names: Vec<String>,
        /// Render passes performed before giving up
        rounds: usize,
        /// Known keys that look like misspellings of the missing names
        suggestions: Vec<String>,
    },

    /// A template source could not be parsed
    #[error("Template syntax error in '{template}': {message}")]
    TemplateSyntax {
        template: String,
        message: String,
        line: Option<usize>,
    },

    /// A template source parsed but failed while rendering
    #[error("Failed to render template '{template}': {message}")]
    TemplateRender {
        template: String,
        message: String,
    },

    /// A template rendered to something that is not a YAML mapping
    #[error("Template '{template}' did not render to a mapping: {reason}")]
    TemplateOutput {
        template: String,
        reason: String,
    },

    /// The environment store file exists but does not hold a JSON object
    #[error("Invalid environment store content in {}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A file could not be read or written
    #[error(transparent)]
    File(#[from] FileOperationError),

    /// The charm settings file is malformed
    #[error("Configuration error in {}: {reason}", .path.display())]
    Config {
        path: PathBuf,
        reason: String,
    },
}

/// Error wrapper carrying user-facing details and a suggestion
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: message in red, details in yellow,
    /// suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] for CLI display.
///
/// [`CharmError`] variants get tailored details and suggestions. Anything else
/// is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(charm_error) = error.downcast_ref::<CharmError>() {
        return create_error_context(charm_error);
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(message)
}

fn create_error_context(error: &CharmError) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());

    match error {
        CharmError::UnresolvedVariables {
            rounds,
            suggestions,
            ..
        } => {
            let ctx = ctx.with_details(format!(
                "Resolution stopped after {rounds} render pass(es) without defining these variables. \
                 Re-running with the same configuration gives the same result."
            ));
            if suggestions.is_empty() {
                ctx.with_suggestion(
                    "Set the variables in the charm config, or give them a fallback in the role \
                     files with {{ name | default(value=...) }}",
                )
            } else {
                ctx.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }
        CharmError::TemplateSyntax {
            line,
            ..
        } => {
            let ctx = ctx.with_suggestion(
                "Check template syntax: variables use {{ var }}, comments use {# #}, control flow uses {% %}",
            );
            match line {
                Some(line) => ctx.with_details(format!("The parser stopped at line {line}")),
                None => ctx,
            }
        }
        CharmError::TemplateRender {
            ..
        } => ctx.with_suggestion(
            "Guard optional values with {% if var is defined %} or the default filter",
        ),
        CharmError::TemplateOutput {
            ..
        } => ctx
            .with_details("Role variable files must render to a YAML mapping of names to values")
            .with_suggestion("Make sure the rendered file is `key: value` lines at the top level"),
        CharmError::Decode {
            source,
            ..
        } => ctx
            .with_details(source.to_string())
            .with_suggestion(
                "The file was not discarded. Fix or remove it by hand; an absent file counts as empty",
            ),
        CharmError::File(file_error) => ErrorContext::new(file_error.user_message()),
        CharmError::Config {
            ..
        } => ctx.with_suggestion("Check the TOML syntax and field names in wsgi-charm.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::file_error::FileOperation;

    #[test]
    fn test_unresolved_variables_message_lists_names() {
        let error = CharmError::UnresolvedVariables {
            names: vec!["a".into(), "b".into()],
            rounds: 1,
            suggestions: vec![],
        };
        assert_eq!(error.to_string(), "Undefined variables: a, b");
    }

    #[test]
    fn test_user_friendly_error_suggests_similar_names() {
        let error = CharmError::UnresolvedVariables {
            names: vec!["db_hots".into()],
            rounds: 2,
            suggestions: vec!["db_host".into()],
        };
        let ctx = user_friendly_error(error.into());
        assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean: db_host?"));
        assert!(ctx.details.unwrap().contains("2 render pass"));
    }

    #[test]
    fn test_user_friendly_error_for_file_error_uses_user_message() {
        let error: CharmError = FileOperationError::new(
            FileOperation::Write,
            "/nope/env.json",
            "saving environment variables",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();
        let ctx = user_friendly_error(error.into());
        assert!(ctx.message.contains("Permission denied"));
    }

    #[test]
    fn test_generic_error_includes_chain() {
        let error = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(error);
        assert!(ctx.message.starts_with("outer"));
        assert!(ctx.message.contains("1: root cause"));
    }
}
