//! Issue composition error types.

/// Description rendering error.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// Handlebars rendering error.
    #[error("Template rendering error: {0}")]
    Render(#[from] handlebars::RenderError),

    /// Template registration error.
    #[error("Template registration error: {0}")]
    Registration(#[from] handlebars::TemplateError),
}
