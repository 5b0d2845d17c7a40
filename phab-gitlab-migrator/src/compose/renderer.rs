//! Issue description renderer.

use super::ComposeError;
use handlebars::{no_escape, Handlebars};
use serde_json::json;

const DESCRIPTION_TEMPLATE_NAME: &str = "description";

/// Body of every migrated issue. `comments_section` is empty when the task
/// had no comments.
const DESCRIPTION_TEMPLATE: &str = "### Description\n\n\
**Originally reported by {{author}}: {{source_url}}**\n\n\
{{description}}\n\
{{comments_section}}";

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
fn create_handlebars_registry() -> Result<Handlebars<'static>, ComposeError> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);
    hbs.register_template_string(DESCRIPTION_TEMPLATE_NAME, DESCRIPTION_TEMPLATE)?;
    Ok(hbs)
}

/// Fields substituted into the description template.
#[derive(Debug, Clone, Copy)]
pub struct DescriptionContext<'a> {
    /// Original author username.
    pub author: &'a str,

    /// Canonical URL of the source task.
    pub source_url: &'a str,

    /// Relocated task description.
    pub description: &'a str,

    /// Relocated concatenated comment blocks, `None` without comments.
    pub comments: Option<&'a str>,
}

/// Renders migrated issue descriptions.
pub struct DescriptionRenderer {
    handlebars: Handlebars<'static>,
}

impl DescriptionRenderer {
    /// Creates a renderer with the description template registered.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Registration`] if the template is invalid.
    pub fn new() -> Result<Self, ComposeError> {
        Ok(Self {
            handlebars: create_handlebars_registry()?,
        })
    }

    /// Renders the description of a migrated issue.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Render`] if rendering fails.
    pub fn render(&self, context: &DescriptionContext<'_>) -> Result<String, ComposeError> {
        let comments_section = context
            .comments
            .filter(|comments| !comments.is_empty())
            .map(|comments| format!("\n### Comments:\n\n{comments}"))
            .unwrap_or_default();

        let data = json!({
            "author": context.author,
            "source_url": context.source_url,
            "description": context.description,
            "comments_section": comments_section,
        });

        Ok(self.handlebars.render(DESCRIPTION_TEMPLATE_NAME, &data)?)
    }
}
