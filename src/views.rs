//! Template rendering
//!
//! Handlers and the mutation workflow describe what to show as a [`Page`]
//! (template name plus named payload) or a redirect; [`Views`] turns pages
//! into HTML with Tera.

use serde::Serialize;
use tera::{Context, Tera};

use crate::{
    error::{AppError, AppResult},
    forms::FieldError,
};

/// A template with its payload
#[derive(Debug, Clone)]
pub struct Page {
    pub template: &'static str,
    pub context: Context,
}

impl Page {
    /// Start a page; every template receives a `title`
    pub fn new(template: &'static str, title: &str) -> Self {
        let mut context = Context::new();
        context.insert("title", title);
        Self { template, context }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }

    pub fn with_errors(self, errors: &[FieldError]) -> Self {
        self.with("errors", errors)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.context.get(key)
    }
}

/// Result of a request handler or mutation workflow
#[derive(Debug, Clone)]
pub enum Outcome {
    Render(Page),
    /// 303 to a canonical location
    Redirect(String),
}

impl Outcome {
    pub fn redirect(location: impl Into<String>) -> Self {
        Outcome::Redirect(location.into())
    }
}

impl From<Page> for Outcome {
    fn from(page: Page) -> Self {
        Outcome::Render(page)
    }
}

/// Loaded templates
pub struct Views {
    tera: Tera,
}

impl Views {
    /// Load every `*.html` template under `dir`
    pub fn load(dir: &str) -> AppResult<Self> {
        let mut tera = Tera::new(&format!("{}/**/*.html", dir.trim_end_matches('/')))?;
        // values are HTML-escaped by the form sanitizers before storage
        tera.autoescape_on(vec![]);
        tracing::debug!(
            "Loaded {} templates from {}",
            tera.get_template_names().count(),
            dir
        );
        Ok(Self { tera })
    }

    pub fn render(&self, page: &Page) -> AppResult<String> {
        self.tera
            .render(page.template, &page.context)
            .map_err(AppError::from)
    }
}
