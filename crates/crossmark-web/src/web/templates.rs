//! Page templates, compiled into the binary.

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("info.html", include_str!("../../templates/info.html")),
];

/// The template environment. HTML auto-escaping applies to every page.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compiles all pages.
    ///
    /// # Errors
    ///
    /// Returns an error if a template has a syntax error.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)
                .with_context(|| format!("Failed to compile template {name}"))?;
        }
        Ok(Self { env })
    }

    /// Renders `name` with `context`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or rendering fails.
    pub fn render(&self, name: &str, context: impl Serialize) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(context))
            .with_context(|| format!("Failed to render {name}"))
    }
}
