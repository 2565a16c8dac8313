//! Template sources: one variables file of the role, parsed once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tera::Template;

use super::renderer::TemplateRenderer;
use super::variables::{KnownKeys, referenced_variables, undeclared_in};
use crate::core::Result;
use crate::utils::fs::read_text_file;

/// A variables template, identified by its name relative to the search path.
///
/// The template is parsed when it is created. The parse tree and the set of
/// variables read from it are kept for the whole resolution.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    name: String,
    path: Option<PathBuf>,
    content: String,
    template: Template,
    referenced: BTreeSet<String>,
}

impl TemplateSource {
    /// Load `name` (e.g. `defaults/main.yml`) from `search_path`.
    pub fn load(search_path: &Path, name: &str) -> Result<Self> {
        let path = search_path.join(name);
        let content = read_text_file(&path, "loading role variables template")?;
        let mut source = Self::from_content(name, content)?;
        source.path = Some(path);
        Ok(source)
    }

    /// Build a source from in-memory text.
    pub fn from_content(name: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let content = content.into();
        let template = TemplateRenderer::parse(&name, &content)?;
        let referenced = referenced_variables(&template.ast);
        tracing::trace!("Template '{}' references {:?}", name, referenced);
        Ok(Self {
            name,
            path: None,
            content,
            template,
            referenced,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the source was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Parsed form of [`Self::content`]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Every free variable the template reads.
    pub fn referenced_variables(&self) -> &BTreeSet<String> {
        &self.referenced
    }

    /// The referenced variables that `known` does not define.
    pub fn undeclared_variables<K: KnownKeys + ?Sized>(&self, known: &K) -> BTreeSet<String> {
        undeclared_in(&self.referenced, known)
    }
}
