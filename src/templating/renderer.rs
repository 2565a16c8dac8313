//! Template rendering engine with Tera.
//!
//! Renders a [`TemplateSource`] against a configuration dictionary and reads
//! the output as a YAML mapping of new variables. Failures are split into
//! "a context variable was missing" and everything else, because the resolver
//! treats the first kind as "not ready yet" rather than fatal.

use regex::Regex;
use std::sync::LazyLock;
use tera::ast::Node;
use tera::{Context as TeraContext, Template, Tera};

use super::filters;
use super::source::TemplateSource;
use crate::core::{CharmError, ConfigMap, ConfigValue};

/// Scratch template name used while rendering single lines
const PARTIAL_LINE_TEMPLATE: &str = "__wsgi_charm_partial_line";

static UNDEFINED_VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Variable `([^`]+)` not found").expect("valid regex"));

static LINE_COLUMN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d+)").expect("valid regex"));

/// Why a strict render did not produce output
#[derive(Debug)]
pub enum RenderFailure {
    /// The template read a variable that is not in the context
    UndefinedVariable {
        name: String,
        error: CharmError,
    },
    /// Any other failure; always fatal
    Fatal(CharmError),
}

impl RenderFailure {
    pub fn into_error(self) -> CharmError {
        match self {
            Self::UndefinedVariable {
                error,
                ..
            }
            | Self::Fatal(error) => error,
        }
    }
}

impl From<CharmError> for RenderFailure {
    fn from(error: CharmError) -> Self {
        Self::Fatal(error)
    }
}

/// Tera wrapper with the role-file filters registered.
pub struct TemplateRenderer {
    tera: Tera,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        filters::register_all(&mut tera);
        Self {
            tera,
        }
    }

    /// Parse `content` the way the renderer will, without rendering it.
    pub fn parse(name: &str, content: &str) -> Result<Template, CharmError> {
        let syntax_error = |e: tera::Error| CharmError::TemplateSyntax {
            template: name.to_string(),
            message: format_tera_error(&e, name),
            line: extract_line_from_tera_error(&e),
        };

        let mut tera = Tera::default();
        tera.add_raw_template(name, content).map_err(syntax_error)?;
        tera.get_template(name).cloned().map_err(syntax_error)
    }

    /// Build the Tera context for a configuration dictionary.
    pub fn context_for(config: &ConfigMap, template: &str) -> Result<TeraContext, CharmError> {
        log_context_as_kv(config);
        TeraContext::from_serialize(config).map_err(|e| CharmError::TemplateRender {
            template: template.to_string(),
            message: format!("configuration cannot be used as template context: {e}"),
        })
    }

    /// Render the whole source and read the result as a mapping.
    pub fn render(
        &mut self,
        source: &TemplateSource,
        context: &TeraContext,
    ) -> Result<ConfigMap, RenderFailure> {
        tracing::debug!("Rendering template '{}'", source.name());

        let rendered = self
            .tera
            .render_str(source.content(), context)
            .map_err(|e| classify_tera_error(&e, source.name()))?;

        Ok(parse_mapping(source.name(), &rendered)?)
    }

    /// Best-effort render used while some variables are still undefined.
    ///
    /// Tera refuses to render a template that reads an undefined variable, so
    /// the parsed template is rendered one output line at a time instead and
    /// lines that cannot be rendered are dropped. Lines holding a statement
    /// (`{% if %}`, `{% for %}`, `{% set %}`, ...) are dropped together with
    /// the whole body of that statement, and so are the indented children of
    /// a dropped line, so control flow is never evaluated with missing inputs.
    /// If what is left does not read as a mapping, the source contributes
    /// nothing this time.
    pub fn render_partial(&mut self, source: &TemplateSource, context: &TeraContext) -> ConfigMap {
        let mut kept = Vec::new();
        let mut dropped_parent_indent: Option<usize> = None;
        let mut dropped = 0usize;

        let mut scratch = source.template().clone();
        scratch.name = PARTIAL_LINE_TEMPLATE.to_string();
        scratch.ast = Vec::new();
        self.tera.templates.insert(PARTIAL_LINE_TEMPLATE.to_string(), scratch);

        for line in output_lines(&source.template().ast) {
            if line.has_statement {
                dropped += 1;
                continue;
            }

            if line.is_blank() {
                kept.push(String::new());
                continue;
            }

            let indent = line.indent();
            if let Some(parent_indent) = dropped_parent_indent {
                if indent > parent_indent {
                    dropped += 1;
                    continue;
                }
                dropped_parent_indent = None;
            }

            match self.render_line(line.nodes, context) {
                Ok(rendered) => kept.push(rendered),
                Err(_) => {
                    dropped += 1;
                    dropped_parent_indent = Some(indent);
                }
            }
        }

        self.tera.templates.remove(PARTIAL_LINE_TEMPLATE);

        tracing::debug!(
            "Partially rendered '{}': kept {} line(s), dropped {}",
            source.name(),
            kept.len(),
            dropped
        );

        match parse_mapping(source.name(), &kept.join("\n")) {
            Ok(map) => map,
            Err(e) => {
                tracing::debug!("Partial output of '{}' is not usable yet: {e}", source.name());
                ConfigMap::new()
            }
        }
    }

    /// Render one line's nodes through the scratch template.
    fn render_line(&mut self, nodes: Vec<Node>, context: &TeraContext) -> tera::Result<String> {
        if let Some(template) = self.tera.templates.get_mut(PARTIAL_LINE_TEMPLATE) {
            template.ast = nodes;
        }
        self.tera.render(PARTIAL_LINE_TEMPLATE, context)
    }
}

/// The top-level nodes producing one line of output.
#[derive(Debug, Default)]
struct OutputLine {
    nodes: Vec<Node>,
    has_statement: bool,
}

impl OutputLine {
    fn is_blank(&self) -> bool {
        self.nodes.iter().all(|node| matches!(node, Node::Text(text) if text.trim().is_empty()))
    }

    fn indent(&self) -> usize {
        match self.nodes.first() {
            Some(Node::Text(text)) => text.len() - text.trim_start().len(),
            _ => 0,
        }
    }
}

/// Split a template's top-level nodes into output lines.
///
/// A statement node (with its whole body) belongs to the line it starts on,
/// together with any text around it up to the surrounding newlines.
fn output_lines(ast: &[Node]) -> Vec<OutputLine> {
    let mut lines = Vec::new();
    let mut current = OutputLine::default();

    for node in ast {
        match node {
            Node::Text(text) => {
                let mut parts = text.split('\n');
                if let Some(first) = parts.next().filter(|part| !part.is_empty()) {
                    current.nodes.push(Node::Text(first.to_string()));
                }
                for part in parts {
                    lines.push(std::mem::take(&mut current));
                    if !part.is_empty() {
                        current.nodes.push(Node::Text(part.to_string()));
                    }
                }
            }
            Node::VariableBlock(..) => current.nodes.push(node.clone()),
            Node::Comment(..) => {}
            _ => current.has_statement = true,
        }
    }
    lines.push(current);

    lines
}

/// Read rendered text as a mapping of variable names to values.
///
/// An empty document is an empty mapping.
pub fn parse_mapping(template: &str, rendered: &str) -> Result<ConfigMap, CharmError> {
    if rendered.trim().is_empty() {
        return Ok(ConfigMap::new());
    }

    let output_error = |reason: String| CharmError::TemplateOutput {
        template: template.to_string(),
        reason,
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(rendered).map_err(|e| output_error(format!("invalid YAML: {e}")))?;

    match value {
        serde_yaml::Value::Null => Ok(ConfigMap::new()),
        serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value)
            .map_err(|e| output_error(format!("unsupported value: {e}"))),
        serde_yaml::Value::Sequence(_) => Err(output_error("got a list".to_string())),
        _ => Err(output_error("got a scalar".to_string())),
    }
}

fn classify_tera_error(error: &tera::Error, template: &str) -> RenderFailure {
    let message = format_tera_error(error, template);

    if let Some(name) = extract_variable_name(error) {
        return RenderFailure::UndefinedVariable {
            name,
            error: CharmError::TemplateRender {
                template: template.to_string(),
                message,
            },
        };
    }

    let fatal = match &error.kind {
        tera::ErrorKind::Msg(msg) if msg.starts_with("Failed to parse") => {
            CharmError::TemplateSyntax {
                template: template.to_string(),
                message,
                line: extract_line_from_tera_error(error),
            }
        }
        _ => CharmError::TemplateRender {
            template: template.to_string(),
            message,
        },
    };
    RenderFailure::Fatal(fatal)
}

/// Name from a "Variable `foo` not found" message anywhere in the chain.
fn extract_variable_name(error: &tera::Error) -> Option<String> {
    use std::error::Error;

    let mut current: Option<&dyn Error> = Some(error);
    while let Some(err) = current {
        if let Some(caps) = UNDEFINED_VARIABLE_RE.captures(&err.to_string()) {
            return caps.get(1).map(|m| m.as_str().to_string());
        }
        current = err.source();
    }
    None
}

/// Line number from Tera's `line:column` position, when it reports one.
fn extract_line_from_tera_error(error: &tera::Error) -> Option<usize> {
    let error_msg = format!("{error:?}");
    LINE_COLUMN_RE
        .captures(&error_msg)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
}

/// Flatten a Tera error chain into one readable message.
///
/// Tera wraps the useful message in "Failed to render '__tera_one_off'"
/// layers; those are dropped and the internal template name is replaced.
pub fn format_tera_error(error: &tera::Error, template: &str) -> String {
    use std::error::Error;

    let mut all_messages = vec![error.to_string()];
    let mut current_error: Option<&dyn Error> = error.source();
    while let Some(err) = current_error {
        all_messages.push(err.to_string());
        current_error = err.source();
    }

    let messages: Vec<String> = all_messages
        .into_iter()
        .map(|msg| {
            msg.replace("while rendering '__tera_one_off'", "")
                .replace("'__tera_one_off'", &format!("'{template}'"))
                .trim()
                .to_string()
        })
        .filter(|msg| {
            !msg.is_empty()
                && !msg.starts_with("Failed to render")
                && !(msg.starts_with("Failed to parse") && msg.len() < 80)
        })
        .collect();

    if messages.is_empty() {
        error.to_string()
    } else {
        messages.join("\n  -> ")
    }
}

/// Log the render context as key/value pairs at trace level.
fn log_context_as_kv(config: &ConfigMap) {
    if !tracing::enabled!(tracing::Level::TRACE) {
        return;
    }
    for (key, value) in config {
        let shown = match value {
            ConfigValue::String(s) if s.chars().count() > 100 => {
                let head: String = s.chars().take(97).collect();
                format!("\"{head}...\" ({} chars)", s.chars().count())
            }
            other => other.to_string(),
        };
        tracing::trace!("  {key} ({}): {shown}", value.kind());
    }
}
