//! Tera templating for role variable files.
//!
//! Role variable files (`defaults/main.yml`, `vars/main.yml`) are YAML
//! documents with template expressions in them. Rendering one against the
//! current configuration yields a YAML mapping of new variables, which the
//! [`resolver`](crate::resolver) merges back in until nothing changes.
//!
//! # Template Dialect
//!
//! Templates use [Tera](https://keats.github.io/tera/) syntax:
//!
//! - Variable substitution: `{{ app_name }}`
//! - Conditionals and loops: `{% if ssl_enabled %}...{% endif %}`
//! - Standard Tera filters plus `bool` (see [`filters`])
//! - Defaults for optional inputs: `{{ port | default(value=8080) }}`
//!
//! Undefined variables are an error in Tera. A variable read inside
//! `default(...)` or guarded by `is defined` still counts as referenced.
//!
//! # Example
//!
//! ```yaml
//! app_user: "{{ app_name }}"
//! app_dir: "/srv/{{ app_name }}"
//! listen: "0.0.0.0:{{ port | default(value=8080) }}"
//! ```

pub mod filters;
pub mod renderer;
pub mod source;
pub mod variables;

pub use renderer::{RenderFailure, TemplateRenderer, parse_mapping};
pub use source::TemplateSource;
pub use variables::{KnownKeys, referenced_variables, undeclared_in};
