//! Fixpoint resolution of role variables.
//!
//! Role variable files may reference variables that only exist once another
//! file (or the same file, on a later pass) has been rendered. The resolver
//! renders every source, merges what they define, and repeats until a pass
//! defines nothing new that was missing before.
//!
//! # Algorithm
//!
//! Each round works on the dictionary `C` as it was at the start of the
//! round:
//!
//! 1. For every source `t_i`, compute `U_i`, the variables it reads that `C`
//!    does not define
//! 2. Render every source against `C`, in order, and merge the outputs into a
//!    copy `C'` (later sources win on key collisions)
//! 3. `progress` is the set of names in `U = ∪ U_i` that `C'` now defines;
//!    `still` is the rest of `U`
//!
//! Non-empty `progress` starts another round with `C'`. Otherwise the
//! resolution has converged if `still` is empty and failed if it is not.
//!
//! A source that Tera refuses to render because a variable is undefined is
//! rendered line by line instead (see [`TemplateRenderer::render_partial`]),
//! so the definitions that do not depend on missing values can still make
//! progress. The undefined name joins `U_i` for that round. A round that
//! converges rendered every source in full, which means the returned
//! dictionary never contains partially rendered output.
//!
//! # Termination
//!
//! With `R` distinct referenced names across all sources, each round that
//! continues defines at least one of them for good, so at most `R` rounds
//! make progress and round `R + 1` must converge or fail. The loop is bounded
//! by that count explicitly.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wsgi_charm::core::{ConfigMap, ConfigValue};
//! use wsgi_charm::resolver::ConfigResolver;
//! use wsgi_charm::templating::TemplateSource;
//!
//! # fn example() -> wsgi_charm::core::Result<()> {
//! let sources = vec![
//!     TemplateSource::from_content("defaults", "app_dir: /srv/{{ app_name }}")?,
//!     TemplateSource::from_content("vars", "app_name: blog")?,
//! ];
//!
//! let config = ConfigResolver::new().resolve(&sources, &ConfigMap::new())?;
//! assert_eq!(config["app_dir"], ConfigValue::from("/srv/blog"));
//! # Ok(())
//! # }
//! ```

pub mod role;

use std::collections::BTreeSet;
use strsim::levenshtein;

use crate::core::{CharmError, ConfigMap, Result, merge_into};
use crate::templating::{RenderFailure, TemplateRenderer, TemplateSource, undeclared_in};

pub use role::{DEFAULT_ROLE_PATH, DEFAULT_ROLE_TEMPLATES, resolve_role_config};

/// Maximum Levenshtein distance, as a percentage of the missing name's
/// length, for a known key to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// A converged resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The initial configuration with every source's output merged in
    pub config: ConfigMap,
    /// Render passes performed, including the final one that saw no progress
    pub rounds: usize,
}

/// Resolves an ordered list of template sources against a configuration.
///
/// Holds no state between calls; every call renders from scratch.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigResolver;

impl ConfigResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `sources` on top of `initial` and return the merged dictionary.
    ///
    /// `initial` is never modified. Fails with
    /// [`CharmError::UnresolvedVariables`] when some referenced variables can
    /// never be defined, and propagates template errors unchanged.
    pub fn resolve(&self, sources: &[TemplateSource], initial: &ConfigMap) -> Result<ConfigMap> {
        self.resolve_with_report(sources, initial).map(|resolution| resolution.config)
    }

    /// Like [`resolve`](Self::resolve), also reporting the number of rounds.
    pub fn resolve_with_report(
        &self,
        sources: &[TemplateSource],
        initial: &ConfigMap,
    ) -> Result<Resolution> {
        let referenced: BTreeSet<String> =
            sources.iter().flat_map(|s| s.referenced_variables().iter().cloned()).collect();
        let max_rounds = referenced.len() + 1;

        tracing::debug!(
            "Resolving {} template source(s), {} referenced variable(s), at most {} round(s)",
            sources.len(),
            referenced.len(),
            max_rounds
        );

        let mut renderer = TemplateRenderer::new();
        let mut config = initial.clone();

        for round in 1..=max_rounds {
            let (next, undeclared) = render_round(&mut renderer, sources, &config)?;

            let (progress, still): (BTreeSet<String>, BTreeSet<String>) =
                undeclared.into_iter().partition(|name| next.contains_key(name));
            config = next;

            tracing::debug!(
                "Round {round}: defined {:?}, still missing {:?}, {} key(s) known",
                progress,
                still,
                config.len()
            );

            if !progress.is_empty() {
                continue;
            }

            if still.is_empty() {
                tracing::info!("Configuration resolved in {round} round(s)");
                return Ok(Resolution {
                    config,
                    rounds: round,
                });
            }

            return Err(unresolved(still, round, &config));
        }

        // Unreachable while every continuing round defines a referenced name,
        // but the bound is what guarantees termination.
        let still = undeclared_in(&referenced, &config);
        tracing::warn!("Resolution hit its bound of {max_rounds} round(s)");
        Err(unresolved(still, max_rounds, &config))
    }
}

/// One pass over every source against the round-start dictionary.
///
/// Every source is rendered strictly first. When that fails on an undefined
/// variable, the variable joins the source's undeclared set and the source
/// is rendered partially instead, whether or not the static analysis saw the
/// variable coming. Returns the merged dictionary and the union of the
/// undeclared sets.
fn render_round(
    renderer: &mut TemplateRenderer,
    sources: &[TemplateSource],
    config: &ConfigMap,
) -> Result<(ConfigMap, BTreeSet<String>)> {
    let context = TemplateRenderer::context_for(config, "configuration")?;
    let mut next = config.clone();
    let mut undeclared = BTreeSet::new();

    for source in sources {
        let mut missing = source.undeclared_variables(config);

        let rendered = match renderer.render(source, &context) {
            Ok(rendered) => rendered,
            Err(RenderFailure::UndefinedVariable {
                name,
                ..
            }) => {
                tracing::debug!(
                    "'{}' needs '{name}', which is not defined yet; rendering what it can",
                    source.name()
                );
                missing.insert(undefined_key(&name, config));
                renderer.render_partial(source, &context)
            }
            Err(RenderFailure::Fatal(error)) => return Err(error),
        };

        tracing::trace!("'{}' defined {} key(s)", source.name(), rendered.len());
        merge_into(&mut next, &rendered);
        undeclared.extend(missing);
    }

    Ok((next, undeclared))
}

/// Configuration key to wait for when Tera reports `name` as undefined.
///
/// Tera names the whole access path (`db.host`). When the root is missing,
/// the root is what has to be defined; otherwise the path itself is.
fn undefined_key(name: &str, config: &ConfigMap) -> String {
    let root = name.split(['.', '[']).next().unwrap_or(name);
    if config.contains_key(root) {
        name.to_string()
    } else {
        root.to_string()
    }
}

fn unresolved(still: BTreeSet<String>, rounds: usize, config: &ConfigMap) -> CharmError {
    let names: Vec<String> = still.into_iter().collect();
    let known: Vec<&str> = config.keys().map(String::as_str).collect();

    let mut suggestions = Vec::new();
    for name in &names {
        for candidate in find_similar_keys(name, &known) {
            if !suggestions.contains(&candidate) {
                suggestions.push(candidate);
            }
        }
    }

    tracing::debug!("Unresolved after {rounds} round(s): {:?}", names);
    CharmError::UnresolvedVariables {
        names,
        rounds,
        suggestions,
    }
}

/// Known keys closest to `target`, at most three.
fn find_similar_keys(target: &str, available: &[&str]) -> Vec<String> {
    let mut scored: Vec<_> = available.iter().map(|key| (*key, levenshtein(target, key))).collect();

    scored.sort_by_key(|(_, dist)| *dist);

    scored
        .into_iter()
        .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
        .take(3)
        .map(|(key, _)| key.to_string())
        .collect()
}
