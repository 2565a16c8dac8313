//! Free-variable analysis for Tera templates.
//!
//! Finds the names a template reads from its context: `{{ db_host }}`,
//! `{% if enable_ssl %}`, `{{ port | default(value=8080) }}`. Names that only
//! appear as attributes (`app.name` yields `app`), filter or test names,
//! function calls, keyword arguments, loop variables and `set` locals are not
//! context variables and are left out.
//!
//! The analysis walks the tree Tera builds when it parses the template, so it
//! sees exactly what the renderer will evaluate. A `set` only hides a name
//! from the context once it has certainly run: a `set` inside `{% if %}`
//! without an `else` that sets it too leaves the name free afterwards.

use std::collections::{BTreeSet, HashSet};
use tera::ast::{Expr, ExprVal, FunctionCall, Node};

use crate::core::ConfigMap;

/// Identifiers Tera resolves itself
const BUILTIN_IDENTS: &[&str] = &["__tera_context"];

/// Something that can answer "is this variable already defined?"
pub trait KnownKeys {
    fn is_known(&self, name: &str) -> bool;
}

impl KnownKeys for ConfigMap {
    fn is_known(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl KnownKeys for HashSet<String> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl KnownKeys for BTreeSet<String> {
    fn is_known(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// The referenced names that `known` does not define yet.
pub fn undeclared_in<K: KnownKeys + ?Sized>(
    referenced: &BTreeSet<String>,
    known: &K,
) -> BTreeSet<String> {
    referenced.iter().filter(|name| !known.is_known(name)).cloned().collect()
}

/// Every context variable read by a parsed template, sorted by name.
pub fn referenced_variables(ast: &[Node]) -> BTreeSet<String> {
    let mut collector = FreeVariables::default();
    collector.nodes(ast, &mut HashSet::new());
    collector.free
}

/// Walks nodes while tracking the names bound at each point.
#[derive(Default)]
struct FreeVariables {
    free: BTreeSet<String>,
}

impl FreeVariables {
    fn nodes(&mut self, nodes: &[Node], bound: &mut HashSet<String>) {
        for node in nodes {
            self.node(node, bound);
        }
    }

    fn node(&mut self, node: &Node, bound: &mut HashSet<String>) {
        match node {
            Node::VariableBlock(_, expr) => self.expr(expr, bound),
            Node::Set(_, set) => {
                self.expr(&set.value, bound);
                bound.insert(set.key.clone());
            }
            Node::If(branches, _) => {
                // Names every branch sets are bound afterwards, but only when
                // an `else` guarantees one of the branches runs
                let mut always_set: Option<HashSet<String>> = None;
                for (_, condition, body) in &branches.conditions {
                    self.expr(condition, bound);
                    let inner = self.scoped(body, bound.clone());
                    intersect(&mut always_set, inner);
                }
                if let Some((_, body)) = &branches.otherwise {
                    let inner = self.scoped(body, bound.clone());
                    intersect(&mut always_set, inner);
                    if let Some(set) = always_set {
                        *bound = set;
                    }
                }
            }
            Node::Forloop(_, forloop, _) => {
                self.expr(&forloop.container, bound);
                let mut inner = bound.clone();
                inner.extend(forloop.key.iter().cloned());
                inner.insert(forloop.value.clone());
                inner.insert("loop".to_string());
                self.scoped(&forloop.body, inner);
                if let Some(empty_body) = &forloop.empty_body {
                    self.scoped(empty_body, bound.clone());
                }
            }
            Node::MacroDefinition(_, definition, _) => {
                // Macro frames do not see the caller's locals
                let params = definition.args.keys().cloned().collect();
                self.scoped(&definition.body, params);
            }
            Node::FilterSection(_, section, _) => {
                self.call(&section.filter, bound);
                self.nodes(&section.body, bound);
            }
            Node::Block(_, block, _) => self.nodes(&block.body, bound),
            Node::Super
            | Node::Text(_)
            | Node::Extends(..)
            | Node::Include(..)
            | Node::ImportMacro(..)
            | Node::Raw(..)
            | Node::Break(_)
            | Node::Continue(_)
            | Node::Comment(..) => {}
        }
    }

    /// Walk `body` with its own copy of the bindings and hand them back.
    fn scoped(&mut self, body: &[Node], mut bound: HashSet<String>) -> HashSet<String> {
        self.nodes(body, &mut bound);
        bound
    }

    fn expr(&mut self, expr: &Expr, bound: &HashSet<String>) {
        self.value(&expr.val, bound);
        for filter in &expr.filters {
            self.call(filter, bound);
        }
    }

    fn call(&mut self, call: &FunctionCall, bound: &HashSet<String>) {
        for arg in call.args.values() {
            self.expr(arg, bound);
        }
    }

    fn value(&mut self, value: &ExprVal, bound: &HashSet<String>) {
        match value {
            ExprVal::Ident(path) => self.ident(path, bound),
            ExprVal::Math(math) => {
                self.expr(&math.lhs, bound);
                self.expr(&math.rhs, bound);
            }
            ExprVal::Logic(logic) => {
                self.expr(&logic.lhs, bound);
                self.expr(&logic.rhs, bound);
            }
            ExprVal::Test(test) => {
                self.ident(&test.ident, bound);
                for arg in &test.args {
                    self.expr(arg, bound);
                }
            }
            ExprVal::MacroCall(call) => {
                for arg in call.args.values() {
                    self.expr(arg, bound);
                }
            }
            ExprVal::FunctionCall(call) => self.call(call, bound),
            ExprVal::Array(items) => {
                for item in items {
                    self.expr(item, bound);
                }
            }
            ExprVal::StringConcat(concat) => {
                for value in &concat.values {
                    self.value(value, bound);
                }
            }
            ExprVal::In(membership) => {
                self.expr(&membership.lhs, bound);
                self.expr(&membership.rhs, bound);
            }
            ExprVal::String(_) | ExprVal::Int(_) | ExprVal::Float(_) | ExprVal::Bool(_) => {}
        }
    }

    /// Record the roots of an access path such as `db.hosts[idx].name`.
    fn ident(&mut self, path: &str, bound: &HashSet<String>) {
        for root in path_roots(path) {
            if !bound.contains(root) && !BUILTIN_IDENTS.contains(&root) {
                self.free.insert(root.to_string());
            }
        }
    }
}

fn intersect(acc: &mut Option<HashSet<String>>, next: HashSet<String>) {
    *acc = Some(match acc.take() {
        Some(current) => current.intersection(&next).cloned().collect(),
        None => next,
    });
}

/// Variable names an access path reads: its head, plus the head of every
/// `[...]` index that is itself a path rather than a literal.
fn path_roots(path: &str) -> Vec<&str> {
    let head_end = path.find(['.', '[']).unwrap_or(path.len());
    let mut roots = vec![&path[..head_end]];

    let mut depth = 0usize;
    let mut index_start = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in path.char_indices().skip_while(|(i, _)| *i < head_end) {
        match c {
            _ if quote == Some(c) => quote = None,
            _ if quote.is_some() => {}
            '"' | '\'' | '`' => quote = Some(c),
            '[' => {
                if depth == 0 {
                    index_start = i + 1;
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let index = path[index_start..i].trim();
                    let literal = index.starts_with(['"', '\'', '`'])
                        || index.starts_with(|c: char| c.is_ascii_digit() || c == '-');
                    if !index.is_empty() && !literal {
                        roots.extend(path_roots(index));
                    }
                }
            }
            _ => {}
        }
    }

    roots
}
