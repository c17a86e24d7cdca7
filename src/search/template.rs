//! A tiny mustache-style template renderer for prompts.
//!
//! Supported tags:
//! - `{{name}}` substitutes a variable (lists are joined with ", ")
//! - `{{#if name}}…{{else}}…{{/if}}` renders a branch on non-empty values
//! - `{{#each name}}…{{this}}…{{/each}}` repeats a block per list item
//!
//! Substituted values are never re-scanned, so user text containing braces
//! cannot inject tags.

use std::collections::HashMap;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    List(Vec<String>),
}

impl Value {
    fn is_truthy(&self) -> bool {
        match self {
            Value::Text(s) => !s.trim().is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Vars(HashMap<&'static str, Value>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.insert(name, Value::Text(value.into()));
        self
    }

    pub fn list(mut self, name: &'static str, items: Vec<String>) -> Self {
        self.0.insert(name, Value::List(items));
        self
    }

    /// Set `name` only when `value` is present; absent variables are falsy.
    pub fn opt_text(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

#[derive(Debug)]
enum Node<'a> {
    Text(&'a str),
    Var(&'a str),
    If {
        name: &'a str,
        then: Vec<Node<'a>>,
        otherwise: Vec<Node<'a>>,
    },
    Each {
        name: &'a str,
        body: Vec<Node<'a>>,
    },
}

enum Stop {
    End,
    Else,
    CloseIf,
    CloseEach,
}

struct Parser<'a> {
    rest: &'a str,
}

impl<'a> Parser<'a> {
    fn parse_nodes(&mut self) -> Result<(Vec<Node<'a>>, Stop)> {
        let mut nodes = Vec::new();
        loop {
            let Some(start) = self.rest.find("{{") else {
                if !self.rest.is_empty() {
                    nodes.push(Node::Text(self.rest));
                }
                self.rest = "";
                return Ok((nodes, Stop::End));
            };
            if start > 0 {
                nodes.push(Node::Text(&self.rest[..start]));
            }
            let after = &self.rest[start + 2..];
            let end = after.find("}}").context("Unclosed '{{' in template")?;
            let tag = after[..end].trim();
            self.rest = &after[end + 2..];

            match tag {
                "else" => return Ok((nodes, Stop::Else)),
                "/if" => return Ok((nodes, Stop::CloseIf)),
                "/each" => return Ok((nodes, Stop::CloseEach)),
                _ => {}
            }

            if let Some(name) = tag.strip_prefix("#if ") {
                let name = name.trim();
                let (then, stop) = self.parse_nodes()?;
                let otherwise = match stop {
                    Stop::CloseIf => Vec::new(),
                    Stop::Else => {
                        let (otherwise, stop) = self.parse_nodes()?;
                        if !matches!(stop, Stop::CloseIf) {
                            anyhow::bail!("Missing {{{{/if}}}} for '{name}'");
                        }
                        otherwise
                    }
                    _ => anyhow::bail!("Missing {{{{/if}}}} for '{name}'"),
                };
                nodes.push(Node::If {
                    name,
                    then,
                    otherwise,
                });
            } else if let Some(name) = tag.strip_prefix("#each ") {
                let name = name.trim();
                let (body, stop) = self.parse_nodes()?;
                if !matches!(stop, Stop::CloseEach) {
                    anyhow::bail!("Missing {{{{/each}}}} for '{name}'");
                }
                nodes.push(Node::Each { name, body });
            } else {
                nodes.push(Node::Var(tag));
            }
        }
    }
}

/// Render `template` with `vars`. Unknown variables and unbalanced blocks
/// are errors.
pub fn render(template: &str, vars: &Vars) -> Result<String> {
    let mut parser = Parser { rest: template };
    let (nodes, stop) = parser.parse_nodes()?;
    if !matches!(stop, Stop::End) {
        anyhow::bail!("Unexpected closing tag in template");
    }

    let mut out = String::with_capacity(template.len());
    render_nodes(&nodes, vars, None, &mut out)?;
    Ok(out)
}

fn render_nodes(nodes: &[Node<'_>], vars: &Vars, item: Option<&str>, out: &mut String) -> Result<()> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var("this") => {
                out.push_str(item.context("'this' used outside an each block")?);
            }
            Node::Var(name) => match vars.get(name) {
                Some(Value::Text(s)) => out.push_str(s),
                Some(Value::List(items)) => out.push_str(&items.join(", ")),
                None => anyhow::bail!("Template variable '{name}' is not set"),
            },
            Node::If {
                name,
                then,
                otherwise,
            } => {
                let truthy = vars.get(name).is_some_and(Value::is_truthy);
                let branch = if truthy { then } else { otherwise };
                render_nodes(branch, vars, item, out)?;
            }
            Node::Each { name, body } => {
                if let Some(Value::List(items)) = vars.get(name) {
                    for entry in items {
                        render_nodes(body, vars, Some(entry), out)?;
                    }
                }
            }
        }
    }
    Ok(())
}
