//! URI templates for link targets
//!
//! Supports the subset of RFC 6570 that route resolution needs:
//!
//! - `{id}` - required path variable
//! - `{/id}` - optional path segment
//! - `{?page,size}` - request parameters
//! - `{&page}` - request parameters continuing an existing query
//! - `{#section}` - fragment
//! - `{?year*}` - composite (exploded) request parameter

use crate::core::error::{HateoasError, Result};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Characters escaped inside a path segment
pub(crate) const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped inside a query parameter value
pub(crate) const QUERY: &AsciiSet = &SEGMENT.add(b'&').add(b'=').add(b'+');

fn expression_regex() -> &'static Regex {
    static EXPRESSION: OnceLock<Regex> = OnceLock::new();
    EXPRESSION.get_or_init(|| Regex::new(r"\{([?&/#]?)([^{}]*)\}").unwrap())
}

/// How a template variable is rendered when expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// `{name}`, must be supplied
    PathVariable,
    /// `{?name}`
    RequestParam,
    /// `{&name}`
    RequestParamContinued,
    /// `{/name}`
    Segment,
    /// `{#name}`
    Fragment,
    /// `{?name*}`, one `name=value` pair per value
    Composite,
}

impl VariableKind {
    fn is_request_param(self) -> bool {
        matches!(
            self,
            VariableKind::RequestParam
                | VariableKind::RequestParamContinued
                | VariableKind::Composite
        )
    }

    fn is_optional(self) -> bool {
        self != VariableKind::PathVariable
    }
}

/// A named variable in a [`UriTemplate`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateVariable {
    pub name: String,
    pub kind: VariableKind,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Simple,
    Query,
    QueryContinued,
    Segment,
    Fragment,
}

impl Operator {
    fn parse(prefix: &str) -> Self {
        match prefix {
            "?" => Operator::Query,
            "&" => Operator::QueryContinued,
            "/" => Operator::Segment,
            "#" => Operator::Fragment,
            _ => Operator::Simple,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Operator::Simple => "",
            Operator::Query => "?",
            Operator::QueryContinued => "&",
            Operator::Segment => "/",
            Operator::Fragment => "#",
        }
    }

    fn kind(self) -> VariableKind {
        match self {
            Operator::Simple => VariableKind::PathVariable,
            Operator::Query => VariableKind::RequestParam,
            Operator::QueryContinued => VariableKind::RequestParamContinued,
            Operator::Segment => VariableKind::Segment,
            Operator::Fragment => VariableKind::Fragment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Expression {
        operator: Operator,
        variables: Vec<TemplateVariable>,
    },
}

/// A parsed URI template
///
/// # Examples
///
/// ```
/// use hateoas::core::template::UriTemplate;
///
/// let template = UriTemplate::new("/customers/{id}{?expand}").unwrap();
/// assert_eq!(template.variable_names(), vec!["id", "expand"]);
/// assert_eq!(template.expand_ordered(&["15"]).unwrap(), "/customers/15");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    parts: Vec<Part>,
}

impl UriTemplate {
    /// Parse a template string
    pub fn new(template: &str) -> Result<Self> {
        if template.is_empty() {
            return Err(HateoasError::invalid_template(template, "empty template"));
        }

        let mut parts = Vec::new();
        let mut last = 0;

        for captures in expression_regex().captures_iter(template) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            push_literal(&mut parts, template, &template[last..whole.start()])?;

            let operator = Operator::parse(&captures[1]);
            let variables = captures[2]
                .split(',')
                .map(str::trim)
                .map(|name| match name.strip_suffix('*') {
                    Some(name) => TemplateVariable::new(name, VariableKind::Composite),
                    None => TemplateVariable::new(name, operator.kind()),
                })
                .collect::<Vec<_>>();

            if variables.iter().any(|v| v.name.is_empty()) {
                return Err(HateoasError::invalid_template(
                    template,
                    "empty variable name",
                ));
            }

            parts.push(Part::Expression {
                operator,
                variables,
            });
            last = whole.end();
        }

        push_literal(&mut parts, template, &template[last..])?;
        Ok(Self { parts })
    }

    /// Whether the given string is a template with at least one variable
    pub fn is_template(candidate: &str) -> bool {
        UriTemplate::new(candidate)
            .map(|template| template.variables().next().is_some())
            .unwrap_or(false)
    }

    /// All variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &TemplateVariable> {
        self.parts.iter().flat_map(|part| match part {
            Part::Expression { variables, .. } => variables.as_slice(),
            Part::Literal(_) => &[][..],
        })
    }

    /// Names of all variables in declaration order
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables().map(|v| v.name.as_str()).collect()
    }

    /// Add a single variable, see [`UriTemplate::with`]
    pub fn with_variable(self, name: impl Into<String>, kind: VariableKind) -> Self {
        self.with([TemplateVariable::new(name, kind)])
    }

    /// Add variables to the template
    ///
    /// Request parameters already present literally in the query and
    /// fragments on a URI that already has one are skipped. New request
    /// parameters join an existing query expression when there is one.
    pub fn with(mut self, variables: impl IntoIterator<Item = TemplateVariable>) -> Self {
        for variable in variables {
            if self.variables().any(|v| v.name == variable.name) {
                continue;
            }

            if variable.kind.is_request_param() {
                if self.literal_query_contains(&variable.name) {
                    continue;
                }
                if let Some(existing) = self.query_expression_mut() {
                    existing.push(variable);
                    continue;
                }

                let operator = if self.literal_text().contains('?') {
                    Operator::QueryContinued
                } else {
                    Operator::Query
                };
                self.insert_before_fragment(Part::Expression {
                    operator,
                    variables: vec![variable],
                });
                continue;
            }

            match variable.kind {
                VariableKind::Fragment => {
                    if self.has_fragment() {
                        continue;
                    }
                    self.parts.push(Part::Expression {
                        operator: Operator::Fragment,
                        variables: vec![variable],
                    });
                }
                VariableKind::Segment => self.insert_before_fragment(Part::Expression {
                    operator: Operator::Segment,
                    variables: vec![variable],
                }),
                _ => self.insert_before_fragment(Part::Expression {
                    operator: Operator::Simple,
                    variables: vec![variable],
                }),
            }
        }
        self
    }

    /// Expand the template with named values
    ///
    /// Path variables are required; every other kind is dropped when no
    /// value is supplied.
    pub fn expand(&self, values: &HashMap<String, Vec<String>>) -> Result<String> {
        let mut out = String::new();

        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Expression {
                    operator,
                    variables,
                } => self.expand_expression(&mut out, *operator, variables, values)?,
            }
        }

        Ok(out)
    }

    /// Expand the template binding values to variables in declaration order
    ///
    /// A composite variable consumes all remaining values.
    pub fn expand_ordered(&self, values: &[&str]) -> Result<String> {
        let mut named = HashMap::new();
        let mut remaining = values.iter();

        for variable in self.variables() {
            if variable.kind == VariableKind::Composite {
                let rest = remaining.by_ref().map(|v| v.to_string()).collect();
                named.insert(variable.name.clone(), rest);
            } else if let Some(value) = remaining.next() {
                named.insert(variable.name.clone(), vec![value.to_string()]);
            }
        }

        self.expand(&named)
    }

    fn expand_expression(
        &self,
        out: &mut String,
        operator: Operator,
        variables: &[TemplateVariable],
        values: &HashMap<String, Vec<String>>,
    ) -> Result<()> {
        let mut emitted = false;

        for variable in variables {
            let Some(supplied) = values.get(&variable.name).filter(|v| !v.is_empty()) else {
                if !variable.kind.is_optional() {
                    return Err(HateoasError::missing_argument(
                        &variable.name,
                        self.to_string(),
                    ));
                }
                continue;
            };

            match operator {
                Operator::Query | Operator::QueryContinued => {
                    let pairs: Vec<&String> = if variable.kind == VariableKind::Composite {
                        supplied.iter().collect()
                    } else {
                        supplied.iter().take(1).collect()
                    };
                    for value in pairs {
                        out.push(if out.contains('?') { '&' } else { '?' });
                        out.push_str(&variable.name);
                        out.push('=');
                        out.extend(utf8_percent_encode(value, QUERY));
                    }
                }
                Operator::Segment => {
                    for value in supplied {
                        out.push('/');
                        out.extend(utf8_percent_encode(value, SEGMENT));
                    }
                }
                Operator::Fragment | Operator::Simple => {
                    out.push_str(match (operator, emitted) {
                        (Operator::Fragment, false) => "#",
                        (_, true) => ",",
                        _ => "",
                    });
                    let joined = supplied
                        .iter()
                        .map(|value| utf8_percent_encode(value, SEGMENT).to_string())
                        .collect::<Vec<_>>()
                        .join(",");
                    out.push_str(&joined);
                }
            }
            emitted = true;
        }

        Ok(())
    }

    fn literal_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Literal(text) => Some(text.as_str()),
                Part::Expression { .. } => None,
            })
            .collect()
    }

    fn literal_query_contains(&self, name: &str) -> bool {
        let text = self.literal_text();
        let Some((_, query)) = text.split_once('?') else {
            return false;
        };
        let query = query.split('#').next().unwrap_or_default();

        query
            .split('&')
            .any(|pair| pair.split('=').next() == Some(name))
    }

    fn has_fragment(&self) -> bool {
        self.literal_text().contains('#')
            || self.parts.iter().any(|part| {
                matches!(
                    part,
                    Part::Expression {
                        operator: Operator::Fragment,
                        ..
                    }
                )
            })
    }

    fn query_expression_mut(&mut self) -> Option<&mut Vec<TemplateVariable>> {
        self.parts.iter_mut().rev().find_map(|part| match part {
            Part::Expression {
                operator: Operator::Query | Operator::QueryContinued,
                variables,
            } => Some(variables),
            _ => None,
        })
    }

    fn insert_before_fragment(&mut self, part: Part) {
        let position = self.parts.iter().position(|p| {
            matches!(
                p,
                Part::Expression {
                    operator: Operator::Fragment,
                    ..
                }
            )
        });

        match position {
            Some(index) => self.parts.insert(index, part),
            None => self.parts.push(part),
        }
    }
}

fn push_literal(parts: &mut Vec<Part>, template: &str, literal: &str) -> Result<()> {
    if literal.contains('{') || literal.contains('}') {
        return Err(HateoasError::invalid_template(
            template,
            "unbalanced braces",
        ));
    }
    if !literal.is_empty() {
        parts.push(Part::Literal(literal.to_string()));
    }
    Ok(())
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Literal(text) => write!(f, "{}", text)?,
                Part::Expression {
                    operator,
                    variables,
                } => {
                    let names = variables
                        .iter()
                        .map(|v| match v.kind {
                            VariableKind::Composite => format!("{}*", v.name),
                            _ => v.name.clone(),
                        })
                        .collect::<Vec<_>>()
                        .join(",");
                    write!(f, "{{{}{}}}", operator.prefix(), names)?;
                }
            }
        }
        Ok(())
    }
}
