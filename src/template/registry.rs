//! Template registry: parses template files and stores definitions by name

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{Location, ScanError};
use crate::parser::{is_identifier, scan_from_line, split_lines, Spanned, Token};

const DEFINITION: &str = "##";
const PARAMETER: &str = "++";
const OPTION: &str = "@@";

/// Errors that can occur while parsing or registering templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found in registry
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// Duplicate template definition
    #[error("{location}: duplicate template definition '{name}' (first defined at {previous})")]
    Duplicate {
        name: String,
        location: Location,
        previous: Location,
    },

    /// Definition opened but never closed with `##`
    #[error("{location}: template '{name}' is missing its closing '##' line")]
    Unterminated { name: String, location: Location },

    /// Malformed `##name` or `++param` line
    #[error("{location}: {message}")]
    InvalidHeader { location: Location, message: String },

    /// Malformed sigil inside a template body
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Supplied arguments do not match the declared parameters
    #[error("template '{template}' expects {expected} argument(s), got {found}: {reason}")]
    ArityMismatch {
        template: String,
        expected: usize,
        found: usize,
        reason: String,
    },

    /// Template invoked while it is already being expanded
    #[error("recursive template call: {}", chain.join(" -> "))]
    Recursive { chain: Vec<String> },
}

impl TemplateError {
    fn invalid_header(location: Location, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            location,
            message: message.into(),
        }
    }
}

/// A stored template definition
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDefinition {
    /// Template name
    pub name: String,
    /// Free text after `\` on the header line
    pub human_name: Option<String>,
    /// Parameter names in declaration order
    pub parameters: Vec<String>,
    /// Surround the expanded body with newlines (`@@wrap-newlines`)
    pub wrap_newlines: bool,
    /// Scanned body
    pub body: Vec<Spanned<Token>>,
    /// File and line of the `##name` header
    pub origin: Location,
}

impl TemplateDefinition {
    /// Check if this template has a parameter
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p == name)
    }

    /// Position of a parameter in declaration order
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p == name)
    }

    /// File label of the defining template file
    pub fn file(&self) -> &str {
        &self.origin.file
    }
}

/// Registry for storing template definitions
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, TemplateDefinition>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a template file and register all of its definitions.
    ///
    /// Registration is all-or-nothing per file: on any error nothing from
    /// `text` is added. Returns the number of templates registered.
    pub fn load_str(&mut self, text: &str, origin: &str) -> Result<usize, TemplateError> {
        let definitions = parse_template_file(text, origin)?;

        let mut seen: HashMap<&str, &Location> = HashMap::new();
        for def in &definitions {
            let previous = self
                .templates
                .get(&def.name)
                .map(|existing| &existing.origin)
                .or_else(|| seen.get(def.name.as_str()).copied());
            if let Some(previous) = previous {
                return Err(TemplateError::Duplicate {
                    name: def.name.clone(),
                    location: def.origin.clone(),
                    previous: previous.clone(),
                });
            }
            seen.insert(&def.name, &def.origin);
        }

        let count = definitions.len();
        for def in definitions {
            debug!(template = %def.name, parameters = ?def.parameters, "defined template");
            self.templates.insert(def.name.clone(), def);
        }
        Ok(count)
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&TemplateDefinition> {
        self.templates.get(name)
    }

    /// Get a template by name or fail with `NotFound`
    pub fn lookup(&self, name: &str) -> Result<&TemplateDefinition, TemplateError> {
        self.get(name).ok_or_else(|| TemplateError::NotFound {
            name: name.to_string(),
        })
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// All template names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Parse every `##name ... ##` block of a template file.
///
/// Text outside definition blocks is discarded.
pub fn parse_template_file(
    text: &str,
    origin: &str,
) -> Result<Vec<TemplateDefinition>, TemplateError> {
    let lines = split_lines(text);
    let mut definitions = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = &lines[idx];
        let Some(header) = line.content.strip_prefix(DEFINITION) else {
            idx += 1;
            continue;
        };
        if header.trim().is_empty() {
            // stray terminator outside a block
            idx += 1;
            continue;
        }
        let Some((name, human_name)) = parse_header(header) else {
            debug!(line = line.number, "skipping '##' line outside a definition");
            idx += 1;
            continue;
        };

        let location = Location::new(origin, line.number);

        let mut def = TemplateDefinition {
            name,
            human_name,
            parameters: Vec::new(),
            wrap_newlines: false,
            body: Vec::new(),
            origin: location,
        };

        idx += 1;
        while let Some(line) = lines.get(idx) {
            if let Some(param) = line.content.strip_prefix(PARAMETER) {
                let param = param.trim();
                let here = Location::new(origin, line.number);
                if !is_identifier(param) {
                    return Err(TemplateError::invalid_header(
                        here,
                        format!("invalid parameter name '{}' in template '{}'", param, def.name),
                    ));
                }
                if def.has_parameter(param) {
                    return Err(TemplateError::invalid_header(
                        here,
                        format!("parameter '{}' declared twice in template '{}'", param, def.name),
                    ));
                }
                def.parameters.push(param.to_string());
            } else if let Some(option) = line.content.strip_prefix(OPTION) {
                match option.trim() {
                    "wrap-newlines" => def.wrap_newlines = true,
                    other => warn!(
                        template = %def.name,
                        line = line.number,
                        "ignoring unknown template option '{}'",
                        other
                    ),
                }
            } else {
                break;
            }
            idx += 1;
        }

        let body_start = idx;
        let close = lines[body_start..]
            .iter()
            .position(|l| l.content.trim_end() == DEFINITION)
            .map(|p| body_start + p)
            .ok_or_else(|| TemplateError::Unterminated {
                name: def.name.clone(),
                location: def.origin.clone(),
            })?;

        if close > body_start {
            let start = lines[body_start].offset;
            let end = lines[close].offset;
            let body = strip_final_newline(&text[start..end]);
            def.body = scan_from_line(body, origin, lines[body_start].number)?;
        }

        definitions.push(def);
        idx = close + 1;
    }

    Ok(definitions)
}

/// Split a `name [\ human name]` header.
///
/// `None` when the line is not a header, e.g. `## notes` or `########`.
fn parse_header(header: &str) -> Option<(String, Option<String>)> {
    let name_len = header
        .char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map_or(header.len(), |(i, _)| i);
    let (name, rest) = header.split_at(name_len);
    if !is_identifier(name) {
        return None;
    }

    let rest = rest.trim();
    let human_name = if rest.is_empty() {
        None
    } else {
        let human = rest.strip_prefix('\\')?.trim();
        Some(human.to_string()).filter(|h| !h.is_empty())
    };
    Some((name.to_string(), human_name))
}

fn strip_final_newline(s: &str) -> &str {
    s.strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(s)
}
