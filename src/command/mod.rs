//! Command dispatch
//!
//! Commands are `@name` or `@name||arg|key=value||` sites in source text.
//! Each name maps to a [`CommandHandler`] registered in a [`CommandRegistry`];
//! adding a command means registering a handler.

mod builtin;
mod figure;
mod table;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::expand::RenderContext;
use crate::expr::{EvaluatedPlot, ExpressionError};
use crate::parser::{split_arguments, Argument};

pub use builtin::{DateCommand, DumpCommand, RefCommand, TableLabelCommand};
pub use figure::FigureCommand;
pub use table::{TableBodyCommand, TableCaptionCommand, TableCommand, TableOptions};

/// Errors raised by command handlers
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("table not found: {name}")]
    TableNotFound { name: String },

    #[error("plot not found: {name}")]
    PlotNotFound { name: String },

    /// Neither a table nor a plot
    #[error("nothing named '{name}' to reference")]
    NotFound { name: String },

    #[error("'{command}' needs a {argument} argument")]
    MissingArgument {
        command: String,
        argument: &'static str,
    },

    #[error("invalid value '{value}' for '{argument}' of '{command}': {reason}")]
    InvalidArgument {
        command: String,
        argument: String,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

impl CommandError {
    pub fn invalid_argument(
        command: &str,
        argument: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            command: command.to_string(),
            argument: argument.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parsed inline arguments of a command site
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    raw: Option<String>,
    entries: Vec<Argument>,
}

impl CommandArgs {
    pub fn parse(raw: Option<&str>) -> Self {
        Self {
            raw: raw.map(str::to_string),
            entries: raw.map(split_arguments).unwrap_or_default(),
        }
    }

    /// Argument text exactly as written between the delimiters
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn entries(&self) -> &[Argument] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `index`-th positional argument
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.entries
            .iter()
            .filter(|a| a.key.is_none())
            .nth(index)
            .map(|a| a.value.as_str())
    }

    pub fn keyword(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.key.as_deref() == Some(key))
            .map(|a| a.value.as_str())
    }

    /// Object name: first positional argument or `name=`
    pub fn name(&self, command: &str) -> Result<&str, CommandError> {
        self.positional(0)
            .or_else(|| self.keyword("name"))
            .ok_or_else(|| CommandError::MissingArgument {
                command: command.to_string(),
                argument: "name",
            })
    }

    /// Boolean option: `key=true|false|1|0|yes|no`, or the bare word `key`
    pub fn flag(&self, command: &str, key: &str) -> Result<bool, CommandError> {
        match self.keyword(key) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(CommandError::invalid_argument(
                    command,
                    key,
                    value,
                    "expected true or false",
                )),
            },
            None => Ok(self
                .entries
                .iter()
                .skip(1)
                .any(|a| a.key.is_none() && a.value == key)),
        }
    }

    /// Typed keyword option
    pub fn parsed<T>(&self, command: &str, key: &str) -> Result<Option<T>, CommandError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.keyword(key)
            .map(|value| {
                value
                    .parse::<T>()
                    .map_err(|e| CommandError::invalid_argument(command, key, value, e.to_string()))
            })
            .transpose()
    }
}

/// A plot to hand to the figure backend once the render succeeds
#[derive(Debug, Clone, PartialEq)]
pub struct FigureRequest {
    pub plot: EvaluatedPlot,
    /// Path as referenced from the rendered text
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    Figure(FigureRequest),
}

/// Replacement text for a command site plus any side effects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub text: String,
    pub effects: Vec<SideEffect>,
}

impl CommandOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: SideEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// A named operation invoked with `@name`
pub trait CommandHandler: Send + Sync {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError>;

    /// One-line summary for `@labgen_dump`
    fn summary(&self) -> &'static str {
        ""
    }
}

/// Command name to handler table
#[derive(Default, Clone)]
pub struct CommandRegistry {
    handlers: BTreeMap<String, Arc<dyn CommandHandler>>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

impl CommandRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in command
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("date", DateCommand);
        registry.register("labgen_dump", DumpCommand);
        registry.register("ref", RefCommand);
        registry.register("table", TableCommand);
        registry.register("table_body", TableBodyCommand);
        registry.register("table_caption", TableCaptionCommand);
        registry.register("table_label", TableLabelCommand);
        registry.register("fig", FigureCommand);
        registry.alias("plo", "fig");
        registry.alias("plot", "fig");
        registry
    }

    /// Register a handler, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    /// Make `alias` dispatch to the handler registered as `target`
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        match self.handlers.get(target).cloned() {
            Some(handler) => {
                self.handlers.insert(alias.into(), handler);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn CommandHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Command names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(|k| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn CommandHandler)> {
        self.handlers.iter().map(|(k, h)| (k.as_str(), h.as_ref()))
    }
}
