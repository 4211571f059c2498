//! Expansion engine: walks scanned tokens, expanding templates and commands
//!
//! Expansion is depth-first and left to right. A template body is expanded
//! completely before the text after its invocation site, so output order is
//! source order.

mod context;

pub use context::RenderContext;

use thiserror::Error;
use tracing::{debug, warn};

use crate::command::{CommandArgs, CommandError, CommandRegistry, FigureRequest, SideEffect};
use crate::data::DataRegistry;
use crate::error::{Location, ScanError};
use crate::parser::{scan, substitute_parameters, Argument, Spanned, Token};
use crate::template::{TemplateError, TemplateFrame, TemplateRegistry};
use crate::RenderConfig;

/// Errors that abort the render of one source file
#[derive(Debug, Error)]
pub enum RenderError {
    /// Malformed sigil in the source text
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Unknown template, wrong arguments or recursion
    #[error("{location}: {source}")]
    Template {
        location: Location,
        source: TemplateError,
    },

    #[error("{location}: unknown command '@{name}'")]
    UnknownCommand { name: String, location: Location },

    #[error("{location}: @{name}: {source}")]
    Command {
        name: String,
        location: Location,
        source: CommandError,
    },
}

impl RenderError {
    pub fn template(location: Location, source: TemplateError) -> Self {
        Self::Template { location, source }
    }

    pub fn location(&self) -> &Location {
        match self {
            RenderError::Scan(e) => e.location(),
            RenderError::Template { location, .. }
            | RenderError::UnknownCommand { location, .. }
            | RenderError::Command { location, .. } => location,
        }
    }
}

/// Text and queued figures of a successful render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
    pub text: String,
    pub figures: Vec<FigureRequest>,
}

/// Renders source files against shared, read-only registries
#[derive(Debug)]
pub struct Renderer<'r> {
    templates: &'r TemplateRegistry,
    data: &'r DataRegistry,
    commands: CommandRegistry,
    config: RenderConfig,
}

impl<'r> Renderer<'r> {
    /// Renderer with the built-in commands and default configuration
    pub fn new(templates: &'r TemplateRegistry, data: &'r DataRegistry) -> Self {
        Self {
            templates,
            data,
            commands: CommandRegistry::with_builtins(),
            config: RenderConfig::default(),
        }
    }

    pub fn with_commands(mut self, commands: CommandRegistry) -> Self {
        self.commands = commands;
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Render one source file. Nothing is returned on error.
    pub fn render(&self, text: &str, source: &str) -> Result<RenderOutput, RenderError> {
        let tokens = scan(text, source)?;
        debug!(source, tokens = tokens.len(), "scanned source");

        let mut ctx = RenderContext::new(
            source,
            self.templates,
            self.data,
            &self.commands,
            &self.config,
        );
        self.expand_tokens(&mut ctx, &tokens, None, source)?;

        Ok(RenderOutput {
            text: ctx.output,
            figures: ctx.figures,
        })
    }

    fn expand_tokens(
        &self,
        ctx: &mut RenderContext<'_>,
        tokens: &[Spanned<Token>],
        frame: Option<&TemplateFrame<'_>>,
        file: &str,
    ) -> Result<(), RenderError> {
        for token in tokens {
            match &token.node {
                Token::Literal(text) => ctx.output.push_str(text),
                Token::Parameter(name) => match frame.and_then(|f| f.get(name)) {
                    Some(value) => ctx.output.push_str(value),
                    None => {
                        if let Some(frame) = frame {
                            warn!(
                                template = %frame.definition.name,
                                parameter = %name,
                                location = %token.location(file),
                                "reference to undeclared parameter left as text"
                            );
                        }
                        ctx.output.push_str("%%");
                        ctx.output.push_str(name);
                    }
                },
                Token::Template { name, args } => {
                    let args: Vec<Argument> = args
                        .iter()
                        .map(|arg| Argument {
                            key: arg.key.clone(),
                            value: substitute(&arg.value, frame),
                        })
                        .collect();
                    self.expand_template(ctx, name, &args, token.location(file))?;
                }
                Token::Command { name, args } => {
                    let raw = args.as_deref().map(|raw| substitute(raw, frame));
                    self.dispatch(ctx, name, raw.as_deref(), token.location(file))?;
                }
            }
        }
        Ok(())
    }

    fn expand_template(
        &self,
        ctx: &mut RenderContext<'_>,
        name: &str,
        args: &[Argument],
        location: Location,
    ) -> Result<(), RenderError> {
        let definition = self
            .templates
            .lookup(name)
            .map_err(|e| RenderError::template(location.clone(), e))?;

        // Checked before binding so a cycle is reported even with bad arguments
        ctx.chain
            .enter(name)
            .map_err(|e| RenderError::template(location.clone(), e))?;
        debug!(template = name, depth = ctx.chain.depth(), "expanding template");

        let result = TemplateFrame::bind(definition, args)
            .map_err(|e| RenderError::template(location, e))
            .and_then(|frame| {
                if definition.wrap_newlines {
                    ctx.output.push('\n');
                }
                self.expand_tokens(ctx, &definition.body, Some(&frame), definition.file())?;
                if definition.wrap_newlines {
                    ctx.output.push('\n');
                }
                Ok(())
            });

        ctx.chain.leave();
        result
    }

    fn dispatch(
        &self,
        ctx: &mut RenderContext<'_>,
        name: &str,
        raw: Option<&str>,
        location: Location,
    ) -> Result<(), RenderError> {
        let handler = self
            .commands
            .get(name)
            .ok_or_else(|| RenderError::UnknownCommand {
                name: name.to_string(),
                location: location.clone(),
            })?;

        debug!(command = name, "dispatching command");
        let args = CommandArgs::parse(raw);
        let output = handler
            .handle(&args, ctx)
            .map_err(|source| RenderError::Command {
                name: name.to_string(),
                location,
                source,
            })?;

        ctx.output.push_str(&output.text);
        for effect in output.effects {
            match effect {
                SideEffect::Figure(request) => ctx.figures.push(request),
            }
        }
        Ok(())
    }
}

/// Substitute bound parameters into nested argument text
fn substitute(text: &str, frame: Option<&TemplateFrame<'_>>) -> String {
    match frame {
        Some(frame) => substitute_parameters(text, |name| frame.get(name).map(str::to_string)),
        None => text.to_string(),
    }
}
