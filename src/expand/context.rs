//! Per-render state

use chrono::NaiveDateTime;

use crate::command::{CommandRegistry, FigureRequest};
use crate::data::DataRegistry;
use crate::template::{CallChain, TemplateRegistry};
use crate::RenderConfig;

/// State threaded through one render of one source file.
///
/// Never shared between renders; the registries it points to are.
#[derive(Debug)]
pub struct RenderContext<'r> {
    source: String,
    templates: &'r TemplateRegistry,
    data: &'r DataRegistry,
    commands: &'r CommandRegistry,
    config: &'r RenderConfig,
    now: NaiveDateTime,
    pub(crate) chain: CallChain,
    pub(crate) output: String,
    pub(crate) figures: Vec<FigureRequest>,
}

impl<'r> RenderContext<'r> {
    pub fn new(
        source: impl Into<String>,
        templates: &'r TemplateRegistry,
        data: &'r DataRegistry,
        commands: &'r CommandRegistry,
        config: &'r RenderConfig,
    ) -> Self {
        Self {
            source: source.into(),
            templates,
            data,
            commands,
            config,
            now: config
                .timestamp
                .unwrap_or_else(|| chrono::Local::now().naive_local()),
            chain: CallChain::new(),
            output: String::new(),
            figures: Vec::new(),
        }
    }

    /// Label of the source file being rendered
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn templates(&self) -> &'r TemplateRegistry {
        self.templates
    }

    pub fn data(&self) -> &'r DataRegistry {
        self.data
    }

    pub fn commands(&self) -> &'r CommandRegistry {
        self.commands
    }

    pub fn config(&self) -> &'r RenderConfig {
        self.config
    }

    /// Render start time, fixed for the whole render
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Templates currently being expanded, outermost first
    pub fn call_chain(&self) -> &[String] {
        self.chain.names()
    }

    /// Figures queued so far
    pub fn figures(&self) -> &[FigureRequest] {
        &self.figures
    }
}
