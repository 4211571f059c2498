//! General purpose commands: `@date`, `@labgen_dump`, `@ref`, `@table_label`

use std::fmt::Write;

use crate::data::DataItem;
use crate::expand::RenderContext;

use super::{CommandArgs, CommandError, CommandHandler, CommandOutput};

/// `@date`: render start time in the configured format
pub struct DateCommand;

impl DateCommand {
    pub fn format(ctx: &RenderContext<'_>) -> Result<String, CommandError> {
        let format = &ctx.config().date_format;
        let mut out = String::new();
        write!(out, "{}", ctx.now().format(format)).map_err(|_| {
            CommandError::invalid_argument("date", "date_format", format, "invalid format string")
        })?;
        Ok(out)
    }
}

impl CommandHandler for DateCommand {
    fn handle(&self, _args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput::text(Self::format(ctx)?))
    }

    fn summary(&self) -> &'static str {
        "current date and time"
    }
}

/// `@labgen_dump`: list everything the renderer knows about
pub struct DumpCommand;

impl CommandHandler for DumpCommand {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        let mut out = String::from("{\n");

        out.push_str("Defined templates:\n");
        for name in ctx.templates().names() {
            if let Some(def) = ctx.templates().get(name) {
                out.push_str(&format!("\t{}({})", name, def.parameters.join(", ")));
                if let Some(human) = &def.human_name {
                    out.push_str(&format!(" \\ {}", human));
                }
                out.push_str(&format!(" [{}]\n", def.origin));
            }
        }

        out.push_str("Defined commands:\n");
        for (name, handler) in ctx.commands().iter() {
            match handler.summary() {
                "" => out.push_str(&format!("\t{}\n", name)),
                summary => out.push_str(&format!("\t{}: {}\n", name, summary)),
            }
        }

        out.push_str("Tables:\n");
        for table in ctx.data().tables() {
            out.push_str(&format!(
                "\t{} ({} rows x {} cols) [{}]\n",
                table.name,
                table.row_count(),
                table.column_count(),
                table.origin
            ));
        }

        out.push_str("Plots:\n");
        for plot in ctx.data().plots() {
            let curves: Vec<&str> = plot.curves.iter().map(|c| c.name.as_str()).collect();
            out.push_str(&format!(
                "\t{} (curves: {}) [{}]\n",
                plot.name,
                curves.join(", "),
                plot.origin
            ));
        }

        if let Some(raw) = args.raw() {
            out.push_str(&format!("Arguments: {}\n", raw));
        }
        out.push_str(&format!("Result of 'date' command: {}\n", DateCommand::format(ctx)?));
        out.push('}');
        Ok(CommandOutput::text(out))
    }

    fn summary(&self) -> &'static str {
        "dump templates, commands and data"
    }
}

/// `@ref||name||`: LaTeX reference to a table or plot
pub struct RefCommand;

impl CommandHandler for RefCommand {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        let name = args.name("ref")?;
        let label = match ctx.data().lookup(name) {
            Some(DataItem::Table(table)) => table.label(),
            Some(DataItem::Plot(plot)) => plot.label(),
            None => {
                return Err(CommandError::NotFound {
                    name: name.to_string(),
                })
            }
        };
        Ok(CommandOutput::text(format!("\\ref{{{}}}", label)))
    }

    fn summary(&self) -> &'static str {
        "cross reference to a table or figure"
    }
}

/// `@table_label||name||`
pub struct TableLabelCommand;

impl CommandHandler for TableLabelCommand {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        let name = args.name("table_label")?;
        let table = ctx
            .data()
            .table(name)
            .ok_or_else(|| CommandError::TableNotFound {
                name: name.to_string(),
            })?;
        Ok(CommandOutput::text(table.label()))
    }

    fn summary(&self) -> &'static str {
        "LaTeX label of a table"
    }
}
