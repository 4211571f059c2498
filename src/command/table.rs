//! LaTeX table commands: `@table`, `@table_body`, `@table_caption`

use crate::data::{Cell, Table};
use crate::expand::RenderContext;

use super::{CommandArgs, CommandError, CommandHandler, CommandOutput};

const DEFAULT_MODIFIERS: &str = "h!";

fn lookup_table<'c>(ctx: &'c RenderContext<'_>, name: &str) -> Result<&'c Table, CommandError> {
    ctx.data()
        .table(name)
        .ok_or_else(|| CommandError::TableNotFound {
            name: name.to_string(),
        })
}

/// Formatting options shared by `@table` and `@table_body`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Maximum number of decimals
    pub precision: usize,
    /// Draw a rule between every row
    pub split_each: bool,
    /// Truncate numbers to integers
    pub cast_to_int: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            precision: 3,
            split_each: false,
            cast_to_int: false,
        }
    }
}

impl TableOptions {
    fn from_args(command: &str, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<Self, CommandError> {
        Ok(Self {
            precision: args
                .parsed(command, "precision")?
                .unwrap_or(ctx.config().table_precision),
            split_each: args.flag(command, "split_each")?,
            cast_to_int: args.flag(command, "cast_to_int")?,
        })
    }

    pub fn format_cell(&self, cell: &Cell) -> String {
        match cell {
            Cell::Text(text) => text.clone(),
            Cell::Number(n) if self.cast_to_int => format!("{}", n.trunc() as i64),
            Cell::Number(n) => {
                let fixed = format!("{:.*}", self.precision, n);
                let trimmed = if fixed.contains('.') {
                    fixed.trim_end_matches('0').trim_end_matches('.')
                } else {
                    fixed.as_str()
                };
                // values that round to zero keep their sign in `format!`
                match trimmed {
                    "-0" => "0".to_string(),
                    other => other.to_string(),
                }
            }
        }
    }
}

/// Header line and body rows of a table
pub fn render_body(table: &Table, options: &TableOptions) -> String {
    let mut out = String::new();
    if let Some(columns) = table.columns() {
        out.push_str(&columns.join(" & "));
        out.push_str("\\\\\n\\hline\n");
    }
    let separator = if options.split_each { "\n\\hline\n" } else { "\n" };
    let rows: Vec<String> = table
        .rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(|c| options.format_cell(c)).collect();
            format!("{} \\\\", cells.join(" & "))
        })
        .collect();
    out.push_str(&rows.join(separator));
    out
}

/// Complete `table` environment
pub fn render_table(table: &Table, options: &TableOptions, modifiers: &str) -> String {
    let columns = vec!["c"; table.column_count()].join("|");
    format!(
        "\\begin{{table}}[{modifiers}]\n\
         \\caption{{{caption}}}\n\
         \\label{{{label}}}\n\
         \\begin{{center}}\n\
         \\begin{{tabular}}{{{columns}}}\n\
         \\hline\n\
         {body}\n\
         \\hline\n\
         \\end{{tabular}}\n\
         \\end{{center}}\n\
         \\end{{table}}",
        modifiers = modifiers,
        caption = table.caption(),
        label = table.label(),
        columns = columns,
        body = render_body(table, options),
    )
}

/// `@table||name|modifiers=h!|precision=3|split_each|cast_to_int||`
pub struct TableCommand;

impl CommandHandler for TableCommand {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        let table = lookup_table(ctx, args.name("table")?)?;
        let options = TableOptions::from_args("table", args, ctx)?;
        let modifiers = args.keyword("modifiers").unwrap_or(DEFAULT_MODIFIERS);
        Ok(CommandOutput::text(render_table(table, &options, modifiers)))
    }

    fn summary(&self) -> &'static str {
        "full LaTeX table environment"
    }
}

/// `@table_body||name|precision=3|split_each|cast_to_int||`
pub struct TableBodyCommand;

impl CommandHandler for TableBodyCommand {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        let table = lookup_table(ctx, args.name("table_body")?)?;
        let options = TableOptions::from_args("table_body", args, ctx)?;
        Ok(CommandOutput::text(render_body(table, &options)))
    }

    fn summary(&self) -> &'static str {
        "table header and rows"
    }
}

/// `@table_caption||name||`
pub struct TableCaptionCommand;

impl CommandHandler for TableCaptionCommand {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        let table = lookup_table(ctx, args.name("table_caption")?)?;
        Ok(CommandOutput::text(table.caption()))
    }

    fn summary(&self) -> &'static str {
        "table human name"
    }
}
