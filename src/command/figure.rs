//! `@fig`, `@plo` and `@plot`: evaluate a plot and queue it for the figure backend

use tracing::debug;

use crate::expand::RenderContext;
use crate::expr::evaluate_plot;
use crate::renderer::figure_path;

use super::{CommandArgs, CommandError, CommandHandler, CommandOutput, FigureRequest, SideEffect};

pub struct FigureCommand;

impl CommandHandler for FigureCommand {
    fn handle(&self, args: &CommandArgs, ctx: &RenderContext<'_>) -> Result<CommandOutput, CommandError> {
        let name = args.name("fig")?;
        let plot = ctx
            .data()
            .plot(name)
            .ok_or_else(|| CommandError::PlotNotFound {
                name: name.to_string(),
            })?;

        let evaluated = evaluate_plot(plot, ctx.data())?;
        let path = figure_path(&ctx.config().figure_dir, &evaluated.label);
        debug!(plot = %name, path = %path.display(), "queued figure");

        Ok(CommandOutput::text(path.display().to_string()).with_effect(SideEffect::Figure(
            FigureRequest {
                plot: evaluated,
                path,
            },
        )))
    }

    fn summary(&self) -> &'static str {
        "render a plot and insert its file path"
    }
}
