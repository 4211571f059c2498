//! LabGen CLI
//!
//! Usage:
//!   labgen [OPTIONS] [SOURCES]...
//!
//! Options:
//!   -c, --config <FILE>      Project file (defaults to ./labgen.toml when present)
//!   -t, --template <FILE>    Template file, may be repeated
//!   -d, --data <FILE>        Data file, may be repeated
//!   -o, --output-dir <DIR>   Write rendered sources and figures here
//!   --figure-dir <DIR>       Figure directory as referenced from the output
//!   -p, --palette <FILE>     Palette file for curve colors (TOML format)
//!   --dump                   Print registered templates, commands and data
//!   --keep-going             Continue when a template or data file fails to load
//!   -v, --verbose            Debug logging
//!   -h, --help               Print help

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use labgen::{
    FigureBackend, Palette, Project, ProjectConfig, ProjectError, RenderError, Source,
    SvgFigureBackend,
};

const DEFAULT_CONFIG: &str = "labgen.toml";

#[derive(Parser)]
#[command(name = "labgen")]
#[command(about = "Template-driven generator for LaTeX lab reports")]
struct Cli {
    /// Source files to render
    sources: Vec<PathBuf>,

    /// Project file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template file
    #[arg(short, long = "template")]
    templates: Vec<PathBuf>,

    /// Data file with tables and plots
    #[arg(short, long = "data")]
    data: Vec<PathBuf>,

    /// Output directory (prints a single source to stdout if not provided)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Figure directory as written into rendered text
    #[arg(long)]
    figure_dir: Option<PathBuf>,

    /// Palette file for curve colors (TOML format)
    #[arg(short, long)]
    palette: Option<PathBuf>,

    /// Print registered templates, commands, tables and plots
    #[arg(long)]
    dump: bool,

    /// Continue when a template or data file fails to load
    #[arg(long)]
    keep_going: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let palette = match &config.palette {
        Some(path) => match Palette::from_file(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error loading palette '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Palette::default(),
    };

    let (project, diagnostics) = Project::load(&config);
    for diagnostic in &diagnostics {
        eprintln!("Error: {}", diagnostic);
    }
    if !diagnostics.is_empty() && !cli.keep_going {
        std::process::exit(1);
    }

    let render_config = config.render_config();

    if cli.dump {
        let renderer = project.renderer(render_config);
        match renderer.render("@labgen_dump", "<dump>") {
            Ok(output) => println!("{}", output.text),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    if config.sources.is_empty() {
        eprintln!("Error: no source files given");
        std::process::exit(1);
    }

    let mut sources = Vec::new();
    for path in &config.sources {
        match Source::read(path) {
            Ok(source) => sources.push(source),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let root = config.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let backend = SvgFigureBackend::new(&root)
        .with_config(config.figure_config())
        .with_palette(palette);

    let failed = match &config.output_dir {
        None => render_to_stdout(&project, &sources, &render_config, &backend),
        Some(dir) => render_to_dir(&project, &sources, &render_config, &backend, dir),
    };
    if failed > 0 {
        eprintln!("{} of {} source(s) failed", failed, sources.len());
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let directive = if verbose { "labgen=debug" } else { "labgen=info" };
    let filter = match directive.parse() {
        Ok(d) => EnvFilter::from_default_env().add_directive(d),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Project file merged with command line overrides
fn load_config(cli: &Cli) -> Result<ProjectConfig, labgen::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ProjectConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            ProjectConfig::from_file(Path::new(DEFAULT_CONFIG))?
        }
        None => ProjectConfig::new(),
    };

    config.templates.extend(cli.templates.iter().cloned());
    config.data.extend(cli.data.iter().cloned());
    config.sources.extend(cli.sources.iter().cloned());
    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    if let Some(dir) = &cli.figure_dir {
        config.figure_dir = Some(dir.clone());
    }
    if let Some(path) = &cli.palette {
        config.palette = Some(path.clone());
    }
    Ok(config)
}

fn render_to_stdout(
    project: &Project,
    sources: &[Source],
    config: &labgen::RenderConfig,
    backend: &dyn FigureBackend,
) -> usize {
    let [source] = sources else {
        eprintln!("Error: rendering several sources needs --output-dir");
        return sources.len();
    };
    let renderer = project.renderer(config.clone());
    match project.render_source(&renderer, source, backend) {
        Ok(text) => {
            print!("{}", text);
            0
        }
        Err(e) => {
            report_error(&e, source);
            1
        }
    }
}

fn render_to_dir(
    project: &Project,
    sources: &[Source],
    config: &labgen::RenderConfig,
    backend: &dyn FigureBackend,
    dir: &Path,
) -> usize {
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("Error creating output directory '{}': {}", dir.display(), e);
        return sources.len();
    }

    let mut failed = 0;
    for (report, source) in project.render_all(sources, config, backend).iter().zip(sources) {
        let text = match &report.result {
            Ok(text) => text,
            Err(e) => {
                report_error(e, source);
                failed += 1;
                continue;
            }
        };
        let name = Path::new(&source.label)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output.tex"));
        let path = dir.join(name);
        if let Err(e) = fs::write(&path, text) {
            eprintln!("Error writing '{}': {}", path.display(), e);
            failed += 1;
        }
    }
    failed
}

fn report_error(error: &ProjectError, source: &Source) {
    match error {
        ProjectError::Render(RenderError::Scan(scan)) if scan.location().file == source.label => {
            eprint!("{}", scan.format(&source.text, &source.label));
        }
        other => eprintln!("Error: {}", other),
    }
}
