use crate::config::{load_config, Config};
use crate::layout::{FontMetricsSizer, LayoutSummary, StateDiagram};
use crate::layout_dump::{write_layout_dump, LayoutDump};
use crate::parser::parse_diagram;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sdlayout", version, about = "Grid layout for state diagrams")]
pub struct Args {
    /// Input file (state diagram text or JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Lay out top to bottom instead of left to right
    #[arg(long)]
    pub vertical: bool,

    /// Size nodes from their labels
    #[arg(long)]
    pub labels: bool,

    /// Center parents between their children after row assignment
    #[arg(long)]
    pub balance: bool,

    /// Measure labels with system fonts instead of counting characters
    #[arg(long = "font-metrics")]
    pub font_metrics: bool,

    /// Also write the layout grid as JSON to this path
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    apply_flags(&mut config, &args);

    let input = read_input(args.input.as_deref())?;
    let parsed = parse_diagram(&input)?;
    let mut diagram = parsed.graph.to_state_diagram(config.layout.clone())?;
    if args.font_metrics {
        diagram.set_node_size_calculator(Box::new(FontMetricsSizer::new(
            config.theme.font_family.clone(),
            config.theme.font_size,
        )));
    }
    let summary = diagram.layout()?;
    tracing::info!(
        nodes = diagram.len(),
        rows = summary.rows,
        columns = summary.columns,
        "layout finished"
    );

    if let Some(path) = args.dump.as_deref() {
        write_layout_dump(path, &diagram, &summary)?;
    }

    write_result(&args, &config, &diagram, &summary)
}

fn apply_flags(config: &mut Config, args: &Args) {
    if args.vertical {
        config.layout.vertical = true;
    }
    if args.labels || args.font_metrics {
        config.layout.include_labels = true;
    }
    if args.balance {
        config.layout.balance = true;
    }
}

fn write_result(
    args: &Args,
    config: &Config,
    diagram: &StateDiagram<String>,
    summary: &LayoutSummary,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(diagram, summary, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(diagram, summary, &config.theme, &config.render);
            write_output_png(&svg, &output, &config.render)?;
        }
        OutputFormat::Json => {
            let dump = LayoutDump::from_diagram(diagram, summary);
            let json = serde_json::to_string_pretty(&dump)?;
            match args.output.as_deref() {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
