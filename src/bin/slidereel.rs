use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use slidereel::{
    FfmpegBackend, ReelConfig, RenderRequest, SeededSelector, SystemProber, VideoShape,
    plan_render, prepare_product, render,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slidereel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a render and print its graph or timing report without encoding.
    Plan(PlanArgs),
    /// Render the long-form video and, optionally, the short-form one (requires `ffmpeg`).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Render request JSON.
    #[arg(long)]
    request: PathBuf,

    /// Configuration JSON. Defaults apply to every omitted section.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Transition/music selector seed (overrides the configured one).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output shape (defaults to the configured target shape).
    #[arg(long, value_enum)]
    shape: Option<ShapeArg>,

    /// What to print.
    #[arg(long, value_enum, default_value_t = PlanOutput::Dump)]
    print: PlanOutput,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Long-form (horizontal) output path.
    #[arg(long)]
    out: PathBuf,

    /// Short-form (vertical) output path.
    #[arg(long)]
    short_out: Option<PathBuf>,

    /// Write the timing report(s) as JSON next to each output.
    #[arg(long, default_value_t = false)]
    report: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeArg {
    Horizontal,
    Vertical,
}

impl From<ShapeArg> for VideoShape {
    fn from(s: ShapeArg) -> Self {
        match s {
            ShapeArg::Horizontal => VideoShape::Horizontal,
            ShapeArg::Vertical => VideoShape::Vertical,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlanOutput {
    /// Human-readable timing and graph dump.
    Dump,
    /// Render graph JSON.
    Graph,
    /// Timing report JSON.
    Report,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load(common: &CommonArgs) -> anyhow::Result<(RenderRequest, ReelConfig, SeededSelector)> {
    let request = RenderRequest::from_path(&common.request)
        .with_context(|| format!("loading request '{}'", common.request.display()))?;
    let config = match &common.config {
        Some(path) => ReelConfig::from_path(path)
            .with_context(|| format!("loading config '{}'", path.display()))?,
        None => ReelConfig::default(),
    };
    let selector = SeededSelector::from_seed_or_entropy(common.seed.or(config.transitions.seed));
    tracing::info!(seed = selector.seed(), "selector seeded");
    Ok((request, config, selector))
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let (request, config, mut selector) = load(&args.common)?;
    let prober = SystemProber::new(&config.process);
    let prepared = prepare_product(&request, &config, &prober, &mut selector)?;
    let shape = args.shape.map_or(config.style.target_shape, VideoShape::from);
    let plan = plan_render(&prepared, shape, &config, &mut selector)?;

    match args.print {
        PlanOutput::Dump => {
            print!("{}", plan.report.dump());
            print!("{}", plan.graph.dump());
        }
        PlanOutput::Graph => println!("{}", plan.graph.to_json()?),
        PlanOutput::Report => println!("{}", serde_json::to_string_pretty(&plan.report)?),
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (request, config, mut selector) = load(&args.common)?;
    let prober = SystemProber::new(&config.process);
    let backend = FfmpegBackend::new(&config.process);
    if !slidereel::is_tool_on_path(backend.program()) {
        anyhow::bail!(
            "'{}' is required for rendering, but was not found on PATH",
            backend.program()
        );
    }

    let prepared = prepare_product(&request, &config, &prober, &mut selector)?;
    for d in &prepared.degradations {
        eprintln!("degraded [{}] {}: {}", d.stage, d.subject, d.reason);
    }

    let mut targets = vec![(VideoShape::Horizontal, args.out.clone())];
    if let Some(short) = &args.short_out {
        targets.push((VideoShape::Vertical, short.clone()));
    }
    for (shape, out) in targets {
        let plan = plan_render(&prepared, shape, &config, &mut selector)?;
        let outcome = render(&plan, &backend, &out)?;
        if args.report {
            write_report(&outcome.path, &outcome.report)?;
        }
        println!(
            "{} {} ({}, {} frames)",
            shape.as_str(),
            outcome.path.display(),
            outcome.report.total,
            outcome.report.total_frames
        );
    }
    Ok(())
}

fn write_report(out: &Path, report: &slidereel::TimingReport) -> anyhow::Result<()> {
    let path = out.with_extension("timing.json");
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)
        .with_context(|| format!("writing timing report '{}'", path.display()))?;
    Ok(())
}
