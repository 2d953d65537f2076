use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "flipbook", version)]
struct Cli {
    /// Print debug-level diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a project to an animated GIF.
    Render(RenderArgs),
    /// Render a single output frame as a PNG.
    Frame(FrameArgs),
    /// Print the frame layout of a project without rendering.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    /// Replace an existing output file.
    #[arg(long)]
    overwrite: bool,

    /// Normalize and synthesize frames in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel` (defaults to the number of CPUs).
    #[arg(long)]
    threads: Option<usize>,

    /// Override the project's per-frame display time.
    #[arg(long, allow_negative_numbers = true)]
    frame_duration_ms: Option<i64>,

    /// Override the project's loop count (0 loops forever).
    #[arg(long, allow_negative_numbers = true)]
    loop_count: Option<i64>,

    /// Override the project's frames per transition.
    #[arg(long, allow_negative_numbers = true)]
    transition_frames: Option<i64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output frame index (0-based).
    #[arg(long)]
    frame: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the project's frames per transition.
    #[arg(long, allow_negative_numbers = true)]
    transition_frames: Option<i64>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the project's frames per transition.
    #[arg(long, allow_negative_numbers = true)]
    transition_frames: Option<i64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_project(path: &std::path::Path) -> anyhow::Result<flipbook::Project> {
    flipbook::Project::from_path(path)
        .with_context(|| format!("load project '{}'", path.display()))
}

fn settings_with_overrides(
    project: &flipbook::Project,
    frame_duration_ms: Option<i64>,
    loop_count: Option<i64>,
    transition_frames: Option<i64>,
) -> anyhow::Result<flipbook::ExportSettings> {
    let e = project.def().export;
    Ok(flipbook::ExportSettings::from_raw(
        frame_duration_ms.unwrap_or(e.frame_duration_ms),
        loop_count.unwrap_or(e.loop_count),
        transition_frames.unwrap_or(e.transition_frames),
    )?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let project = load_project(&args.in_path)?;
    let settings = settings_with_overrides(
        &project,
        args.frame_duration_ms,
        args.loop_count,
        args.transition_frames,
    )?;
    let opts = flipbook::BuildOpts {
        parallel: args.parallel,
        threads: args.threads,
    };
    opts.validate()?;

    let workspace = project.load_workspace()?;
    let mut sink = flipbook::GifSink::new(flipbook::GifSinkOpts {
        overwrite: args.overwrite,
        ..flipbook::GifSinkOpts::new(&args.out)
    })?;
    let stats = flipbook::export(&workspace, &settings, &opts, &mut sink)?;

    eprintln!(
        "wrote {} ({} frames: {} base + {} transition, {}x{})",
        args.out.display(),
        stats.frames,
        stats.base_frames,
        stats.transition_frames,
        stats.width,
        stats.height
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = load_project(&args.in_path)?;
    let settings = settings_with_overrides(&project, None, None, args.transition_frames)?;
    let workspace = project.load_workspace()?;

    let frame = flipbook::render_frame(&workspace, settings.transition_frames, args.frame)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .as_dynamic()
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let project = load_project(&args.in_path)?;
    let settings = settings_with_overrides(&project, None, None, args.transition_frames)?;
    let workspace = project.load_workspace()?;
    let plan = flipbook::plan_sequence(&workspace, settings.transition_frames)?;

    println!("canvas: {}", plan.canvas());
    println!(
        "frames: {} ({} base + {} transition)",
        plan.len(),
        plan.entry_count(),
        plan.transition_frames()
    );
    for (idx, slot) in plan.slots().iter().enumerate() {
        match *slot {
            flipbook::FrameSlot::Base { entry } => {
                println!("{idx:>5}  image {entry}");
            }
            flipbook::FrameSlot::Transition {
                from,
                kind,
                step,
                steps,
            } => {
                if step == 0 {
                    println!(
                        "{idx:>5}  {kind} {from} -> {} ({steps} frames)",
                        from + 1
                    );
                }
            }
        }
    }
    Ok(())
}
