use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "overlayer", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Turn an image into a trimmed, transparent overlay PNG.
    Prepare(PrepareArgs),
    /// Bake every overlay of a project onto its base image.
    Compose(ComposeArgs),
    /// Validate a hotspot template and list its marks.
    Marks(MarksArgs),
}

#[derive(Parser, Debug)]
struct PrepareArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Fail unless the result has real transparency.
    #[arg(long)]
    enforce_transparency: bool,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Project JSON.
    #[arg(long)]
    project: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct MarksArgs {
    /// Template JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Prepare(args) => cmd_prepare(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Marks(args) => cmd_marks(args),
    }
}

fn cmd_prepare(args: PrepareArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read '{}'", args.in_path.display()))?;
    let preparer = overlayer::OverlayPreparer::new(overlayer::PrepareOpts::default())?;
    let prepared = preparer.prepare(&bytes, args.enforce_transparency)?;

    let png = overlayer::encode_png(&preparer, &prepared.raster)?;
    write_output(&args.out, &png)?;
    eprintln!(
        "wrote {} ({}x{}, alpha: {:?})",
        args.out.display(),
        prepared.raster.width,
        prepared.raster.height,
        prepared.source
    );
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let project = overlayer::Project::from_path(&args.project)?;
    let root = args.project.parent().unwrap_or_else(|| Path::new("."));
    let preparer = overlayer::OverlayPreparer::new(project.prepare.clone())?;

    let composite = overlayer::compose_project(&project, root, &preparer)?;
    let png = overlayer::encode_png(&preparer, &composite)?;
    write_output(&args.out, &png)?;
    eprintln!(
        "wrote {} ({}x{}, {} overlays)",
        args.out.display(),
        composite.width,
        composite.height,
        project.overlays.len()
    );
    Ok(())
}

fn cmd_marks(args: MarksArgs) -> anyhow::Result<()> {
    let template = overlayer::Template::from_path(&args.in_path)?;
    template.validate()?;
    for m in &template.marks {
        println!(
            "{}\t{:?}\tcenter=({:.3},{:.3})\tsize=({:.3},{:.3})\t{}",
            m.id, m.kind, m.center_x, m.center_y, m.width, m.height, m.label
        );
    }
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
