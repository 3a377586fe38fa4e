use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use scenebox::{AssetCache, FontBook, FsStorage, SceneConfig, SceneRunner};

#[derive(Parser, Debug)]
#[command(name = "scenebox", version)]
struct Cli {
    /// More log output on stderr (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene file to a PNG.
    Render(RenderArgs),
    /// List the host tags a scene can be bound to.
    Tags,
    /// Print the effective configuration as JSON.
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene source file.
    scene: PathBuf,

    /// Output PNG path.
    #[arg(short, long)]
    out: PathBuf,

    /// Asset root holding `gfx/` and `fonts/`. Defaults to the scene file's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host tag to report display geometry for.
    #[arg(long, requires = "container_width")]
    tag: Option<String>,

    /// Host width in pixels used with `--tag`.
    #[arg(long)]
    container_width: Option<f64>,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Settings JSON to merge over the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Tags => cmd_tags(),
        Command::Config(args) => cmd_config(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(p) => SceneConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let source = std::fs::read_to_string(&args.scene)
        .with_context(|| format!("read scene '{}'", args.scene.display()))?;

    let root = match args.assets {
        Some(root) => root,
        None => args
            .scene
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let mut fonts = FontBook::system();
    fonts.load_fonts_dir(&root.join("fonts"));
    tracing::debug!(faces = fonts.face_count(), "fonts loaded");

    let runner = SceneRunner::new(
        config,
        Arc::new(AssetCache::new()),
        Arc::new(FsStorage::new(&root)),
        Arc::new(fonts),
    )?;
    let surface = runner.render(&source)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    surface
        .to_rgba_image()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if let (Some(tag), Some(host_width)) = (args.tag, args.container_width) {
        let binding = scenebox::binding_for(&tag)
            .with_context(|| format!("unknown tag '{tag}'"))?;
        let cfg = runner.config();
        let display = scenebox::display_scale(
            binding.container_width(host_width),
            cfg.scene_w,
            cfg.scene_h,
        );
        println!(
            "{tag}: {:.2}x{} (scale {:.4})",
            display.width, display.height, display.scale
        );
    }
    Ok(())
}

fn cmd_tags() -> anyhow::Result<()> {
    for b in &scenebox::SCENE_TAGS {
        let float = match b.float() {
            scenebox::Float::Left => "left",
            scenebox::Float::Right => "right",
            scenebox::Float::Center => "center",
        };
        let spoiler = if b.spoiler() { " spoiler" } else { "" };
        println!("{:<28} {:>5.1}% {float}{spoiler}", b.tag, b.width_share);
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    println!("{}", config.to_json()?);
    Ok(())
}
