use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use murex_assets::GltfLoader;
use murex_render::{DebugTextRenderer, PerspectiveCamera, Renderer};
use murex_viewer::{AppContext, FrameLoop, SoftwarePresenter, ViewerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "murex-cli", about = "Headless murex viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer config; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions and the effective config
    Info,
    /// Decode an asset and print its node tree
    Inspect {
        /// glTF or GLB file
        asset: PathBuf,
    },
    /// Run frame ticks on the CPU and write the final frame as PNG
    Render {
        /// Asset to load; overrides the config
        #[arg(long)]
        asset: Option<PathBuf>,
        /// Number of frame ticks to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        out: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ViewerConfig> {
    match path {
        Some(path) => Ok(ViewerConfig::load(path)?),
        None => Ok(ViewerConfig::default()),
    }
}

fn inspect(config: &ViewerConfig, asset: &Path) -> anyhow::Result<()> {
    let loaded = GltfLoader::new(config.loader_config())
        .decode(asset)
        .with_context(|| format!("decoding {}", asset.display()))?;
    println!("asset: {} ({})", loaded.id, loaded.path.display());
    println!("vertices: {}", loaded.vertex_count());

    let camera = PerspectiveCamera::new(
        config.camera.fov_degrees,
        config.viewport()?.aspect(),
        config.camera.near,
        config.camera.far,
    );
    let mut out = String::new();
    DebugTextRenderer::new().render(&loaded.scene, &camera, &mut out);
    print!("{out}");
    Ok(())
}

fn render(config: ViewerConfig, frames: u64, out: &Path) -> anyhow::Result<()> {
    let asset_path = config.asset_path.clone();
    let mut ctx = AppContext::new(config)?;

    // Headless runs resolve the load up front so every frame sees the mesh.
    let result = GltfLoader::new(ctx.config().loader_config())
        .load(&asset_path)
        .wait();
    if let Err(e) = ctx.on_asset_loaded(result) {
        tracing::warn!(path = %asset_path.display(), "asset unavailable, rendering the empty scene: {e}");
    }

    let mut frame_loop = FrameLoop::new(ctx.config().idle_rotation);
    let mut presenter = SoftwarePresenter::default();
    for _ in 0..frames {
        frame_loop.tick(&mut ctx, &mut presenter)?;
    }

    let frame = presenter.output(&ctx);
    let image = image::RgbaImage::from_raw(frame.width(), frame.height(), frame.to_rgba8())
        .context("frame buffer size does not match its viewport")?;
    image
        .save(out)
        .with_context(|| format!("writing {}", out.display()))?;
    println!(
        "wrote {} ({}x{}, {} ticks)",
        out.display(),
        frame.width(),
        frame.height(),
        frame_loop.ticks()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("murex-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", murex_assets::crate_info());
            println!("render: {}", murex_render::crate_info());
            println!("viewer: {}", murex_viewer::crate_info());
            println!("--- effective config ---");
            print!("{}", config.to_yaml()?);
        }
        Commands::Inspect { asset } => inspect(&config, &asset)?,
        Commands::Render {
            asset,
            frames,
            out,
            width,
            height,
        } => {
            if let Some(asset) = asset {
                config.asset_path = asset;
            }
            if let Some(width) = width {
                config.viewport.width = width;
            }
            if let Some(height) = height {
                config.viewport.height = height;
            }
            tracing::info!(frames, asset = %config.asset_path.display(), "headless render");
            render(config, frames, &out)?;
        }
    }

    Ok(())
}
