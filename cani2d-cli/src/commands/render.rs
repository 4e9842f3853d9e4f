//! Render one frame of a model to an image

use anyhow::{Context, Result};
use cani2d::{AnimationInstance, Canvas};
use clap::Args;
use std::path::PathBuf;

use super::{SourceArgs, ViewArgs, bounds, load_mesh, select_animation};

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output PNG file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Animation to pose the model with (rest pose when omitted)
    #[arg(short, long)]
    pub animation: Option<String>,

    /// Animation frame to render
    #[arg(short, long, default_value_t = 0.0)]
    pub frame: f32,

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let mesh = load_mesh(&args.source)?;
    let mut instance = AnimationInstance::new(mesh);

    if let Some(name) = &args.animation {
        select_animation(&mut instance, name)?;
        instance.set_frame(args.frame);
    } else if args.frame != 0.0 {
        log::warn!("--frame has no effect without --animation");
    }

    let (width, height, view) = args.view.resolve(bounds(instance.vertices()))?;
    let mut canvas = Canvas::new(width, height).with_view(view);
    let drawn = instance.draw(&mut canvas);
    log::info!("Drew {drawn} triangles into {width}x{height}");

    canvas
        .into_image()
        .save(&args.output)
        .with_context(|| format!("Failed to save image: {}", args.output.display()))?;

    println!(
        "Rendered {} ({}x{}) to {}",
        args.source.model.display(),
        width,
        height,
        args.output.display()
    );
    Ok(())
}
