//! Render an animation frame by frame

use anyhow::{Context, Result, bail};
use cani2d::math::Affine2;
use cani2d::{AnimationInstance, Canvas};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::{SourceArgs, ViewArgs, clip_bounds, load_mesh, select_animation};
use crate::utils::create_progress_bar;

#[derive(Args, Debug)]
pub struct FramesArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory receiving the numbered PNG files
    pub out_dir: PathBuf,

    /// Animation to play
    #[arg(short, long)]
    pub animation: String,

    /// Output images per second of animation time
    #[arg(long, default_value_t = 30.0)]
    pub fps: f32,

    /// Number of images to write (whole clip when omitted)
    #[arg(short, long)]
    pub count: Option<u32>,

    #[command(flatten)]
    pub view: ViewArgs,
}

pub fn execute(args: FramesArgs) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be a positive number, got {}", args.fps);
    }

    let mesh = load_mesh(&args.source)?;
    let mut instance = AnimationInstance::new(Arc::clone(&mesh));
    select_animation(&mut instance, &args.animation)?;

    let length = instance.clip().map_or(0.0, |clip| clip.length);
    let step_ms = 1000.0 / args.fps;
    let clip_fps = instance.state().fps;
    // Clip frames covered by one output image
    let frames_per_image = clip_fps / args.fps;
    let count = args
        .count
        .unwrap_or_else(|| (length / frames_per_image).ceil() as u32 + 1);

    let (width, height, view) = args.view.resolve(clip_bounds(&mesh, &args.animation)?)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create directory: {}", args.out_dir.display()))?;

    instance.set_looping(args.count.is_some());
    instance.set_frame(0.0);
    instance.play();

    let progress = create_progress_bar(u64::from(count), &args.animation);
    let mut written = 0;
    let mut running = true;
    for index in 0..count {
        if index > 0 {
            running = instance.advance(step_ms);
        }

        write_frame(&instance, &args, index, width, height, view)?;
        written += 1;
        progress.inc(1);

        // A non-looping clip stops on its final pose
        if !running {
            log::debug!("Animation ended after {written} images");
            break;
        }
    }
    progress.finish_with_message("done");

    println!(
        "Wrote {} frames of '{}' to {}",
        written,
        args.animation,
        args.out_dir.display()
    );
    Ok(())
}

fn write_frame(
    instance: &AnimationInstance,
    args: &FramesArgs,
    index: u32,
    width: u32,
    height: u32,
    view: Affine2,
) -> Result<()> {
    let mut canvas = Canvas::new(width, height).with_view(view);
    instance.draw(&mut canvas);

    let path = args
        .out_dir
        .join(format!("{}_{:04}.png", args.animation, index));
    canvas
        .into_image()
        .save(&path)
        .with_context(|| format!("Failed to save image: {}", path.display()))
}
