use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use image::{ImageFormat, RgbImage};
use indicatif::{ProgressBar, ProgressStyle};

use blocktracer::camera::CameraCommand;
use blocktracer::color::Color;
use blocktracer::rendering::{
    render_frame, Frame, PixelSink, ReflectionMode, RenderContext, RenderStats,
};
use blocktracer::scene::{load_scene_file, SceneDescription};
use blocktracer::skybox::{Skybox, TexturedSkybox};
use blocktracer::texture::TextureAtlas;

/// Renders a scene of textured boxes with a recursive ray tracer.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scene description file.
    scene: PathBuf,

    /// PNG file to write.
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Also write a binary PPM to this path.
    #[arg(long)]
    ppm: Option<PathBuf>,

    /// Override the image width from the scene file.
    #[arg(long)]
    width: Option<u32>,

    /// Override the image height from the scene file.
    #[arg(long)]
    height: Option<u32>,

    /// Mirror direction: `origin` or `incident`.
    #[arg(long)]
    reflection: Option<ReflectionMode>,

    /// Camera commands applied before rendering, e.g. `rotate+`, `zoom-`, `move-x+`.
    #[arg(long = "camera", value_name = "COMMAND")]
    camera_commands: Vec<CameraCommand>,

    /// Hide the progress bar.
    #[arg(short, long)]
    quiet: bool,
}

/// Frame sink that ticks a progress bar at the end of every scanline.
struct ProgressSink<'a> {
    frame: &'a mut Frame,
    progress: &'a ProgressBar,
}

impl PixelSink for ProgressSink<'_> {
    fn write_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.frame.write_pixel(x, y, color);
        if x + 1 == self.frame.width {
            self.progress.inc(1);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut description = load_scene_file(&args.scene)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;
    if let Some(width) = args.width {
        description.width = width;
    }
    if let Some(height) = args.height {
        description.height = height;
    }
    if let Some(reflection) = args.reflection {
        description.reflection = reflection;
    }
    for command in &args.camera_commands {
        description.camera.apply(*command);
    }
    anyhow::ensure!(
        description.width > 0 && description.height > 0,
        "image dimensions must be positive"
    );
    log::info!(
        "scene {}: {} boxes, {}x{}",
        args.scene.display(),
        description.scene.len(),
        description.width,
        description.height
    );

    let textures = load_textures(&description);
    let textured_sky = description
        .skybox_faces
        .clone()
        .map(|faces| TexturedSkybox {
            faces,
            textures: &textures,
            fallback: description.sky.clone(),
        });
    let skybox: &dyn Skybox = match &textured_sky {
        Some(sky) => sky,
        None => &description.sky,
    };

    let ctx = RenderContext {
        scene: &description.scene,
        camera: &description.camera,
        light: &description.light,
        textures: &textures,
        skybox,
        reflection: description.reflection,
        stats: RenderStats::default(),
    };

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(description.height as u64)
    };
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} rows {elapsed_precise}")
            .context("progress template")?,
    );
    let mut frame = Frame::new(description.width, description.height);
    let started = Instant::now();
    render_frame(
        &ctx,
        description.width,
        description.height,
        &mut ProgressSink {
            frame: &mut frame,
            progress: &progress,
        },
    );
    progress.finish_and_clear();
    log::info!(
        "rendered in {} ms ({} scene scans, {} shadow scans)",
        started.elapsed().as_millis(),
        ctx.stats.scene_scans.get(),
        ctx.stats.shadow_scans.get()
    );

    dump_rendered_to_png(&frame, &args.output)?;
    log::info!("wrote {}", args.output.display());
    if let Some(ppm_path) = &args.ppm {
        dump_rendered_to_ppm(&frame, ppm_path)?;
        log::info!("wrote {}", ppm_path.display());
    }
    Ok(())
}

/// Missing or broken textures are skipped; faces using them fall back to the
/// material color.
fn load_textures(description: &SceneDescription) -> TextureAtlas {
    let mut atlas = TextureAtlas::new();
    for (name, path) in &description.textures {
        if let Err(error) = atlas.load(name, path) {
            log::warn!("texture '{}' ({}): {}", name, path.display(), error);
        }
    }
    log::info!(
        "{} of {} textures loaded",
        atlas.len(),
        description.textures.len()
    );
    atlas
}

fn dump_rendered_to_png(frame: &Frame, png_path: &Path) -> anyhow::Result<()> {
    let img = RgbImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .context("frame buffer size does not match its dimensions")?;
    img.save_with_format(png_path, ImageFormat::Png)
        .with_context(|| format!("writing {}", png_path.display()))?;
    Ok(())
}

fn dump_rendered_to_ppm(frame: &Frame, ppm_path: &Path) -> anyhow::Result<()> {
    let file =
        File::create(ppm_path).with_context(|| format!("creating {}", ppm_path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(b"P6\n")?;
    out.write_all(format!("{} {}\n", frame.width, frame.height).as_bytes())?;
    out.write_all(b"255\n")?;
    out.write_all(&frame.pixels)?;
    out.flush()?;
    Ok(())
}
