mod demo;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vista_device::{HeadlessDevice, TextureData};
use vista_render::{ForwardRenderer, RenderStatistics, RendererConfig};
use vista_render_wgpu::WgpuDevice;
use vista_scene::SceneInspector;
use vista_terrain::TileCoord;

use crate::demo::DemoOptions;

#[derive(Parser)]
#[command(name = "vista-cli", about = "CLI driver for the vista renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Copy)]
struct SceneArgs {
    /// Number of cubes in the prop grid
    #[arg(long, default_value = "9")]
    cubes: u32,
    /// Number of lights; the first is directional, the rest are point lights
    #[arg(long, default_value = "1")]
    lights: u32,
    /// Leave out the water plane
    #[arg(long)]
    no_water: bool,
    /// Leave out the skybox
    #[arg(long)]
    no_skybox: bool,
    /// Terrain tiles per side
    #[arg(long, default_value = "0")]
    terrain: u32,
}

impl SceneArgs {
    fn options(self) -> DemoOptions {
        DemoOptions {
            cubes: self.cubes,
            lights: self.lights,
            water: !self.no_water,
            skybox: !self.no_skybox,
            terrain: self.terrain,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Render frames of the demo scene on the recording device
    Frame {
        #[command(flatten)]
        scene: SceneArgs,
        /// Backbuffer width
        #[arg(long, default_value = "1280")]
        width: u32,
        /// Backbuffer height
        #[arg(long, default_value = "720")]
        height: u32,
        /// Number of frames to render
        #[arg(short, long, default_value = "1")]
        frames: u32,
        /// Renderer config as JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Sculpt a terrain and report how each tile meshes
    Terrain {
        /// Tiles per side
        #[arg(short, long, default_value = "2")]
        tiles: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the demo scene graph
    Scene {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// Render one frame through wgpu on an offscreen backbuffer
    Gpu {
        #[command(flatten)]
        scene: SceneArgs,
        #[arg(long, default_value = "640")]
        width: u32,
        #[arg(long, default_value = "360")]
        height: u32,
        /// Renderer config as JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct FrameReport {
    frames: u32,
    statistics: RenderStatistics,
    effects: usize,
    draws_recorded: usize,
    live_meshes: usize,
    live_textures: usize,
}

#[derive(Serialize)]
struct TileReport {
    x: u32,
    y: u32,
    flat: bool,
    vertices: u32,
    triangles: u32,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RendererConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let config = serde_json::from_str(&text)?;
            tracing::info!(path = %path.display(), "loaded renderer config");
            Ok(config)
        }
        None => Ok(RendererConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("vista-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", vista_common::crate_info());
            println!("device: {}", vista_device::crate_info());
            println!("terrain: {}", vista_terrain::crate_info());
            println!("scene: {}", vista_scene::crate_info());
            println!("render: {}", vista_render::crate_info());
            println!("render-wgpu: {}", vista_render_wgpu::crate_info());
        }
        Commands::Frame {
            scene,
            width,
            height,
            frames,
            config,
            json,
        } => {
            let config = load_config(config.as_ref())?;
            let mut device = HeadlessDevice::new(width, height);
            let mut renderer = ForwardRenderer::new(&mut device, config);
            let mut scene = demo::build_scene(&mut device, &scene.options())?;

            let mut draws_recorded = 0;
            for _ in 0..frames {
                device.take_commands();
                renderer.advance(Duration::from_secs_f32(1.0 / 60.0));
                let mut frame = renderer.frame(&mut device)?;
                frame.draw_scene(&mut scene)?;
                drop(frame);
                draws_recorded = device.draw_count();
            }

            let report = FrameReport {
                frames,
                statistics: renderer.statistics(),
                effects: renderer.effects().len(),
                draws_recorded,
                live_meshes: device.live_meshes(),
                live_textures: device.live_textures(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Rendered {frames} frame(s) at {width}x{height}");
                println!("{}", report.statistics);
                println!(
                    "effects={} draws_recorded={} meshes={} textures={}",
                    report.effects, report.draws_recorded, report.live_meshes, report.live_textures
                );
                println!("{}", device.summary());
            }
        }
        Commands::Terrain { tiles, json } => {
            let mut terrain = demo::build_terrain(tiles)?;
            let mut device = HeadlessDevice::new(1, 1);
            let mut report = Vec::new();
            for tile in terrain.tiles_mut() {
                let TileCoord { x, y } = tile.coord();
                let built = tile.mesh(&mut device);
                report.push(TileReport {
                    x,
                    y,
                    flat: built.flat,
                    vertices: built.mesh.vertex_count(),
                    triangles: built.mesh.primitive_count(),
                });
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let extent = terrain.extent();
                println!(
                    "Terrain: {tiles}x{tiles} tiles, extent {:.1}x{:.1}",
                    extent.x, extent.y
                );
                for tile in &report {
                    println!(
                        "  tile ({}, {}): {} vertices={} triangles={}",
                        tile.x,
                        tile.y,
                        if tile.flat { "flat" } else { "grid" },
                        tile.vertices,
                        tile.triangles
                    );
                }
            }
        }
        Commands::Scene { scene } => {
            let mut device = HeadlessDevice::new(1, 1);
            let mut scene = demo::build_scene(&mut device, &scene.options())?;
            scene
                .graph
                .update_absolute_transforms(glam::Mat4::IDENTITY);
            println!("{}", SceneInspector::summary(&scene));
            print!("{}", SceneInspector::render_tree(&scene));
        }
        Commands::Gpu {
            scene,
            width,
            height,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            let mut device = WgpuDevice::new_headless(width, height)?;
            let mut renderer = ForwardRenderer::new(&mut device, config);
            let mut scene = demo::build_scene(&mut device, &scene.options())?;
            if let Some(skybox) = scene.skybox.as_mut() {
                let sky = TextureData::solid(1, 1, config.clear_color.to_rgba8());
                skybox.texture = Some(std::rc::Rc::new(vista_device::Texture::upload(
                    &mut device,
                    &sky,
                )));
            }

            let mut frame = renderer.frame(&mut device)?;
            frame.draw_scene(&mut scene)?;
            drop(frame);
            let encoded = device.submit();
            let pixels = device.read_backbuffer()?;

            let (w, h) = device.backbuffer_size();
            let center = pixels
                .get((h / 2 * w.max(1) + w / 2) as usize)
                .copied()
                .unwrap_or_default();
            println!("{}", renderer.statistics());
            println!(
                "encoded draws={encoded} pipelines={} center pixel=#{:02x}{:02x}{:02x}{:02x}",
                device.pipeline_count(),
                center[0],
                center[1],
                center[2],
                center[3]
            );
        }
    }

    Ok(())
}
