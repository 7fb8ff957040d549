//! Strangewave - audio-reactive strange attractors, headless host
//!
//! Runs the frame loop at a fixed rate, logs frame rate and band levels, and
//! optionally writes PNG snapshots of the attractor and surface clouds.

use std::error::Error;
use std::thread;
use std::time::Instant;

use clap::Parser;

use strangewave::attractor;
use strangewave::audio::{CaptureSource, CaptureStatus};
use strangewave::cli::Args;
use strangewave::engine::{FrameReport, Visualizer, VisualizerConfig};
use strangewave::fps::FrameRateMeter;
use strangewave::params::SnapshotConfig;
use strangewave::snapshot::{self, CloudLayer, SurfaceLayer};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        print_library();
        return Ok(());
    }

    let source = args.capture_source()?;
    let params = args.initial_params()?;

    let mut vis = Visualizer::new(VisualizerConfig {
        surface: args.surface_config(),
        audio_source: source.clone().unwrap_or(CaptureSource::Microphone),
        ..VisualizerConfig::default()
    });
    vis.select_attractor(&args.attractor, params.as_ref())?;

    if let Some(mesh) = args.mesh() {
        vis.set_mesh(mesh);
    }
    if source.is_some() {
        if let Err(e) = vis.set_audio_enabled(true) {
            log::warn!("Audio disabled: {}", e);
        }
    }

    let snapshots = args.snapshot_config();
    let interval = args.frame_interval();
    let frames = args.frame_budget();
    log::info!("Running {} frames at {} fps", frames, args.fps);

    let mut meter = FrameRateMeter::default();
    let mut last_status = vis.audio_status();
    let mut last_frame = Instant::now();

    for frame in 0..frames {
        let frame_start = Instant::now();
        let dt = frame_start.duration_since(last_frame).as_secs_f32();
        last_frame = frame_start;

        let report = vis.tick(dt);

        let status = vis.audio_status();
        if status != last_status {
            log_status(status.as_ref());
            last_status = status;
        }

        if let Some(fps) = meter.frame(Instant::now()) {
            let bands = report.bands;
            log::info!(
                "{} fps | bass {:.2} mid {:.2} high {:.2} volume {:.2} | surface {}",
                fps,
                bands.bass,
                bands.mid,
                bands.high,
                bands.volume,
                report.surface_particles
            );
        }

        if let Some(config) = &snapshots {
            if frame % config.every_n_frames == 0 {
                write_snapshot(&vis, &report, config, frame);
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }

    vis.set_audio_enabled(false)?;
    Ok(())
}

fn print_library() {
    for def in attractor::definitions() {
        let params: Vec<String> = def
            .params
            .iter()
            .map(|p| format!("{}={}", p.key, p.default))
            .collect();
        println!("{:<22} {} - {}", def.key, def.name, def.description);
        if !params.is_empty() {
            println!("{:<22} params: {}", "", params.join(" "));
        }
        for preset in def.presets {
            println!("{:<22} preset: {}", "", preset.name);
        }
    }
}

fn log_status(status: Option<&CaptureStatus>) {
    match status {
        Some(CaptureStatus::Running {
            source,
            sample_rate,
        }) => log::info!("Audio running: {} @ {}Hz", source, sample_rate),
        Some(CaptureStatus::Failed(e)) => log::warn!("{}; continuing without audio", e),
        Some(CaptureStatus::Pending) => log::info!("Waiting for audio capture..."),
        Some(CaptureStatus::Stopped) | None => {}
    }
}

fn write_snapshot(vis: &Visualizer, report: &FrameReport, config: &SnapshotConfig, frame: u64) {
    let cloud = CloudLayer {
        buffer: vis.cloud(),
        rotation: vis.view_rotation(),
        point_size: report.point_size,
        opacity: config.style.opacity,
    };
    let surface = vis.surface_particles().map(|set| SurfaceLayer {
        set,
        point_size: report.surface_point_size,
        opacity: vis.surface_config().particle_opacity,
    });

    let image = snapshot::render(&cloud, surface.as_ref(), config);
    if let Err(e) = snapshot::save_png(&image, &config.frame_path(frame)) {
        log::error!("{}", e);
    }
}
