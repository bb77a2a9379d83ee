use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use macroquad::prelude::*;

mod bounds;
mod clouds;
mod config;
mod droplets;
mod error;
mod fish;
mod hook;
mod lightning;
mod renderer;
mod report;
mod scene;
mod ui;
mod water;
mod weather;

use config::SceneConfig;
use scene::Scene;
use ui::UiState;
use weather::Weather;

#[derive(Parser, Debug)]
#[command(name = "tidewater", about = "A fishing boat on a spring-mesh ocean")]
struct Args {
    /// JSON scene config; missing fields fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<f32>,

    #[arg(long)]
    height: Option<f32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Starting weather: clear, rainy or stormy
    #[arg(long, value_parser = parse_weather)]
    weather: Option<Weather>,

    /// Start paused
    #[arg(long)]
    paused: bool,

    /// Run this many ticks without a window and print a JSON report
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
}

fn parse_weather(value: &str) -> Result<Weather, String> {
    Weather::parse_cli(value)
        .ok_or_else(|| format!("unknown weather `{value}` (expected clear, rainy or stormy)"))
}

fn build_config(args: &Args) -> anyhow::Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.weather.is_some() {
        config.starting_weather = args.weather;
    }
    if let Err(e) = config.validate() {
        log::error!("rejected configuration: {e}");
        return Err(e.into());
    }
    Ok(config)
}

fn window_conf(config: &SceneConfig) -> Conf {
    Conf {
        window_title: "Tidewater".to_string(),
        window_width: config.width as i32,
        window_height: config.height as i32,
        window_resizable: true,
        ..Default::default()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = build_config(&args)?;

    if let Some(ticks) = args.headless {
        let mut scene = Scene::new(config).context("building headless scene")?;
        let report = report::run_headless(&mut scene, ticks);
        println!("{}", serde_json::to_string_pretty(&report)?);
        if report.overall_status != "PASS" {
            anyhow::bail!("headless run failed its checks");
        }
        return Ok(());
    }

    let mut scene = Scene::new(config.clone()).context("building scene")?;
    scene.paused = args.paused;
    macroquad::Window::from_config(window_conf(&config), run(scene, config));
    Ok(())
}

async fn run(mut scene: Scene, config: SceneConfig) {
    let mut accumulator = 0.0f64;
    let mut ui_state = UiState::default();
    let mut egui_wants_keyboard = false;
    let dt = config::FIXED_DT as f64;

    loop {
        if !egui_wants_keyboard {
            if is_key_pressed(KeyCode::Space) {
                scene.paused = !scene.paused;
            }
            if is_key_pressed(KeyCode::Enter) && scene.paused {
                ui_state.step_requested = true;
            }
            if is_key_pressed(KeyCode::R) {
                ui_state.rebuild_requested = true;
            }
            if is_key_pressed(KeyCode::E) {
                scene.elevate_fish();
            }
            if is_key_pressed(KeyCode::D) {
                scene.show_headings = !scene.show_headings;
            }
        }

        if ui_state.rebuild_requested {
            ui_state.rebuild_requested = false;
            match Scene::new(config.clone()) {
                Ok(fresh) => {
                    let paused = scene.paused;
                    let show_headings = scene.show_headings;
                    scene = fresh;
                    scene.paused = paused;
                    scene.show_headings = show_headings;
                    accumulator = 0.0;
                    log::info!("scene rebuilt");
                }
                Err(e) => log::error!("rebuild failed: {e}"),
            }
        }

        accumulator += (get_frame_time() as f64).min(0.1);
        if !scene.paused {
            while accumulator >= dt {
                scene.tick();
                accumulator -= dt;
            }
        } else {
            accumulator = 0.0;
            if ui_state.step_requested {
                scene.tick();
            }
        }
        ui_state.step_requested = false;

        let alpha = if !scene.paused {
            (accumulator / dt) as f32
        } else {
            1.0
        };

        renderer::draw(&scene, alpha);
        egui_wants_keyboard = ui::draw_ui(&mut scene, &mut ui_state);

        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_apply_over_defaults() {
        let args = Args::parse_from([
            "tidewater",
            "--width",
            "900",
            "--seed",
            "3",
            "--weather",
            "storm",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.width, 900.0);
        assert_eq!(config.height, config::CANVAS_HEIGHT);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.starting_weather, Some(Weather::Stormy));
    }

    #[test]
    fn cli_rejects_unknown_weather_and_bad_canvas() {
        assert!(Args::try_parse_from(["tidewater", "--weather", "foggy"]).is_err());

        let args = Args::parse_from(["tidewater", "--height", "0"]);
        assert!(build_config(&args).is_err());
    }
}
