// All tunable scene constants in one place.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::weather::Weather;

// Canvas
pub const CANVAS_WIDTH: f32 = 1280.0;
pub const CANVAS_HEIGHT: f32 = 800.0;
pub const WATER_LEVEL_FRAC: f32 = 0.5;

// Simulation
pub const FIXED_DT: f32 = 1.0 / 30.0;

// Water mesh
pub const WATER_SPACING: f32 = 20.0;
pub const WATER_ACCEL_SPEED: f32 = 0.05;
pub const WATER_DAMPENING: f32 = 0.95;
pub const WATER_RETURN_COEFF: f32 = 1.0;
pub const WATER_NOISE: f32 = 0.2;
pub const WATER_MAX_CONTROL_POINTS: usize = 100_000;

// Fish
pub const FISH_SPECIES_COUNT: usize = 8;
pub const FISH_MAX_SPEED: f32 = 5.0;
pub const FISH_SPEED_FLOOR: f32 = 0.6;
pub const FISH_SPEED_DECAY: f32 = 0.99;
pub const FISH_SWIM_SPEED_MIN: f32 = 1.0;
pub const FISH_SWIM_SPEED_MAX: f32 = 3.0;
pub const FISH_SWIM_OUT_SPEED_MIN: f32 = 2.0;
pub const FISH_SWIM_OUT_SPEED_MAX: f32 = 4.0;
pub const FISH_SWIM_IN_THRESHOLD: f32 = 100.0;
pub const FISH_VARIANCE_INTERVAL: u32 = 600;
pub const FISH_VARIANCE_JITTER: i32 = 30;
pub const FISH_GO_FOR_HOOK_DISTANCE: f32 = 150.0;
pub const FISH_ON_HOOK_THRESHOLD: f32 = 10.0;
pub const FISH_TURN_SPEED: f32 = 3.0;
pub const FISH_EXCITED_ACCEL: f32 = 0.05;
pub const FISH_SNAP_TURN_ANGLE: f32 = 100.0;

// Fish population
pub const INITIAL_FISH_MIN: usize = 5;
pub const INITIAL_FISH_MAX: usize = 20;
pub const FISH_SPAWN_INTERVAL: f64 = 10.0;
pub const FISH_SPAWN_OFFSCREEN: f32 = 50.0;
pub const FISH_SPAWN_DEPTH_FRAC: f32 = 0.8;
pub const FISH_DESPAWN_MARGIN: f32 = 60.0;
pub const MIN_FISH_POPULATION: usize = 3;
pub const MAX_FISH_POPULATION: usize = 40;
pub const REPLACEMENT_BURST_MIN: usize = 2;
pub const REPLACEMENT_BURST_MAX: usize = 5;

// Phases
pub const DELAY_SECS: f64 = 1.0;
pub const SWITCH_SHIP_SECS: f64 = 3.0;
pub const REEL_RAMP_SECS: f64 = 2.0;
pub const REEL_MAX_SPEED: f32 = 3.0;
pub const REEL_BACK_THRESHOLD: f32 = 5.0;

// Hook
pub const HOOK_SPEED_MIN: f32 = 8.0;
pub const HOOK_SPEED_MAX: f32 = 30.0;
pub const HOOK_GRAVITY: f32 = 0.5;
pub const HOOK_SUBMERGED_DRAG: f32 = 0.97;
pub const HOOK_ENTRY_DRAG: f32 = 0.9;
pub const HOOK_SINK_SPEED: f32 = 7.0;
pub const HOOK_VISUAL_OFFSET: (f32, f32) = (8.0, 8.0);
pub const HOOK_STRING_OFFSET: (f32, f32) = (8.0, 12.0);

// Boat tiers: sailboat, galleon, galleon with insignia
pub const BOAT_TIER_COUNT: usize = 3;
pub const BOAT_ANCHOR_INDEX: usize = 10;
pub const BOAT_OFFSETS: [(f32, f32); BOAT_TIER_COUNT] = [(0.0, -25.0), (0.0, -25.0), (0.0, -25.0)];
pub const FISHER_OFFSETS: [(f32, f32); BOAT_TIER_COUNT] = [(75.0, 30.0), (220.0, 50.0), (220.0, 50.0)];
pub const BOAT_TIER_MILESTONES: [u32; BOAT_TIER_COUNT - 1] = [10, 20];

// Weather
pub const WEATHER_TRANSITION_SECS: f64 = 5.0;
pub const WEATHER_CHANGE_MIN_SECS: f64 = 40.0;
pub const WEATHER_CHANGE_MAX_SECS: f64 = 80.0;
pub const RAIN_DROPS_PER_TICK: f32 = 2.0;
pub const RAIN_IMPACT: f32 = 0.4;
pub const RAIN_FALL_SPEED: f32 = 10.0;
pub const LIGHTNING_MIN_SECS: f64 = 3.0;
pub const LIGHTNING_MAX_SECS: f64 = 9.0;
pub const LIGHTNING_KICK: f32 = 15.0;
pub const LIGHTNING_FADE_SECS: f64 = 0.5;
pub const LIGHTNING_PASSES: usize = 6;

// Droplets
pub const MAX_DROPLETS: usize = 600;
pub const DROPLET_GRAVITY: f32 = 1.0;
pub const DROPLET_SIZE: f32 = 5.0;
pub const SPLASH_DROPLETS_MIN: usize = 8;
pub const SPLASH_DROPLETS_MAX: usize = 14;

// Clouds
pub const CLOUD_COUNT_MIN: usize = 7;
pub const CLOUD_COUNT_MAX: usize = 12;
pub const CLOUD_RECYCLE_X: f32 = -200.0;
pub const CLOUD_MIN_BRIGHTNESS: f32 = 0.7;

/// Spring mesh coefficients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub spacing: f32,
    pub accel_speed: f32,
    pub dampening: f32,
    pub return_coeff: f32,
    /// Half-width of the uniform per-tick acceleration noise.
    pub noise: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            spacing: WATER_SPACING,
            accel_speed: WATER_ACCEL_SPEED,
            dampening: WATER_DAMPENING,
            return_coeff: WATER_RETURN_COEFF,
            noise: WATER_NOISE,
        }
    }
}

/// Runtime-tunable scene parameters, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: f32,
    pub height: f32,
    pub water: WaterConfig,
    pub initial_fish_min: usize,
    pub initial_fish_max: usize,
    pub delay_secs: f64,
    pub switch_ship_secs: f64,
    pub fish_spawn_interval: f64,
    pub starting_weather: Option<Weather>,
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            water: WaterConfig::default(),
            initial_fish_min: INITIAL_FISH_MIN,
            initial_fish_max: INITIAL_FISH_MAX,
            delay_secs: DELAY_SECS,
            switch_ship_secs: SWITCH_SHIP_SECS,
            fish_spawn_interval: FISH_SPAWN_INTERVAL,
            starting_weather: None,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SceneConfig =
            serde_json::from_str(&text).map_err(|source| SceneError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn water_level(&self) -> f32 {
        self.height * WATER_LEVEL_FRAC
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(SceneError::InvalidCanvas {
                width: self.width,
                height: self.height,
            });
        }
        if self.initial_fish_min > self.initial_fish_max {
            return Err(SceneError::InvalidFishRange {
                min: self.initial_fish_min,
                max: self.initial_fish_max,
            });
        }
        for (name, value) in [
            ("delay_secs", self.delay_secs),
            ("switch_ship_secs", self.switch_ship_secs),
            ("fish_spawn_interval", self.fish_spawn_interval),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SceneError::InvalidDuration { name, value });
            }
        }
        self.water.validate(self.width)
    }
}

impl WaterConfig {
    pub fn validate(&self, width: f32) -> Result<(), SceneError> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(SceneError::InvalidSpacing(self.spacing));
        }
        self.control_point_count(width)?;
        check_coefficient("accel_speed", self.accel_speed, 0.0, 1.0)?;
        check_coefficient("dampening", self.dampening, 0.0, 1.0)?;
        check_coefficient("return_coeff", self.return_coeff, 0.0, f32::MAX)?;
        check_coefficient("noise", self.noise, 0.0, f32::MAX)?;
        Ok(())
    }

    /// `floor(width / spacing) + 1`, refused when the mesh would be degenerate or huge.
    pub fn control_point_count(&self, width: f32) -> Result<usize, SceneError> {
        let ratio = (width as f64 / self.spacing as f64).floor();
        if !ratio.is_finite() || ratio >= WATER_MAX_CONTROL_POINTS as f64 {
            return Err(SceneError::TooManyControlPoints {
                width,
                spacing: self.spacing,
            });
        }
        let points = (ratio.max(0.0) as usize)
            .checked_add(1)
            .ok_or(SceneError::TooManyControlPoints {
                width,
                spacing: self.spacing,
            })?;
        if points < 2 {
            return Err(SceneError::TooFewControlPoints(points));
        }
        Ok(points)
    }
}

fn check_coefficient(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), SceneError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(SceneError::InvalidCoefficient { name, value })
    }
}
