use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::SceneError;

/// Weather kinds reported to renderers and the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weather {
    /// Sentinel before the starting weather is set.
    None,
    Clear,
    Rainy,
    Stormy,
    Transition,
}

impl Weather {
    pub const SETTLED: [Weather; 3] = [Weather::Clear, Weather::Rainy, Weather::Stormy];

    pub fn is_settled(self) -> bool {
        matches!(self, Weather::Clear | Weather::Rainy | Weather::Stormy)
    }

    pub fn name(self) -> &'static str {
        match self {
            Weather::None => "None",
            Weather::Clear => "Clear",
            Weather::Rainy => "Rainy",
            Weather::Stormy => "Stormy",
            Weather::Transition => "Transition",
        }
    }

    pub fn parse_cli(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "clear" | "sunny" => Some(Weather::Clear),
            "rain" | "rainy" => Some(Weather::Rainy),
            "storm" | "stormy" => Some(Weather::Stormy),
            _ => None,
        }
    }

    // The shade tables only cover settled kinds; the sentinels read as clear sky.
    fn cloud_shade(self) -> f32 {
        match self {
            Weather::Rainy => 0.8,
            Weather::Stormy => 0.5,
            _ => 1.0,
        }
    }

    fn ocean_shade(self) -> f32 {
        match self {
            Weather::Rainy => 0.75,
            Weather::Stormy => 0.5,
            _ => 1.0,
        }
    }

    fn rain_intensity(self) -> f32 {
        match self {
            Weather::Rainy => 1.0,
            Weather::Stormy => 2.5,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum WeatherPhase {
    Unset,
    Steady(Weather),
    Transition {
        from: Weather,
        to: Weather,
        started_at: f64,
        /// Elapsed fraction as of the last tick, in [0, 1].
        progress: f32,
    },
}

/// Scene weather with timed linear transitions between settled kinds.
#[derive(Clone, Debug)]
pub struct WeatherState {
    phase: WeatherPhase,
    transition_secs: f64,
}

impl Default for WeatherState {
    fn default() -> Self {
        Self::new(config::WEATHER_TRANSITION_SECS)
    }
}

impl WeatherState {
    pub fn new(transition_secs: f64) -> Self {
        Self {
            phase: WeatherPhase::Unset,
            transition_secs,
        }
    }

    /// Set the initial weather. Only valid once, before anything else.
    pub fn set_starting(&mut self, weather: Weather) -> Result<(), SceneError> {
        if self.phase != WeatherPhase::Unset {
            return Err(SceneError::WeatherAlreadySet);
        }
        if !weather.is_settled() {
            return Err(SceneError::InvalidStartingWeather(weather));
        }
        self.phase = WeatherPhase::Steady(weather);
        Ok(())
    }

    pub fn start_transition_to(&mut self, weather: Weather, now: f64) {
        if !weather.is_settled() {
            log::warn!("ignoring transition to {}", weather.name());
            return;
        }
        // A transition interrupted mid-way restarts from its previous target.
        let from = match self.phase {
            WeatherPhase::Unset => weather,
            WeatherPhase::Steady(current) => current,
            WeatherPhase::Transition { to, .. } => to,
        };
        log::info!("weather turning {} -> {}", from.name(), weather.name());
        self.phase = WeatherPhase::Transition {
            from,
            to: weather,
            started_at: now,
            progress: 0.0,
        };
    }

    pub fn tick(&mut self, now: f64) {
        let WeatherPhase::Transition {
            from,
            to,
            started_at,
            ..
        } = self.phase
        else {
            return;
        };
        let elapsed = now - started_at;
        self.phase = if elapsed >= self.transition_secs {
            WeatherPhase::Steady(to)
        } else {
            WeatherPhase::Transition {
                from,
                to,
                started_at,
                progress: self.progress_for(elapsed),
            }
        };
    }

    pub fn current_weather(&self) -> Weather {
        match self.phase {
            WeatherPhase::Unset => Weather::None,
            WeatherPhase::Steady(weather) => weather,
            WeatherPhase::Transition { .. } => Weather::Transition,
        }
    }

    /// The settled weather being moved toward, or the current one.
    pub fn target_weather(&self) -> Weather {
        match self.phase {
            WeatherPhase::Unset => Weather::None,
            WeatherPhase::Steady(weather) => weather,
            WeatherPhase::Transition { to, .. } => to,
        }
    }

    pub fn transition_progress(&self) -> Option<f32> {
        match self.phase {
            WeatherPhase::Transition { progress, .. } => Some(progress),
            _ => None,
        }
    }

    /// Shades read the progress stored by the last `tick`, so they only move when the
    /// clock does. A transition started since then reads as its `from` shade.
    pub fn cloud_shade(&self) -> f32 {
        self.interpolate(Weather::cloud_shade)
    }

    pub fn ocean_shade(&self) -> f32 {
        self.interpolate(Weather::ocean_shade)
    }

    /// Relative rain rate; 0 means no rain.
    pub fn rain_intensity(&self) -> f32 {
        self.interpolate(Weather::rain_intensity)
    }

    pub fn is_stormy(&self) -> bool {
        self.current_weather() == Weather::Stormy
    }

    fn progress_for(&self, elapsed: f64) -> f32 {
        if self.transition_secs <= 0.0 {
            return 1.0;
        }
        (elapsed / self.transition_secs).clamp(0.0, 1.0) as f32
    }

    fn interpolate(&self, table: fn(Weather) -> f32) -> f32 {
        match self.phase {
            WeatherPhase::Unset => table(Weather::None),
            WeatherPhase::Steady(weather) => table(weather),
            WeatherPhase::Transition {
                from, to, progress, ..
            } => table(from) + (table(to) - table(from)) * progress,
        }
    }
}
