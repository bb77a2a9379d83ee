use std::fmt;

use macroquad::prelude::*;
use ::rand::seq::SliceRandom;
use ::rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::bounds::Bounds;
use crate::clouds::CloudLayer;
use crate::config::{self, SceneConfig};
use crate::droplets::DropletSystem;
use crate::error::SceneError;
use crate::fish::{Fish, FishBehavior, FishContext, FishEvent, FishId, Species};
use crate::hook::{Hook, HookEvent, HookState};
use crate::lightning::LightningBolt;
use crate::water::WaterSurface;
use crate::weather::{Weather, WeatherState};

/// Hook lifecycle. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Delay,
    ThrowHook,
    ReelIn,
    SwitchShip,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Delay,
        Phase::ThrowHook,
        Phase::ReelIn,
        Phase::SwitchShip,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Delay => "Delay",
            Phase::ThrowHook => "ThrowHook",
            Phase::ReelIn => "ReelIn",
            Phase::SwitchShip => "SwitchShip",
        }
    }
}

/// Per-species catch counters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatchLog {
    per_species: [u32; config::FISH_SPECIES_COUNT],
    total: u32,
}

impl CatchLog {
    pub fn record(&mut self, species: Species) {
        self.per_species[species.index()] += 1;
        self.total += 1;
    }

    pub fn count(&self, species: Species) -> u32 {
        self.per_species[species.index()]
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, u32)> + '_ {
        Species::ALL.iter().map(move |&s| (s, self.count(s)))
    }
}

/// Things that happened during the most recent tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEvent {
    PhaseChanged { from: Phase, to: Phase },
    Splash { x: f32, intensity: f32 },
    FishCaught { species: Species },
    BoatUpgraded { tier: usize },
    FishSpawned { id: FishId },
    DespawnStarted { id: FishId },
    FishDespawned { id: FishId },
    LightningStrike { x: f32 },
    WeatherChanging { to: Weather },
}

impl fmt::Display for SceneEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneEvent::PhaseChanged { from, to } => {
                write!(f, "phase {} -> {}", from.name(), to.name())
            }
            SceneEvent::Splash { x, intensity } => write!(f, "splash at x={x:.0} ({intensity:.1})"),
            SceneEvent::FishCaught { species } => write!(f, "caught a {}", species.name()),
            SceneEvent::BoatUpgraded { tier } => write!(f, "boat upgraded to tier {tier}"),
            SceneEvent::FishSpawned { id } => write!(f, "fish {id} spawned"),
            SceneEvent::DespawnStarted { id } => write!(f, "fish {id} swimming out"),
            SceneEvent::FishDespawned { id } => write!(f, "fish {id} gone"),
            SceneEvent::LightningStrike { x } => write!(f, "lightning at x={x:.0}"),
            SceneEvent::WeatherChanging { to } => write!(f, "weather turning {}", to.name()),
        }
    }
}

pub struct Scene {
    pub water: WaterSurface,
    pub weather: WeatherState,
    pub fish: Vec<Fish>,
    pub droplets: DropletSystem,
    pub clouds: CloudLayer,
    pub lightning: Vec<LightningBolt>,
    pub events: Vec<SceneEvent>,
    pub rng: ChaCha8Rng,
    pub tick_count: u64,
    pub paused: bool,
    pub show_headings: bool,
    config: SceneConfig,
    bounds: Bounds,
    clock: f64,
    phase: Phase,
    phase_started_at: f64,
    hook: HookState,
    catches: CatchLog,
    boat_tier: usize,
    previous_boat_tier: Option<usize>,
    next_fish_id: FishId,
    despawning: Option<FishId>,
    fish_cycle_started_at: f64,
    next_weather_change_at: f64,
    next_lightning_at: Option<f64>,
    rain_accumulator: f32,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let bounds = Bounds::new(config.width, config.height);
        let water_level = config.water_level();
        let water = WaterSurface::new(config.width, water_level, config.water.clone())?;

        let mut weather = WeatherState::default();
        let starting = match config.starting_weather {
            Some(weather) => weather,
            None => *Weather::SETTLED.choose(&mut rng).unwrap_or(&Weather::Clear),
        };
        weather.set_starting(starting)?;

        let clouds = CloudLayer::new(bounds, water_level, &mut rng);
        let next_weather_change_at =
            rng.gen_range(config::WEATHER_CHANGE_MIN_SECS..=config::WEATHER_CHANGE_MAX_SECS);
        let fish_count = rng.gen_range(config.initial_fish_min..=config.initial_fish_max);

        let mut scene = Self {
            water,
            weather,
            fish: Vec::with_capacity(fish_count),
            droplets: DropletSystem::new(),
            clouds,
            lightning: Vec::new(),
            events: Vec::new(),
            rng,
            tick_count: 0,
            paused: false,
            show_headings: false,
            config,
            bounds,
            clock: 0.0,
            phase: Phase::Delay,
            phase_started_at: 0.0,
            hook: HookState::Idle,
            catches: CatchLog::default(),
            boat_tier: 0,
            previous_boat_tier: None,
            next_fish_id: 0,
            despawning: None,
            fish_cycle_started_at: 0.0,
            next_weather_change_at,
            next_lightning_at: None,
            rain_accumulator: 0.0,
        };

        for _ in 0..fish_count {
            let x = scene.rng.gen_range(0.0..=scene.bounds.width);
            let y = scene.random_fish_depth();
            scene.add_fish(vec2(x, y));
        }

        log::info!(
            "scene ready: {}x{} canvas, {} water points, {} fish, {} skies",
            scene.bounds.width,
            scene.bounds.height,
            scene.water.len(),
            scene.fish.len(),
            starting.name()
        );
        Ok(scene)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn hook(&self) -> &HookState {
        &self.hook
    }

    pub fn visual_hook_pos(&self) -> Option<Vec2> {
        self.hook.visual_pos()
    }

    pub fn catches(&self) -> &CatchLog {
        &self.catches
    }

    pub fn boat_tier(&self) -> usize {
        self.boat_tier
    }

    pub fn previous_boat_tier(&self) -> Option<usize> {
        self.previous_boat_tier
    }

    pub fn despawning(&self) -> Option<FishId> {
        self.despawning
    }

    /// Cross-fade progress while switching boats.
    pub fn switch_progress(&self) -> Option<f32> {
        if self.phase != Phase::SwitchShip {
            return None;
        }
        let secs = self.config.switch_ship_secs;
        if secs <= 0.0 {
            return Some(1.0);
        }
        Some(((self.clock - self.phase_started_at) / secs).clamp(0.0, 1.0) as f32)
    }

    /// Brightest live lightning flash, 0 when the sky is calm.
    pub fn flash(&self) -> f32 {
        self.lightning
            .iter()
            .map(|bolt| bolt.alpha(self.clock))
            .fold(0.0, f32::max)
    }

    pub fn boat_pos(&self) -> Vec2 {
        self.boat_pos_for(self.boat_tier)
    }

    /// Boat rides the water at a fixed control point.
    pub fn boat_pos_for(&self, tier: usize) -> Vec2 {
        let anchor = self.water.point_position(config::BOAT_ANCHOR_INDEX);
        let (dx, dy) = config::BOAT_OFFSETS[tier.min(config::BOAT_TIER_COUNT - 1)];
        anchor + vec2(dx, dy)
    }

    pub fn fisher_pos(&self) -> Vec2 {
        let (dx, dy) = config::FISHER_OFFSETS[self.boat_tier.min(config::BOAT_TIER_COUNT - 1)];
        self.boat_pos() + vec2(dx, dy)
    }

    pub fn fish_context(&self) -> FishContext {
        FishContext {
            hook: self.hook.visual_pos(),
            phase: self.phase,
            bounds: self.bounds,
        }
    }

    pub fn tick(&mut self) {
        self.clock += config::FIXED_DT as f64;
        let now = self.clock;
        self.events.clear();

        // Water and sky
        self.water.integrate(&mut self.rng);
        self.weather.tick(now);
        self.update_weather_timer(now);
        self.clouds
            .update(self.bounds, self.water.rest_level(), &mut self.rng);

        // Hook first so hooked fish see where it is now
        self.advance_phase(now);

        // Fish
        self.animate_fish();
        self.run_fish_cycle(now);

        // Rain, lightning and spray
        self.spawn_rain();
        self.update_lightning(now);
        for x in self.droplets.update(&self.water, self.bounds) {
            self.water.perturb(x, config::RAIN_IMPACT);
        }

        self.tick_count += 1;
    }

    /// A fish has taken the hook. Only meaningful while throwing.
    pub fn notify_on_hook(&mut self) {
        if self.phase == Phase::ThrowHook {
            self.set_phase(Phase::ReelIn, self.clock);
        }
    }

    pub fn change_weather(&mut self, weather: Weather) {
        if !weather.is_settled() {
            return;
        }
        self.weather.start_transition_to(weather, self.clock);
        self.events.push(SceneEvent::WeatherChanging { to: weather });
    }

    /// Debug: lift every free-swimming fish to just under the surface.
    pub fn elevate_fish(&mut self) {
        for fish in &mut self.fish {
            let surface = self.water.height_at(fish.position().x);
            fish.elevate_to(surface - 20.0);
        }
        log::debug!("elevated {} fish", self.fish.len());
    }

    /// Send a fish off-screen. Returns false if it does not exist or cannot leave now.
    pub fn begin_despawn(&mut self, id: FishId) -> bool {
        let Some(fish) = self.fish.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        if fish.on_hook() {
            return false;
        }
        fish.begin_despawn();
        self.despawning = Some(id);
        self.events.push(SceneEvent::DespawnStarted { id });
        log::debug!("fish {id} heading out");
        true
    }

    pub fn spawn_offscreen_fish(&mut self) -> FishId {
        let pos = self.random_offscreen_pos();
        let id = self.add_fish(pos);
        self.events.push(SceneEvent::FishSpawned { id });
        log::debug!("fish {id} spawned at x={:.0}", pos.x);
        id
    }

    fn add_fish(&mut self, pos: Vec2) -> FishId {
        let fish = self.new_fish(pos);
        let id = fish.id;
        self.fish.push(fish);
        id
    }

    fn new_fish(&mut self, pos: Vec2) -> Fish {
        let id = self.next_fish_id;
        self.next_fish_id += 1;
        let species = Species::random(&mut self.rng);
        let mut fish = Fish::new(id, species, pos, &mut self.rng);
        if !self.bounds.contains(pos) {
            fish.face(self.bounds.center());
        }
        fish
    }

    fn random_fish_depth(&mut self) -> f32 {
        let deepest = self.water.rest_level() * config::FISH_SPAWN_DEPTH_FRAC;
        self.rng.gen_range(0.0..=deepest.max(0.0))
    }

    fn random_offscreen_pos(&mut self) -> Vec2 {
        let x = if self.rng.gen_bool(0.5) {
            -config::FISH_SPAWN_OFFSCREEN
        } else {
            self.bounds.width + config::FISH_SPAWN_OFFSCREEN
        };
        vec2(x, self.random_fish_depth())
    }

    fn animate_fish(&mut self) {
        let ctx = self.fish_context();
        let mut took_hook = false;
        for fish in &mut self.fish {
            if let Some(FishEvent::TookHook) = fish.animate(&ctx, &mut self.rng) {
                took_hook = true;
            }
        }
        if took_hook {
            self.notify_on_hook();
        }
    }

    fn run_fish_cycle(&mut self, now: f64) {
        if let Some(id) = self.despawning {
            let bounds = self.bounds;
            match self.fish.iter().position(|f| f.id == id) {
                Some(idx)
                    if bounds.is_past_side(self.fish[idx].position(), config::FISH_DESPAWN_MARGIN) =>
                {
                    self.fish.remove(idx);
                    self.finish_despawn(now);
                    self.events.push(SceneEvent::FishDespawned { id });
                    log::debug!("fish {id} left, {} remain", self.fish.len());
                    self.refill_population();
                }
                Some(_) => {}
                None => self.finish_despawn(now),
            }
            return;
        }

        if now - self.fish_cycle_started_at < self.config.fish_spawn_interval {
            return;
        }
        self.fish_cycle_started_at = now;

        let leavers: Vec<FishId> = self
            .fish
            .iter()
            .filter(|f| matches!(f.behavior(), FishBehavior::Swim | FishBehavior::PursueHook))
            .map(|f| f.id)
            .collect();
        let spawn = if leavers.is_empty() {
            true
        } else if self.fish.len() >= config::MAX_FISH_POPULATION {
            false
        } else {
            self.rng.gen_bool(0.5)
        };

        if spawn {
            self.spawn_offscreen_fish();
        } else if let Some(&id) = leavers.choose(&mut self.rng) {
            self.begin_despawn(id);
        }
    }

    fn finish_despawn(&mut self, now: f64) {
        self.despawning = None;
        self.fish_cycle_started_at = now;
    }

    fn refill_population(&mut self) {
        if self.fish.len() >= config::MIN_FISH_POPULATION {
            return;
        }
        let burst =
            self.rng.gen_range(config::REPLACEMENT_BURST_MIN..=config::REPLACEMENT_BURST_MAX);
        for _ in 0..burst {
            self.spawn_offscreen_fish();
        }
        log::debug!("population low, spawned {burst} replacements");
    }

    fn set_phase(&mut self, next: Phase, now: f64) {
        let from = self.phase;
        self.phase = next;
        self.phase_started_at = now;
        match next {
            Phase::Delay | Phase::SwitchShip => self.hook = HookState::Idle,
            Phase::ThrowHook => {
                let hook = Hook::launch(self.fisher_pos(), &mut self.rng);
                self.hook = HookState::InFlight(hook);
            }
            Phase::ReelIn => {}
        }
        log::debug!("phase {} -> {}", from.name(), next.name());
        self.events.push(SceneEvent::PhaseChanged { from, to: next });
    }

    fn advance_phase(&mut self, now: f64) {
        let elapsed = now - self.phase_started_at;
        match self.phase {
            Phase::Delay => {
                if elapsed >= self.config.delay_secs {
                    self.set_phase(Phase::ThrowHook, now);
                }
            }
            Phase::ThrowHook => self.step_thrown_hook(),
            Phase::ReelIn => self.step_reel_in(now, elapsed),
            Phase::SwitchShip => {
                if elapsed >= self.config.switch_ship_secs {
                    self.set_phase(Phase::Delay, now);
                }
            }
        }
    }

    fn step_thrown_hook(&mut self) {
        let event = match &mut self.hook {
            HookState::InFlight(hook) => hook.step_throw(&self.water, self.bounds),
            HookState::Idle => None,
        };
        if let Some(HookEvent::Splash { x, intensity }) = event {
            self.splash(x, intensity);
        }
    }

    fn step_reel_in(&mut self, now: f64, elapsed: f64) {
        let ramp = (elapsed / config::REEL_RAMP_SECS).min(1.0) as f32;
        let speed = config::REEL_MAX_SPEED * ramp;
        let fisher = self.fisher_pos();
        let reeled = match &mut self.hook {
            HookState::InFlight(hook) => hook.step_reel(fisher, speed),
            HookState::Idle => true,
        };
        if reeled {
            self.land_catch(now);
        }
    }

    fn land_catch(&mut self, now: f64) {
        let hooked: Vec<usize> = self
            .fish
            .iter()
            .enumerate()
            .filter(|(_, f)| f.on_hook())
            .map(|(idx, _)| idx)
            .collect();

        for &idx in &hooked {
            let species = self.fish[idx].species();
            self.catches.record(species);
            self.events.push(SceneEvent::FishCaught { species });
            log::info!(
                "caught a {} ({} total)",
                species.name(),
                self.catches.total()
            );
            let pos = self.random_offscreen_pos();
            let fresh = self.new_fish(pos);
            self.fish[idx] = fresh;
        }

        let next = if !hooked.is_empty() && self.milestone_reached() {
            self.upgrade_boat();
            Phase::SwitchShip
        } else {
            Phase::Delay
        };
        self.set_phase(next, now);
    }

    fn milestone_reached(&self) -> bool {
        config::BOAT_TIER_MILESTONES
            .get(self.boat_tier)
            .is_some_and(|&milestone| self.catches.total() >= milestone)
    }

    fn upgrade_boat(&mut self) {
        self.previous_boat_tier = Some(self.boat_tier);
        self.boat_tier += 1;
        self.events.push(SceneEvent::BoatUpgraded {
            tier: self.boat_tier,
        });
        log::info!(
            "boat upgraded to tier {} after {} catches",
            self.boat_tier,
            self.catches.total()
        );
    }

    fn splash(&mut self, x: f32, intensity: f32) {
        self.water.perturb(x, intensity);
        let surface = vec2(x, self.water.height_at(x));
        let shade = self.weather.ocean_shade();
        let color = Color::new(0.75 * shade, 0.88 * shade, 1.0 * shade, 0.9);
        self.droplets
            .emit_splash(surface, intensity, color, &mut self.rng);
        self.events.push(SceneEvent::Splash { x, intensity });
    }

    fn update_weather_timer(&mut self, now: f64) {
        if now < self.next_weather_change_at {
            return;
        }
        let current = self.weather.target_weather();
        let choices: Vec<Weather> = Weather::SETTLED
            .iter()
            .copied()
            .filter(|&w| w != current)
            .collect();
        if let Some(&next) = choices.choose(&mut self.rng) {
            self.change_weather(next);
        }
        self.next_weather_change_at = now
            + self
                .rng
                .gen_range(config::WEATHER_CHANGE_MIN_SECS..=config::WEATHER_CHANGE_MAX_SECS);
    }

    fn spawn_rain(&mut self) {
        let intensity = self.weather.rain_intensity();
        if intensity <= 0.0 {
            self.rain_accumulator = 0.0;
            return;
        }
        self.rain_accumulator += intensity * config::RAIN_DROPS_PER_TICK;
        while self.rain_accumulator >= 1.0 {
            self.droplets.emit_rain(self.bounds, &mut self.rng);
            self.rain_accumulator -= 1.0;
        }
    }

    fn update_lightning(&mut self, now: f64) {
        self.lightning.retain(|bolt| !bolt.is_expired(now));
        if !self.weather.is_stormy() {
            self.next_lightning_at = None;
            return;
        }
        let due = match self.next_lightning_at {
            Some(at) => at,
            None => {
                let at = now + self.lightning_gap();
                self.next_lightning_at = Some(at);
                at
            }
        };
        if now >= due {
            self.strike_lightning();
            self.next_lightning_at = Some(now + self.lightning_gap());
        }
    }

    fn lightning_gap(&mut self) -> f64 {
        self.rng
            .gen_range(config::LIGHTNING_MIN_SECS..=config::LIGHTNING_MAX_SECS)
    }

    pub fn strike_lightning(&mut self) {
        let now = self.clock;
        let x = self.rng.gen_range(0.0..=self.bounds.width);
        let target = vec2(x, self.water.height_at(x));
        let origin = vec2(x + self.rng.gen_range(-80.0..=80.0), self.bounds.height);
        let bolt = LightningBolt::strike(origin, target, config::LIGHTNING_PASSES, now, &mut self.rng);
        self.lightning.push(bolt);
        self.water.perturb(x, -config::LIGHTNING_KICK);
        self.events.push(SceneEvent::LightningStrike { x });
        log::debug!("lightning at x={x:.0}");
    }
}
