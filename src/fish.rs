use macroquad::prelude::*;
use ::rand::Rng;
use serde::Serialize;

use crate::bounds::Bounds;
use crate::config;
use crate::scene::Phase;

pub type FishId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Species {
    Simple,
    Barrango,
    ChromisViridis,
    Clownfish,
    Ghost,
    Minnow,
    RedOrange,
    YellowWavy,
}

impl Species {
    pub const ALL: [Species; config::FISH_SPECIES_COUNT] = [
        Species::Simple,
        Species::Barrango,
        Species::ChromisViridis,
        Species::Clownfish,
        Species::Ghost,
        Species::Minnow,
        Species::RedOrange,
        Species::YellowWavy,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::Simple => "Simple",
            Species::Barrango => "Barrango",
            Species::ChromisViridis => "Chromis viridis",
            Species::Clownfish => "Clownfish",
            Species::Ghost => "Ghost",
            Species::Minnow => "Minnow",
            Species::RedOrange => "Red-orange",
            Species::YellowWavy => "Yellow wavy",
        }
    }

    pub fn body_color(self) -> Color {
        match self {
            Species::Simple => Color::new(0.85, 0.85, 0.9, 1.0),
            Species::Barrango => Color::new(0.45, 0.55, 0.35, 1.0),
            Species::ChromisViridis => Color::new(0.35, 0.85, 0.75, 1.0),
            Species::Clownfish => Color::new(0.98, 0.5, 0.1, 1.0),
            Species::Ghost => Color::new(0.9, 0.95, 1.0, 0.55),
            Species::Minnow => Color::new(0.6, 0.62, 0.55, 1.0),
            Species::RedOrange => Color::new(0.9, 0.25, 0.15, 1.0),
            Species::YellowWavy => Color::new(0.98, 0.85, 0.2, 1.0),
        }
    }

    pub fn stripe_color(self) -> Option<Color> {
        match self {
            Species::Clownfish => Some(WHITE),
            Species::YellowWavy => Some(Color::new(0.55, 0.35, 0.05, 1.0)),
            Species::Barrango => Some(Color::new(0.25, 0.3, 0.2, 1.0)),
            _ => None,
        }
    }

    /// Body length in world units.
    pub fn length(self) -> f32 {
        match self {
            Species::Minnow => 22.0,
            Species::ChromisViridis | Species::Clownfish => 28.0,
            Species::Barrango => 40.0,
            _ => 32.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FishBehavior {
    Swim,
    PursueHook,
    OnHook,
    SwimOut,
}

/// Read-only view of the scene handed to each fish every frame.
#[derive(Clone, Copy, Debug)]
pub struct FishContext {
    /// Visual hook position, if a hook is in the water or air.
    pub hook: Option<Vec2>,
    pub phase: Phase,
    pub bounds: Bounds,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FishEvent {
    /// The fish bit and is now riding the hook.
    TookHook,
}

#[derive(Clone, Debug)]
pub struct Fish {
    pub id: FishId,
    species: Species,
    pos: Vec2,
    prev_pos: Vec2,
    /// Degrees, counter-clockwise from +x, in [0, 360).
    rotation: f32,
    speed: f32,
    behavior: FishBehavior,
    variance_interval: u32,
    variance_timer: u32,
}

impl Fish {
    pub fn new(id: FishId, species: Species, pos: Vec2, rng: &mut impl Rng) -> Self {
        let variance_interval = (config::FISH_VARIANCE_INTERVAL as i32
            + rng.gen_range(-config::FISH_VARIANCE_JITTER..=config::FISH_VARIANCE_JITTER))
            as u32;
        Self {
            id,
            species,
            pos,
            prev_pos: pos,
            rotation: 0.0,
            speed: 1.0,
            behavior: FishBehavior::Swim,
            variance_interval,
            variance_timer: rng.gen_range(0..=variance_interval),
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn position(&self) -> Vec2 {
        self.pos
    }

    /// Position blended between the last two ticks for rendering.
    pub fn interpolated_position(&self, alpha: f32) -> Vec2 {
        self.prev_pos.lerp(self.pos, alpha.clamp(0.0, 1.0))
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn behavior(&self) -> FishBehavior {
        self.behavior
    }

    pub fn on_hook(&self) -> bool {
        self.behavior == FishBehavior::OnHook
    }

    /// Facing the left half of the circle.
    pub fn is_flipped(&self) -> bool {
        !faces_right(self.rotation)
    }

    pub fn heading(&self) -> Vec2 {
        Vec2::from_angle(self.rotation.to_radians())
    }

    /// Send the fish off-screen; the scene removes it once it has left.
    pub fn begin_despawn(&mut self) {
        self.face_horizontal();
        self.behavior = FishBehavior::SwimOut;
    }

    /// Point straight at `target`.
    pub fn face(&mut self, target: Vec2) {
        if let Some(bearing) = bearing_degrees(target - self.pos) {
            self.rotation = bearing;
        }
    }

    #[cfg(test)]
    pub(crate) fn force_behavior(&mut self, behavior: FishBehavior) {
        self.behavior = behavior;
    }

    /// Debug helper: lift a free-swimming fish to `y`.
    pub fn elevate_to(&mut self, y: f32) {
        if matches!(self.behavior, FishBehavior::Swim | FishBehavior::PursueHook) {
            self.pos.y = y;
            self.prev_pos = self.pos;
        }
    }

    pub fn animate(&mut self, ctx: &FishContext, rng: &mut impl Rng) -> Option<FishEvent> {
        self.prev_pos = self.pos;
        if self.behavior != FishBehavior::OnHook {
            self.pos += self.heading() * self.speed.abs();
        }

        match self.behavior {
            FishBehavior::OnHook => {
                if let Some(hook) = ctx.hook {
                    self.pos = hook;
                }
                None
            }
            FishBehavior::PursueHook => {
                let Some(hook) = ctx.hook else {
                    self.behavior = FishBehavior::Swim;
                    self.face_horizontal();
                    return None;
                };
                self.steer_toward(hook);
                self.check_hook(ctx)
            }
            FishBehavior::Swim => {
                self.wander(ctx, rng);
                self.check_hook(ctx)
            }
            FishBehavior::SwimOut => {
                self.decay_speed(
                    rng,
                    config::FISH_SWIM_OUT_SPEED_MIN,
                    config::FISH_SWIM_OUT_SPEED_MAX,
                );
                self.cap_speed();
                None
            }
        }
    }

    fn wander(&mut self, ctx: &FishContext, rng: &mut impl Rng) {
        self.variance_timer += 1;
        if self.variance_timer >= self.variance_interval {
            self.variance_timer = 0;
            self.vary_speed(rng.gen_range(-1.0..=1.0));
        }

        if self.decay_speed(rng, config::FISH_SWIM_SPEED_MIN, config::FISH_SWIM_SPEED_MAX) {
            self.rotation = self.pick_heading(ctx, rng);
        }
        self.cap_speed();
    }

    /// Nudge speed by `delta`; a fish pushed below zero turns around instead of swimming backwards.
    fn vary_speed(&mut self, delta: f32) {
        self.speed += delta;
        if self.speed < 0.0 {
            self.speed = -self.speed;
            self.rotate_by(180.0);
        }
    }

    /// Geometric slowdown; re-rolls from `[min, max]` below the floor. Returns true on re-roll.
    fn decay_speed(&mut self, rng: &mut impl Rng, min: f32, max: f32) -> bool {
        self.speed *= config::FISH_SPEED_DECAY;
        if self.speed < config::FISH_SPEED_FLOOR {
            self.speed = rng.gen_range(min..=max);
            return true;
        }
        false
    }

    fn cap_speed(&mut self) {
        if self.speed.abs() > config::FISH_MAX_SPEED {
            self.speed = config::FISH_MAX_SPEED;
        }
    }

    fn pick_heading(&self, ctx: &FishContext, rng: &mut impl Rng) -> f32 {
        let threshold = config::FISH_SWIM_IN_THRESHOLD;
        if self.pos.x < threshold {
            return 0.0;
        }
        if self.pos.x > ctx.bounds.width - threshold {
            return 180.0;
        }
        // 1/5 right, 1/5 left, 3/5 toward the hook (or canvas center).
        match rng.gen_range(1..=5) {
            1 => 0.0,
            2 => 180.0,
            _ => {
                let target_x = ctx.hook.map_or(ctx.bounds.width * 0.5, |hook| hook.x);
                if target_x - self.pos.x > 0.0 {
                    0.0
                } else {
                    180.0
                }
            }
        }
    }

    fn steer_toward(&mut self, target: Vec2) {
        let Some(bearing) = bearing_degrees(target - self.pos) else {
            return;
        };
        let diff = angular_difference(bearing, self.rotation);
        let turn = config::FISH_TURN_SPEED;

        if diff < turn {
            // Lined up: dart forward.
            self.speed += config::FISH_EXCITED_ACCEL;
            self.speed *= config::FISH_SPEED_DECAY;
        } else if diff > config::FISH_SNAP_TURN_ANGLE {
            self.rotate_by(180.0);
        } else if wrap_degrees(bearing - self.rotation) < 180.0 {
            self.rotate_by(turn);
        } else {
            self.rotate_by(-turn);
        }
    }

    fn check_hook(&mut self, ctx: &FishContext) -> Option<FishEvent> {
        if ctx.phase != Phase::ThrowHook {
            if self.behavior == FishBehavior::PursueHook {
                self.behavior = FishBehavior::Swim;
            }
            return None;
        }

        match (self.behavior, ctx.hook) {
            (FishBehavior::Swim, Some(hook)) => {
                if self.pos.distance(hook) < config::FISH_GO_FOR_HOOK_DISTANCE {
                    self.behavior = FishBehavior::PursueHook;
                }
                None
            }
            (FishBehavior::PursueHook, None) => {
                self.behavior = FishBehavior::Swim;
                self.face_horizontal();
                None
            }
            (FishBehavior::PursueHook, Some(hook)) => {
                let dist = self.pos.distance(hook);
                if dist > config::FISH_GO_FOR_HOOK_DISTANCE {
                    self.behavior = FishBehavior::Swim;
                    self.face_horizontal();
                    None
                } else if dist < config::FISH_ON_HOOK_THRESHOLD {
                    self.behavior = FishBehavior::OnHook;
                    self.pos = hook;
                    Some(FishEvent::TookHook)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn face_horizontal(&mut self) {
        self.rotation = if faces_right(self.rotation) { 0.0 } else { 180.0 };
    }

    fn rotate_by(&mut self, degrees: f32) {
        self.rotation = wrap_degrees(self.rotation + degrees);
    }
}

fn faces_right(rotation: f32) -> bool {
    rotation < 90.0 || rotation > 270.0
}

/// Normalize into [0, 360).
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Direction of `delta` in degrees within [0, 360). None for a zero or non-finite vector.
pub fn bearing_degrees(delta: Vec2) -> Option<f32> {
    if !delta.is_finite() || delta == Vec2::ZERO {
        return None;
    }
    Some(wrap_degrees(delta.y.atan2(delta.x).to_degrees()))
}

/// Unsigned shortest angle between two headings, in [0, 180].
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn test_fish(pos: Vec2, rotation: f32, speed: f32, behavior: FishBehavior) -> Fish {
        let mut fish = Fish::new(1, Species::Clownfish, pos, &mut rng());
        fish.rotation = rotation;
        fish.speed = speed;
        fish.behavior = behavior;
        fish.variance_timer = 0;
        fish.variance_interval = 600;
        fish
    }

    fn ctx(hook: Option<Vec2>, phase: Phase) -> FishContext {
        FishContext {
            hook,
            phase,
            bounds: Bounds::new(1000.0, 800.0),
        }
    }

    #[test]
    fn bearing_wraps_into_full_circle() {
        assert_eq!(bearing_degrees(vec2(3.0, 0.0)), Some(0.0));
        assert!((bearing_degrees(vec2(0.0, 5.0)).unwrap() - 90.0).abs() < 1e-4);
        assert!((bearing_degrees(vec2(-1.0, -1.0)).unwrap() - 225.0).abs() < 1e-4);
        assert!((bearing_degrees(vec2(0.0, -2.0)).unwrap() - 270.0).abs() < 1e-4);
        assert!((bearing_degrees(vec2(-4.0, 0.0)).unwrap() - 180.0).abs() < 1e-4);
        assert_eq!(bearing_degrees(Vec2::ZERO), None);
        assert_eq!(bearing_degrees(vec2(f32::NAN, 1.0)), None);
    }

    #[test]
    fn angular_difference_takes_short_way_round() {
        assert_eq!(angular_difference(350.0, 10.0), 20.0);
        assert_eq!(angular_difference(10.0, 350.0), 20.0);
        assert_eq!(angular_difference(90.0, 270.0), 180.0);
        assert_eq!(wrap_degrees(-3.0), 357.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
    }

    #[test]
    fn negative_speed_variance_turns_the_fish_around() {
        let mut fish = test_fish(vec2(500.0, 200.0), 30.0, 0.2, FishBehavior::Swim);
        fish.vary_speed(-1.0);
        assert!((fish.speed() - 0.8).abs() < 1e-6);
        assert_eq!(fish.rotation(), 210.0);

        fish.vary_speed(0.5);
        assert!((fish.speed() - 1.3).abs() < 1e-6);
        assert_eq!(fish.rotation(), 210.0);
    }

    #[test]
    fn variance_tick_never_leaves_speed_negative() {
        let mut turned = 0;
        for seed in 0..200 {
            let mut fish = test_fish(vec2(500.0, 200.0), 30.0, 0.01, FishBehavior::Swim);
            fish.variance_timer = fish.variance_interval - 1;
            fish.animate(
                &ctx(None, Phase::Delay),
                &mut ChaCha8Rng::seed_from_u64(seed),
            );
            assert!(fish.speed() >= 0.0, "seed {seed} left speed {}", fish.speed());
            if fish.rotation() == 210.0 {
                turned += 1;
            }
        }
        // A big enough negative nudge survives the decay floor with the heading reversed.
        assert!(turned > 0);
    }

    #[test]
    fn swimming_fish_goes_for_nearby_hook_only_while_throwing() {
        let hook = Some(vec2(600.0, 200.0));

        let mut fish = test_fish(vec2(500.0, 200.0), 0.0, 1.0, FishBehavior::Swim);
        fish.animate(&ctx(hook, Phase::Delay), &mut rng());
        assert_eq!(fish.behavior(), FishBehavior::Swim);

        fish.animate(&ctx(hook, Phase::ThrowHook), &mut rng());
        assert_eq!(fish.behavior(), FishBehavior::PursueHook);
    }

    #[test]
    fn pursuit_ends_when_phase_leaves_throw_hook() {
        let mut fish = test_fish(vec2(500.0, 200.0), 45.0, 1.0, FishBehavior::PursueHook);
        for phase in [Phase::ReelIn, Phase::Delay, Phase::SwitchShip] {
            fish.behavior = FishBehavior::PursueHook;
            fish.animate(&ctx(Some(vec2(560.0, 260.0)), phase), &mut rng());
            assert_eq!(fish.behavior(), FishBehavior::Swim);
        }
    }

    #[test]
    fn pursuit_ends_when_hook_vanishes() {
        let mut fish = test_fish(vec2(500.0, 200.0), 200.0, 1.0, FishBehavior::PursueHook);
        fish.animate(&ctx(None, Phase::ThrowHook), &mut rng());
        assert_eq!(fish.behavior(), FishBehavior::Swim);
        assert_eq!(fish.rotation(), 180.0);
    }

    #[test]
    fn pursuit_ends_when_hook_drifts_away() {
        let mut fish = test_fish(vec2(500.0, 200.0), 30.0, 1.0, FishBehavior::PursueHook);
        fish.animate(&ctx(Some(vec2(700.0, 200.0)), Phase::ThrowHook), &mut rng());
        assert_eq!(fish.behavior(), FishBehavior::Swim);
        assert_eq!(fish.rotation(), 0.0);
    }

    #[test]
    fn reaching_the_hook_reports_a_bite() {
        let mut fish = test_fish(vec2(500.0, 200.0), 0.0, 1.0, FishBehavior::PursueHook);
        let event = fish.animate(&ctx(Some(vec2(505.0, 200.0)), Phase::ThrowHook), &mut rng());
        assert_eq!(event, Some(FishEvent::TookHook));
        assert!(fish.on_hook());
        assert_eq!(fish.position(), vec2(505.0, 200.0));
    }

    #[test]
    fn hooked_fish_tracks_hook_exactly() {
        let mut fish = test_fish(vec2(500.0, 200.0), 0.0, 4.0, FishBehavior::OnHook);
        let mut rng = rng();
        for step in 0..50 {
            let hook = vec2(500.0 - step as f32 * 7.3, 200.0 + step as f32 * 2.1);
            let event = fish.animate(&ctx(Some(hook), Phase::ReelIn), &mut rng);
            assert_eq!(event, None);
            assert_eq!(fish.position(), hook);
            assert!(fish.on_hook());
        }
    }

    #[test]
    fn hook_behind_triggers_snap_turn() {
        let mut fish = test_fish(vec2(500.0, 200.0), 0.0, 1.0, FishBehavior::PursueHook);
        fish.animate(&ctx(Some(vec2(420.0, 200.0)), Phase::ThrowHook), &mut rng());
        assert_eq!(fish.rotation(), 180.0);
        assert_eq!(fish.behavior(), FishBehavior::PursueHook);
    }

    #[test]
    fn turns_the_short_way_toward_hook() {
        // Hook up and to the right: counter-clockwise.
        let mut fish = test_fish(vec2(500.0, 200.0), 0.0, 0.0, FishBehavior::PursueHook);
        fish.animate(&ctx(Some(vec2(560.0, 260.0)), Phase::ThrowHook), &mut rng());
        assert_eq!(fish.rotation(), 3.0);

        // Hook down and to the right: clockwise through zero.
        let mut fish = test_fish(vec2(500.0, 200.0), 0.0, 0.0, FishBehavior::PursueHook);
        fish.animate(&ctx(Some(vec2(560.0, 140.0)), Phase::ThrowHook), &mut rng());
        assert_eq!(fish.rotation(), 357.0);
    }

    #[test]
    fn aligned_fish_speeds_up() {
        let mut fish = test_fish(vec2(500.0, 200.0), 0.0, 2.0, FishBehavior::PursueHook);
        fish.animate(&ctx(Some(vec2(600.0, 200.0)), Phase::ThrowHook), &mut rng());
        assert!((fish.speed() - 2.05 * 0.99).abs() < 1e-5);
        assert_eq!(fish.rotation(), 0.0);
    }

    #[test]
    fn slow_fish_near_left_edge_swims_inward() {
        let mut fish = test_fish(vec2(50.0, 200.0), 180.0, 0.5, FishBehavior::Swim);
        fish.animate(&ctx(None, Phase::Delay), &mut rng());
        assert_eq!(fish.rotation(), 0.0);
        assert!((1.0..=3.0).contains(&fish.speed()));

        let mut fish = test_fish(vec2(950.0, 200.0), 0.0, 0.5, FishBehavior::Swim);
        fish.animate(&ctx(None, Phase::Delay), &mut rng());
        assert_eq!(fish.rotation(), 180.0);
    }

    #[test]
    fn despawning_fish_ignores_the_hook() {
        let mut fish = test_fish(vec2(500.0, 200.0), 120.0, 1.0, FishBehavior::Swim);
        fish.begin_despawn();
        assert_eq!(fish.rotation(), 180.0);

        let mut rng = rng();
        for _ in 0..100 {
            let event = fish.animate(&ctx(Some(fish.position()), Phase::ThrowHook), &mut rng);
            assert_eq!(event, None);
            assert_eq!(fish.behavior(), FishBehavior::SwimOut);
        }
        assert!(fish.position().x < 500.0);
        assert!((fish.position().y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn wandering_keeps_state_finite_and_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut fish = Fish::new(3, Species::Minnow, vec2(500.0, 150.0), &mut rng);
        let context = ctx(Some(vec2(300.0, 100.0)), Phase::Delay);
        for _ in 0..5000 {
            fish.animate(&context, &mut rng);
            assert!(fish.position().is_finite());
            assert!((0.0..360.0).contains(&fish.rotation()));
            assert!(fish.speed() >= 0.0 && fish.speed() <= config::FISH_MAX_SPEED);
        }
    }

    #[test]
    fn pursuing_eventually_returns_to_swim_outside_throw_phase() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut fish = test_fish(vec2(400.0, 200.0), 90.0, 2.0, FishBehavior::PursueHook);
        let context = ctx(Some(vec2(450.0, 250.0)), Phase::ReelIn);
        let mut ticks = 0;
        while fish.behavior() == FishBehavior::PursueHook {
            fish.animate(&context, &mut rng);
            ticks += 1;
            assert!(ticks < 10);
        }
        assert_eq!(fish.behavior(), FishBehavior::Swim);
    }
}
