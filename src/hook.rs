use macroquad::prelude::*;
use ::rand::Rng;

use crate::bounds::Bounds;
use crate::config;
use crate::water::WaterSurface;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HookEvent {
    /// The hook broke the surface at `x`.
    Splash { x: f32, intensity: f32 },
}

/// A thrown hook and its flight bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hook {
    pub pos: Vec2,
    pub vel: Vec2,
    was_underwater: bool,
    submersions: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HookState {
    Idle,
    InFlight(Hook),
}

impl HookState {
    pub fn visual_pos(&self) -> Option<Vec2> {
        match self {
            HookState::Idle => None,
            HookState::InFlight(hook) => Some(hook.visual_pos()),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, HookState::InFlight(_))
    }
}

impl Hook {
    pub fn launch(from: Vec2, rng: &mut impl Rng) -> Self {
        Self::with_velocity(from, random_throw_velocity(rng))
    }

    pub fn with_velocity(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            was_underwater: false,
            submersions: 0,
        }
    }

    pub fn visual_pos(&self) -> Vec2 {
        let (dx, dy) = config::HOOK_VISUAL_OFFSET;
        self.pos + vec2(dx, dy)
    }

    /// Where the fishing line ties on.
    pub fn string_anchor(&self) -> Vec2 {
        let (dx, dy) = config::HOOK_STRING_OFFSET;
        self.pos + vec2(dx, dy)
    }

    /// One frame of free flight: gravity in air, drag in water, walls, and surface entry.
    pub fn step_throw(&mut self, water: &WaterSurface, bounds: Bounds) -> Option<HookEvent> {
        self.pos += self.vel;

        let underwater = self.pos.y < water.height_at(self.pos.x);
        let entered = underwater && !self.was_underwater;
        self.was_underwater = underwater;

        let event = entered.then(|| HookEvent::Splash {
            x: self.visual_pos().x,
            intensity: self.vel.y.abs(),
        });

        if underwater {
            self.vel *= config::HOOK_SUBMERGED_DRAG;
        } else {
            self.vel.y -= config::HOOK_GRAVITY;
        }

        let right_wall = bounds.width - config::HOOK_VISUAL_OFFSET.0;
        if self.pos.x < 0.0 {
            self.vel.x = self.vel.x.abs();
        } else if self.pos.x > right_wall {
            self.vel.x = -self.vel.x.abs();
        }
        if self.pos.y > bounds.height {
            self.vel.y = -self.vel.y.abs();
        }
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = 0.0;
        }

        if entered {
            self.submersions += 1;
            if self.submersions == 1 {
                // Skip off the surface once.
                self.vel.y = -self.vel.y;
            } else {
                self.vel.x *= config::HOOK_ENTRY_DRAG;
                self.vel.y = -config::HOOK_SINK_SPEED;
            }
        }

        event
    }

    /// Move toward `target` at `speed`. Returns true once within the reel-back threshold.
    pub fn step_reel(&mut self, target: Vec2, speed: f32) -> bool {
        let to_target = target - self.pos;
        let dist = to_target.length();
        if dist < config::REEL_BACK_THRESHOLD {
            return true;
        }
        self.pos += to_target / dist * speed;
        self.vel = Vec2::ZERO;
        false
    }
}

/// Mostly horizontal throw with a magnitude in the configured range.
pub fn random_throw_velocity(rng: &mut impl Rng) -> Vec2 {
    let magnitude = rng.gen_range(config::HOOK_SPEED_MIN..=config::HOOK_SPEED_MAX);
    let vx = rng.gen_range(magnitude / 6.0..=5.0 * magnitude / 6.0);
    let vy = (magnitude * magnitude - vx * vx).max(0.0).sqrt();
    vec2(vx, vy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaterConfig;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn flat_water() -> WaterSurface {
        WaterSurface::new(
            1000.0,
            400.0,
            WaterConfig {
                noise: 0.0,
                ..WaterConfig::default()
            },
        )
        .unwrap()
    }

    fn bounds() -> Bounds {
        Bounds::new(1000.0, 800.0)
    }

    #[test]
    fn throw_velocity_is_mostly_forward() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..500 {
            let v = random_throw_velocity(&mut rng);
            let magnitude = v.length();
            assert!(magnitude >= 8.0 - 1e-3 && magnitude <= 30.0 + 1e-3);
            assert!(v.x >= magnitude / 6.0 - 1e-3);
            assert!(v.x <= 5.0 * magnitude / 6.0 + 1e-3);
            assert!(v.y >= 0.0);
        }
    }

    #[test]
    fn first_entry_splashes_and_skips() {
        let water = flat_water();
        let mut hook = Hook::with_velocity(vec2(300.0, 405.0), vec2(4.0, -10.0));
        let event = hook.step_throw(&water, bounds());

        assert_eq!(
            event,
            Some(HookEvent::Splash {
                x: 304.0 + config::HOOK_VISUAL_OFFSET.0,
                intensity: 10.0
            })
        );
        assert_eq!(hook.submersions, 1);
        assert!(hook.vel.y > 0.0);
    }

    #[test]
    fn second_entry_sinks_at_fixed_speed() {
        let water = flat_water();
        let mut hook = Hook::with_velocity(vec2(300.0, 405.0), vec2(4.0, -10.0));
        hook.step_throw(&water, bounds());

        let mut splashes = 1;
        for _ in 0..200 {
            if hook.step_throw(&water, bounds()).is_some() {
                splashes += 1;
            }
            if hook.submersions == 2 {
                break;
            }
        }
        assert_eq!(splashes, 2);
        assert_eq!(hook.vel.y, -config::HOOK_SINK_SPEED);

        // Stays down: drag only, no gravity, no more splashes.
        for _ in 0..100 {
            assert_eq!(hook.step_throw(&water, bounds()), None);
        }
        assert!(hook.pos.y < 400.0);
        assert!(hook.pos.y >= 0.0);
    }

    #[test]
    fn walls_reflect_and_floor_clamps() {
        let water = flat_water();

        let mut hook = Hook::with_velocity(vec2(2.0, 600.0), vec2(-5.0, 0.0));
        hook.step_throw(&water, bounds());
        assert!(hook.vel.x > 0.0);

        let mut hook = Hook::with_velocity(vec2(500.0, 795.0), vec2(0.0, 10.0));
        hook.step_throw(&water, bounds());
        assert!(hook.vel.y < 0.0);

        let mut hook = Hook::with_velocity(vec2(500.0, 3.0), vec2(0.0, -10.0));
        hook.was_underwater = true;
        hook.step_throw(&water, bounds());
        assert_eq!(hook.pos.y, 0.0);
        assert_eq!(hook.vel.y, 0.0);
    }

    #[test]
    fn reel_moves_toward_target_until_close() {
        let mut hook = Hook::with_velocity(vec2(0.0, 0.0), vec2(3.0, 3.0));
        let target = vec2(30.0, 40.0);
        assert!(!hook.step_reel(target, 3.0));
        assert!((hook.pos - vec2(1.8, 2.4)).length() < 1e-4);

        let mut steps = 0;
        while !hook.step_reel(target, 3.0) {
            steps += 1;
            assert!(steps < 100);
        }
        assert!(hook.pos.distance(target) < config::REEL_BACK_THRESHOLD);
    }

    #[test]
    fn idle_hook_has_no_visual_position() {
        assert_eq!(HookState::Idle.visual_pos(), None);
        let hook = Hook::with_velocity(vec2(10.0, 20.0), Vec2::ZERO);
        assert_eq!(
            HookState::InFlight(hook).visual_pos(),
            Some(vec2(18.0, 28.0))
        );
    }
}
