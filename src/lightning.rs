use macroquad::prelude::*;
use ::rand::Rng;

use crate::config::LIGHTNING_FADE_SECS;

const BRANCH_CHANCE: f64 = 0.3;
const BRANCH_LENGTH_SCALE: f32 = 0.7;
const BRANCH_MAX_ANGLE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
    /// 1.0 for the main channel, halved on each branch.
    pub intensity: f32,
}

/// A single fading bolt from the sky down to the water.
#[derive(Clone, Debug)]
pub struct LightningBolt {
    pub segments: Vec<Segment>,
    pub target: Vec2,
    pub struck_at: f64,
}

impl LightningBolt {
    pub fn strike(origin: Vec2, target: Vec2, passes: usize, now: f64, rng: &mut impl Rng) -> Self {
        Self {
            segments: subdivide(origin, target, passes, rng),
            target,
            struck_at: now,
        }
    }

    /// Opacity in [0, 1], fading linearly after the strike.
    pub fn alpha(&self, now: f64) -> f32 {
        let elapsed = (now - self.struck_at).max(0.0);
        (1.0 - elapsed / LIGHTNING_FADE_SECS).clamp(0.0, 1.0) as f32
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.struck_at >= LIGHTNING_FADE_SECS
    }

    pub fn draw(&self, now: f64) {
        let alpha = self.alpha(now);
        if alpha <= 0.0 {
            return;
        }
        for seg in &self.segments {
            let a = alpha * seg.intensity;
            draw_line(
                seg.start.x,
                seg.start.y,
                seg.end.x,
                seg.end.y,
                5.0 * seg.intensity,
                Color::new(0.6, 0.7, 1.0, a * 0.35),
            );
            draw_line(
                seg.start.x,
                seg.start.y,
                seg.end.x,
                seg.end.y,
                1.5 * seg.intensity.max(0.5),
                Color::new(1.0, 1.0, 1.0, a),
            );
        }
        // Glow where the bolt meets the water.
        draw_circle(
            self.target.x,
            self.target.y,
            18.0 * alpha,
            Color::new(0.8, 0.85, 1.0, alpha * 0.4),
        );
    }
}

/// Midpoint displacement with occasional forks.
pub fn subdivide(origin: Vec2, target: Vec2, passes: usize, rng: &mut impl Rng) -> Vec<Segment> {
    let mut segments = vec![Segment {
        start: origin,
        end: target,
        intensity: 1.0,
    }];
    let mut offset = origin.distance(target) * 0.5;

    for _ in 0..passes {
        let mut next = Vec::with_capacity(segments.len() * 3);
        for seg in &segments {
            let along = seg.end - seg.start;
            let normal = along.perp().normalize_or_zero();
            let mid = (seg.start + seg.end) * 0.5 + normal * rng.gen_range(-offset..=offset);

            next.push(Segment {
                start: seg.start,
                end: mid,
                intensity: seg.intensity,
            });
            next.push(Segment {
                start: mid,
                end: seg.end,
                intensity: seg.intensity,
            });

            if rng.gen_bool(BRANCH_CHANCE) {
                let angle = rng.gen_range(-BRANCH_MAX_ANGLE..=BRANCH_MAX_ANGLE);
                let dir = Vec2::from_angle(angle).rotate(mid - seg.start);
                next.push(Segment {
                    start: mid,
                    end: mid + dir * BRANCH_LENGTH_SCALE,
                    intensity: seg.intensity * 0.5,
                });
            }
        }
        segments = next;
        offset *= 0.5;
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn main_channel_stays_connected() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let origin = vec2(400.0, 800.0);
        let target = vec2(420.0, 400.0);
        let segments = subdivide(origin, target, 6, &mut rng);

        let main: Vec<_> = segments.iter().filter(|s| s.intensity == 1.0).collect();
        assert_eq!(main.len(), 64);
        assert_eq!(main[0].start, origin);
        assert_eq!(main[main.len() - 1].end, target);
        for pair in main.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(segments.iter().all(|s| s.start.is_finite() && s.end.is_finite()));
    }

    #[test]
    fn bolt_fades_out() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let bolt = LightningBolt::strike(vec2(0.0, 100.0), vec2(0.0, 0.0), 4, 10.0, &mut rng);
        assert_eq!(bolt.alpha(10.0), 1.0);
        assert!((bolt.alpha(10.25) - 0.5).abs() < 1e-4);
        assert!(!bolt.is_expired(10.4));
        assert!(bolt.is_expired(10.5));
        assert_eq!(bolt.alpha(11.0), 0.0);
    }
}
