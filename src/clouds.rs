use macroquad::prelude::*;
use noise::{Fbm, NoiseFn, Perlin};
use ::rand::Rng;

use crate::bounds::Bounds;
use crate::config::{CLOUD_COUNT_MAX, CLOUD_COUNT_MIN, CLOUD_MIN_BRIGHTNESS, CLOUD_RECYCLE_X};

const BOB_AMPLITUDE: f32 = 6.0;
const BOB_RATE: f64 = 0.01;

/// One puff of a cloud, relative to the cloud's position.
#[derive(Clone, Copy, Debug)]
struct Puff {
    offset: Vec2,
    size: Vec2,
}

#[derive(Clone, Debug)]
pub struct Cloud {
    pub pos: Vec2,
    /// 0 is far away and dim, 1 is close and bright.
    pub depth: f32,
    puffs: Vec<Puff>,
    noise_lane: f64,
}

impl Cloud {
    fn new(pos: Vec2, rng: &mut impl Rng) -> Self {
        let puffs = (0..rng.gen_range(5..=10))
            .map(|_| Puff {
                offset: vec2(rng.gen_range(-50.0..=50.0), rng.gen_range(-20.0..=20.0)),
                size: vec2(rng.gen_range(60.0..=200.0), rng.gen_range(10.0..=50.0)),
            })
            .collect();
        Self {
            pos,
            depth: rng.gen_range(0.0..=1.0),
            puffs,
            noise_lane: rng.gen_range(0.0..1000.0),
        }
    }

    pub fn speed(&self) -> f32 {
        0.4 + 0.6 * self.depth
    }

    pub fn brightness(&self) -> f32 {
        self.depth * (1.0 - CLOUD_MIN_BRIGHTNESS) + CLOUD_MIN_BRIGHTNESS
    }
}

/// Drifting cloud deck above the water.
pub struct CloudLayer {
    clouds: Vec<Cloud>,
    fbm: Fbm<Perlin>,
    frames: u64,
}

impl CloudLayer {
    pub fn new(bounds: Bounds, water_level: f32, rng: &mut impl Rng) -> Self {
        let count = rng.gen_range(CLOUD_COUNT_MIN..=CLOUD_COUNT_MAX);
        let clouds = (1..=count)
            .map(|i| {
                let mut pos = random_cloud_pos(bounds, water_level, rng);
                pos.x = bounds.width * i as f32 / count as f32;
                Cloud::new(pos, rng)
            })
            .collect();
        Self {
            clouds,
            fbm: Fbm::new(rng.gen()),
            frames: 0,
        }
    }

    pub fn update(&mut self, bounds: Bounds, water_level: f32, rng: &mut impl Rng) {
        self.frames += 1;
        for cloud in &mut self.clouds {
            cloud.pos.x -= cloud.speed();
            if cloud.pos.x <= CLOUD_RECYCLE_X {
                *cloud = Cloud::new(random_cloud_pos(bounds, water_level, rng), rng);
            }
        }
    }

    /// Position with a slow vertical bob applied.
    pub fn display_pos(&self, cloud: &Cloud) -> Vec2 {
        let t = self.frames as f64 * BOB_RATE;
        let bob = self.fbm.get([cloud.noise_lane, t]) as f32;
        cloud.pos + vec2(0.0, bob * BOB_AMPLITUDE)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cloud> {
        self.clouds.iter()
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    /// Far clouds first so near ones overlap them.
    pub fn draw(&self, shade: f32) {
        let mut order: Vec<&Cloud> = self.clouds.iter().collect();
        order.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        for cloud in order {
            let center = self.display_pos(cloud);
            let v = cloud.brightness() * shade;
            let color = Color::new(v, v, v, 1.0);
            for puff in &cloud.puffs {
                let c = center + puff.offset + puff.size * 0.5;
                draw_ellipse(c.x, c.y, puff.size.x * 0.5, puff.size.y * 0.5, 0.0, color);
            }
        }
    }
}

fn random_cloud_pos(bounds: Bounds, water_level: f32, rng: &mut impl Rng) -> Vec2 {
    let low = (water_level * 1.5).min(bounds.height);
    vec2(bounds.width + 200.0, rng.gen_range(low..=bounds.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn clouds_start_spread_and_above_the_water() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let bounds = Bounds::new(1200.0, 800.0);
        let layer = CloudLayer::new(bounds, 400.0, &mut rng);

        assert!((CLOUD_COUNT_MIN..=CLOUD_COUNT_MAX).contains(&layer.len()));
        for cloud in layer.iter() {
            assert!(cloud.pos.x > 0.0 && cloud.pos.x <= 1200.0);
            assert!(cloud.pos.y >= 600.0 && cloud.pos.y <= 800.0);
            assert!((5..=10).contains(&cloud.puffs.len()));
            assert!(cloud.brightness() >= CLOUD_MIN_BRIGHTNESS && cloud.brightness() <= 1.0);
        }
    }

    #[test]
    fn clouds_recycle_off_the_left_edge() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let bounds = Bounds::new(400.0, 800.0);
        let mut layer = CloudLayer::new(bounds, 400.0, &mut rng);
        for _ in 0..5000 {
            layer.update(bounds, 400.0, &mut rng);
            for cloud in layer.iter() {
                assert!(cloud.pos.x > CLOUD_RECYCLE_X);
                let shown = layer.display_pos(cloud);
                assert!((shown.y - cloud.pos.y).abs() <= BOB_AMPLITUDE * 1.5);
            }
        }
    }
}
