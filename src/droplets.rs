use macroquad::prelude::*;
use ::rand::Rng;

use crate::bounds::Bounds;
use crate::config::{
    DROPLET_GRAVITY, DROPLET_SIZE, MAX_DROPLETS, RAIN_FALL_SPEED, SPLASH_DROPLETS_MAX,
    SPLASH_DROPLETS_MIN,
};
use crate::water::WaterSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropletKind {
    Splash,
    Rain,
}

#[derive(Clone, Copy, Debug)]
pub struct Droplet {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub color: Color,
    pub size: f32,
    pub kind: DropletKind,
}

/// Ballistic water drops: splash spray and rain.
pub struct DropletSystem {
    droplets: Vec<Droplet>,
}

impl Default for DropletSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DropletSystem {
    pub fn new() -> Self {
        Self {
            droplets: Vec::with_capacity(MAX_DROPLETS),
        }
    }

    /// Spray thrown up where something broke the surface.
    pub fn emit_splash(&mut self, pos: Vec2, intensity: f32, color: Color, rng: &mut impl Rng) {
        let count = rng.gen_range(SPLASH_DROPLETS_MIN..=SPLASH_DROPLETS_MAX);
        let lift = 2.0 + intensity.abs().min(30.0) * 0.25;
        for _ in 0..count {
            let velocity = vec2(rng.gen_range(-3.0..=3.0), lift * rng.gen_range(0.6..=1.2));
            self.push(Droplet {
                pos: pos + vec2(0.0, 1.0),
                velocity,
                color,
                size: DROPLET_SIZE * rng.gen_range(0.5..=1.0),
                kind: DropletKind::Splash,
            });
        }
    }

    /// One raindrop entering from the top edge.
    pub fn emit_rain(&mut self, bounds: Bounds, rng: &mut impl Rng) {
        self.push(Droplet {
            pos: vec2(rng.gen_range(0.0..=bounds.width), bounds.height),
            velocity: vec2(-0.8, -RAIN_FALL_SPEED * rng.gen_range(0.8..=1.2)),
            color: Color::new(0.75, 0.8, 0.9, 0.7),
            size: DROPLET_SIZE * 0.5,
            kind: DropletKind::Rain,
        });
    }

    fn push(&mut self, droplet: Droplet) {
        if self.droplets.len() >= MAX_DROPLETS {
            // Remove oldest droplet
            self.droplets.remove(0);
        }
        self.droplets.push(droplet);
    }

    /// Advance every droplet one frame. Returns the x of each raindrop that hit the water.
    pub fn update(&mut self, water: &WaterSurface, bounds: Bounds) -> Vec<f32> {
        let mut rain_impacts = Vec::new();
        self.droplets.retain_mut(|d| {
            d.pos += d.velocity;
            d.velocity.y -= DROPLET_GRAVITY;

            let outside = d.pos.x < 0.0 || d.pos.x > bounds.width || d.pos.y < 0.0;
            let landed = d.velocity.y < 0.0 && d.pos.y < water.height_at(d.pos.x);
            if landed && !outside && d.kind == DropletKind::Rain {
                rain_impacts.push(d.pos.x);
            }
            !(outside || landed)
        });
        rain_impacts
    }

    pub fn draw(&self) {
        for d in &self.droplets {
            match d.kind {
                DropletKind::Splash => draw_circle(d.pos.x, d.pos.y, d.size * 0.5, d.color),
                DropletKind::Rain => {
                    let tail = d.pos - d.velocity.normalize_or_zero() * d.size * 3.0;
                    draw_line(d.pos.x, d.pos.y, tail.x, tail.y, d.size * 0.5, d.color);
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Droplet> {
        self.droplets.iter()
    }

    pub fn count(&self) -> usize {
        self.droplets.len()
    }
}
