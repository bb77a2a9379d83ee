use macroquad::prelude::*;

use crate::bounds::Bounds;
use crate::fish::{Fish, FishBehavior};
use crate::hook::HookState;
use crate::scene::{Phase, Scene};
use crate::water::WaterSurface;

const BG_COLOR: Color = Color::new(0.02, 0.03, 0.06, 1.0);
const SKY_COLOR: Color = Color::new(0.45, 0.7, 0.95, 1.0);
const WATER_COLOR: Color = Color::new(0.08, 0.35, 0.62, 1.0);
const HULL_COLOR: Color = Color::new(0.45, 0.28, 0.15, 1.0);
const SAIL_COLOR: Color = Color::new(0.95, 0.93, 0.85, 1.0);
const LINE_COLOR: Color = Color::new(0.9, 0.9, 0.9, 0.8);
const STRING_SEGMENTS: usize = 16;

/// Fit the canvas into the window, letterboxed, y-up.
pub fn scene_camera(bounds: Bounds) -> Camera2D {
    let scale = (screen_width() / bounds.width).min(screen_height() / bounds.height);
    let vw = bounds.width * scale;
    let vh = bounds.height * scale;
    Camera2D {
        target: bounds.center(),
        zoom: vec2(2.0 / bounds.width, 2.0 / bounds.height),
        viewport: Some((
            ((screen_width() - vw) * 0.5) as i32,
            ((screen_height() - vh) * 0.5) as i32,
            vw as i32,
            vh as i32,
        )),
        ..Default::default()
    }
}

/// Render one frame. `alpha` blends fish between the last two ticks.
pub fn draw(scene: &Scene, alpha: f32) {
    clear_background(BG_COLOR);
    set_camera(&scene_camera(scene.bounds()));

    let bounds = scene.bounds();
    let ocean = scene.weather.ocean_shade();

    draw_sky(bounds, scene.weather.cloud_shade(), scene.flash());
    scene.clouds.draw(scene.weather.cloud_shade());
    for bolt in &scene.lightning {
        bolt.draw(scene.clock());
    }

    draw_water_body(&scene.water, ocean, 1.0);
    for fish in &scene.fish {
        draw_fish(fish, alpha);
    }
    if scene.show_headings {
        draw_fish_headings(&scene.fish, alpha);
    }
    // Tint everything below the surface
    draw_water_body(&scene.water, ocean, 0.3);

    draw_boats(scene);
    draw_line_and_hook(scene);
    scene.droplets.draw();

    set_default_camera();
    draw_hud(scene);
}

fn draw_sky(bounds: Bounds, shade: f32, flash: f32) {
    let sky = Color::new(SKY_COLOR.r * shade, SKY_COLOR.g * shade, SKY_COLOR.b * shade, 1.0);
    let lit = lerp_color(sky, WHITE, flash * 0.6);
    draw_rectangle(0.0, 0.0, bounds.width, bounds.height, lit);
}

fn draw_water_body(water: &WaterSurface, shade: f32, opacity: f32) {
    let color = Color::new(
        WATER_COLOR.r * shade,
        WATER_COLOR.g * shade,
        WATER_COLOR.b * shade,
        opacity,
    );
    let points: Vec<Vec2> = water.points().collect();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        draw_triangle(a, b, vec2(b.x, 0.0), color);
        draw_triangle(a, vec2(b.x, 0.0), vec2(a.x, 0.0), color);
    }
    if opacity >= 1.0 {
        let crest = Color::new(0.8, 0.9, 1.0, 0.5);
        for pair in points.windows(2) {
            draw_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, 2.0, crest);
        }
    }
}

fn draw_fish(fish: &Fish, alpha: f32) {
    let species = fish.species();
    let pos = fish.interpolated_position(alpha);
    let len = species.length();
    let dir = fish.heading();
    // Keep the back up when swimming left.
    let up = if fish.is_flipped() {
        vec2(dir.y, -dir.x)
    } else {
        vec2(-dir.y, dir.x)
    };
    let body = species.body_color();

    let tail_root = pos - dir * len * 0.42;
    let tail_back = tail_root - dir * len * 0.28;
    draw_triangle(
        tail_root,
        tail_back + up * len * 0.22,
        tail_back - up * len * 0.22,
        body,
    );
    draw_triangle(
        pos + up * len * 0.15,
        pos + up * len * 0.32 - dir * len * 0.1,
        pos - dir * len * 0.2 + up * len * 0.12,
        body,
    );
    draw_ellipse(pos.x, pos.y, len * 0.5, len * 0.2, fish.rotation(), body);

    if let Some(stripe) = species.stripe_color() {
        for offset in [0.1, -0.15] {
            let c = pos + dir * len * offset;
            let a = c + up * len * 0.17;
            let b = c - up * len * 0.17;
            draw_line(a.x, a.y, b.x, b.y, len * 0.06, stripe);
        }
    }

    let eye = pos + dir * len * 0.3 + up * len * 0.05;
    draw_circle(eye.x, eye.y, len * 0.05, WHITE);
    draw_circle(eye.x + dir.x * 0.8, eye.y + dir.y * 0.8, len * 0.025, BLACK);
}

fn draw_fish_headings(fish: &[Fish], alpha: f32) {
    for f in fish {
        let pos = f.interpolated_position(alpha);
        let tip = pos + f.heading() * 30.0;
        let color = match f.behavior() {
            FishBehavior::Swim => Color::new(0.3, 1.0, 0.3, 0.8),
            FishBehavior::PursueHook => Color::new(1.0, 0.8, 0.2, 0.9),
            FishBehavior::OnHook => Color::new(1.0, 0.2, 0.2, 0.9),
            FishBehavior::SwimOut => Color::new(0.6, 0.6, 0.6, 0.8),
        };
        draw_line(pos.x, pos.y, tip.x, tip.y, 1.5, color);
        draw_circle(tip.x, tip.y, 2.0, color);
    }
}

fn draw_boats(scene: &Scene) {
    match (scene.switch_progress(), scene.previous_boat_tier()) {
        (Some(t), Some(previous)) => {
            draw_boat(scene.boat_pos_for(previous), previous, 1.0 - t);
            draw_boat(scene.boat_pos(), scene.boat_tier(), t);
        }
        _ => draw_boat(scene.boat_pos(), scene.boat_tier(), 1.0),
    }
    draw_fisher(scene.fisher_pos());
}

/// `base` is the hull's bottom-left corner.
fn draw_boat(base: Vec2, tier: usize, opacity: f32) {
    if opacity <= 0.0 {
        return;
    }
    let fade = |c: Color| Color::new(c.r, c.g, c.b, c.a * opacity);
    let (length, depth, mast) = if tier == 0 {
        (110.0, 30.0, 90.0)
    } else {
        (260.0, 50.0, 170.0)
    };

    let deck_l = base + vec2(-10.0, depth);
    let deck_r = base + vec2(length + 15.0, depth);
    let keel_r = base + vec2(length, 0.0);
    draw_triangle(deck_l, deck_r, keel_r, fade(HULL_COLOR));
    draw_triangle(deck_l, keel_r, base, fade(HULL_COLOR));

    let mast_count = if tier == 0 { 1 } else { 2 };
    for m in 0..mast_count {
        let foot = base + vec2(length * (m as f32 + 1.0) / (mast_count as f32 + 1.0), depth);
        let top = foot + vec2(0.0, mast);
        draw_line(foot.x, foot.y, top.x, top.y, 3.0, fade(HULL_COLOR));
        draw_triangle(
            top - vec2(0.0, 8.0),
            foot + vec2(0.0, 12.0),
            foot + vec2(mast * 0.45, 12.0),
            fade(SAIL_COLOR),
        );
        if tier >= 2 {
            // Insignia flag
            draw_triangle(top, top + vec2(24.0, -6.0), top - vec2(0.0, 12.0), fade(RED));
        }
    }
}

fn draw_fisher(pos: Vec2) {
    let hip = pos;
    let neck = pos + vec2(0.0, 22.0);
    draw_line(hip.x, hip.y, neck.x, neck.y, 3.0, DARKGRAY);
    draw_line(hip.x, hip.y, hip.x - 6.0, hip.y - 12.0, 3.0, DARKGRAY);
    draw_line(hip.x, hip.y, hip.x + 6.0, hip.y - 12.0, 3.0, DARKGRAY);
    draw_circle(neck.x, neck.y + 6.0, 6.0, Color::new(0.95, 0.8, 0.65, 1.0));
    let tip = rod_tip(pos);
    draw_line(neck.x, neck.y - 6.0, tip.x, tip.y, 2.0, Color::new(0.3, 0.2, 0.1, 1.0));
}

fn rod_tip(fisher: Vec2) -> Vec2 {
    fisher + vec2(30.0, 40.0)
}

fn draw_line_and_hook(scene: &Scene) {
    let HookState::InFlight(hook) = scene.hook() else {
        return;
    };
    let start = rod_tip(scene.fisher_pos());
    let end = hook.string_anchor();
    let sag = if scene.phase() == Phase::ReelIn {
        0.05
    } else {
        0.2
    };
    let dip = vec2(0.0, -start.distance(end) * sag);
    let c1 = start.lerp(end, 0.33) + dip;
    let c2 = start.lerp(end, 0.66) + dip;

    let mut prev = start;
    for i in 1..=STRING_SEGMENTS {
        let t = i as f32 / STRING_SEGMENTS as f32;
        let p = cubic_bezier(start, c1, c2, end, t);
        draw_line(prev.x, prev.y, p.x, p.y, 1.0, LINE_COLOR);
        prev = p;
    }

    let h = hook.visual_pos();
    draw_line(h.x, h.y + 6.0, h.x, h.y - 2.0, 2.0, GRAY);
    draw_circle_lines(h.x - 3.0, h.y - 2.0, 3.0, 1.5, GRAY);
}

fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * u * u * u + p1 * 3.0 * u * u * t + p2 * 3.0 * u * t * t + p3 * t * t * t
}

fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    Color::new(
        a.r + (b.r - a.r) * t,
        a.g + (b.g - a.g) * t,
        a.b + (b.b - a.b) * t,
        a.a + (b.a - a.a) * t,
    )
}

fn draw_hud(scene: &Scene) {
    let tc = Color::new(0.9, 0.92, 0.95, 1.0);
    let sh = Color::new(0.0, 0.0, 0.0, 0.5);

    let lines = [
        format!("FPS: {}", get_fps()),
        format!("Phase: {}", scene.phase().name()),
        format!("Weather: {}", scene.weather.current_weather().name()),
        format!("Fish: {}", scene.fish.len()),
        format!("Caught: {}", scene.catches().total()),
        format!("Tick: {}", scene.tick_count),
    ];
    for (i, text) in lines.iter().enumerate() {
        let y = 20.0 + i as f32 * 20.0;
        draw_text(text, 11.0, y + 1.0, 18.0, sh);
        draw_text(text, 10.0, y, 18.0, tc);
    }

    if scene.paused {
        let pause_text = "PAUSED (Space to resume, Enter to step)";
        let tw = measure_text(pause_text, None, 24, 1.0).width;
        let x = screen_width() * 0.5 - tw * 0.5;
        draw_text(pause_text, x + 1.0, 31.0, 24.0, sh);
        draw_text(pause_text, x, 30.0, 24.0, Color::new(1.0, 0.8, 0.2, 0.9));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_hits_its_endpoints() {
        let a = vec2(0.0, 0.0);
        let d = vec2(100.0, -40.0);
        let (b, c) = (vec2(30.0, -60.0), vec2(60.0, -60.0));
        assert_eq!(cubic_bezier(a, b, c, d, 0.0), a);
        assert!((cubic_bezier(a, b, c, d, 1.0) - d).length() < 1e-4);
        assert!(cubic_bezier(a, b, c, d, 0.5).y < -40.0);
    }

    #[test]
    fn color_lerp_clamps() {
        let c = lerp_color(BLACK, WHITE, 2.0);
        assert_eq!(c, WHITE);
        let mid = lerp_color(BLACK, WHITE, 0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
    }
}
