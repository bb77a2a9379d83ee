use egui;

use crate::config;
use crate::scene::Scene;

fn to_color32(c: macroquad::prelude::Color) -> egui::Color32 {
    egui::Color32::from_rgb((c.r * 255.0) as u8, (c.g * 255.0) as u8, (c.b * 255.0) as u8)
}

/// Per-species tally and progress toward the next boat.
pub fn draw_catches(ctx: &egui::Context, scene: &Scene) {
    egui::Window::new("Catches")
        .default_pos(egui::pos2(10.0, 90.0))
        .default_size(egui::vec2(220.0, 260.0))
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("catch_grid").striped(true).show(ui, |ui| {
                for (species, count) in scene.catches().iter() {
                    ui.colored_label(to_color32(species.body_color()), "■");
                    ui.label(species.name());
                    ui.label(format!("{count}"));
                    ui.end_row();
                }
            });

            ui.separator();
            ui.label(format!("Total: {}", scene.catches().total()));

            match config::BOAT_TIER_MILESTONES.get(scene.boat_tier()) {
                Some(&milestone) => {
                    let frac = scene.catches().total() as f32 / milestone as f32;
                    let bar = egui::ProgressBar::new(frac.clamp(0.0, 1.0))
                        .text(format!("{}/{} to next boat", scene.catches().total(), milestone));
                    ui.add(bar);
                }
                None => {
                    ui.label("Finest boat on the water");
                }
            }
        });
}
