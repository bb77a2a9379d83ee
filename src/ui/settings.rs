use egui;

use super::UiState;
use crate::droplets::DropletKind;
use crate::scene::Scene;

/// Debug actions and scene info.
pub fn draw_settings(ctx: &egui::Context, scene: &mut Scene, ui_state: &mut UiState) {
    egui::Window::new("Settings")
        .default_pos(egui::pos2(300.0, 60.0))
        .default_size(egui::vec2(260.0, 300.0))
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Fish");
            ui.horizontal(|ui| {
                if ui.button("Spawn Fish").clicked() {
                    scene.spawn_offscreen_fish();
                }
                if ui.button("Elevate").clicked() {
                    scene.elevate_fish();
                }
            });
            match scene.despawning() {
                Some(id) => ui.label(format!("Fish {id} is leaving")),
                None => ui.label("No fish leaving"),
            };

            ui.separator();
            ui.heading("Sky");
            if ui
                .add_enabled(
                    scene.weather.is_stormy(),
                    egui::Button::new("Strike Lightning"),
                )
                .clicked()
            {
                scene.strike_lightning();
            }
            ui.label(format!("Cloud shade: {:.2}", scene.weather.cloud_shade()));
            ui.label(format!("Ocean shade: {:.2}", scene.weather.ocean_shade()));
            ui.label(format!("Rain: {:.2}", scene.weather.rain_intensity()));
            let nearest_cloud = scene
                .clouds
                .iter()
                .map(|cloud| cloud.depth)
                .fold(0.0f32, f32::max);
            ui.label(format!(
                "Clouds: {} (nearest depth {:.2})",
                scene.clouds.len(),
                nearest_cloud
            ));

            ui.separator();
            ui.heading("Info");
            ui.label(format!("Water points: {}", scene.water.len()));
            ui.label(format!("Max swell: {:.1}", scene.water.max_deviation()));
            let raindrops = scene
                .droplets
                .iter()
                .filter(|d| d.kind == DropletKind::Rain)
                .count();
            ui.label(format!(
                "Droplets: {} ({raindrops} rain)",
                scene.droplets.count()
            ));
            ui.label(format!("Seed: {:?}", scene.config().seed));
            if ui.button("Rebuild Scene").clicked() {
                ui_state.rebuild_requested = true;
            }
        });
}
