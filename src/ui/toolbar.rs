use egui;

use super::UiState;
use crate::scene::Scene;
use crate::weather::Weather;

/// Slim status strip + compact controls.
pub fn draw_toolbar(ctx: &egui::Context, scene: &mut Scene, ui_state: &mut UiState) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.add_space(3.0);
        ui.horizontal_wrapped(|ui| {
            title_badge(ui, "TIDEWATER");

            ui.separator();
            compact_group(ui, "Scene", |ui| {
                let pause_label = if scene.paused { "Play" } else { "Pause" };
                if ui.button(pause_label).clicked() {
                    scene.paused = !scene.paused;
                }
                if ui
                    .add_enabled(scene.paused, egui::Button::new("Step"))
                    .clicked()
                {
                    ui_state.step_requested = true;
                }
                if ui.button("Rebuild").clicked() {
                    ui_state.rebuild_requested = true;
                }
            });

            compact_group(ui, "Weather", |ui| {
                let target = scene.weather.target_weather();
                for weather in Weather::SETTLED {
                    if ui
                        .selectable_label(target == weather, weather.name())
                        .clicked()
                        && target != weather
                    {
                        scene.change_weather(weather);
                    }
                }
            });

            compact_group(ui, "Panels", |ui| {
                ui.toggle_value(&mut ui_state.show_catches, "Catches");
                ui.toggle_value(&mut ui_state.show_settings, "Settings");
                ui.toggle_value(&mut scene.show_headings, "Headings");
            });
        });

        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            metric_chip(ui, "Phase", scene.phase().name().to_string());
            let weather = match scene.weather.transition_progress() {
                Some(progress) => format!(
                    "-> {} {:.0}%",
                    scene.weather.target_weather().name(),
                    progress * 100.0
                ),
                None => scene.weather.current_weather().name().to_string(),
            };
            metric_chip(ui, "Weather", weather);
            metric_chip(ui, "Fish", format!("{}", scene.fish.len()));
            metric_chip(ui, "Caught", format!("{}", scene.catches().total()));
            metric_chip(ui, "Boat", format!("tier {}", scene.boat_tier() + 1));
            metric_chip(ui, "Time", format!("{:.0}s", scene.clock()));
            if scene.weather.is_stormy() {
                status_chip(ui, "STORM", egui::Color32::from_rgb(98, 154, 191));
            }
            if scene.paused {
                status_chip(ui, "PAUSED", egui::Color32::from_rgb(230, 190, 60));
            }
        });
        ui.add_space(3.0);
    });
}

fn title_badge(ui: &mut egui::Ui, label: &str) {
    let text = egui::RichText::new(label)
        .strong()
        .color(egui::Color32::from_rgb(190, 220, 255));
    ui.label(text);
}

fn compact_group(ui: &mut egui::Ui, heading: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.group(|ui| {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(heading)
                    .small()
                    .color(egui::Color32::from_rgb(150, 170, 185)),
            );
            add_contents(ui);
        });
    });
}

fn metric_chip(ui: &mut egui::Ui, key: &str, value: String) {
    let text = egui::RichText::new(format!("{key}: {value}"))
        .small()
        .color(egui::Color32::from_rgb(205, 215, 225));
    ui.group(|ui| {
        ui.label(text);
    });
}

fn status_chip(ui: &mut egui::Ui, label: &str, color: egui::Color32) {
    ui.group(|ui| {
        ui.label(egui::RichText::new(label).small().strong().color(color));
    });
}
