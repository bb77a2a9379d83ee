use std::collections::BTreeMap;

use serde::Serialize;

use crate::fish::FishBehavior;
use crate::scene::{Phase, Scene, SceneEvent};

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
}

#[derive(Debug, Clone)]
pub struct MetricAggregator {
    samples: Vec<f64>,
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for MetricAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricAggregator {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.samples.push(value);
    }

    pub fn summary(&self) -> MetricSummary {
        if self.samples.is_empty() {
            return MetricSummary::default();
        }

        let mut sorted = self.samples.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        MetricSummary {
            count: self.samples.len(),
            min: self.min,
            max: self.max,
            mean: self.sum / self.samples.len() as f64,
            p50: percentile_nearest_rank(&sorted, 0.50),
            p95: percentile_nearest_rank(&sorted, 0.95),
        }
    }
}

fn percentile_nearest_rank(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    let rank = ((p * sorted.len() as f64).ceil() as usize).saturating_sub(1);
    sorted[rank.min(sorted.len() - 1)]
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneCheck {
    pub name: String,
    pub passed: bool,
    pub details: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub seed: Option<u64>,
    pub ticks: u64,
    pub seconds: f64,
    pub final_phase: Phase,
    pub final_weather: String,
    pub boat_tier: usize,
    pub total_caught: u32,
    pub catches: BTreeMap<String, u32>,
    pub phase_entries: BTreeMap<String, u32>,
    pub splashes: u32,
    pub lightning_strikes: u32,
    pub fish_spawned: u32,
    pub fish_despawned: u32,
    pub water_deviation: MetricSummary,
    pub non_finite_samples: u64,
    pub population: MetricSummary,
    pub overall_status: String,
    pub checks: Vec<SceneCheck>,
}

/// Watches a scene tick by tick and records anything that looks broken.
#[derive(Default)]
pub struct SceneObserver {
    phase_entries: BTreeMap<String, u32>,
    splashes: u32,
    lightning_strikes: u32,
    fish_spawned: u32,
    fish_despawned: u32,
    water_deviation: MetricAggregator,
    population: MetricAggregator,
    non_finite_samples: u64,
    bad_rotation_samples: u64,
    loose_hooked_samples: u64,
    hook_phase_mismatches: u64,
    checks: Vec<SceneCheck>,
}

impl SceneObserver {
    pub fn new() -> Self {
        Self {
            phase_entries: Phase::ALL
                .iter()
                .map(|phase| (phase.name().to_string(), 0))
                .collect(),
            ..Self::default()
        }
    }

    /// Call after every tick.
    pub fn observe(&mut self, scene: &Scene) {
        for event in &scene.events {
            log::trace!("tick {}: {event}", scene.tick_count);
            match event {
                SceneEvent::PhaseChanged { to, .. } => {
                    *self.phase_entries.entry(to.name().to_string()).or_insert(0) += 1;
                }
                SceneEvent::Splash { .. } => self.splashes += 1,
                SceneEvent::LightningStrike { .. } => self.lightning_strikes += 1,
                SceneEvent::FishSpawned { .. } => self.fish_spawned += 1,
                SceneEvent::FishDespawned { .. } => self.fish_despawned += 1,
                _ => {}
            }
        }

        let deviation = scene.water.max_deviation();
        if deviation.is_finite() {
            self.water_deviation.push(deviation as f64);
        } else {
            self.non_finite_samples += 1;
        }
        self.population.push(scene.fish.len() as f64);

        let hook = scene.visual_hook_pos();
        for fish in &scene.fish {
            let pos = fish.position();
            if !pos.x.is_finite() || !pos.y.is_finite() || !fish.speed().is_finite() {
                self.non_finite_samples += 1;
            }
            let rotation = fish.rotation();
            if !(0.0..360.0).contains(&rotation) {
                self.bad_rotation_samples += 1;
            }
            if fish.behavior() == FishBehavior::OnHook && hook.is_some_and(|h| h != pos) {
                self.loose_hooked_samples += 1;
            }
        }

        let expects_hook = matches!(scene.phase(), Phase::ThrowHook | Phase::ReelIn);
        if expects_hook != scene.hook().is_in_flight() {
            self.hook_phase_mismatches += 1;
        }
    }

    pub fn finalize_checks(&mut self) {
        self.record_check(
            "values_are_finite",
            self.non_finite_samples == 0,
            format!("non_finite_samples={}", self.non_finite_samples),
        );
        self.record_check(
            "rotations_in_range",
            self.bad_rotation_samples == 0,
            format!("bad_rotation_samples={}", self.bad_rotation_samples),
        );
        self.record_check(
            "hooked_fish_stay_on_hook",
            self.loose_hooked_samples == 0,
            format!("loose_hooked_samples={}", self.loose_hooked_samples),
        );
        self.record_check(
            "hook_matches_phase",
            self.hook_phase_mismatches == 0,
            format!("hook_phase_mismatches={}", self.hook_phase_mismatches),
        );
    }

    pub fn report(&self, scene: &Scene) -> SceneReport {
        let all_passed = self.checks.iter().all(|c| c.passed);
        SceneReport {
            seed: scene.config().seed,
            ticks: scene.tick_count,
            seconds: scene.clock(),
            final_phase: scene.phase(),
            final_weather: scene.weather.current_weather().name().to_string(),
            boat_tier: scene.boat_tier(),
            total_caught: scene.catches().total(),
            catches: scene
                .catches()
                .iter()
                .map(|(species, count)| (species.name().to_string(), count))
                .collect(),
            phase_entries: self.phase_entries.clone(),
            splashes: self.splashes,
            lightning_strikes: self.lightning_strikes,
            fish_spawned: self.fish_spawned,
            fish_despawned: self.fish_despawned,
            water_deviation: self.water_deviation.summary(),
            non_finite_samples: self.non_finite_samples,
            population: self.population.summary(),
            overall_status: if all_passed { "PASS" } else { "FAIL" }.to_string(),
            checks: self.checks.clone(),
        }
    }

    fn record_check(&mut self, name: &str, passed: bool, details: String) {
        if !passed {
            log::warn!("check {name} failed: {details}");
        }
        self.checks.push(SceneCheck {
            name: name.to_string(),
            passed,
            details,
        });
    }
}

/// Run `ticks` ticks without a window and summarize what happened.
pub fn run_headless(scene: &mut Scene, ticks: u64) -> SceneReport {
    let mut observer = SceneObserver::new();
    for _ in 0..ticks {
        scene.tick();
        observer.observe(scene);
    }
    observer.finalize_checks();
    let report = observer.report(scene);
    log::info!(
        "headless run finished: {} ticks, {} caught, status {}",
        report.ticks,
        report.total_caught,
        report.overall_status
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn summary_of_known_samples() {
        let mut agg = MetricAggregator::new();
        for i in 1..=20 {
            agg.push(i as f64 * 0.5);
        }
        let s = agg.summary();
        assert_eq!(s.count, 20);
        assert_eq!(s.min, 0.5);
        assert_eq!(s.max, 10.0);
        assert!((s.mean - 5.25).abs() < 1e-9);
        assert_eq!(s.p50, 5.0);
        assert_eq!(s.p95, 9.5);
        assert_eq!(MetricAggregator::new().summary().count, 0);
    }

    #[test]
    fn headless_run_passes_checks() {
        let config = SceneConfig {
            seed: Some(2024),
            ..SceneConfig::default()
        };
        let mut scene = Scene::new(config).unwrap();
        let report = run_headless(&mut scene, 1800);

        assert_eq!(report.ticks, 1800);
        assert_eq!(report.overall_status, "PASS", "{:?}", report.checks);
        assert_eq!(report.population.count, 1800);
        assert_eq!(report.non_finite_samples, 0);
        assert_eq!(report.phase_entries.len(), 4);
        assert!(report.phase_entries["ThrowHook"] >= 1);
        assert_eq!(report.catches.len(), 8);
        assert_eq!(
            report.catches.values().sum::<u32>(),
            report.total_caught
        );
    }

    #[test]
    fn failed_check_sets_report_fail() {
        let scene = Scene::new(SceneConfig {
            seed: Some(1),
            ..SceneConfig::default()
        })
        .unwrap();
        let mut observer = SceneObserver::new();
        observer.record_check("forced_failure", false, "test".to_string());
        let report = observer.report(&scene);
        assert_eq!(report.overall_status, "FAIL");
    }

    #[test]
    fn report_serializes_to_json() {
        let mut scene = Scene::new(SceneConfig {
            seed: Some(5),
            ..SceneConfig::default()
        })
        .unwrap();
        let report = run_headless(&mut scene, 30);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"overall_status\""));
        assert!(json.contains("\"final_phase\""));
        assert!(json.contains("\"non_finite_samples\":0"));
    }
}
