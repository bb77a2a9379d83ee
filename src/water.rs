use macroquad::prelude::*;
use ::rand::Rng;

use crate::config::WaterConfig;
use crate::error::SceneError;

/// Ocean surface modelled as a 1-D chain of control points joined by vertical springs.
///
/// Each point is pulled toward its two neighbours and back toward the rest level,
/// and its velocity is damped every frame. Heights are never clamped.
pub struct WaterSurface {
    xs: Vec<f32>,
    ys: Vec<f32>,
    speeds: Vec<f32>,
    accels: Vec<f32>,
    rest_level: f32,
    params: WaterConfig,
}

impl WaterSurface {
    pub fn new(width: f32, rest_level: f32, params: WaterConfig) -> Result<Self, SceneError> {
        if !width.is_finite() || width <= 0.0 {
            return Err(SceneError::InvalidCanvas {
                width,
                height: rest_level,
            });
        }
        params.validate(width)?;

        let count = params.control_point_count(width)?;
        // Evenly spaced, except the last point which is pinned to the right edge.
        let mut xs: Vec<f32> = (0..count - 1).map(|i| i as f32 * params.spacing).collect();
        xs.push(width);

        Ok(Self {
            xs,
            ys: vec![rest_level; count],
            speeds: vec![0.0; count],
            accels: vec![0.0; count],
            rest_level,
            params,
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn rest_level(&self) -> f32 {
        self.rest_level
    }

    pub fn spacing(&self) -> f32 {
        self.params.spacing
    }

    /// Index of the control point nearest to `x`, clamped to the mesh.
    pub fn nearest_index(&self, x: f32) -> usize {
        let idx = (x / self.params.spacing).round().max(0.0) as usize;
        idx.min(self.len() - 1)
    }

    /// Height of the nearest control point. Not interpolated.
    pub fn height_at(&self, x: f32) -> f32 {
        self.ys[self.nearest_index(x)]
    }

    /// Impulse on the nearest control point. Positive intensity pushes the surface down.
    pub fn perturb(&mut self, x: f32, intensity: f32) {
        let idx = self.nearest_index(x);
        self.speeds[idx] -= intensity;
    }

    pub fn point_position(&self, index: usize) -> Vec2 {
        let idx = index.min(self.len() - 1);
        vec2(self.xs[idx], self.ys[idx])
    }

    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.xs.iter().zip(&self.ys).map(|(&x, &y)| vec2(x, y))
    }

    /// Largest distance of any point from the rest level.
    pub fn max_deviation(&self) -> f32 {
        self.ys
            .iter()
            .map(|y| (y - self.rest_level).abs())
            .fold(0.0, f32::max)
    }

    /// Advance the mesh by one frame.
    pub fn integrate(&mut self, rng: &mut impl Rng) {
        let last = self.len() - 1;

        // Forces are computed from the heights at the start of the frame, so every
        // acceleration is gathered before any point moves.
        for i in 0..=last {
            let y = self.ys[i];
            let disp_left = if i == 0 { 0.0 } else { self.ys[i - 1] - y };
            let disp_right = if i == last { 0.0 } else { self.ys[i + 1] - y };
            let restoring = (self.rest_level - y) * self.params.return_coeff;
            let noise = if self.params.noise > 0.0 {
                rng.gen_range(-self.params.noise..=self.params.noise)
            } else {
                0.0
            };
            self.accels[i] = (disp_left + disp_right + restoring) * self.params.accel_speed + noise;
        }

        for i in 0..=last {
            self.speeds[i] += self.accels[i];
            self.ys[i] += self.speeds[i];
            self.speeds[i] *= self.params.dampening;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet_params() -> WaterConfig {
        WaterConfig {
            noise: 0.0,
            ..WaterConfig::default()
        }
    }

    fn quiet_surface(width: f32) -> WaterSurface {
        WaterSurface::new(width, 400.0, quiet_params()).unwrap()
    }

    #[test]
    fn point_count_and_pinned_last_point() {
        let water = quiet_surface(1000.0);
        assert_eq!(water.len(), 51);
        assert_eq!(water.point_position(50).x, 1000.0);

        let uneven = quiet_surface(1010.0);
        assert_eq!(uneven.len(), 51);
        assert_eq!(uneven.point_position(49).x, 980.0);
        assert_eq!(uneven.point_position(50).x, 1010.0);
    }

    #[test]
    fn refuses_oversized_meshes() {
        assert!(matches!(
            WaterSurface::new(1e30, 400.0, quiet_params()),
            Err(SceneError::TooManyControlPoints { .. })
        ));
        let fine = WaterConfig {
            spacing: 1e-30,
            ..quiet_params()
        };
        assert!(matches!(
            WaterSurface::new(1000.0, 400.0, fine),
            Err(SceneError::TooManyControlPoints { .. })
        ));
    }

    #[test]
    fn perturb_hits_only_the_nearest_point() {
        let mut water = quiet_surface(1000.0);
        water.perturb(505.0, 10.0);

        assert_eq!(water.speeds[25], -10.0);
        for i in (0..water.len()).filter(|&i| i != 25) {
            assert_eq!(water.speeds[i], 0.0, "point {i} moved");
        }
    }

    #[test]
    fn height_at_matches_rounded_index_with_clamping() {
        let mut water = quiet_surface(1000.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        water.perturb(200.0, 30.0);
        water.perturb(730.0, -12.0);
        for _ in 0..7 {
            water.integrate(&mut rng);
        }

        let mut x = 0.0;
        while x <= 1000.0 {
            let idx = ((x / 20.0_f32).round() as usize).min(50);
            assert_eq!(water.height_at(x), water.point_position(idx).y);
            x += 3.7;
        }
        assert_eq!(water.height_at(-500.0), water.point_position(0).y);
        assert_eq!(water.height_at(5000.0), water.point_position(50).y);
        assert_eq!(water.height_at(f32::NAN), water.point_position(0).y);
    }

    #[test]
    fn settles_back_to_rest_without_noise() {
        let mut water = quiet_surface(1000.0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        water.perturb(505.0, 40.0);
        water.perturb(60.0, -25.0);

        water.integrate(&mut rng);
        assert!(water.max_deviation() > 1.0);

        for _ in 0..2000 {
            water.integrate(&mut rng);
        }
        for x in [0.0, 250.0, 505.0, 999.0, 1000.0] {
            assert!((water.height_at(x) - 400.0).abs() < 1e-3);
        }
    }

    #[test]
    fn undisturbed_mesh_stays_flat() {
        let mut water = quiet_surface(640.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            water.integrate(&mut rng);
        }
        assert_eq!(water.max_deviation(), 0.0);
    }

    #[test]
    fn forces_use_start_of_frame_heights() {
        // A single kicked point must spread symmetrically to both neighbours.
        let mut water = quiet_surface(200.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        water.perturb(100.0, 10.0);
        water.integrate(&mut rng);
        water.integrate(&mut rng);

        let left = water.point_position(4).y;
        let right = water.point_position(6).y;
        assert!((left - right).abs() < 1e-5);
        assert!(left < 400.0);
    }

    #[test]
    fn rejects_too_narrow_canvas() {
        assert!(matches!(
            WaterSurface::new(5.0, 10.0, quiet_params()),
            Err(SceneError::TooFewControlPoints(1))
        ));
        assert!(WaterSurface::new(0.0, 10.0, quiet_params()).is_err());
    }
}
