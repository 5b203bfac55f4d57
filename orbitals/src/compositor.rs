//! Volumetric ray-marching compositor
//!
//! A pure kernel from (field, ray, params) to one RGBA sample, shared by
//! the CPU reference renderer here and the WGSL pipeline in
//! `volume_renderer`. Rays live in the field's local unit-cube space
//! [-0.5, 0.5]^3; the field's physical range never reaches this layer.

use glam::{Vec3, Vec4};
use rayon::prelude::*;

use common::Camera3D;

use crate::field::{ScalarField, DENSITY_EPSILON};
use crate::state::{OrbitalConfig, ShadingMode};

/// Hard iteration bound, independent of the configured step count. A ray
/// that exhausts it ends with a partial accumulation instead of spinning.
pub const MAX_MARCH_STEPS: u32 = 128;

/// Accumulated alpha at which the march exits early as near-opaque.
const ALPHA_SATURATION: f32 = 0.95;

/// Pixels that accumulate less than this emit nothing at all.
const ALPHA_DISCARD: f32 = 1e-3;

const PHASE_NEGATIVE: Vec3 = Vec3::new(0.95, 0.3, 0.7);
const PHASE_POSITIVE: Vec3 = Vec3::new(0.2, 0.6, 1.0);

/// Camera ray in the field's local unit-cube space.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Compositing parameters, derived deterministically from the orbital
/// configuration rather than set independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositingParams {
    pub opacity: f32,
    pub steps: u32,
    pub iso_threshold: f32,
    pub shading: ShadingMode,
    pub density_boost: f32,
}

impl CompositingParams {
    /// Derive from the quantum numbers and the quality knob.
    ///
    /// Higher-n orbitals spread their density over a volume growing about
    /// as fast as n^6, so the boost scales with n^6 to keep them visible.
    /// The isosurface threshold falls as 1/n^2 because the peak density
    /// does; 0.18/n^2 puts the default n=3 shell at 0.02.
    pub fn derive(config: &OrbitalConfig) -> Self {
        let n = config.qn.n();
        Self {
            opacity: config.opacity.clamp(1e-3, 1.0),
            steps: (config.quality * 2).max(1),
            iso_threshold: 0.18 / (n * n) as f32,
            shading: config.shading,
            density_boost: (n as f32).powi(6) * 50.0,
        }
    }
}

/// Slab-method intersection of a ray with the unit cube. Returns
/// (t_entry, t_exit); a miss has t_entry > t_exit.
pub fn hit_box(ray: &Ray) -> (f32, f32) {
    let box_min = Vec3::splat(-0.5);
    let box_max = Vec3::splat(0.5);
    let inv_dir = ray.dir.recip();
    let tmin = (box_min - ray.origin) * inv_dir;
    let tmax = (box_max - ray.origin) * inv_dir;
    let real_min = tmin.min(tmax);
    let real_max = tmin.max(tmax);
    let t0 = real_min.x.max(real_min.y).max(real_min.z);
    let t1 = real_max.x.min(real_max.y).min(real_max.z);
    (t0, t1)
}

fn phase_color(phase: f32) -> Vec3 {
    PHASE_NEGATIVE.lerp(PHASE_POSITIVE, phase)
}

fn boosted_sample(field: &ScalarField, p: Vec3, boost: f32) -> (f32, f32) {
    let uv = p + 0.5;
    let texel = field.sample_trilinear(uv.x, uv.y, uv.z);
    (texel.density * boost, texel.phase)
}

/// March one ray through the field and composite an RGBA sample.
pub fn march(field: &ScalarField, ray: &Ray, params: &CompositingParams) -> [f32; 4] {
    march_observed(field, ray, params, |_| {})
}

fn march_observed(
    field: &ScalarField,
    ray: &Ray,
    params: &CompositingParams,
    mut observe: impl FnMut(f32),
) -> [f32; 4] {
    let dir = ray.dir.normalize();
    let ray = Ray {
        origin: ray.origin,
        dir,
    };
    let (t0, t1) = hit_box(&ray);
    if t0 > t1 {
        return [0.0; 4];
    }

    let mut t = t0.max(0.0);
    let t_end = t1;
    let step = (t_end - t) / params.steps as f32;
    let mut rgb = Vec3::ZERO;
    let mut alpha = 0.0f32;

    for _ in 0..MAX_MARCH_STEPS {
        if t >= t_end || alpha >= ALPHA_SATURATION {
            break;
        }
        let p = ray.origin + dir * t;
        let (density, phase) = boosted_sample(field, p, params.density_boost);

        if density > DENSITY_EPSILON {
            let color = phase_color(phase);
            match params.shading {
                ShadingMode::Cloud => {
                    // Front-to-back compositing; capping the per-step alpha
                    // at 1 keeps the accumulator inside [0, 1].
                    let a = (density * params.opacity * step * 2.0).min(1.0);
                    let weight = (1.0 - alpha) * a;
                    rgb += color * weight;
                    alpha += weight;
                }
                ShadingMode::Isosurface => {
                    if density > params.iso_threshold {
                        // Gradient estimate from one step back, for shading
                        // the single shell this mode draws.
                        let prev = ray.origin + dir * (t - step);
                        let (prev_density, _) =
                            boosted_sample(field, prev, params.density_boost);
                        let diff = density - prev_density;
                        let shade = (0.3 + 0.7 * (diff * 20.0).abs()).clamp(0.4, 1.0);
                        rgb = color * shade;
                        alpha = params.opacity;
                        break;
                    }
                }
            }
        }

        observe(alpha);
        t += step;
    }

    if alpha < ALPHA_DISCARD {
        return [0.0; 4];
    }
    [rgb.x, rgb.y, rgb.z, alpha]
}

/// CPU reference frame renderer: one independent ray per output pixel,
/// rows fanned out across the pool. The volume cube is centered at the
/// origin with world edge length `volume_scale`.
///
/// Returns width * height RGBA samples in row-major order. The GPU path
/// runs the same kernel per fragment and must agree within float
/// tolerance.
pub fn render_frame(
    field: &ScalarField,
    camera: &Camera3D,
    params: &CompositingParams,
    width: u32,
    height: u32,
    volume_scale: f32,
) -> Vec<[f32; 4]> {
    let inv_view_proj = camera.view_projection().inverse();
    let origin = camera.position / volume_scale;

    (0..height)
        .into_par_iter()
        .flat_map_iter(|y| {
            (0..width).map(move |x| {
                let ndc_x = (x as f32 + 0.5) / width as f32 * 2.0 - 1.0;
                let ndc_y = 1.0 - (y as f32 + 0.5) / height as f32 * 2.0;
                let far = inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
                let world = far.truncate() / far.w;
                let dir = world / volume_scale - origin;
                march(field, &Ray { origin, dir }, params)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldTexel;
    use crate::state::{OrbitalConfig, QuantumNumbers};

    fn uniform_field(size: usize, density: f32, phase: f32) -> ScalarField {
        ScalarField::synthetic(size, vec![FieldTexel { density, phase }; size * size * size])
    }

    fn cloud_params(opacity: f32, steps: u32) -> CompositingParams {
        CompositingParams {
            opacity,
            steps,
            iso_threshold: 0.02,
            shading: ShadingMode::Cloud,
            density_boost: 1.0,
        }
    }

    fn axis_ray() -> Ray {
        Ray {
            origin: Vec3::new(0.0, 0.0, 2.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    #[test]
    fn ray_toward_center_enters_before_exit() {
        let (t0, t1) = hit_box(&axis_ray());
        assert!(t0 < t1);
        assert!((t0 - 1.5).abs() < 1e-6);
        assert!((t1 - 2.5).abs() < 1e-6);
    }

    #[test]
    fn ray_away_from_box_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 2.0, 2.0),
            dir: Vec3::new(0.0, 1.0, 0.0),
        };
        let (t0, t1) = hit_box(&ray);
        assert!(t0 > t1);
        let pixel = march(&uniform_field(4, 1.0, 1.0), &ray, &cloud_params(0.5, 32));
        assert_eq!(pixel, [0.0; 4]);
    }

    #[test]
    fn oblique_ray_still_hits() {
        let ray = Ray {
            origin: Vec3::new(1.5, 1.2, 1.5),
            dir: Vec3::new(-1.0, -0.8, -1.0),
        };
        let (t0, t1) = hit_box(&Ray {
            origin: ray.origin,
            dir: ray.dir.normalize(),
        });
        assert!(t0 < t1 && t0 > 0.0);
    }

    #[test]
    fn empty_field_is_transparent() {
        let field = uniform_field(4, 0.0, 1.0);
        let pixel = march(&field, &axis_ray(), &cloud_params(1.0, 64));
        assert_eq!(pixel, [0.0; 4]);
    }

    #[test]
    fn near_empty_accumulation_is_discarded() {
        // Densities just above the skip epsilon accumulate less than the
        // discard floor over a short march.
        let field = uniform_field(4, 2e-4, 1.0);
        let params = cloud_params(1e-3, 4);
        let pixel = march(&field, &axis_ray(), &params);
        assert_eq!(pixel, [0.0; 4]);
    }

    #[test]
    fn cloud_alpha_is_monotonic_and_bounded() {
        let field = uniform_field(8, 5.0, 1.0);
        let mut alphas = Vec::new();
        let pixel = march_observed(&field, &axis_ray(), &cloud_params(0.9, 64), |a| {
            alphas.push(a);
        });
        assert!(!alphas.is_empty());
        for pair in alphas.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(alphas.iter().all(|a| (0.0..=1.0).contains(a)));
        assert!(pixel[3] <= 1.0 && pixel[3] > 0.0);
    }

    #[test]
    fn saturated_march_exits_early() {
        let field = uniform_field(8, 1e6, 1.0);
        let mut steps = 0;
        let pixel = march_observed(&field, &axis_ray(), &cloud_params(1.0, 64), |_| {
            steps += 1;
        });
        assert!(steps < 64, "march should saturate well before uSteps");
        assert!(pixel[3] >= 0.95 && pixel[3] <= 1.0);
    }

    #[test]
    fn isosurface_terminates_with_full_opacity() {
        let field = uniform_field(8, 1.0, 1.0);
        let params = CompositingParams {
            opacity: 0.8,
            steps: 64,
            iso_threshold: 0.5,
            shading: ShadingMode::Isosurface,
            density_boost: 1.0,
        };
        let pixel = march(&field, &axis_ray(), &params);
        assert_eq!(pixel[3], 0.8);
        // Uniform field has zero gradient, so shading sits at its floor of
        // 0.4 on the positive-phase color.
        let expected = PHASE_POSITIVE * 0.4;
        assert!((pixel[0] - expected.x).abs() < 1e-6);
        assert!((pixel[1] - expected.y).abs() < 1e-6);
        assert!((pixel[2] - expected.z).abs() < 1e-6);
    }

    #[test]
    fn isosurface_below_threshold_is_transparent() {
        let field = uniform_field(8, 0.1, 0.0);
        let params = CompositingParams {
            opacity: 0.8,
            steps: 64,
            iso_threshold: 0.5,
            shading: ShadingMode::Isosurface,
            density_boost: 1.0,
        };
        assert_eq!(march(&field, &axis_ray(), &params), [0.0; 4]);
    }

    #[test]
    fn phase_selects_the_lobe_color() {
        let positive = march(
            &uniform_field(8, 5.0, 1.0),
            &axis_ray(),
            &cloud_params(0.9, 64),
        );
        let negative = march(
            &uniform_field(8, 5.0, 0.0),
            &axis_ray(),
            &cloud_params(0.9, 64),
        );
        // Blue channel dominates the positive lobe, red the negative one.
        assert!(positive[2] > positive[0]);
        assert!(negative[0] > negative[2]);
    }

    #[test]
    fn derived_params_scale_with_n() {
        let mut config = OrbitalConfig::default();
        config.qn = QuantumNumbers::new(1, 0, 0).unwrap();
        let p1 = CompositingParams::derive(&config);
        config.qn = QuantumNumbers::new(2, 0, 0).unwrap();
        let p2 = CompositingParams::derive(&config);
        assert!((p2.density_boost / p1.density_boost - 64.0).abs() < 1e-3);
        assert!((p1.iso_threshold / p2.iso_threshold - 4.0).abs() < 1e-5);
        assert_eq!(p1.steps, config.quality * 2);
    }

    #[test]
    fn render_frame_center_hits_corner_misses() {
        let field = uniform_field(8, 5.0, 1.0);
        let camera = Camera3D::new(1.0);
        let params = cloud_params(0.9, 64);
        let frame = render_frame(&field, &camera, &params, 33, 33, 10.0);
        assert_eq!(frame.len(), 33 * 33);
        let center = frame[16 * 33 + 16];
        let corner = frame[0];
        assert!(center[3] > 0.0, "center ray should accumulate");
        assert_eq!(corner[3], 0.0, "corner ray should miss the cube");
    }
}
