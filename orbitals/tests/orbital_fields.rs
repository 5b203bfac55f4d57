//! End-to-end scenarios: sampled fields and compositing over real orbitals.

use glam::Vec3;

use orbitals::compositor::{march, CompositingParams, Ray};
use orbitals::field::{FieldRequest, ScalarField, FIELD_GAIN};
use orbitals::hybrid::hybrid_wave_function;
use orbitals::state::{
    HybridFamily, HybridSpec, OrbitalConfig, OrbitalMode, QuantumNumbers, ShadingMode,
};
use orbitals::wavefunction::real_wave_function;

const SIZE: u32 = 33; // odd, so the grid has an exact center node

fn complex_request(n: u32, l: u32, m: i32) -> FieldRequest {
    FieldRequest {
        qn: QuantumNumbers::new(n, l, m).unwrap(),
        mode: OrbitalMode::Complex,
        size: SIZE,
    }
}

fn center() -> usize {
    (SIZE as usize - 1) / 2
}

#[test]
fn ground_state_field_is_spherically_symmetric() {
    let field = ScalarField::sample(&complex_request(1, 0, 0));
    let c = center();

    for k in 1..=c {
        let along_x = field.get(c + k, c, c).density;
        let reference = [
            field.get(c - k, c, c).density,
            field.get(c, c + k, c).density,
            field.get(c, c - k, c).density,
            field.get(c, c, c + k).density,
            field.get(c, c, c - k).density,
        ];
        for d in reference {
            let scale = along_x.max(1e-12);
            assert!(
                (d - along_x).abs() / scale < 1e-4,
                "asymmetry at offset {k}: {d} vs {along_x}"
            );
        }
    }
}

#[test]
fn ground_state_density_decreases_outward() {
    let field = ScalarField::sample(&complex_request(1, 0, 0));
    let c = center();

    let mut previous = field.get(c, c, c).density;
    assert!(previous > 0.0);
    for k in 1..=c {
        let current = field.get(c + k, c, c).density;
        assert!(
            current < previous,
            "1s density must fall strictly with r (offset {k})"
        );
        previous = current;
    }
}

#[test]
fn d_z2_amplitude_vanishes_on_the_node_cone() {
    // 3d_z2 has conical nodes at theta = acos(1/sqrt(3))
    let theta_node = (1.0f64 / 3.0f64.sqrt()).acos();
    for r in [1.0, 4.0, 10.0, 25.0] {
        for phi in [0.0, 1.3, -2.7] {
            let amp = real_wave_function(3, 2, 0, r, theta_node, phi);
            assert!(amp.abs() < 1e-12, "amp {amp} at r={r} phi={phi}");
        }
    }
}

#[test]
fn d_z2_field_separates_lobes_from_torus_by_phase() {
    let field = ScalarField::sample(&FieldRequest {
        qn: QuantumNumbers::new(3, 2, 0).unwrap(),
        mode: OrbitalMode::Real,
        size: SIZE,
    });
    let c = center();

    // Polar lobe: amplitude positive along +z
    let pole = field.get(c, c, c + 6);
    assert!(pole.density > 0.0);
    assert_eq!(pole.phase, 1.0);

    // Equatorial torus: P_2^0(0) < 0, so the phase channel flips
    let torus = field.get(c + 6, c, c);
    assert!(torus.density > 0.0);
    assert_eq!(torus.phase, 0.0);
}

#[test]
fn hybrid_field_matches_direct_combination() {
    let spec = HybridSpec::new(HybridFamily::Sp3, 0).unwrap();
    let field = ScalarField::sample(&FieldRequest {
        qn: QuantumNumbers::new(2, 0, 0).unwrap(),
        mode: OrbitalMode::Hybrid(spec),
        size: SIZE,
    });

    let size = SIZE as usize;
    let range = ScalarField::spatial_range(2);
    for (x, y, z) in [(20usize, 12usize, 16usize), (8, 8, 8), (16, 16, 25)] {
        let to_phys = |i: usize| (i as f64 / (size - 1) as f64 - 0.5) * 2.0 * range;
        let (px, py, pz) = (to_phys(x), to_phys(y), to_phys(z));
        let r = (px * px + py * py + pz * pz).sqrt();
        let theta = (pz / (r + 1e-5)).clamp(-1.0, 1.0).acos();
        let phi = py.atan2(px);

        let s = real_wave_function(2, 0, 0, r, theta, phi);
        let ox = real_wave_function(2, 1, 1, r, theta, phi);
        let oy = real_wave_function(2, 1, -1, r, theta, phi);
        let oz = real_wave_function(2, 1, 0, r, theta, phi);
        let direct = 0.5 * (s + ox + oy + oz);
        let lobe = hybrid_wave_function(HybridFamily::Sp3, 0, r, theta, phi);
        assert!((lobe - direct).abs() < 1e-14);

        let expected = (direct * direct * FIELD_GAIN) as f32;
        let stored = field.get(x, y, z).density;
        assert!(
            (stored - expected).abs() <= 1e-6 * expected.max(1.0),
            "texel ({x},{y},{z}): {stored} vs {expected}"
        );
    }
}

#[test]
fn marching_the_ground_state_renders_a_hit_and_a_miss() {
    let field = ScalarField::sample(&complex_request(1, 0, 0));
    let config = OrbitalConfig {
        qn: QuantumNumbers::new(1, 0, 0).unwrap(),
        quality: 64,
        ..OrbitalConfig::default()
    };
    let params = CompositingParams::derive(&config);

    let hit = march(
        &field,
        &Ray {
            origin: Vec3::new(0.0, 0.0, 2.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        },
        &params,
    );
    assert!(hit[3] > 0.0 && hit[3] <= 1.0);
    // The 1s amplitude is everywhere positive, so the cloud picks up the
    // positive-phase (blue-leaning) color.
    assert!(hit[2] > hit[0]);

    let miss = march(
        &field,
        &Ray {
            origin: Vec3::new(2.0, 0.0, 2.0),
            dir: Vec3::new(0.0, 0.0, 1.0),
        },
        &params,
    );
    assert_eq!(miss, [0.0; 4]);
}

#[test]
fn isosurface_mode_yields_an_opaque_shell_sample() {
    let field = ScalarField::sample(&complex_request(1, 0, 0));
    let config = OrbitalConfig {
        qn: QuantumNumbers::new(1, 0, 0).unwrap(),
        quality: 64,
        opacity: 0.7,
        shading: ShadingMode::Isosurface,
        ..OrbitalConfig::default()
    };
    let params = CompositingParams::derive(&config);

    let pixel = march(
        &field,
        &Ray {
            origin: Vec3::new(0.0, 0.0, 2.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        },
        &params,
    );
    assert_eq!(pixel[3], 0.7, "shell sample carries the configured opacity");
    assert!(pixel[0] > 0.0 || pixel[1] > 0.0 || pixel[2] > 0.0);
}
