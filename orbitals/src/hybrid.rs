//! Hybrid orbitals: fixed linear combinations of the n=2 s and p orbitals
//!
//! The coefficient tables are the standard sp, sp2 and sp3 hybridization
//! combinations and must not be altered; they are what makes the lobes
//! point along the familiar linear, trigonal and tetrahedral directions.

use std::f64::consts::SQRT_2;

use crate::state::HybridFamily;
use crate::wavefunction::real_wave_function;

/// The four n=2 real orbitals every hybrid combination is built from.
fn basis(r: f64, theta: f64, phi: f64) -> (f64, f64, f64, f64) {
    let s = real_wave_function(2, 0, 0, r, theta, phi);
    let px = real_wave_function(2, 1, 1, r, theta, phi);
    let py = real_wave_function(2, 1, -1, r, theta, phi);
    let pz = real_wave_function(2, 1, 0, r, theta, phi);
    (s, px, py, pz)
}

/// Hybrid orbital amplitude for one lobe of the given family.
///
/// An out-of-range index yields zero amplitude; `HybridSpec::new` is the
/// validating entry point for callers that want an error instead.
pub fn hybrid_wave_function(
    family: HybridFamily,
    index: u32,
    r: f64,
    theta: f64,
    phi: f64,
) -> f64 {
    let (s, px, py, pz) = basis(r, theta, phi);

    match family {
        HybridFamily::Sp => match index {
            0 => (s + pz) / SQRT_2,
            1 => (s - pz) / SQRT_2,
            _ => 0.0,
        },
        HybridFamily::Sp2 => {
            let s_part = s / 3.0f64.sqrt();
            match index {
                0 => s_part + (2.0 / 3.0f64).sqrt() * px,
                1 => s_part - px / 6.0f64.sqrt() + py / SQRT_2,
                2 => s_part - px / 6.0f64.sqrt() - py / SQRT_2,
                _ => 0.0,
            }
        }
        HybridFamily::Sp3 => match index {
            0 => 0.5 * (s + px + py + pz),
            1 => 0.5 * (s + px - py - pz),
            2 => 0.5 * (s - px + py - pz),
            3 => 0.5 * (s - px - py + pz),
            _ => 0.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINTS: [(f64, f64, f64); 4] = [
        (1.5, 0.4, 0.9),
        (3.0, 1.571, -0.5),
        (6.0, 2.6, 2.2),
        (0.7, 1.0, 0.0),
    ];

    #[test]
    fn sp3_lobe_zero_matches_direct_combination() {
        for (r, theta, phi) in POINTS {
            let (s, px, py, pz) = basis(r, theta, phi);
            let h = hybrid_wave_function(HybridFamily::Sp3, 0, r, theta, phi);
            assert!((h - 0.5 * (s + px + py + pz)).abs() < 1e-14);
        }
    }

    #[test]
    fn sp3_transformation_is_unitary() {
        // The four lobes redistribute but conserve the total squared
        // amplitude of the s, px, py, pz basis at every point.
        for (r, theta, phi) in POINTS {
            let (s, px, py, pz) = basis(r, theta, phi);
            let basis_sq = s * s + px * px + py * py + pz * pz;
            let lobes_sq: f64 = (0..4)
                .map(|i| hybrid_wave_function(HybridFamily::Sp3, i, r, theta, phi).powi(2))
                .sum();
            assert!((basis_sq - lobes_sq).abs() < 1e-12);
        }
    }

    #[test]
    fn sp_pair_conserves_s_pz_amplitude() {
        for (r, theta, phi) in POINTS {
            let (s, _, _, pz) = basis(r, theta, phi);
            let lobes_sq: f64 = (0..2)
                .map(|i| hybrid_wave_function(HybridFamily::Sp, i, r, theta, phi).powi(2))
                .sum();
            assert!((lobes_sq - (s * s + pz * pz)).abs() < 1e-12);
        }
    }

    #[test]
    fn sp2_lobes_conserve_s_px_py_amplitude() {
        for (r, theta, phi) in POINTS {
            let (s, px, py, _) = basis(r, theta, phi);
            let lobes_sq: f64 = (0..3)
                .map(|i| hybrid_wave_function(HybridFamily::Sp2, i, r, theta, phi).powi(2))
                .sum();
            assert!((lobes_sq - (s * s + px * px + py * py)).abs() < 1e-12);
        }
    }

    #[test]
    fn out_of_range_index_is_zero() {
        assert_eq!(hybrid_wave_function(HybridFamily::Sp, 2, 1.0, 1.0, 1.0), 0.0);
        assert_eq!(hybrid_wave_function(HybridFamily::Sp2, 3, 1.0, 1.0, 1.0), 0.0);
        assert_eq!(hybrid_wave_function(HybridFamily::Sp3, 4, 1.0, 1.0, 1.0), 0.0);
    }
}
