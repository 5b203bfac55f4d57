//! Hydrogen-like wave function evaluation
//!
//! psi(r, theta, phi) = R_nl(r) * Y_lm(theta, phi), with r in Bohr radii,
//! theta the polar angle and phi the azimuthal angle.

use std::f64::consts::PI;

use crate::constants::A0;
use crate::special::{factorial, laguerre, legendre};

/// Complex amplitude of a wave function at a point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Create from polar form: r * e^(i*theta)
    pub fn from_polar(r: f64, theta: f64) -> Self {
        Self {
            re: r * theta.cos(),
            im: r * theta.sin(),
        }
    }

    /// Magnitude squared |z|^2 = probability density
    pub fn norm_sq(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Magnitude |z|
    pub fn norm(&self) -> f64 {
        self.norm_sq().sqrt()
    }
}

impl std::ops::Add for Complex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl std::ops::Mul for Complex {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

impl std::ops::Mul<f64> for Complex {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self {
            re: self.re * rhs,
            im: self.im * rhs,
        }
    }
}

/// Normalization constant shared by the complex and real angular parts:
/// sqrt[(2l+1)(l-|m|)! / (4 pi (l+|m|)!)]
fn angular_norm(l: u32, m_abs: u32) -> f64 {
    (((2 * l + 1) as f64 * factorial(l - m_abs)) / (4.0 * PI * factorial(l + m_abs))).sqrt()
}

/// Spherical harmonic Y_l^m(theta, phi).
///
/// The Condon-Shortley phase lives in the Legendre seed, so it is not
/// applied again here.
pub fn spherical_harmonic(l: u32, m: i32, theta: f64, phi: f64) -> Complex {
    let norm = angular_norm(l, m.unsigned_abs());
    let p_lm = legendre(l, m, theta.cos());
    let phase = m as f64 * phi;
    Complex::new(norm * p_lm * phase.cos(), norm * p_lm * phase.sin())
}

/// Radial wave function R_nl(r) for a hydrogen-like atom.
///
/// rho = 2r/(n a0), N = sqrt[(2/(n a0))^3 (n-l-1)! / (2n (n+l)!)], and
/// R = N e^(-rho/2) rho^l L_{n-l-1}^{2l+1}(rho). The denominator carries a
/// single power of (n+l)!, which is the convention matching the Laguerre
/// recurrence used here; validated by the normalization integral test.
pub fn radial_wave_function(n: u32, l: u32, r: f64) -> f64 {
    debug_assert!(n >= 1 && l < n && r >= 0.0);
    let nf = n as f64 * A0;
    let rho = 2.0 * r / nf;
    let norm = ((2.0 / nf).powi(3) * factorial(n - l - 1) / (2.0 * n as f64 * factorial(n + l)))
        .sqrt();
    norm * (-rho / 2.0).exp() * rho.powi(l as i32) * laguerre(n - l - 1, 2 * l + 1, rho)
}

/// Complete wave function psi(r, theta, phi) = R_nl(r) Y_l^m(theta, phi)
pub fn wave_function(n: u32, l: u32, m: i32, r: f64, theta: f64, phi: f64) -> Complex {
    spherical_harmonic(l, m, theta, phi) * radial_wave_function(n, l, r)
}

/// Probability density |psi|^2
pub fn probability_density(n: u32, l: u32, m: i32, r: f64, theta: f64, phi: f64) -> f64 {
    wave_function(n, l, m, r, theta, phi).norm_sq()
}

/// Real-valued wave function in the chemist convention.
///
/// m > 0 selects the cosine lobe (px, dxz, ...), m < 0 the sine lobe
/// (py, dxy, ...). Which lobe gets labeled "x" versus "y" hangs on this
/// sign mapping, so it must not be reshuffled.
pub fn real_wave_function(n: u32, l: u32, m: i32, r: f64, theta: f64, phi: f64) -> f64 {
    let radial = radial_wave_function(n, l, r);
    let m_abs = m.unsigned_abs();
    let norm = angular_norm(l, m_abs);
    let p_lm = legendre(l, m_abs as i32, theta.cos());

    if m == 0 {
        return radial * norm * p_lm;
    }

    let trig = if m > 0 {
        (m as f64 * phi).cos()
    } else {
        (m_abs as f64 * phi).sin()
    };
    radial * std::f64::consts::SQRT_2 * norm * p_lm * trig
}

/// Radial probability distribution P(r) = r^2 R_nl(r)^2, sampled at
/// `samples` + 1 evenly spaced radii from 0 to max_r inclusive. Derived
/// straight from the radial wave function, independent of any 3D field.
pub fn radial_distribution(n: u32, l: u32, samples: usize, max_r: f64) -> Vec<(f64, f64)> {
    (0..=samples)
        .map(|i| {
            let r = max_r * i as f64 / samples as f64;
            let radial = radial_wave_function(n, l, r);
            (r, r * r * radial * radial)
        })
        .collect()
}

/// Plot range heuristic for the radial distribution: the n^2 growth of the
/// orbital radius, with headroom for the exponential tail.
pub fn radial_plot_range(n: u32) -> f64 {
    (n * n) as f64 * 5.0
}
