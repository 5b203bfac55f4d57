//! Orbital selection state and render configuration
//!
//! The viewer owns an immutable `OrbitalConfig` snapshot per frame. Slider
//! mutations run through the pure clamping transitions here, so the bounds
//! n >= 1, l <= n-1, |m| <= l hold after every change and are testable
//! without any rendering context.

use std::fmt;

/// Domain errors for orbital selection. These are local validation
/// failures, never fatal to the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    InvalidQuantumNumbers { n: u32, l: u32, m: i32 },
    InvalidHybridIndex { family: HybridFamily, index: u32 },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::InvalidQuantumNumbers { n, l, m } => {
                write!(f, "invalid quantum numbers n={n} l={l} m={m} (need n>=1, l<n, |m|<=l)")
            }
            StateError::InvalidHybridIndex { family, index } => {
                write!(
                    f,
                    "hybrid index {index} out of range for {} (max {})",
                    family.label(),
                    family.orbital_count() - 1
                )
            }
        }
    }
}

impl std::error::Error for StateError {}

/// Quantum numbers (n, l, m) of a hydrogen-like orbital.
///
/// Construction and every transition preserve n >= 1, l <= n-1, |m| <= l.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantumNumbers {
    n: u32,
    l: u32,
    m: i32,
}

impl QuantumNumbers {
    /// Validating constructor. Fails fast instead of clamping so upstream
    /// bugs surface as errors rather than silently different orbitals.
    pub fn new(n: u32, l: u32, m: i32) -> Result<Self, StateError> {
        if n == 0 || l >= n || m.unsigned_abs() > l {
            return Err(StateError::InvalidQuantumNumbers { n, l, m });
        }
        Ok(Self { n, l, m })
    }

    /// The 1s ground state
    pub fn ground() -> Self {
        Self { n: 1, l: 0, m: 0 }
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn l(&self) -> u32 {
        self.l
    }

    pub fn m(&self) -> i32 {
        self.m
    }

    /// Change n, clamping l and then m back into range.
    pub fn with_n(self, n: u32) -> Self {
        let n = n.max(1);
        let l = self.l.min(n - 1);
        let m = self.m.clamp(-(l as i32), l as i32);
        Self { n, l, m }
    }

    /// Change l (clamped to n-1), clamping m back into range.
    pub fn with_l(self, l: u32) -> Self {
        let l = l.min(self.n - 1);
        let m = self.m.clamp(-(l as i32), l as i32);
        Self { n: self.n, l, m }
    }

    /// Change m, clamped to [-l, l].
    pub fn with_m(self, m: i32) -> Self {
        Self {
            m: m.clamp(-(self.l as i32), self.l as i32),
            ..self
        }
    }

    /// Orbital name (1s, 2p, 3d, ...)
    pub fn name(&self) -> String {
        let l_char = match self.l {
            0 => 's',
            1 => 'p',
            2 => 'd',
            3 => 'f',
            _ => 'g',
        };
        format!("{}{}{:+}", self.n, l_char, self.m)
    }
}

/// Hybridization family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridFamily {
    Sp,
    Sp2,
    Sp3,
}

impl HybridFamily {
    pub const ALL: [HybridFamily; 3] = [HybridFamily::Sp, HybridFamily::Sp2, HybridFamily::Sp3];

    /// Number of hybrid lobes the family produces
    pub fn orbital_count(self) -> u32 {
        match self {
            HybridFamily::Sp => 2,
            HybridFamily::Sp2 => 3,
            HybridFamily::Sp3 => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HybridFamily::Sp => "sp",
            HybridFamily::Sp2 => "sp2",
            HybridFamily::Sp3 => "sp3",
        }
    }
}

/// A validated (family, lobe index) selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridSpec {
    family: HybridFamily,
    index: u32,
}

impl HybridSpec {
    pub fn new(family: HybridFamily, index: u32) -> Result<Self, StateError> {
        if index >= family.orbital_count() {
            return Err(StateError::InvalidHybridIndex { family, index });
        }
        Ok(Self { family, index })
    }

    pub fn family(&self) -> HybridFamily {
        self.family
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl Default for HybridSpec {
    fn default() -> Self {
        Self {
            family: HybridFamily::Sp3,
            index: 0,
        }
    }
}

/// How the orbital amplitude is computed per grid point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbitalMode {
    /// |psi|^2 of the complex wave function
    Complex,
    /// Squared real (chemist-convention) amplitude
    Real,
    /// Squared hybrid-lobe amplitude
    Hybrid(HybridSpec),
}

/// How the compositor turns densities into a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingMode {
    Cloud,
    Isosurface,
}

/// Immutable per-frame configuration of the whole viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalConfig {
    pub qn: QuantumNumbers,
    pub mode: OrbitalMode,
    /// Grid resolution per axis; clamped to [MIN_QUALITY, MAX_QUALITY]
    /// wherever a field is actually built.
    pub quality: u32,
    pub opacity: f32,
    pub shading: ShadingMode,
}

impl OrbitalConfig {
    pub const MIN_QUALITY: u32 = 16;
    pub const MAX_QUALITY: u32 = 128;
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        Self {
            // 3d_z2 makes a good first impression
            qn: QuantumNumbers { n: 3, l: 2, m: 0 },
            mode: OrbitalMode::Complex,
            quality: 64,
            opacity: 0.5,
            shading: ShadingMode::Cloud,
        }
    }
}
