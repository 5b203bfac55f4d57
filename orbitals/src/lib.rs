//! Hydrogen-like atomic orbital visualization
//!
//! This crate evaluates hydrogen-like wave functions over a dense 3D grid
//! and renders the resulting density/phase field as a volumetric cloud or
//! an isosurface shell:
//!
//! - **Special functions**: factorials, associated Legendre and Laguerre
//!   polynomials via their stable recurrences
//! - **Orbital evaluator**: spherical harmonics, radial wave functions,
//!   complex/real/hybrid orbital amplitudes
//! - **Field sampler**: discretizes a cube of space into a density + phase
//!   scalar field, rebuilt in the background on parameter changes
//! - **Volumetric compositor**: per-ray marching with cloud and isosurface
//!   modes, as a CPU kernel and a matching WGSL pipeline

pub mod special;
pub mod wavefunction;
pub mod hybrid;
pub mod state;
pub mod field;
pub mod compositor;
pub mod volume_renderer;
pub mod controls_ui;

/// Constants shared by the evaluator and the renderer
pub mod constants {
    /// Bohr radius (atomic units; all distances are multiples of a0)
    pub const A0: f64 = 1.0;

    /// World-space edge length of the rendered volume cube. The field is
    /// always marched in its local unit-cube space regardless of this.
    pub const VOLUME_SCALE: f32 = 10.0;
}
