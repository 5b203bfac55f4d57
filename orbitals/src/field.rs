//! Dense scalar field sampled from the orbital evaluator
//!
//! The sampler walks a size^3 grid over a cube of physical space, evaluates
//! the selected orbital at every node and packs (density, phase) texels that
//! the compositor reads back through trilinear lookups. A background builder
//! rebuilds fields off the UI thread with latest-parameters-wins semantics.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use rayon::prelude::*;

use crate::hybrid::hybrid_wave_function;
use crate::state::{OrbitalConfig, OrbitalMode, QuantumNumbers};
use crate::wavefunction::{real_wave_function, wave_function};

/// Baked gain applied to every stored density so mid-range opacities land
/// in a usable band before the n-dependent boost kicks in.
pub const FIELD_GAIN: f64 = 40.0;

/// Densities at or below this are treated as empty space by the compositor.
pub const DENSITY_EPSILON: f32 = 1e-4;

/// One grid cell: non-negative probability density and a binary phase
/// indicator (1 where the real part of the amplitude is non-negative).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FieldTexel {
    pub density: f32,
    pub phase: f32,
}

/// Everything that forces a field rebuild when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRequest {
    pub qn: QuantumNumbers,
    pub mode: OrbitalMode,
    pub size: u32,
}

impl FieldRequest {
    pub fn from_config(config: &OrbitalConfig) -> Self {
        Self {
            qn: config.qn,
            mode: config.mode,
            size: config
                .quality
                .clamp(OrbitalConfig::MIN_QUALITY, OrbitalConfig::MAX_QUALITY),
        }
    }
}

/// Immutable size^3 density/phase grid with the physical range it covers
/// and the generation of the request that produced it.
pub struct ScalarField {
    size: usize,
    range: f64,
    generation: u64,
    texels: Vec<FieldTexel>,
}

impl ScalarField {
    /// Half-extent of the sampled cube in Bohr radii. The wave function's
    /// spread grows roughly as n^2; a fixed range would collapse high-n
    /// orbitals into a single bright voxel.
    pub fn spatial_range(n: u32) -> f64 {
        (n * 12 + 5) as f64
    }

    /// Evaluate the orbital over the full grid. O(size^3) evaluations, each
    /// O(l) in the recurrences; any parameter change rebuilds from scratch.
    pub fn sample(request: &FieldRequest) -> Self {
        Self::sample_with_generation(request, 0)
    }

    fn sample_with_generation(request: &FieldRequest, generation: u64) -> Self {
        let size = request.size as usize;
        assert!(size >= 2, "field needs at least 2 nodes per axis");
        let range = Self::spatial_range(request.qn.n());

        let started = Instant::now();
        let mut texels = vec![FieldTexel::default(); size * size * size];
        // z slabs are independent, so fan them out across the pool.
        texels
            .par_chunks_mut(size * size)
            .enumerate()
            .for_each(|(z, slab)| {
                let pz = grid_to_physical(z, size, range);
                for y in 0..size {
                    let py = grid_to_physical(y, size, range);
                    for x in 0..size {
                        let px = grid_to_physical(x, size, range);
                        slab[y * size + x] = evaluate(request, px, py, pz);
                    }
                }
            });
        log::debug!(
            "sampled {size}^3 field for {} in {:.1?}",
            request.qn.name(),
            started.elapsed()
        );

        Self {
            size,
            range,
            generation,
            texels,
        }
    }

    /// Grid for tests and synthetic inputs; texels in x-fastest order.
    #[cfg(test)]
    pub(crate) fn synthetic(size: usize, texels: Vec<FieldTexel>) -> Self {
        assert_eq!(texels.len(), size * size * size);
        Self {
            size,
            range: 1.0,
            generation: 0,
            texels,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> FieldTexel {
        self.texels[x + y * self.size + z * self.size * self.size]
    }

    /// Raw texel bytes in GPU upload order (x fastest, then y, then z).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Trilinear lookup with clamp-to-edge addressing; (u, v, w) in the
    /// [0, 1]^3 texture space where grid nodes sit at i/(size-1).
    pub fn sample_trilinear(&self, u: f32, v: f32, w: f32) -> FieldTexel {
        let scale = (self.size - 1) as f32;
        let fx = u.clamp(0.0, 1.0) * scale;
        let fy = v.clamp(0.0, 1.0) * scale;
        let fz = w.clamp(0.0, 1.0) * scale;

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let z0 = fz.floor() as usize;
        let x1 = (x0 + 1).min(self.size - 1);
        let y1 = (y0 + 1).min(self.size - 1);
        let z1 = (z0 + 1).min(self.size - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;
        let tz = fz - z0 as f32;

        let lerp = |a: FieldTexel, b: FieldTexel, t: f32| FieldTexel {
            density: a.density + (b.density - a.density) * t,
            phase: a.phase + (b.phase - a.phase) * t,
        };

        let c00 = lerp(self.get(x0, y0, z0), self.get(x1, y0, z0), tx);
        let c10 = lerp(self.get(x0, y1, z0), self.get(x1, y1, z0), tx);
        let c01 = lerp(self.get(x0, y0, z1), self.get(x1, y0, z1), tx);
        let c11 = lerp(self.get(x0, y1, z1), self.get(x1, y1, z1), tx);
        let c0 = lerp(c00, c10, ty);
        let c1 = lerp(c01, c11, ty);
        lerp(c0, c1, tz)
    }
}

/// Linear map from grid index to physical coordinate: both cube corners are
/// sampled exactly (size-1 denominator, no half-voxel bias).
fn grid_to_physical(i: usize, size: usize, range: f64) -> f64 {
    (i as f64 / (size - 1) as f64 - 0.5) * 2.0 * range
}

fn evaluate(request: &FieldRequest, px: f64, py: f64, pz: f64) -> FieldTexel {
    let r = (px * px + py * py + pz * pz).sqrt();
    // Rounding can push pz/(r+eps) just past [-1, 1], where acos is NaN.
    let theta = (pz / (r + 1e-5)).clamp(-1.0, 1.0).acos();
    let phi = py.atan2(px);

    let qn = request.qn;
    let (density, positive) = match request.mode {
        OrbitalMode::Complex => {
            let psi = wave_function(qn.n(), qn.l(), qn.m(), r, theta, phi);
            (psi.norm_sq(), psi.re >= 0.0)
        }
        OrbitalMode::Real => {
            let amp = real_wave_function(qn.n(), qn.l(), qn.m(), r, theta, phi);
            (amp * amp, amp >= 0.0)
        }
        OrbitalMode::Hybrid(spec) => {
            let amp = hybrid_wave_function(spec.family(), spec.index(), r, theta, phi);
            (amp * amp, amp >= 0.0)
        }
    };

    FieldTexel {
        density: (density * FIELD_GAIN) as f32,
        phase: if positive { 1.0 } else { 0.0 },
    }
}

/// Background field construction with latest-parameters-wins semantics.
///
/// A request made while another is queued supersedes it, and completed
/// fields older than the last adopted one are dropped on `poll`. A stale
/// in-flight build is never blended with a newer one.
pub struct FieldBuilder {
    requests: Sender<(u64, FieldRequest)>,
    results: Receiver<ScalarField>,
    next_generation: u64,
    adopted: u64,
}

impl FieldBuilder {
    pub fn spawn() -> Self {
        let (req_tx, req_rx) = mpsc::channel::<(u64, FieldRequest)>();
        let (res_tx, res_rx) = mpsc::channel();

        thread::Builder::new()
            .name("field-builder".into())
            .spawn(move || {
                while let Ok(mut job) = req_rx.recv() {
                    // Drain to the newest request before doing any work.
                    while let Ok(newer) = req_rx.try_recv() {
                        job = newer;
                    }
                    let (generation, request) = job;
                    let field = ScalarField::sample_with_generation(&request, generation);
                    if res_tx.send(field).is_err() {
                        break;
                    }
                }
            })
            .expect("failed to spawn field-builder thread");

        Self {
            requests: req_tx,
            results: res_rx,
            next_generation: 0,
            adopted: 0,
        }
    }

    /// Queue a rebuild. Supersedes any request the worker has not started.
    pub fn request(&mut self, request: FieldRequest) {
        self.next_generation += 1;
        log::debug!("field generation {} requested", self.next_generation);
        // The worker outlives the sender; a send error just means shutdown.
        let _ = self.requests.send((self.next_generation, request));
    }

    /// Newest completed field, if any. Stale generations are discarded.
    pub fn poll(&mut self) -> Option<ScalarField> {
        let mut newest = None;
        while let Ok(field) = self.results.try_recv() {
            if field.generation() > self.adopted {
                self.adopted = field.generation();
                newest = Some(field);
            }
        }
        newest
    }

    /// True while a requested generation has not been adopted yet.
    pub fn pending(&self) -> bool {
        self.next_generation > self.adopted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn request(n: u32, l: u32, m: i32, size: u32) -> FieldRequest {
        FieldRequest {
            qn: QuantumNumbers::new(n, l, m).unwrap(),
            mode: OrbitalMode::Complex,
            size,
        }
    }

    #[test]
    fn grid_mapping_hits_both_corners() {
        let range = 17.0;
        assert_eq!(grid_to_physical(0, 33, range), -range);
        assert_eq!(grid_to_physical(32, 33, range), range);
        assert_eq!(grid_to_physical(16, 33, range), 0.0);
    }

    #[test]
    fn spatial_range_tracks_n() {
        assert_eq!(ScalarField::spatial_range(1), 17.0);
        assert_eq!(ScalarField::spatial_range(3), 41.0);
        assert_eq!(ScalarField::spatial_range(7), 89.0);
    }

    #[test]
    fn densities_are_finite_and_non_negative() {
        let field = ScalarField::sample(&request(3, 2, -1, 16));
        for z in 0..16 {
            for y in 0..16 {
                for x in 0..16 {
                    let t = field.get(x, y, z);
                    assert!(t.density.is_finite() && t.density >= 0.0);
                    assert!(t.phase == 0.0 || t.phase == 1.0);
                }
            }
        }
    }

    #[test]
    fn trilinear_at_nodes_returns_stored_texels() {
        let field = ScalarField::sample(&request(2, 1, 0, 16));
        for (x, y, z) in [(0usize, 0usize, 0usize), (5, 9, 3), (15, 15, 15)] {
            let u = x as f32 / 15.0;
            let v = y as f32 / 15.0;
            let w = z as f32 / 15.0;
            let sampled = field.sample_trilinear(u, v, w);
            let stored = field.get(x, y, z);
            assert!((sampled.density - stored.density).abs() < 1e-5);
            assert!((sampled.phase - stored.phase).abs() < 1e-5);
        }
    }

    #[test]
    fn trilinear_clamps_outside_unit_cube() {
        let field = ScalarField::sample(&request(1, 0, 0, 16));
        let corner = field.get(0, 0, 0);
        let outside = field.sample_trilinear(-0.5, -0.5, -0.5);
        assert_eq!(corner, outside);
    }

    #[test]
    fn builder_adopts_only_the_newest_generation() {
        let mut builder = FieldBuilder::spawn();
        builder.request(request(1, 0, 0, 16));
        builder.request(request(2, 1, 0, 24));

        let deadline = Instant::now() + Duration::from_secs(30);
        let mut latest = None;
        while builder.pending() {
            if let Some(field) = builder.poll() {
                latest = Some(field);
            }
            assert!(Instant::now() < deadline, "builder never caught up");
            thread::sleep(Duration::from_millis(5));
        }

        let field = latest.expect("no field adopted");
        assert_eq!(field.generation(), 2);
        assert_eq!(field.size(), 24);
        assert!(!builder.pending());
    }
}
