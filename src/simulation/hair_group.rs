//! A head of hair: real strands planted on a spherical scalp plus derived
//! strands blended from their neighbours.
//!
//! Real strands are integrated independently (in parallel). Interpolated
//! strands own no state; their geometry is read from the real strands'
//! already-updated buffers after every real strand has finished its step.

use std::f64::consts::PI;

use rayon::prelude::*;
use tracing::debug;

use crate::configuration::config::{HairConfig, IntegratorConfig};
use crate::error::SimError;
use crate::simulation::hair::{HairParams, HairStrand};
use crate::simulation::states::{NVec3, ParticleSystem};
use crate::simulation::Rgb;

pub const HEAD_RADIUS: f64 = 1.0;
pub const DEFAULT_ROUNDS: usize = 3;
pub const DEFAULT_PER_ROUND: usize = 4;
pub const DEFAULT_INTERPOLATED_PER_GAP: usize = 2;
/// Pulls every band slightly toward the equator so the crown is not bald
const LAT_OFFSET: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct HairGroupParams {
    pub rounds: usize,
    pub per_round: usize,
    pub interpolated_per_gap: usize,
    pub head_radius: f64,
    pub strand: HairParams,
}

impl Default for HairGroupParams {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            per_round: DEFAULT_PER_ROUND,
            interpolated_per_gap: DEFAULT_INTERPOLATED_PER_GAP,
            head_radius: HEAD_RADIUS,
            strand: HairParams::default(),
        }
    }
}

impl From<&HairConfig> for HairGroupParams {
    fn from(cfg: &HairConfig) -> Self {
        let d = HairGroupParams::default();
        let s = HairParams::default();
        Self {
            rounds: cfg.rounds.unwrap_or(d.rounds),
            per_round: cfg.per_round.unwrap_or(d.per_round),
            interpolated_per_gap: cfg.interpolated_per_gap.unwrap_or(d.interpolated_per_gap),
            head_radius: d.head_radius,
            strand: HairParams {
                length: cfg.length.unwrap_or(s.length),
                unit_height: cfg.unit_height.unwrap_or(s.unit_height),
                curl: cfg.curl.unwrap_or(s.curl),
                head_center: s.head_center,
                wind_direction: cfg.wind_direction.map(NVec3::from).unwrap_or(s.wind_direction),
                wind_strength: cfg.wind_strength.unwrap_or(s.wind_strength),
                seed: cfg.seed.unwrap_or(s.seed),
            },
        }
    }
}

/// Point on a sphere of radius `r` centred at the origin
pub fn position_from_lat_lon(r: f64, lat: f64, lon: f64) -> NVec3 {
    NVec3::new(r * lat.cos() * lon.cos(), r * lat.sin(), r * lat.cos() * lon.sin())
}

/// A virtual strand whose point `i >= 1` is `sum_j weights[j] * hairs[sources[j]].position(i)`.
/// Point 0 is its own root on the scalp.
#[derive(Debug, Clone)]
pub struct InterpolatedStrand {
    origin: NVec3,
    sources: Vec<usize>,
    weights: Vec<f64>,
    color: Rgb,
}

impl InterpolatedStrand {
    /// `strand_count` is the number of real strands the sources index into
    pub fn new(origin: NVec3, sources: Vec<usize>, weights: Vec<f64>, strand_count: usize) -> Result<Self, SimError> {
        if sources.is_empty() {
            return Err(SimError::InvalidWeights("no source strands".into()));
        }
        if sources.len() != weights.len() {
            return Err(SimError::InvalidWeights(format!(
                "{} sources but {} weights",
                sources.len(),
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SimError::InvalidWeights("weights must be finite and non-negative".into()));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(SimError::InvalidWeights(format!("weights sum to {sum}, expected 1")));
        }
        if let Some(&index) = sources.iter().find(|&&s| s >= strand_count) {
            return Err(SimError::SourceOutOfRange { index, count: strand_count });
        }
        Ok(Self {
            origin,
            sources,
            weights,
            color: Rgb::new(0.642589, 0.347272, 0.211211),
        })
    }

    pub fn origin(&self) -> NVec3 {
        self.origin
    }

    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Blend the current positions of the source strands
    pub fn points(&self, hairs: &[HairStrand]) -> Vec<NVec3> {
        let len = hairs[self.sources[0]].num_particles();
        let mut points = Vec::with_capacity(len);
        points.push(self.origin);
        for i in 1..len {
            let p = self
                .sources
                .iter()
                .zip(&self.weights)
                .fold(NVec3::zeros(), |acc, (&s, &w)| acc + w * hairs[s].position(i));
            points.push(p);
        }
        points
    }
}

pub struct HairGroup {
    hairs: Vec<HairStrand>,
    interpolated: Vec<InterpolatedStrand>,
    per_round: usize,
}

impl HairGroup {
    pub fn new(params: &HairGroupParams) -> Result<Self, SimError> {
        let rounds = params.rounds;
        let per_round = params.per_round;
        let r = params.head_radius;
        let index_of = |i: usize, j: usize| i * per_round + j;

        let mut hairs = Vec::with_capacity(rounds * per_round);
        let mut lat_lon = Vec::with_capacity(rounds * per_round);
        for i in 0..rounds {
            for j in 0..per_round {
                let lat = (PI / 2.0) / rounds as f64 * (i + 1) as f64 - LAT_OFFSET;
                let lon = PI / per_round as f64 * j as f64;
                let strand = HairParams {
                    seed: params.strand.seed.wrapping_add(index_of(i, j) as u64),
                    ..params.strand.clone()
                };
                let root = params.strand.head_center + position_from_lat_lon(r, lat, lon);
                hairs.push(HairStrand::new(root, &strand)?);
                lat_lon.push((lat, lon));
            }
        }

        // blend sources with weights, origin from the same blend of lat/lon
        let count = hairs.len();
        let mut interpolated = Vec::new();
        let mut derive = |sources: Vec<usize>, weights: Vec<f64>| -> Result<(), SimError> {
            let (lat, lon) = sources
                .iter()
                .zip(&weights)
                .fold((0.0, 0.0), |(la, lo), (&s, &w)| (la + w * lat_lon[s].0, lo + w * lat_lon[s].1));
            let origin = params.strand.head_center + position_from_lat_lon(r, lat, lon);
            interpolated.push(InterpolatedStrand::new(origin, sources, weights, count)?);
            Ok(())
        };

        let m = params.interpolated_per_gap;
        let step = 1.0 / (m + 1) as f64;
        for i in 0..rounds {
            for j in 0..per_round {
                if i + 1 < rounds {
                    for k in 1..=m {
                        let t = k as f64 * step;
                        derive(vec![index_of(i, j), index_of(i + 1, j)], vec![1.0 - t, t])?;
                    }
                }
                if j + 1 < per_round {
                    for k in 1..=m {
                        let t = k as f64 * step;
                        derive(vec![index_of(i, j), index_of(i, j + 1)], vec![1.0 - t, t])?;
                    }
                }
                if i + 1 < rounds && j + 1 < per_round {
                    for k1 in 1..=m {
                        for k2 in 1..=m {
                            let u = k1 as f64 * step;
                            let v = k2 as f64 * step;
                            derive(
                                vec![index_of(i, j), index_of(i, j + 1), index_of(i + 1, j), index_of(i + 1, j + 1)],
                                vec![(1.0 - u) * (1.0 - v), u * (1.0 - v), (1.0 - u) * v, u * v],
                            )?;
                        }
                    }
                }
            }
        }

        debug!(
            strands = hairs.len(),
            interpolated = interpolated.len(),
            "built hair group"
        );

        Ok(Self {
            hairs,
            interpolated,
            per_round,
        })
    }

    pub fn hairs(&self) -> &[HairStrand] {
        &self.hairs
    }

    pub fn interpolated(&self) -> &[InterpolatedStrand] {
        &self.interpolated
    }

    /// Strand at latitude band `round`, position `j` within the band
    pub fn strand(&self, round: usize, j: usize) -> &HairStrand {
        &self.hairs[round * self.per_round + j]
    }

    /// Advance every real strand by one step
    pub fn step(&mut self, integrator: IntegratorConfig, h: f64) {
        self.hairs
            .par_iter_mut()
            .for_each(|strand| integrator.take_step(strand, h));
    }

    /// Geometry of every interpolated strand, read from the current strand states
    pub fn interpolated_points(&self) -> Vec<Vec<NVec3>> {
        self.interpolated.iter().map(|s| s.points(&self.hairs)).collect()
    }

    pub fn set_curl(&mut self, curl: f64) {
        for strand in &mut self.hairs {
            strand.set_curl(curl);
        }
    }

    pub fn toggle_wind(&mut self) {
        for strand in &mut self.hairs {
            strand.toggle_wind();
        }
    }

    pub fn set_wind(&mut self, direction: NVec3, strength: f64) {
        for strand in &mut self.hairs {
            strand.set_wind(direction, strength);
        }
    }

    pub fn set_color(&mut self, color: Rgb) {
        for strand in &mut self.hairs {
            strand.set_color(color);
        }
        for strand in &mut self.interpolated {
            strand.set_color(color);
        }
    }
}
