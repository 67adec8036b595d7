//! Route risk evaluation.
//!
//! A route is scored as `alpha * length + beta * sum(1 / (d^2 + 1))` over
//! samples taken along the polyline, where `d` is the sample's distance to
//! the threat. Only samples the threat can see contribute; visibility is a
//! pluggable predicate and currently defaults to [`AlwaysVisible`] because
//! the site model carries no wall geometry.

use serde::Serialize;

use crate::config::RoutingConfig;
use crate::geometry::{polyline_length, Point};
use crate::graph::{NavGraph, NodeIndex};

/// Segments shorter than this contribute no samples.
const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// Line-of-sight predicate between a route sample and the threat.
pub trait Visibility: Send + Sync {
    fn is_visible(&self, sample: Point, threat: Point) -> bool;
}

/// Treats every sample as visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl Visibility for AlwaysVisible {
    fn is_visible(&self, _sample: Point, _threat: Point) -> bool {
        true
    }
}

impl<F> Visibility for F
where
    F: Fn(Point, Point) -> bool + Send + Sync,
{
    fn is_visible(&self, sample: Point, threat: Point) -> bool {
        self(sample, threat)
    }
}

/// Scoring weights and sample spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParams {
    pub step: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self::from(&RoutingConfig::default())
    }
}

impl From<&RoutingConfig> for RiskParams {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            step: config.risk_step,
            alpha: config.risk_alpha,
            beta: config.risk_beta,
        }
    }
}

/// Result of scoring one polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub risk: f64,
    pub length: f64,
    pub exposure: f64,
    /// Distance from each sample to the threat; hidden samples are infinite.
    #[serde(skip)]
    pub sample_distances: Vec<f64>,
}

impl RiskAssessment {
    /// Smallest finite sample distance, or infinity when nothing was visible.
    pub fn min_visible_distance(&self) -> f64 {
        self.sample_distances
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(f64::INFINITY, f64::min)
    }
}

/// Node positions in path order.
pub fn polyline(graph: &NavGraph, path: &[NodeIndex]) -> Vec<Point> {
    path.iter().map(|&index| graph.position(index)).collect()
}

/// Resample a polyline.
///
/// Each segment of length `L` is split into `max(1, floor(L / step))` equal
/// parts and sampled at the start of every part; the final vertex is always
/// appended. Degenerate segments are skipped.
pub fn sample_along(points: &[Point], step: f64) -> Vec<Point> {
    let Some(last) = points.last() else {
        return Vec::new();
    };

    let mut samples = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let segment = a.distance_to(&b);
        if segment < MIN_SEGMENT_LENGTH {
            continue;
        }
        let parts = ((segment / step) as usize).max(1);
        for i in 0..parts {
            samples.push(a.lerp(&b, i as f64 / parts as f64));
        }
    }
    samples.push(*last);
    samples
}

/// Score a polyline against a threat position.
pub fn risk_score(
    points: &[Point],
    threat: Point,
    params: &RiskParams,
    visibility: &dyn Visibility,
) -> RiskAssessment {
    let length = polyline_length(points);
    let mut exposure = 0.0;
    let mut sample_distances = Vec::new();

    for sample in sample_along(points, params.step) {
        let d = sample.distance_to(&threat);
        if visibility.is_visible(sample, threat) {
            sample_distances.push(d);
            exposure += 1.0 / (d * d + 1.0);
        } else {
            sample_distances.push(f64::INFINITY);
        }
    }

    RiskAssessment {
        risk: params.alpha * length + params.beta * exposure,
        length,
        exposure,
        sample_distances,
    }
}
