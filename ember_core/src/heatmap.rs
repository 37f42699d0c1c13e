//! Heat blob compositing - convex-hull-bounded radial density fields.
//!
//! Turns clusters of (synthetic or aggregated) presence points into a
//! renderer-agnostic draw plan. For each cluster:
//!
//! 1. Project all points to render space (caller-supplied projection).
//! 2. Convex hull of the projected points (requires >= 3 distinct vertices).
//! 3. Per-point radius in render units from the local projection scale.
//! 4. Clip region: the hull outline *stroked* at twice the radius with round
//!    joins/caps. This approximates the union of N overlapping disks around
//!    the hull without an exact Minkowski sum - O(hull size) instead of
//!    O(n^2), trading geometric precision for cost.
//! 5. Radial gradient at the point centroid, alpha stops scaled by the base
//!    intensity, extending to the farthest hull vertex plus one radius.
//! 6. Groups composite additively (lightening), with a global alpha ceiling
//!    applied at composite time so dense areas cannot saturate.
//!
//! The whole pass is a pure function of its inputs: no shared state is
//! mutated, so it is safe to call on every display-refresh frame.

use crate::error::CoreError;
use crate::tiling::METERS_PER_DEGREE_LAT;
use ember_env::{Coordinate, HeatSample, VenueId};
use geo::{ConvexHull, MultiPoint, Point};
use serde::{Deserialize, Serialize};

/// A point in render space (screen units, caller-defined).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderPoint {
    pub x: f64,
    pub y: f64,
}

impl RenderPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another render point.
    pub fn distance(&self, other: &RenderPoint) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Caller-supplied map projection from geographic to render space.
///
/// The compositor derives the local scale numerically by projecting pairs of
/// nearby coordinates, so implementations only need the forward transform.
pub trait MapProjection {
    /// Projects a coordinate to render space.
    fn project(&self, coord: &Coordinate) -> RenderPoint;
}

/// Simple equirectangular screen projection for tests and simulation.
#[derive(Debug, Clone, Copy)]
pub struct EquirectangularView {
    /// Geographic center mapped to render-space origin
    pub center: Coordinate,

    /// Render units per meter (zoom level)
    pub units_per_meter: f64,
}

impl MapProjection for EquirectangularView {
    fn project(&self, coord: &Coordinate) -> RenderPoint {
        let lat_rad = self.center.lat_deg.to_radians();
        let x = (coord.lon_deg - self.center.lon_deg)
            * METERS_PER_DEGREE_LAT
            * lat_rad.cos()
            * self.units_per_meter;
        // Screen y grows downward
        let y = -(coord.lat_deg - self.center.lat_deg) * METERS_PER_DEGREE_LAT * self.units_per_meter;
        RenderPoint::new(x, y)
    }
}

/// One venue's jittered contributor points plus display parameters.
///
/// Invariants enforced at construction: at least one point, radius > 0,
/// intensity clamped into [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct HeatBlobGroup {
    /// Venue/cluster identity (labeling only, optional)
    pub venue: Option<VenueId>,

    /// Jittered sample points around the venue
    pub points: Vec<Coordinate>,

    /// Base intensity in [0, 1]
    pub base_intensity: f64,

    /// Per-point radius in meters
    pub radius_m: f64,
}

impl HeatBlobGroup {
    /// Creates a group, clamping intensity and validating the rest.
    pub fn new(
        venue: Option<VenueId>,
        points: Vec<Coordinate>,
        base_intensity: f64,
        radius_m: f64,
    ) -> Result<Self, CoreError> {
        if points.is_empty() {
            return Err(CoreError::EmptyBlobGroup);
        }
        if radius_m <= 0.0 {
            return Err(CoreError::NonPositiveBlobRadius(radius_m));
        }
        Ok(Self {
            venue,
            points,
            base_intensity: base_intensity.clamp(0.0, 1.0),
            radius_m,
        })
    }

    /// Builds a group from an aggregated heat sample, under the same
    /// invariants as [`new`](Self::new).
    pub fn from_sample(sample: HeatSample) -> Result<Self, CoreError> {
        Self::new(
            Some(sample.venue),
            sample.points,
            sample.intensity,
            sample.radius_m,
        )
    }
}

/// One alpha stop of a radial gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Offset along the gradient, 0 (center) to 1 (edge)
    pub offset: f64,

    /// Alpha at this stop, already scaled by the group's base intensity
    pub alpha: f64,
}

/// Radial gradient description for one blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialGradient {
    /// Gradient center (the projected point centroid)
    pub center: RenderPoint,

    /// Gradient extent: farthest hull vertex distance plus one radius
    pub radius: f64,

    /// Inner/mid/outer alpha stops
    pub stops: Vec<GradientStop>,
}

/// Clip region for one blob: the hull outline to be stroked with round
/// joins/caps at `stroke_width`, then used as a clip path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullClip {
    /// Convex hull vertices in order (not closed; renderer closes the path)
    pub outline: Vec<RenderPoint>,

    /// Stroke width: twice the per-point render radius
    pub stroke_width: f64,
}

/// Draw instructions for one heat blob group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobDrawCommand {
    /// Venue identity carried through for debugging/labels
    pub venue: Option<VenueId>,

    /// Clip region approximating the disk union around the hull
    pub clip: HullClip,

    /// Gradient drawn within the clip
    pub gradient: RadialGradient,
}

/// The full overlay draw plan for one frame.
///
/// Commands composite with additive (lightening) blending; the renderer
/// applies `alpha_ceiling` globally so overlapping venues reinforce without
/// saturating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatOverlay {
    pub commands: Vec<BlobDrawCommand>,
    pub alpha_ceiling: f64,
}

impl HeatOverlay {
    /// True when nothing will be drawn.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Compositor tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct CompositorConfig {
    /// Global alpha ceiling applied at composite time (default: 0.85)
    pub alpha_ceiling: f64,

    /// Blobs whose render radius falls at or below this are skipped
    /// (extreme zoom-out produces invisible/garbage draws; default: 1.0)
    pub min_render_radius: f64,

    /// Gradient alpha at the centroid, before intensity scaling
    pub inner_alpha: f64,

    /// Gradient alpha at the mid stop, before intensity scaling
    pub mid_alpha: f64,

    /// Offset of the mid stop along the gradient
    pub mid_offset: f64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            alpha_ceiling: 0.85,
            min_render_radius: 1.0,
            inner_alpha: 0.9,
            mid_alpha: 0.45,
            mid_offset: 0.55,
        }
    }
}

/// The heat blob compositor.
///
/// Stateless apart from its config; `composite` is re-entrant-safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatBlobCompositor {
    config: CompositorConfig,
}

impl HeatBlobCompositor {
    /// Creates a compositor with the given config.
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    /// Builds the overlay draw plan for the given groups and viewport.
    ///
    /// Degenerate groups (fewer than 3 distinct hull vertices, sub-pixel
    /// radius) are skipped, never errors.
    pub fn composite(
        &self,
        groups: &[HeatBlobGroup],
        projection: &dyn MapProjection,
    ) -> HeatOverlay {
        let mut commands = Vec::new();

        for group in groups {
            if let Some(command) = self.plan_group(group, projection) {
                commands.push(command);
            }
        }

        HeatOverlay {
            commands,
            alpha_ceiling: self.config.alpha_ceiling,
        }
    }

    fn plan_group(
        &self,
        group: &HeatBlobGroup,
        projection: &dyn MapProjection,
    ) -> Option<BlobDrawCommand> {
        if group.points.len() < 3 || group.base_intensity <= 0.0 {
            return None;
        }

        let projected: Vec<RenderPoint> =
            group.points.iter().map(|c| projection.project(c)).collect();

        let outline = convex_hull(&projected)?;

        let radius = render_radius(&group.points[0], group.radius_m, projection);
        if radius <= self.config.min_render_radius {
            return None;
        }

        // Centroid of the *points*, not the hull: the gradient should sit
        // where contributors actually concentrate
        let n = projected.len() as f64;
        let centroid = RenderPoint::new(
            projected.iter().map(|p| p.x).sum::<f64>() / n,
            projected.iter().map(|p| p.y).sum::<f64>() / n,
        );

        let farthest = outline
            .iter()
            .map(|v| centroid.distance(v))
            .fold(0.0_f64, f64::max);

        let intensity = group.base_intensity;
        let gradient = RadialGradient {
            center: centroid,
            radius: farthest + radius,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    alpha: self.config.inner_alpha * intensity,
                },
                GradientStop {
                    offset: self.config.mid_offset,
                    alpha: self.config.mid_alpha * intensity,
                },
                GradientStop {
                    offset: 1.0,
                    alpha: 0.0,
                },
            ],
        };

        Some(BlobDrawCommand {
            venue: group.venue,
            clip: HullClip {
                outline,
                stroke_width: 2.0 * radius,
            },
            gradient,
        })
    }
}

/// Convex hull of projected points; `None` with fewer than 3 distinct
/// vertices (collinear clusters degenerate and are skipped upstream).
fn convex_hull(points: &[RenderPoint]) -> Option<Vec<RenderPoint>> {
    if points.len() < 3 {
        return None;
    }

    let multi = MultiPoint::new(points.iter().map(|p| Point::new(p.x, p.y)).collect());
    let hull = multi.convex_hull();

    // The exterior ring is closed (first == last); drop the closing vertex
    let ring = hull.exterior();
    let mut outline: Vec<RenderPoint> = ring
        .coords()
        .map(|c| RenderPoint::new(c.x, c.y))
        .collect();
    if outline.len() >= 2 && outline.first() == outline.last() {
        outline.pop();
    }
    outline.dedup();

    if outline.len() < 3 {
        return None;
    }
    Some(outline)
}

/// Per-point radius in render units, from the local projection scale at one
/// reference point.
fn render_radius(reference: &Coordinate, radius_m: f64, projection: &dyn MapProjection) -> f64 {
    // Offset the reference eastward by radius_m and measure in render space
    let lat_rad = reference
        .lat_deg
        .clamp(-89.9, 89.9)
        .to_radians();
    let dlon = radius_m / (METERS_PER_DEGREE_LAT * lat_rad.cos());
    let east = Coordinate::new(reference.lat_deg, reference.lon_deg + dlon);

    projection
        .project(reference)
        .distance(&projection.project(&east))
}
