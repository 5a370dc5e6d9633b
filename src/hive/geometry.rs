//! SVG layout of the hive: six trapezoid wedges around a hexagonal center.
//!
//! Segment 0 is centred at the top and indices run clockwise. Each wedge spans
//! the band between the inner hexagon (the center cell) and the outer hexagon.
//!
//! Server-supplied wedges are drawn around the origin; they are shifted to the
//! viewbox center here, the path through an SVG `translate`.

use super::{Hive, OUTER_SEGMENTS};

pub const VIEWBOX: f64 = 300.0;
pub const DEFAULT_INNER_RADIUS: f64 = 48.0;
pub const DEFAULT_OUTER_RADIUS: f64 = 135.0;

const SLICE_DEG: f64 = 360.0 / OUTER_SEGMENTS as f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentSlot {
    Outer(usize),
    Center,
}

/// One drawable cell of the hive.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub slot: SegmentSlot,
    pub letter: char,
    pub label: (f64, f64),
    pub path: String,
    /// Translation for a path given in origin-centred coordinates.
    pub path_offset: Option<(f64, f64)>,
}

impl Segment {
    pub fn label_text(&self) -> String {
        self.letter.to_ascii_uppercase().to_string()
    }

    /// The same cell carrying whatever letter `hive` holds in this slot now.
    /// A shuffle between planning and drawing must not resurrect old letters.
    pub fn with_current_letter(&self, hive: &Hive) -> Segment {
        let letter = match self.slot {
            SegmentSlot::Outer(i) => hive.outer.get(i).copied(),
            SegmentSlot::Center => Some(hive.center),
        };
        Segment { letter: letter.unwrap_or(self.letter), ..self.clone() }
    }

    pub fn transform(&self) -> Option<String> {
        self.path_offset.map(|(x, y)| format!("translate({x:.2},{y:.2})"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HiveGeometry {
    pub center: (f64, f64),
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Default for HiveGeometry {
    fn default() -> Self {
        Self {
            center: (VIEWBOX / 2.0, VIEWBOX / 2.0),
            inner_radius: DEFAULT_INNER_RADIUS,
            outer_radius: DEFAULT_OUTER_RADIUS,
        }
    }
}

impl HiveGeometry {
    /// Geometry with a server-supplied center radius, ignoring nonsense values.
    pub fn with_inner_radius(radius: Option<f64>) -> Self {
        let mut g = Self::default();
        if let Some(r) = radius.filter(|r| r.is_finite() && *r > 0.0 && *r < g.outer_radius) {
            g.inner_radius = r;
        }
        g
    }

    pub fn label_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    /// Center angle of slice `index` in degrees; slice 0 points straight up.
    pub fn slice_angle(index: usize) -> f64 {
        -90.0 + SLICE_DEG * index as f64
    }

    fn polar(&self, radius: f64, deg: f64) -> (f64, f64) {
        let rad = deg.to_radians();
        (self.center.0 + radius * rad.cos(), self.center.1 + radius * rad.sin())
    }

    pub fn outer_label(&self, index: usize) -> (f64, f64) {
        self.polar(self.label_radius(), Self::slice_angle(index))
    }

    pub fn outer_path(&self, index: usize) -> String {
        let mid = Self::slice_angle(index);
        let (a0, a1) = (mid - SLICE_DEG / 2.0, mid + SLICE_DEG / 2.0);
        let pts = [
            self.polar(self.inner_radius, a0),
            self.polar(self.outer_radius, a0),
            self.polar(self.outer_radius, a1),
            self.polar(self.inner_radius, a1),
        ];
        polygon_path(&pts)
    }

    /// Inner hexagon; corners sit on the wedge edges so the cells tile.
    pub fn center_path(&self) -> String {
        let pts: Vec<(f64, f64)> = (0..OUTER_SEGMENTS)
            .map(|i| self.polar(self.inner_radius, Self::slice_angle(i) - SLICE_DEG / 2.0))
            .collect();
        polygon_path(&pts)
    }

    pub fn segments(&self, hive: &Hive) -> Vec<Segment> {
        let mut out: Vec<Segment> = hive
            .outer
            .iter()
            .enumerate()
            .map(|(i, &letter)| match hive.supplied.get(i) {
                Some(s) => Segment {
                    slot: SegmentSlot::Outer(i),
                    letter,
                    label: (s.label.0 + self.center.0, s.label.1 + self.center.1),
                    path: s.path.clone(),
                    path_offset: Some(self.center),
                },
                None => Segment {
                    slot: SegmentSlot::Outer(i),
                    letter,
                    label: self.outer_label(i),
                    path: self.outer_path(i),
                    path_offset: None,
                },
            })
            .collect();
        out.push(Segment {
            slot: SegmentSlot::Center,
            letter: hive.center,
            label: self.center,
            path: self.center_path(),
            path_offset: None,
        });
        out
    }
}

fn polygon_path(pts: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, (x, y)) in pts.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{cmd}{x:.2},{y:.2} "));
    }
    d.push('Z');
    d
}
