//! Pool table layout
//!
//! Eighteen linear segments form the rails and pocket jaws:
//!
//! ```text
//!            8 /   9   \ 10
//!           7 /         \ 11
//!            |           |
//!          6 |           | 12
//!          5 -           - 13
//!          4 -           - 14
//!          3 |           | 15
//!            |           |
//!           2 \         / 16
//!            1 \  18   / 17
//! ```
//!
//! Ids 3, 6, 9, 12, 15 and 18 are full-length rails. The others are short jaw
//! segments flanking the six pockets. Circular segments are supplied by the
//! caller (pocket mouths, obstacles).

use std::collections::BTreeMap;

use serde::Serialize;

use super::segment::{CircularSegment, CushionKind, CushionSegment, LinearSegment};
use crate::Vec3;
use crate::constants::PhysicalConstants;
use crate::error::{SimError, SimResult};

/// Half-width of the side pocket opening (m)
const SIDE_POCKET_HALF_WIDTH: f64 = 0.05;
/// Corner chamfer along each rail (m)
const CORNER_CHAMFER: f64 = 0.062;
/// Jaw segment length (m)
const JAW_LENGTH: f64 = 0.1;

/// Segment heights closer than this count as equal
const HEIGHT_EPS: f64 = 1e-12;

/// A pool table: dimensions and cushion segments
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    width: f64,
    length: f64,
    edge_width: f64,
    cushion_width: f64,
    cushion_height: f64,
    table_height: f64,
    lights_height: f64,
    cushion_segments: BTreeMap<CushionKind, BTreeMap<String, CushionSegment>>,
}

impl Table {
    /// Start building a table with every dimension taken from `constants`
    pub fn builder(constants: &PhysicalConstants) -> TableBuilder {
        TableBuilder::new(constants)
    }

    /// Standard table with no circular segments
    pub fn standard(constants: &PhysicalConstants) -> SimResult<Self> {
        Self::builder(constants).build()
    }

    /// Center of the playing surface
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.width / 2.0, self.length / 2.0, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn edge_width(&self) -> f64 {
        self.edge_width
    }

    pub fn cushion_width(&self) -> f64 {
        self.cushion_width
    }

    /// Height of every cushion segment on this table
    pub fn cushion_height(&self) -> f64 {
        self.cushion_height
    }

    pub fn table_height(&self) -> f64 {
        self.table_height
    }

    pub fn lights_height(&self) -> f64 {
        self.lights_height
    }

    /// Segments of one kind, keyed by id
    pub fn segments(&self, kind: CushionKind) -> &BTreeMap<String, CushionSegment> {
        // Both kinds are always present; built in `with_rails`
        &self.cushion_segments[&kind]
    }

    /// Look up a segment of either kind
    pub fn segment(&self, id: &str) -> Option<&CushionSegment> {
        self.cushion_segments.values().find_map(|segs| segs.get(id))
    }

    /// All segments, linear first, each kind in id order
    pub fn iter_segments(&self) -> impl Iterator<Item = &CushionSegment> {
        self.cushion_segments.values().flat_map(|segs| segs.values())
    }

    pub fn linear_count(&self) -> usize {
        self.segments(CushionKind::Linear).len()
    }

    pub fn circular_count(&self) -> usize {
        self.segments(CushionKind::Circular).len()
    }

    /// Add a caller-supplied circular segment
    ///
    /// The id must be unused by any segment of either kind, and the segment
    /// must sit at the table's cushion height.
    pub fn add_circular(&mut self, segment: CircularSegment) -> SimResult<()> {
        self.insert(segment.into())
    }

    fn insert(&mut self, segment: CushionSegment) -> SimResult<()> {
        if self.segment(segment.id()).is_some() {
            return Err(SimError::DuplicateId(segment.id().to_string()));
        }
        if (segment.height() - self.cushion_height).abs() > HEIGHT_EPS {
            return Err(SimError::geometry(segment.id(), "height mismatch"));
        }
        log::debug!("Added {} segment '{}'", segment.kind().as_str(), segment.id());
        self.cushion_segments
            .entry(segment.kind())
            .or_default()
            .insert(segment.id().to_string(), segment);
        Ok(())
    }

    /// Table with dimensions set and the 18-segment rail layout installed
    fn with_rails(dims: Dimensions) -> SimResult<Self> {
        let mut table = Self {
            width: dims.width,
            length: dims.length,
            edge_width: dims.edge_width,
            cushion_width: dims.cushion_width,
            cushion_height: dims.cushion_height,
            table_height: dims.table_height,
            lights_height: dims.lights_height,
            cushion_segments: BTreeMap::from([
                (CushionKind::Linear, BTreeMap::new()),
                (CushionKind::Circular, BTreeMap::new()),
            ]),
        };

        for segment in rail_layout(dims.width, dims.length, dims.cushion_height)? {
            table.insert(segment.into())?;
        }

        Ok(table)
    }
}

/// Rails and jaws for a `w` x `l` table with cushions at height `h`
fn rail_layout(w: f64, l: f64, h: f64) -> SimResult<Vec<LinearSegment>> {
    let s = SIDE_POCKET_HALF_WIDTH;
    let c = CORNER_CHAMFER;
    let j = JAW_LENGTH;
    let js = j / 2f64.sqrt();

    let p = |x: f64, y: f64| Vec3::new(x, y, h);

    let layout = [
        // Long rails
        ("3", p(0.0, c), p(0.0, l / 2.0 - s)),
        ("6", p(0.0, l / 2.0 + s), p(0.0, l - c)),
        ("9", p(c, l), p(w - c, l)),
        ("12", p(w, l - c), p(w, l / 2.0 + s)),
        ("15", p(w, l / 2.0 - s), p(w, c)),
        ("18", p(w - c, 0.0), p(c, 0.0)),
        // Jaws
        ("1", p(c - js, -js), p(c, 0.0)),
        ("2", p(-js, c - js), p(0.0, c)),
        ("4", p(-j, l / 2.0 - s), p(0.0, l / 2.0 - s)),
        ("5", p(-j, l / 2.0 + s), p(0.0, l / 2.0 + s)),
        ("7", p(-js, l - c + js), p(0.0, l - c)),
        ("8", p(c - js, l + js), p(c, l)),
        ("10", p(w - c + js, l + js), p(w - c, l)),
        ("11", p(w + js, l - c + js), p(w, l - c)),
        ("13", p(w + j, l / 2.0 + s), p(w, l / 2.0 + s)),
        ("14", p(w + j, l / 2.0 - s), p(w, l / 2.0 - s)),
        ("16", p(w + js, c - js), p(w, c)),
        ("17", p(w - c + js, -js), p(w - c, 0.0)),
    ];

    layout
        .into_iter()
        .map(|(id, p1, p2)| LinearSegment::new(id, p1, p2))
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Dimensions {
    width: f64,
    length: f64,
    edge_width: f64,
    cushion_width: f64,
    cushion_height: f64,
    table_height: f64,
    lights_height: f64,
}

/// Builder for [`Table`]; every dimension defaults to the constants registry
#[derive(Debug, Clone)]
pub struct TableBuilder {
    dims: Dimensions,
    circular: Vec<CircularSegment>,
}

impl TableBuilder {
    pub fn new(constants: &PhysicalConstants) -> Self {
        Self {
            dims: Dimensions {
                width: constants.table_width,
                length: constants.table_length,
                edge_width: constants.edge_width,
                cushion_width: constants.cushion_width,
                cushion_height: constants.cushion_height,
                table_height: constants.table_height,
                lights_height: constants.lights_height,
            },
            circular: Vec::new(),
        }
    }

    pub fn width(mut self, width: f64) -> Self {
        self.dims.width = width;
        self
    }

    pub fn length(mut self, length: f64) -> Self {
        self.dims.length = length;
        self
    }

    pub fn edge_width(mut self, edge_width: f64) -> Self {
        self.dims.edge_width = edge_width;
        self
    }

    pub fn cushion_width(mut self, cushion_width: f64) -> Self {
        self.dims.cushion_width = cushion_width;
        self
    }

    pub fn cushion_height(mut self, cushion_height: f64) -> Self {
        self.dims.cushion_height = cushion_height;
        self
    }

    pub fn table_height(mut self, table_height: f64) -> Self {
        self.dims.table_height = table_height;
        self
    }

    pub fn lights_height(mut self, lights_height: f64) -> Self {
        self.dims.lights_height = lights_height;
        self
    }

    /// Queue a circular segment for insertion
    pub fn circular(mut self, segment: CircularSegment) -> Self {
        self.circular.push(segment);
        self
    }

    /// Validate dimensions, lay out the rails and insert the circular segments
    pub fn build(self) -> SimResult<Table> {
        let d = self.dims;
        for (field, value) in [("width", d.width), ("length", d.length)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::configuration(field, value));
            }
        }
        if !(d.cushion_height.is_finite() && d.cushion_height >= 0.0) {
            return Err(SimError::configuration("cushion_height", d.cushion_height));
        }

        let mut table = Table::with_rails(d)?;
        for segment in self.circular {
            table.add_circular(segment)?;
        }

        log::debug!(
            "Built {}x{} table: {} linear, {} circular segments",
            table.width,
            table.length,
            table.linear_count(),
            table.circular_count()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: PhysicalConstants = PhysicalConstants::STANDARD;

    #[test]
    fn test_default_table_has_18_linear_segments() {
        let table = Table::standard(&C).unwrap();
        assert_eq!(table.linear_count(), 18);
        assert_eq!(table.circular_count(), 0);

        let mut ids: Vec<u32> = table
            .segments(CushionKind::Linear)
            .keys()
            .map(|id| id.parse().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, (1..=18).collect::<Vec<_>>());
    }

    #[test]
    fn test_defaults_come_from_constants() {
        let table = Table::standard(&C).unwrap();
        assert_eq!(table.width(), C.table_width);
        assert_eq!(table.length(), C.table_length);
        assert_eq!(table.cushion_height(), C.cushion_height);
        assert_eq!(table.lights_height(), C.lights_height);
        assert_eq!(table.center(), Vec3::new(C.table_width / 2.0, C.table_length / 2.0, 0.0));
    }

    #[test]
    fn test_all_segments_at_cushion_height() {
        let table = Table::builder(&C).cushion_height(0.04).build().unwrap();
        assert!(table.iter_segments().all(|s| s.height() == 0.04));
    }

    #[test]
    fn test_long_rails_lie_on_table_edges() {
        let table = Table::builder(&C).width(1.0).length(2.0).build().unwrap();
        let rail = |id: &str| match table.segment(id) {
            Some(CushionSegment::Linear(s)) => s.clone(),
            other => panic!("expected linear rail {id}, got {other:?}"),
        };

        assert_eq!(rail("3").p1().x, 0.0);
        assert_eq!(rail("9").p1().y, 2.0);
        assert_eq!(rail("12").p2().x, 1.0);
        assert_eq!(rail("18").p1().y, 0.0);
        // Side pocket gap between rails 3 and 6
        assert!((rail("6").p1().y - rail("3").p2().y - 2.0 * SIDE_POCKET_HALF_WIDTH).abs() < 1e-12);
        // Rail normals are axis-aligned
        assert_eq!(rail("3").normal(), Vec3::X);
        assert_eq!(rail("18").normal(), Vec3::Y);
    }

    #[test]
    fn test_corner_jaws_are_diagonal() {
        let table = Table::standard(&C).unwrap();
        let Some(CushionSegment::Linear(jaw)) = table.segment("1") else {
            panic!("jaw 1 missing");
        };
        assert!((jaw.length() - JAW_LENGTH).abs() < 1e-12);
        let n = jaw.normal();
        assert!((n.x.abs() - n.y.abs()).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        assert!(matches!(
            Table::builder(&C).width(0.0).build(),
            Err(SimError::Configuration { ref field, .. }) if field == "width"
        ));
        assert!(matches!(
            Table::builder(&C).length(-2.0).build(),
            Err(SimError::Configuration { ref field, .. }) if field == "length"
        ));
        assert!(matches!(
            Table::builder(&C).cushion_height(-0.01).build(),
            Err(SimError::Configuration { .. })
        ));
    }

    #[test]
    fn test_circular_segments_added() {
        let h = C.cushion_height;
        let table = Table::builder(&C)
            .circular(CircularSegment::new("c0", Vec3::new(0.3, 0.3, h), 0.05).unwrap())
            .circular(CircularSegment::new("c1", Vec3::new(0.9, 1.5, h), 0.02).unwrap())
            .build()
            .unwrap();
        assert_eq!(table.circular_count(), 2);
        assert_eq!(table.segment("c1").map(|s| s.kind()), Some(CushionKind::Circular));
        assert_eq!(table.iter_segments().count(), 20);
    }

    #[test]
    fn test_duplicate_id_across_kinds_rejected() {
        let h = C.cushion_height;
        let result = Table::builder(&C)
            .circular(CircularSegment::new("7", Vec3::new(0.3, 0.3, h), 0.05).unwrap())
            .build();
        assert_eq!(result.unwrap_err(), SimError::DuplicateId("7".to_string()));

        let mut table = Table::standard(&C).unwrap();
        table
            .add_circular(CircularSegment::new("c", Vec3::new(0.3, 0.3, h), 0.05).unwrap())
            .unwrap();
        let again =
            table.add_circular(CircularSegment::new("c", Vec3::new(0.5, 0.5, h), 0.05).unwrap());
        assert_eq!(again.unwrap_err(), SimError::DuplicateId("c".to_string()));
        assert_eq!(table.circular_count(), 1);
    }

    #[test]
    fn test_circular_segment_at_wrong_height_rejected() {
        let result = Table::builder(&C)
            .circular(CircularSegment::new("c0", Vec3::new(0.3, 0.3, 0.0), 0.05).unwrap())
            .build();
        assert!(matches!(result, Err(SimError::Geometry { .. })));
    }

    #[test]
    fn test_segments_added_later_match_reported_cushion_height() {
        let mut table = Table::builder(&C).cushion_height(0.04).build().unwrap();
        let h = table.cushion_height();
        assert_eq!(h, 0.04);

        table
            .add_circular(CircularSegment::new("c0", Vec3::new(0.3, 0.3, h), 0.05).unwrap())
            .unwrap();
        assert!(table.iter_segments().all(|s| s.height() == table.cushion_height()));

        let stale =
            CircularSegment::new("c1", Vec3::new(0.6, 0.6, C.cushion_height), 0.05).unwrap();
        assert!(matches!(table.add_circular(stale), Err(SimError::Geometry { .. })));
    }

    #[test]
    fn test_table_serializes_segments_by_kind() {
        let table = Table::standard(&C).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["cushion_segments"]["linear"].as_object().unwrap().len(), 18);
        assert!(json["cushion_segments"]["circular"].as_object().unwrap().is_empty());
    }
}
