//! Sign candidates handed in by an upstream proposer.

use image::GrayImage;
use imageproc::point::Point;

use crate::error::ReadError;
use crate::geometry::PixelRect;

/// Closed polygon outlining one detected circular sign, in frame pixels.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "CandidateRecord", into = "CandidateRecord")]
pub struct SignCandidate {
    polygon: Vec<Point<i32>>,
    bounds: PixelRect,
}

/// Wire form: `{"polygon": [[x, y], ...]}`.
#[derive(serde::Serialize, serde::Deserialize)]
struct CandidateRecord {
    polygon: Vec<[i32; 2]>,
}

impl TryFrom<CandidateRecord> for SignCandidate {
    type Error = ReadError;

    fn try_from(rec: CandidateRecord) -> Result<Self, Self::Error> {
        Self::new(&rec.polygon)
    }
}

impl From<SignCandidate> for CandidateRecord {
    fn from(c: SignCandidate) -> Self {
        Self {
            polygon: c.polygon.iter().map(|p| [p.x, p.y]).collect(),
        }
    }
}

impl SignCandidate {
    pub fn new(polygon: &[[i32; 2]]) -> Result<Self, ReadError> {
        Self::from_points(polygon.iter().map(|p| Point::new(p[0], p[1])).collect())
    }

    pub fn from_points(polygon: Vec<Point<i32>>) -> Result<Self, ReadError> {
        if polygon.is_empty() {
            return Err(ReadError::EmptyCandidate);
        }
        let bounds = PixelRect::bounding(&polygon);
        Ok(Self { polygon, bounds })
    }

    #[inline]
    pub fn polygon(&self) -> &[Point<i32>] {
        &self.polygon
    }

    /// Inclusive axis-aligned bounding rectangle of the polygon.
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    /// Candidate with every vertex multiplied by `scale` (used after frame resizing).
    pub fn scaled(&self, scale: f64) -> Self {
        if scale == 1.0 {
            return self.clone();
        }
        let polygon: Vec<Point<i32>> = self
            .polygon
            .iter()
            .map(|p| {
                Point::new(
                    (p.x as f64 * scale).round() as i32,
                    (p.y as f64 * scale).round() as i32,
                )
            })
            .collect();
        let bounds = PixelRect::bounding(&polygon);
        Self { polygon, bounds }
    }

    /// Load a JSON array of candidates.
    pub fn list_from_json_file(path: &std::path::Path) -> Result<Vec<Self>, ReadError> {
        crate::error::load_json(path)
    }
}

/// Upstream stage that outlines circular signs on an edge map.
pub trait SignProposer {
    fn propose(&self, edges: &GrayImage) -> Vec<SignCandidate>;
}

impl<F> SignProposer for F
where
    F: Fn(&GrayImage) -> Vec<SignCandidate>,
{
    fn propose(&self, edges: &GrayImage) -> Vec<SignCandidate> {
        self(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_follow_polygon() {
        let c = SignCandidate::new(&[[10, 20], [50, 20], [50, 70], [10, 70]]).unwrap();
        assert_eq!(c.bounds(), PixelRect::new(10, 20, 41, 51));
        assert_eq!(c.polygon().len(), 4);
    }

    #[test]
    fn empty_polygon_is_rejected() {
        assert!(matches!(SignCandidate::new(&[]), Err(ReadError::EmptyCandidate)));
        let err = serde_json::from_str::<SignCandidate>(r#"{"polygon": []}"#).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn parses_candidate_list() {
        let json = r#"[{"polygon": [[0, 0], [4, 0], [4, 4]]}, {"polygon": [[1, 1]]}]"#;
        let list: Vec<SignCandidate> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].bounds(), PixelRect::new(1, 1, 1, 1));
    }

    #[test]
    fn scaling_moves_bounds() {
        let c = SignCandidate::new(&[[10, 10], [20, 30]]).unwrap().scaled(0.5);
        assert_eq!(c.bounds(), PixelRect::new(5, 5, 6, 11));
    }
}
