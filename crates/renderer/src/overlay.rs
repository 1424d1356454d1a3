//! Administrative boundary overlay read from GeoJSON.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use radar_common::GeoPoint;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::map_frame::MapFrame;

/// GeoJSON geometry. Coordinates stay untyped because their nesting depth
/// depends on the geometry type.
#[derive(Debug, Clone, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    geometry_type: String,
    #[serde(default)]
    coordinates: Value,
    #[serde(default)]
    geometries: Vec<Geometry>,
}

#[derive(Debug, Clone, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

/// Polylines in longitude/latitude, drawn as thin lines over the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryLayer {
    lines: Vec<Vec<GeoPoint>>,
}

impl BoundaryLayer {
    /// Parse a FeatureCollection, a single Feature, or a bare geometry.
    ///
    /// Line strings and polygon rings become polylines; points are ignored.
    pub fn from_geojson_str(json: &str) -> RenderResult<Self> {
        let doc: Value = serde_json::from_str(json)?;
        let doc_type = doc.get("type").and_then(Value::as_str).map(str::to_owned);
        let geometries: Vec<Geometry> = match doc_type.as_deref() {
            Some("FeatureCollection") => {
                let features: Vec<Feature> = serde_json::from_value(
                    doc.get("features").cloned().unwrap_or(Value::Array(Vec::new())),
                )?;
                features.into_iter().filter_map(|f| f.geometry).collect()
            }
            Some("Feature") => {
                let feature: Feature = serde_json::from_value(doc)?;
                feature.geometry.into_iter().collect()
            }
            Some(_) => vec![serde_json::from_value(doc)?],
            None => {
                return Err(RenderError::Boundary(
                    "GeoJSON document has no \"type\"".to_string(),
                ))
            }
        };

        let mut layer = Self::default();
        for geometry in &geometries {
            layer.collect(geometry);
        }
        debug!(lines = layer.lines.len(), "Parsed boundary layer");
        Ok(layer)
    }

    pub fn from_file(path: &Path) -> RenderResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_geojson_str(&json)
    }

    pub fn lines(&self) -> &[Vec<GeoPoint>] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn collect(&mut self, geometry: &Geometry) {
        match geometry.geometry_type.as_str() {
            "LineString" => self.push_line(&geometry.coordinates),
            "MultiLineString" | "Polygon" => {
                for line in as_array(&geometry.coordinates) {
                    self.push_line(line);
                }
            }
            "MultiPolygon" => {
                for polygon in as_array(&geometry.coordinates) {
                    for ring in as_array(polygon) {
                        self.push_line(ring);
                    }
                }
            }
            "GeometryCollection" => {
                for inner in &geometry.geometries {
                    self.collect(inner);
                }
            }
            _ => {}
        }
    }

    fn push_line(&mut self, coordinates: &Value) {
        let line: Vec<GeoPoint> = as_array(coordinates).iter().filter_map(position).collect();
        if line.len() >= 2 {
            self.lines.push(line);
        }
    }

    /// Draw into an image covering exactly the frame's plot rectangle.
    pub fn draw(&self, image: &mut RgbaImage, frame: &MapFrame, color: Rgba<u8>, thickness: u32) {
        let rect = frame.rect();
        let (ox, oy) = (rect.x as f64, rect.y as f64);
        let (w, h) = (image.width() as f64, image.height() as f64);
        // Longer segments jumped across the projection and are not drawn
        let max_len = 4.0 * (w + h);

        for line in &self.lines {
            let pixels: Vec<Option<(f64, f64)>> = line
                .iter()
                .map(|p| frame.geo_to_pixel(p.lon, p.lat).map(|(x, y)| (x - ox, y - oy)))
                .collect();

            for pair in pixels.windows(2) {
                let (Some(a), Some(b)) = (pair[0], pair[1]) else {
                    continue;
                };
                if outside_same_side(a, b, w, h) {
                    continue;
                }
                let (dx, dy) = (b.0 - a.0, b.1 - a.1);
                let len = dx.hypot(dy);
                if len > max_len {
                    continue;
                }
                draw_thick_segment(image, a, b, color, thickness);
            }
        }
    }
}

fn as_array(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn position(value: &Value) -> Option<GeoPoint> {
    let coords = value.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    let point = GeoPoint::new(lon, lat);
    point.is_finite().then_some(point)
}

fn outside_same_side(a: (f64, f64), b: (f64, f64), w: f64, h: f64) -> bool {
    (a.0 < 0.0 && b.0 < 0.0)
        || (a.0 > w && b.0 > w)
        || (a.1 < 0.0 && b.1 < 0.0)
        || (a.1 > h && b.1 > h)
}

fn draw_thick_segment(image: &mut RgbaImage, a: (f64, f64), b: (f64, f64), color: Rgba<u8>, thickness: u32) {
    let thickness = thickness.max(1);
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = dx.hypot(dy);
    let (nx, ny) = if len > 0.0 { (-dy / len, dx / len) } else { (0.0, 0.0) };
    let half = (thickness - 1) as f64 / 2.0;

    for i in 0..thickness {
        let off = i as f64 - half;
        draw_line_segment_mut(
            image,
            ((a.0 + nx * off) as f32, (a.1 + ny * off) as f32),
            ((b.0 + nx * off) as f32, (b.1 + ny * off) as f32),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_collection() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "a"},
                 "geometry": {"type": "LineString", "coordinates": [[113.0, 23.0], [113.5, 23.5]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Polygon", "coordinates": [[[112, 22], [114, 22], [114, 24], [112, 22]]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "Point", "coordinates": [113.0, 23.0]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;
        let layer = BoundaryLayer::from_geojson_str(json).unwrap();
        assert_eq!(layer.lines().len(), 2);
        assert_eq!(layer.lines()[1].len(), 4);
    }

    #[test]
    fn test_multipolygon_and_collection() {
        let json = r#"{
            "type": "GeometryCollection",
            "geometries": [
                {"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    [[[5, 5], [6, 5], [6, 6], [5, 5]], [[5.2, 5.2], [5.4, 5.2], [5.4, 5.4], [5.2, 5.2]]]
                ]},
                {"type": "MultiLineString", "coordinates": [[[0, 0], [2, 2]], [[3, 3]]]}
            ]
        }"#;
        let layer = BoundaryLayer::from_geojson_str(json).unwrap();
        // Three rings plus one line; the single-point line is dropped
        assert_eq!(layer.lines().len(), 4);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(BoundaryLayer::from_geojson_str("not json").is_err());
        assert!(BoundaryLayer::from_geojson_str(r#"{"features": []}"#).is_err());
    }
}
