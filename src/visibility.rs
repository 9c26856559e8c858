use glam::Vec3;
use crate::polygon::Polygon;

/// Backface test: the polygon faces the camera when its outward normal points
/// towards `camera_position`. Degenerate polygons are never visible.
pub fn is_visible(polygon: &Polygon<Vec3>, camera_position: Vec3) -> bool {
    let Some(normal) = polygon.normal() else {
        return false;
    };
    let Some(&v0) = polygon.iter().next() else {
        return false;
    };
    normal.dot(camera_position - v0) > 0.0
}

/// Orders items far to near by the view-space depth `key` returns (the camera
/// looks down -Z, so the most negative value comes first).
pub fn sort_by_depth<T, F>(items: &mut [T], mut key: F)
where
    F: FnMut(&T) -> f32,
{
    items.sort_by(|a, b| key(a).total_cmp(&key(b)));
}
