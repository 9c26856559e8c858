use crate::plane::HalfSpace;
use crate::polygon::{Lerp, Polygon};

/// Vertices this far outside a boundary still count as inside, so that
/// intersection points produced by a previous clip against the same
/// boundary are not clipped again.
pub const CLIP_EPSILON: f32 = 1e-4;

/// Clips `polygon` in place against a single half-space.
///
/// Returns `false` when nothing with area is left; the ring is emptied in
/// that case. A polygon entirely inside is left untouched.
pub fn clip<V, H>(polygon: &mut Polygon<V>, half_space: &H) -> bool
where
    V: Lerp,
    H: HalfSpace<V>,
{
    let Some(head) = polygon.head() else {
        return false;
    };
    let count = polygon.len();

    let mut inside = 0;
    let mut id = head;
    for _ in 0..count {
        let keep = half_space.distance(polygon.vertex(id)) >= -CLIP_EPSILON;
        polygon.set_keep(id, keep);
        inside += keep as usize;
        id = polygon.next(id);
    }

    if inside == 0 {
        polygon.clear();
        return false;
    }
    if inside == count {
        return polygon.is_alive();
    }

    // split every edge that crosses the boundary
    let mut id = head;
    for _ in 0..count {
        let next = polygon.next(id);
        if polygon.keep(id) != polygon.keep(next) {
            let a = *polygon.vertex(id);
            let b = *polygon.vertex(next);
            let da = half_space.distance(&a);
            let db = half_space.distance(&b);
            // an inside endpoint lying on the boundary already is the intersection
            let d_inside = if polygon.keep(id) { da } else { db };
            if d_inside > CLIP_EPSILON {
                let t = (da / (da - db)).clamp(0.0, 1.0);
                let inserted = polygon.insert_after(id, a.lerp(&b, t));
                polygon.set_keep(inserted, true);
            }
        }
        id = next;
    }

    // drop the outside vertices
    let mut cursor = polygon.head();
    for _ in 0..polygon.len() {
        let Some(id) = cursor else { break };
        cursor = if polygon.keep(id) {
            Some(polygon.next(id))
        } else {
            polygon.remove(id)
        };
    }

    if !polygon.is_alive() {
        polygon.clear();
        return false;
    }
    true
}

/// Clips a copy of `polygon`, leaving the input alone.
pub fn clipped<V, H>(polygon: &Polygon<V>, half_space: &H) -> Polygon<V>
where
    V: Lerp,
    H: HalfSpace<V>,
{
    let mut out = polygon.clone();
    clip(&mut out, half_space);
    out
}

/// Clips against each half-space in turn, stopping at the first one that
/// leaves nothing.
pub fn clip_all<V, H>(polygon: &mut Polygon<V>, half_spaces: &[H]) -> bool
where
    V: Lerp,
    H: HalfSpace<V>,
{
    half_spaces.iter().all(|h| clip(polygon, h))
}
