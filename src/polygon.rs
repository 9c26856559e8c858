//! Closed polygons stored as an index-linked vertex ring.
//!
//! Clipping inserts and removes vertices at arbitrary points of the ring while
//! walking it, so vertices live in an arena with explicit `next`/`prev`
//! indices. Removed slots go on a free list and the whole arena is kept
//! across `clear`/`copy_from`, so a polygon used as scratch space stops
//! allocating once it has seen its largest input.

use glam::{Vec2, Vec3};

/// Projected vertex: screen position plus `1/w` of the clip-space vertex.
///
/// `w` is affine in screen space, which is what makes interpolating it
/// across edges and spans perspective-correct.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vertex2D {
    pub pos: Vec2,
    pub w: f32,
}

impl Vertex2D {
    pub fn new(x: f32, y: f32, w: f32) -> Vertex2D {
        Vertex2D { pos: Vec2::new(x, y), w }
    }
}

/// Vertex types the clipper can interpolate.
pub trait Lerp: Copy {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

impl Lerp for Vertex2D {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vertex2D {
            pos: self.pos.lerp(other.pos, t),
            w: self.w + (other.w - self.w) * t,
        }
    }
}

/// Index of a vertex slot inside a [`Polygon`] arena.
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct Node<V> {
    vertex: V,
    next: NodeId,
    prev: NodeId,
    keep: bool,
}

#[derive(Debug, Clone)]
pub struct Polygon<V> {
    nodes: Vec<Node<V>>,
    free: Vec<NodeId>,
    head: Option<NodeId>,
    len: usize,
    pub color: u32,
}

impl<V> Default for Polygon<V> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            len: 0,
            color: 0,
        }
    }
}

impl<V: Copy> Polygon<V> {
    pub fn new(color: u32) -> Polygon<V> {
        Polygon { color, ..Self::default() }
    }

    pub fn from_vertices<I: IntoIterator<Item = V>>(vertices: I, color: u32) -> Polygon<V> {
        let mut polygon = Polygon::new(color);
        polygon.extend(vertices);
        polygon
    }

    pub fn len(&self) -> usize { self.len }

    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Has enough vertices to cover any area.
    pub fn is_alive(&self) -> bool { self.len >= 3 }

    pub fn head(&self) -> Option<NodeId> { self.head }

    /// Drops every vertex but keeps the arena allocation.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.len = 0;
    }

    /// Replaces this ring with a copy of `other`, reusing this arena.
    pub fn copy_from(&mut self, other: &Polygon<V>) {
        self.clear();
        self.color = other.color;
        self.extend(other.iter().copied());
    }

    pub fn extend<I: IntoIterator<Item = V>>(&mut self, vertices: I) {
        for v in vertices {
            self.push(v);
        }
    }

    /// Appends a vertex at the end of the ring (just before the head).
    pub fn push(&mut self, vertex: V) -> NodeId {
        match self.head {
            None => {
                let id = self.alloc(vertex);
                self.nodes[id].next = id;
                self.nodes[id].prev = id;
                self.head = Some(id);
                self.len = 1;
                id
            }
            Some(head) => {
                let tail = self.nodes[head].prev;
                self.insert_after(tail, vertex)
            }
        }
    }

    /// Inserts a vertex between `at` and its successor.
    pub fn insert_after(&mut self, at: NodeId, vertex: V) -> NodeId {
        let next = self.nodes[at].next;
        let id = self.alloc(vertex);
        self.nodes[id].prev = at;
        self.nodes[id].next = next;
        self.nodes[at].next = id;
        self.nodes[next].prev = id;
        self.len += 1;
        id
    }

    /// Unlinks a vertex and returns the id of its successor (`None` once the
    /// ring is empty).
    pub fn remove(&mut self, id: NodeId) -> Option<NodeId> {
        if self.len <= 1 {
            self.clear();
            return None;
        }

        let Node { next, prev, .. } = self.nodes[id];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.free.push(id);
        self.len -= 1;

        if self.head == Some(id) {
            self.head = Some(next);
        }

        Some(next)
    }

    pub fn vertex(&self, id: NodeId) -> &V { &self.nodes[id].vertex }

    pub fn next(&self, id: NodeId) -> NodeId { self.nodes[id].next }

    pub(crate) fn keep(&self, id: NodeId) -> bool { self.nodes[id].keep }

    pub(crate) fn set_keep(&mut self, id: NodeId, keep: bool) { self.nodes[id].keep = keep; }

    /// Walks the ring once, starting at the head.
    pub fn iter(&self) -> RingIter<'_, V> {
        RingIter {
            polygon: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Consecutive vertex pairs `(a, b)` including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (&V, &V)> + '_ {
        self.head
            .into_iter()
            .flat_map(move |head| {
                let mut id = head;
                (0..self.len).map(move |_| {
                    let a = id;
                    id = self.nodes[id].next;
                    (a, id)
                })
            })
            .map(move |(a, b)| (&self.nodes[a].vertex, &self.nodes[b].vertex))
    }

    fn alloc(&mut self, vertex: V) -> NodeId {
        let node = Node { vertex, next: 0, prev: 0, keep: true };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }
}

pub struct RingIter<'a, V> {
    polygon: &'a Polygon<V>,
    cursor: Option<NodeId>,
    remaining: usize,
}

impl<'a, V: Copy> Iterator for RingIter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.cursor?;
        self.remaining -= 1;
        self.cursor = Some(self.polygon.next(id));
        Some(self.polygon.vertex(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl Polygon<Vec3> {
    /// Outward normal from the first two edges, `None` when degenerate.
    ///
    /// Counter-clockwise winding (seen from outside) faces outward.
    pub fn normal(&self) -> Option<Vec3> {
        let mut it = self.iter();
        let (p0, p1, p2) = (it.next()?, it.next()?, it.next()?);
        (*p1 - *p0).cross(*p2 - *p0).try_normalize()
    }

    pub fn average_z(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.iter().map(|p| p.z).sum::<f32>() / self.len as f32
    }
}
