use geoworld_geom::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkKey {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Key of the chunk containing `pos`, for a grid anchored at `origin`.
    #[inline]
    pub fn containing(pos: Vec3, origin: Vec2, chunk_size: f32) -> Self {
        let cx = ((pos.x - origin.x) / chunk_size).floor() as i32;
        let cz = ((pos.z - origin.y) / chunk_size).floor() as i32;
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkKey) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dz * dz
    }

    #[inline]
    pub fn chebyshev(self, other: ChunkKey) -> i32 {
        (self.cx - other.cx).abs().max((self.cz - other.cz).abs())
    }
}

impl From<(i32, i32)> for ChunkKey {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkKey> for (i32, i32) {
    fn from(value: ChunkKey) -> Self {
        (value.cx, value.cz)
    }
}
