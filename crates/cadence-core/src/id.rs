//! Identifiers for the simulated world's regions and spatial partitions.

use std::fmt;

/// One of the three fixed simulated regions.
///
/// Per-dimension profiling data is stored in arrays indexed by
/// [`Dimension::index`], so the set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    /// Region 0.
    Overworld,
    /// Region 1.
    Nether,
    /// Region 2.
    TheEnd,
}

impl Dimension {
    /// Number of dimensions.
    pub const COUNT: usize = 3;

    /// All dimensions in report order.
    pub const ALL: [Dimension; Self::COUNT] =
        [Dimension::Overworld, Dimension::Nether, Dimension::TheEnd];

    /// Dense index in `0..COUNT`.
    pub fn index(self) -> usize {
        match self {
            Self::Overworld => 0,
            Self::Nether => 1,
            Self::TheEnd => 2,
        }
    }

    /// Report heading for this dimension.
    pub fn label(self) -> &'static str {
        match self {
            Self::Overworld => "Overworld",
            Self::Nether => "Nether",
            Self::TheEnd => "The end",
        }
    }
}

impl TryFrom<i32> for Dimension {
    type Error = i32;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Overworld),
            1 => Ok(Self::Nether),
            2 => Ok(Self::TheEnd),
            other => Err(other),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chunk coordinate: a 16x16 column of the world, addressed by `(x, z)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos {
    /// Chunk x coordinate.
    pub x: i32,
    /// Chunk z coordinate.
    pub z: i32,
}

impl ChunkPos {
    /// Edge length of a chunk in blocks.
    pub const SIZE: i32 = 16;

    /// Construct a chunk coordinate.
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Block coordinate at the centre of the chunk, `(x*16+8, z*16+8)`.
    ///
    /// Widened to `i64`: the product leaves `i32` for chunk coordinates
    /// beyond about 1.3e8.
    pub fn center_block(self) -> (i64, i64) {
        let size = i64::from(Self::SIZE);
        let half = size / 2;
        (
            i64::from(self.x) * size + half,
            i64::from(self.z) * size + half,
        )
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
