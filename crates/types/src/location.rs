// Path: crates/types/src/location.rs
//! Target locations within a layer and their fixed-radix display decomposition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of cube faces in a layer.
pub const FACES: u32 = 6;
/// Sectors per face.
pub const SECTORS_PER_FACE: u32 = 256;
/// Regions per sector.
pub const REGIONS_PER_SECTOR: u32 = 256;
/// Containers per region.
pub const CONTAINERS_PER_REGION: u32 = 4;
/// Containers per face.
pub const CONTAINERS_PER_FACE: u32 = SECTORS_PER_FACE * REGIONS_PER_SECTOR * CONTAINERS_PER_REGION;
/// Total containers in one layer.
pub const CONTAINERS_PER_LAYER: u32 = FACES * CONTAINERS_PER_FACE;
/// Tiles (blocks) per container.
pub const TILES_PER_CONTAINER: u32 = 256;

/// A block to destroy: `(container_id, block_id)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Container index in `[0, CONTAINERS_PER_LAYER)`.
    pub container_id: u32,
    /// Block index in `[0, TILES_PER_CONTAINER)`.
    pub block_id: u32,
}

impl Location {
    /// Creates a location without range checks; the contract rejects out-of-range ids.
    pub fn new(container_id: u32, block_id: u32) -> Self {
        Self {
            container_id,
            block_id,
        }
    }

    /// Returns true if both indices are inside the layer bounds.
    pub fn in_bounds(&self) -> bool {
        self.container_id < CONTAINERS_PER_LAYER && self.block_id < TILES_PER_CONTAINER
    }

    /// The display hierarchy of this location's container.
    pub fn hierarchy(&self) -> ContainerPath {
        decompose_container(self.container_id)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/tile {}", self.hierarchy(), self.block_id)
    }
}

/// A container id split into `(face, sector, region, container)`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerPath {
    /// Cube face.
    pub face: u32,
    /// Sector within the face.
    pub sector: u32,
    /// Region within the sector.
    pub region: u32,
    /// Container within the region.
    pub container: u32,
}

impl ContainerPath {
    /// Recomposes the flat container id: `((face*256+sector)*256+region)*4+container`.
    pub fn container_id(&self) -> u32 {
        ((self.face * SECTORS_PER_FACE + self.sector) * REGIONS_PER_SECTOR + self.region)
            * CONTAINERS_PER_REGION
            + self.container
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "face {}/sector {}/region {}/container {}",
            self.face, self.sector, self.region, self.container
        )
    }
}

/// Splits a flat container id into its display hierarchy. Display only.
pub fn decompose_container(container_id: u32) -> ContainerPath {
    let per_sector = REGIONS_PER_SECTOR * CONTAINERS_PER_REGION;
    ContainerPath {
        face: container_id / CONTAINERS_PER_FACE,
        sector: (container_id / per_sector) % SECTORS_PER_FACE,
        region: (container_id / CONTAINERS_PER_REGION) % REGIONS_PER_SECTOR,
        container: container_id % CONTAINERS_PER_REGION,
    }
}
