//! Terrain generation, chunk streaming and the mining world facade.

mod camera;
mod chunk;
mod config;
mod damage;
mod layers;
mod loader;
mod mine;
mod mining;
mod selection;
mod terrain;
mod tilemap;
mod world;

pub use camera::*;
pub use chunk::*;
pub use config::*;
pub use damage::*;
pub use layers::*;
pub use loader::*;
pub use mine::*;
pub use mining::*;
pub use selection::*;
pub use terrain::*;
pub use tilemap::*;
pub use world::*;
