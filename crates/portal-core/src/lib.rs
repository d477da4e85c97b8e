pub mod clock;
pub mod constants;
pub mod controls;
pub mod error;
pub mod fireflies;
pub mod frame;
pub mod noise;
pub mod params;
pub mod portal;
pub mod preview;
#[cfg(feature = "gpu")]
pub mod render;
pub mod scene;
pub mod state;
pub mod tween;

pub static NOISE_WGSL: &str = include_str!("../shaders/noise.wgsl");
pub static PORTAL_WGSL: &str = include_str!("../shaders/portal.wgsl");
pub static FIREFLIES_WGSL: &str = include_str!("../shaders/fireflies.wgsl");
pub static MESH_WGSL: &str = include_str!("../shaders/mesh.wgsl");

pub use clock::*;
pub use constants::*;
pub use error::*;
pub use frame::*;
pub use params::*;
pub use scene::*;
pub use state::*;
#[cfg(feature = "gpu")]
pub use render::Renderer;
