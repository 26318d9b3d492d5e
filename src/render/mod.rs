// render/ - Renderers and their drawing seams
//
// StarField draws through Canvas2d, WaveGrid through PointBackend. The
// browser implementations live in crate::web, the software ones in raster.

pub mod canvas;
pub mod points;
pub mod starfield;
pub mod wavegrid;

#[cfg(not(target_arch = "wasm32"))]
pub mod raster;

pub use canvas::Canvas2d;
pub use points::{Camera, Fog, LayerDraw, LayerHandle, LayerStyle, PointBackend};
pub use starfield::StarField;
pub use wavegrid::WaveGrid;
