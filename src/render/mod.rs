pub mod assets;
pub mod autotile;
pub mod contour;
pub mod frame;
pub mod minimap;
pub mod painter;

pub use assets::{SpriteAtlas, SpriteKey};
pub use frame::{FrameView, draw_frame};
pub use minimap::{MinimapProjection, draw_minimap};
pub use painter::{CanvasPainter, Painter};
