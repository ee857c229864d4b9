pub mod camera;
pub mod hud;
pub mod input;
pub mod placement;
pub mod touch;
pub mod world;

pub use camera::Camera;
pub use hud::{HudState, ToastKind};
pub use input::{InputAction, InputContext, InputState, KeyPress};
pub use placement::{InteractionMode, can_place, check_placement};
pub use touch::DragGesture;
pub use world::{WorldBounds, WorldStore};
