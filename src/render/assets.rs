//! Lazily loaded sprites. A request starts the image load and returns
//! nothing until the browser reports it loaded; failed loads stay absent and
//! the frame keeps drawing primitives.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlImageElement;

use crate::model::TerrainType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Terrain(TerrainType),
    /// Road variant by N/E/S/W neighbour mask.
    Road(u8),
    Building(u32),
    Tower(u32),
    Creep(String),
}

impl SpriteKey {
    pub fn path(&self, root: &str) -> String {
        match self {
            SpriteKey::Terrain(t) => format!("{}/terrain/{}.png", root, t.asset_name()),
            SpriteKey::Road(mask) => format!("{}/roads/road_{:02}.png", root, mask),
            SpriteKey::Building(id) => format!("{}/buildings/building_{}.png", root, id),
            SpriteKey::Tower(id) => format!("{}/towers/tower_{}.png", root, id),
            SpriteKey::Creep(kind) => format!("{}/creeps/{}.png", root, kind.to_ascii_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Loading,
    Ready,
    Failed,
}

struct Slot {
    image: HtmlImageElement,
    state: Rc<Cell<LoadState>>,
}

pub struct SpriteAtlas {
    root: String,
    slots: HashMap<SpriteKey, Slot>,
}

impl SpriteAtlas {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            slots: HashMap::new(),
        }
    }

    /// The image if it has finished loading; otherwise kicks off the load.
    pub fn ready_image(&mut self, key: &SpriteKey) -> Option<HtmlImageElement> {
        if let Some(slot) = self.slots.get(key) {
            return match slot.state.get() {
                LoadState::Ready => Some(slot.image.clone()),
                LoadState::Loading | LoadState::Failed => None,
            };
        }
        self.start_load(key.clone());
        None
    }

    fn start_load(&mut self, key: SpriteKey) {
        let image = match HtmlImageElement::new() {
            Ok(img) => img,
            Err(e) => {
                log::warn!("cannot create image element: {:?}", e);
                return;
            }
        };
        let state = Rc::new(Cell::new(LoadState::Loading));
        let onload = {
            let state = state.clone();
            Closure::once_into_js(move || state.set(LoadState::Ready))
        };
        let onerror = {
            let state = state.clone();
            let path = key.path(&self.root);
            Closure::once_into_js(move || {
                log::debug!("sprite unavailable: {}", path);
                state.set(LoadState::Failed);
            })
        };
        image.set_onload(Some(onload.unchecked_ref()));
        image.set_onerror(Some(onerror.unchecked_ref()));
        image.set_src(&key.path(&self.root));
        self.slots.insert(key, Slot { image, state });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_paths_are_stable() {
        assert_eq!(
            SpriteKey::Terrain(TerrainType::WaterShallow).path("assets"),
            "assets/terrain/water_shallow.png"
        );
        assert_eq!(SpriteKey::Road(5).path("a"), "a/roads/road_05.png");
        assert_eq!(SpriteKey::Creep("TROLL".into()).path("a"), "a/creeps/troll.png");
    }
}
