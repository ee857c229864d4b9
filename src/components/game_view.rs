use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};
use yew::prelude::*;

use super::action_panel::ActionPanel;
use super::camera_controls::CameraControls;
use super::connection_banner::ConnectionBanner;
use super::countdown::Countdown;
use super::game_over_overlay::GameOverOverlay;
use super::minimap::Minimap;
use super::resource_bar::ResourceBar;
use super::stats_panel::StatsPanel;
use super::tile_info_panel::TileInfoPanel;
use super::toasts::Toasts;
use crate::client::BrowserClient;
use crate::config::ClientConfig;
use crate::model::PlaceableKind;
use crate::net::ConnectionState;
use crate::net::session::LOBBY_ROUTE;
use crate::render::{CanvasPainter, MinimapProjection, SpriteAtlas};
use crate::state::{InputContext, InteractionMode, KeyPress};
use crate::util::now_ms;

#[derive(Properties, PartialEq, Clone)]
pub struct GameViewProps {
    pub config: ClientConfig,
}

/// What the overlays show. A change schedules a re-render.
#[derive(Clone, Copy, PartialEq)]
struct Revision {
    world: u64,
    hud: u64,
    connection: ConnectionState,
    countdown: Option<u32>,
    mode: InteractionMode,
    stats_open: bool,
    zoom: f64,
}

impl Revision {
    fn of(c: &BrowserClient, now: f64) -> Self {
        let hud = c.hud();
        Self {
            world: c.world().version(),
            hud: hud.version(),
            connection: c.connection_state(),
            countdown: hud.countdown_remaining(now),
            mode: c.mode,
            stats_open: c.stats_open(),
            zoom: c.camera.zoom,
        }
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

/// Canvas-relative position of a window-level mouse event.
fn canvas_point(canvas: &HtmlCanvasElement, e: &web_sys::MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (
        e.client_x() as f64 - rect.left(),
        e.client_y() as f64 - rect.top(),
    )
}

fn is_text_field(e: &web_sys::Event) -> bool {
    e.target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .is_some_and(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA"))
}

/// Wires the canvas, the frame loop and the input listeners. Returns the
/// teardown, or `None` when the page is missing something it needs.
fn mount(
    canvas_ref: &NodeRef,
    minimap_ref: &NodeRef,
    client: Rc<RefCell<BrowserClient>>,
    atlas: Rc<RefCell<SpriteAtlas>>,
    projection: Rc<RefCell<Option<MinimapProjection>>>,
    revision: UseStateHandle<u64>,
) -> Option<impl FnOnce() + use<>> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let canvas: HtmlCanvasElement = canvas_ref.cast::<HtmlCanvasElement>()?;
    let ctx = context_2d(&canvas)?;
    let minimap = minimap_ref
        .cast::<HtmlCanvasElement>()
        .and_then(|c| context_2d(&c).map(|mctx| (c, mctx)));

    let compute_and_apply_canvas_size = {
        let canvas = canvas.clone();
        let document = document.clone();
        let window = window.clone();
        let client = client.clone();
        move || {
            let nav_height: f64 = document
                .get_element_by_id("top-bar")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                .map(|el| el.client_height() as f64)
                .unwrap_or(0.0);
            let width = window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(800.0)
                .max(0.0);
            let height = (window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(600.0)
                - nav_height)
                .max(0.0);
            canvas.set_width(width as u32);
            canvas.set_height(height as u32);
            client.borrow_mut().camera.set_viewport(width, height);
        }
    };
    compute_and_apply_canvas_size();
    client.borrow_mut().start();

    // RAF loop: drain the socket inbox, advance, draw
    let raf_id = Rc::new(RefCell::new(None));
    let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    {
        let raf_id_clone = raf_id.clone();
        let window_loop = window.clone();
        let closure_cell_clone = closure_cell.clone();
        let client = client.clone();
        let projection = projection.clone();
        let mut painter = CanvasPainter::new(ctx, atlas.clone());
        let mut minimap_painter = minimap.map(|(c, mctx)| {
            (
                c.width() as f64,
                c.height() as f64,
                CanvasPainter::new(mctx, atlas.clone()),
            )
        });
        let mut seen: Option<Revision> = None;
        let mut bumps = 0u64;
        *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let now = now_ms();
            let (current, navigating) = {
                let mut c = client.borrow_mut();
                c.pump(now);
                c.tick(now);
                c.render(&mut painter);
                if let Some((w, h, mp)) = minimap_painter.as_mut() {
                    *projection.borrow_mut() = c.render_minimap(mp, *w, *h);
                }
                (Revision::of(&c, now), c.logged_out().is_some())
            };
            if seen != Some(current) {
                seen = Some(current);
                bumps += 1;
                revision.set(bumps);
            }
            // The session is already redirecting to the login page.
            if navigating {
                return;
            }
            if let Some(cb) = closure_cell_clone.borrow().as_ref() {
                if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    *raf_id_clone.borrow_mut() = Some(id);
                }
            }
        }) as Box<dyn FnMut()>));
        if let Some(cb) = closure_cell.borrow().as_ref() {
            if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                *raf_id.borrow_mut() = Some(id);
            }
        }
    }
    // Wheel zoom, anchored at the pointer
    let wheel_cb = {
        let client = client.clone();
        Closure::wrap(Box::new(move |e: web_sys::WheelEvent| {
            e.prevent_default();
            client
                .borrow_mut()
                .wheel(e.delta_y(), e.offset_x() as f64, e.offset_y() as f64);
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
        .ok();
    let keydown_cb = {
        let client = client.clone();
        Closure::wrap(Box::new(move |e: web_sys::KeyboardEvent| {
            let key = KeyPress::from(&e);
            if client.borrow_mut().key(&key).is_some() {
                e.prevent_default();
            }
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
        .ok();
    // Typing in a text field suspends the hotkeys
    let focusin_cb = {
        let client = client.clone();
        Closure::wrap(Box::new(move |e: web_sys::Event| {
            if is_text_field(&e) {
                client.borrow_mut().input.push(InputContext::TextInput);
            }
        }) as Box<dyn FnMut(_)>)
    };
    let focusout_cb = {
        let client = client.clone();
        Closure::wrap(Box::new(move |e: web_sys::Event| {
            if is_text_field(&e) {
                client.borrow_mut().input.pop(InputContext::TextInput);
            }
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("focusin", focusin_cb.as_ref().unchecked_ref())
        .ok();
    window
        .add_event_listener_with_callback("focusout", focusout_cb.as_ref().unchecked_ref())
        .ok();
    let mousedown_cb = {
        let client = client.clone();
        Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            if e.button() == 0 {
                client
                    .borrow_mut()
                    .mouse_down(e.offset_x() as f64, e.offset_y() as f64);
            }
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
        .ok();
    let mousemove_cb = {
        let client = client.clone();
        let canvas = canvas.clone();
        Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            let (x, y) = canvas_point(&canvas, &e);
            client.borrow_mut().mouse_move(x, y);
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
        .ok();
    let mouseup_cb = {
        let client = client.clone();
        let canvas = canvas.clone();
        Closure::wrap(Box::new(move |e: web_sys::MouseEvent| {
            if e.button() != 0 {
                return;
            }
            let (x, y) = canvas_point(&canvas, &e);
            if let Some(Err(e)) = client.borrow_mut().mouse_up(x, y) {
                log::debug!("click at ({}, {}) not placed: {}", x, y, e);
            }
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
        .ok();
    // Right click leaves placement mode
    let contextmenu_cb = {
        let client = client.clone();
        Closure::wrap(Box::new(move |e: web_sys::Event| {
            e.prevent_default();
            client.borrow_mut().cancel_placement();
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref())
        .ok();
    let resize_cb = {
        let compute_and_apply_canvas_size = compute_and_apply_canvas_size.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            compute_and_apply_canvas_size();
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
        .ok();

    // Cleanup
    let window_clone = window.clone();
    Some(move || {
        let _ = canvas.remove_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref());
        let _ = canvas
            .remove_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref());
        let _ = canvas.remove_event_listener_with_callback(
            "contextmenu",
            contextmenu_cb.as_ref().unchecked_ref(),
        );
        let _ = window_clone
            .remove_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref());
        let _ = window_clone
            .remove_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref());
        let _ = window_clone
            .remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
        let _ = window_clone
            .remove_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref());
        let _ = window_clone
            .remove_event_listener_with_callback("focusin", focusin_cb.as_ref().unchecked_ref());
        let _ = window_clone
            .remove_event_listener_with_callback("focusout", focusout_cb.as_ref().unchecked_ref());
        if let Some(id) = *raf_id.borrow() {
            let _ = window_clone.cancel_animation_frame(id);
        }
        // The loop closure holds its own cell; drop it to break the cycle.
        closure_cell.borrow_mut().take();
        client.borrow_mut().shutdown();
        let _keep_alive = (
            &wheel_cb,
            &mousedown_cb,
            &mousemove_cb,
            &mouseup_cb,
            &contextmenu_cb,
            &resize_cb,
            &keydown_cb,
            &focusin_cb,
            &focusout_cb,
        );
    })
}

#[function_component(GameView)]
pub fn game_view(props: &GameViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let minimap_ref = use_node_ref();
    let client = use_mut_ref(|| BrowserClient::browser(props.config.clone()));
    let atlas = use_mut_ref(|| SpriteAtlas::new(props.config.asset_root.clone()));
    let projection = use_mut_ref(|| None::<MinimapProjection>);
    let revision = use_state(|| 0u64);

    {
        let canvas_ref = canvas_ref.clone();
        let minimap_ref = minimap_ref.clone();
        let client = client.clone();
        let atlas = atlas.clone();
        let projection = projection.clone();
        let revision = revision.clone();
        use_effect_with((), move |_| {
            let teardown = mount(&canvas_ref, &minimap_ref, client, atlas, projection, revision);
            if teardown.is_none() {
                log::error!("game canvas could not be set up");
            }
            move || {
                if let Some(teardown) = teardown {
                    teardown();
                }
            }
        });
    }

    let on_zoom_in = {
        let client = client.clone();
        Callback::from(move |()| client.borrow_mut().camera.zoom_in())
    };
    let on_zoom_out = {
        let client = client.clone();
        Callback::from(move |()| client.borrow_mut().camera.zoom_out())
    };
    let on_reset = {
        let client = client.clone();
        Callback::from(move |()| client.borrow_mut().camera.reset())
    };
    let on_place = {
        let client = client.clone();
        Callback::from(move |kind: PlaceableKind| {
            let mut c = client.borrow_mut();
            if c.mode == InteractionMode::Place(kind) {
                c.cancel_placement();
            } else {
                c.enter_placement(kind);
            }
        })
    };
    let on_send_creep = {
        let client = client.clone();
        Callback::from(move |id: &'static str| {
            client.borrow_mut().send_creep(id);
        })
    };
    let on_stats = {
        let client = client.clone();
        Callback::from(move |()| client.borrow_mut().toggle_stats())
    };
    let on_show_stats = {
        let client = client.clone();
        Callback::from(move |()| {
            let mut c = client.borrow_mut();
            if !c.stats_open() {
                c.open_stats();
            }
        })
    };
    let on_close_stats = {
        let client = client.clone();
        Callback::from(move |()| client.borrow_mut().close_stats())
    };
    let on_reconnect = {
        let client = client.clone();
        Callback::from(move |()| client.borrow_mut().start())
    };
    let on_minimap_point = {
        let client = client.clone();
        let projection = projection.clone();
        Callback::from(move |(x, y): (f64, f64)| {
            let proj = *projection.borrow();
            if let Some(p) = proj {
                client.borrow_mut().minimap_recenter(&p, x, y);
            }
        })
    };
    let to_lobby = Callback::from(|()| {
        if let Some(win) = web_sys::window() {
            let _ = win.location().set_href(LOBBY_ROUTE);
        }
    });

    let c = client.borrow();
    let world = c.world();
    let hud = c.hud();
    let local = world.local_player().map(|l| l.player_number);
    let selected = world.selected().cloned();
    let owners: Vec<(u32, &'static str)> = selected
        .as_ref()
        .map(|t| t.owners.iter().map(|p| (*p, world.color_of(*p))).collect())
        .unwrap_or_default();
    let hitpoints = local.and_then(|p| hud.player_hp.get(&p).copied());
    let player_color = local.map(|p| world.color_of(p)).unwrap_or("#8b949e");
    let placing = match c.mode {
        InteractionMode::Place(kind) => Some(kind),
        InteractionMode::Select => None,
    };
    let cursor = if placing.is_some() { "crosshair" } else { "default" };

    let out = html! {<div style="position:relative; width:100vw; height:100vh; overflow:hidden; background:#1a1a2e; color:#c9d1d9;">
        <canvas ref={canvas_ref.clone()} id="game-canvas" style={format!("display:block; width:100%; height:100%; cursor:{};", cursor)}></canvas>
        <ResourceBar resources={world.resources()} player_number={local} player_color={player_color} hitpoints={hitpoints} />
        <Countdown seconds_left={hud.countdown_remaining(now_ms())} />
        <Toasts toasts={hud.toasts().to_vec()} />
        <ConnectionBanner state={c.connection_state()} on_reconnect={on_reconnect} />
        <TileInfoPanel tile={selected} owners={owners} local_player={local} />
        <ActionPanel resources={world.resources()} placing={placing} on_place={on_place} on_send_creep={on_send_creep} on_stats={on_stats} />
        <CameraControls zoom={c.camera.zoom} on_zoom_in={on_zoom_in} on_zoom_out={on_zoom_out} on_reset={on_reset} />
        <Minimap canvas_ref={minimap_ref.clone()} on_point={on_minimap_point} />
        <StatsPanel show={c.stats_open()} stats={hud.stats.clone()} local_player={local} on_close={on_close_stats} />
        <GameOverOverlay outcome={hud.outcome} show_stats={on_show_stats} to_lobby={to_lobby} />
    </div> };
    out
}
