//! The game client: owns the connection, the channel, the world store and
//! the view state, and is driven once per animation frame.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::config::ClientConfig;
use crate::error::PlacementError;
use crate::model::{PlaceableKind, TerrainType, TileCoord, creep_definition, CREEP_DEFINITIONS};
use crate::net::{
    BackoffPolicy, BrowserSession, CommandChannel, Connection, ConnectionState, Effect, Inbox,
    LogoutReason, NetEvent, ReconnectScheduler, SessionStore, SubscriptionId, TimeoutScheduler,
    Transport, WebSocketTransport, new_inbox,
};
use crate::protocol::{GameDelta, SocketCommand, subject};
use crate::render::{FrameView, MinimapProjection, Painter, draw_frame, draw_minimap};
use crate::state::{
    Camera, DragGesture, HudState, InputAction, InputContext, InputState, InteractionMode,
    KeyPress, ToastKind, WorldStore, check_placement,
};

/// How long the stats panel waits for a `STATS` reply.
pub const STATS_TIMEOUT_MS: f64 = 5000.0;

pub type BrowserClient = GameClient<WebSocketTransport, TimeoutScheduler, BrowserSession>;

impl BrowserClient {
    pub fn browser(config: ClientConfig) -> Self {
        let inbox = new_inbox();
        let transport = WebSocketTransport::new(inbox.clone());
        let scheduler = TimeoutScheduler::new(inbox.clone());
        GameClient::new(config, transport, scheduler, BrowserSession, inbox)
    }
}

/// Applies one decoded delta to the store and overlay state.
pub fn apply_delta(world: &mut WorldStore, hud: &mut HudState, delta: GameDelta, now_ms: f64) {
    match delta {
        GameDelta::FullMap {
            width,
            height,
            tiles,
            player_colors,
        } => {
            log::info!("map {}x{} with {} tiles", width, height, tiles.len());
            world.replace_map(width, height, tiles, player_colors);
        }
        GameDelta::TileUpdate(tile) => world.upsert_tile(tile),
        GameDelta::TerrainChanged { coord, terrain } => world.set_terrain(coord, terrain),
        GameDelta::Resources(res) => {
            world.set_resources(res);
        }
        GameDelta::BuildingChanged {
            coord,
            building_type,
            player_number,
        } => {
            world.building_changed(coord, building_type, player_number);
        }
        GameDelta::TowerPlaced(tower) => {
            world.tower_placed(tower);
        }
        GameDelta::CreepsSpawned(spawns) => {
            for spawn in spawns {
                world.spawn_creep(spawn);
            }
        }
        GameDelta::CreepsUpdated(updates) => {
            for update in updates {
                world.update_creep(update);
            }
        }
        GameDelta::CreepDespawned(id) => {
            world.despawn_creep(&id);
        }
        GameDelta::PlayerDamaged {
            player_number,
            damage,
            remaining_hitpoints,
        } => {
            log::debug!("player {} took {} damage", player_number, damage);
            hud.set_player_hp(player_number, remaining_hitpoints);
        }
        GameDelta::PlayerHp {
            player_number,
            hitpoints,
        } => hud.set_player_hp(player_number, hitpoints),
        GameDelta::Countdown { seconds } => hud.start_countdown(seconds, now_ms),
        GameDelta::PlayerInfo(player) => {
            log::info!("playing as player {}", player.player_number);
            world.set_local_player(player);
        }
        GameDelta::GameOver(outcome) => hud.set_outcome(outcome),
        GameDelta::ErrorMessage(msg) => {
            hud.push_toast(msg, ToastKind::Error, now_ms);
        }
        GameDelta::Stats(stats) => hud.set_stats(stats),
    }
}

pub struct GameClient<T: Transport, S: ReconnectScheduler, P: SessionStore> {
    connection: Connection<T>,
    channel: CommandChannel,
    game_sub: SubscriptionId,
    scheduler: S,
    session: P,
    inbox: Inbox,
    world: Rc<RefCell<WorldStore>>,
    hud: Rc<RefCell<HudState>>,
    clock: Rc<Cell<f64>>,
    pub camera: Camera,
    pub mode: InteractionMode,
    pub input: InputState,
    pub drag: DragGesture,
    pub hover: Option<TileCoord>,
    logged_out: Option<LogoutReason>,
    last_frame_ms: Option<f64>,
    stats_opened_at: Option<f64>,
}

impl<T: Transport, S: ReconnectScheduler, P: SessionStore> GameClient<T, S, P> {
    pub fn new(config: ClientConfig, transport: T, scheduler: S, mut session: P, inbox: Inbox) -> Self {
        let tab_id = session.tab_id();
        let policy = BackoffPolicy {
            base_delay_ms: config.reconnect_base_delay_ms,
            max_attempts: config.max_reconnect_attempts,
        };
        let mut connection = Connection::new(transport, config.ws_url.clone(), policy, tab_id);
        connection.set_credential(session.credential());

        let world = Rc::new(RefCell::new(WorldStore::new()));
        let hud = Rc::new(RefCell::new(HudState::new(config.toast_duration_ms)));
        let clock = Rc::new(Cell::new(0.0));
        let mut channel = CommandChannel::new();
        let game_sub;
        {
            let world = world.clone();
            let hud = hud.clone();
            let clock = clock.clone();
            game_sub = channel.subscribe(Some(subject::GAME), None, move |cmd| {
                match GameDelta::from_command(cmd) {
                    Ok(Some(delta)) => {
                        apply_delta(&mut world.borrow_mut(), &mut hud.borrow_mut(), delta, clock.get())
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("dropping {}/{}: {}", cmd.subject, cmd.topic, e),
                }
            });
        }

        Self {
            camera: Camera::from_config(&config),
            drag: DragGesture::new(config.drag_threshold_px),
            connection,
            channel,
            game_sub,
            scheduler,
            session,
            inbox,
            world,
            hud,
            clock,
            mode: InteractionMode::Select,
            input: InputState::default(),
            hover: None,
            logged_out: None,
            last_frame_ms: None,
            stats_opened_at: None,
        }
    }

    pub fn world(&self) -> Ref<'_, WorldStore> {
        self.world.borrow()
    }

    pub fn hud(&self) -> Ref<'_, HudState> {
        self.hud.borrow()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn logged_out(&self) -> Option<LogoutReason> {
        self.logged_out
    }

    #[cfg(test)]
    pub fn has_credential(&self) -> bool {
        self.connection.credential().is_some()
    }

    pub fn start(&mut self) {
        if self.connection.credential().is_none() {
            log::warn!("no stored login; not connecting");
            return;
        }
        let effect = self.connection.connect();
        self.handle_effect(effect);
    }

    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    /// Closes the socket and stops routing game deltas into the store.
    pub fn shutdown(&mut self) {
        self.disconnect();
        if self.channel.unsubscribe(self.game_sub) {
            log::debug!("game view detached");
        }
    }

    pub fn send(&mut self, cmd: &SocketCommand) -> bool {
        self.connection.send(cmd)
    }

    /// Drains queued network events, one at a time, in arrival order.
    pub fn pump(&mut self, now_ms: f64) {
        self.clock.set(now_ms);
        loop {
            let next = self.inbox.borrow_mut().pop_front();
            let Some(event) = next else { break };
            let effect = match event {
                NetEvent::Transport(ev) => self.connection.on_event(ev),
                NetEvent::ReconnectDue(generation) => self.connection.on_reconnect_due(generation),
            };
            self.handle_effect(effect);
        }
    }

    fn handle_effect(&mut self, effect: Option<Effect>) {
        match effect {
            None => {}
            Some(Effect::Dispatch(cmd)) => {
                self.channel.dispatch(&cmd);
            }
            Some(Effect::ScheduleReconnect {
                delay_ms,
                attempt,
                generation,
            }) => {
                log::debug!("reconnect attempt {} due in {}ms", attempt, delay_ms);
                self.scheduler.schedule(delay_ms, generation);
            }
            Some(Effect::ForceLogout(reason)) => {
                let err = reason.as_error(self.connection.attempts());
                log::warn!("{}", err);
                self.logged_out = Some(reason);
                self.session.force_logout(reason);
            }
        }
    }

    /// Advances interpolation and timers. Elapsed time is never negative.
    pub fn tick(&mut self, now_ms: f64) {
        self.clock.set(now_ms);
        let dt = match self.last_frame_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms.max(self.last_frame_ms.unwrap_or(now_ms)));
        self.world.borrow_mut().advance_creeps(dt);
        self.hud.borrow_mut().expire(now_ms);
        if let Some(opened) = self.stats_opened_at {
            let waiting = self.hud.borrow().stats.is_none();
            if waiting && now_ms - opened >= STATS_TIMEOUT_MS {
                self.close_stats();
                self.toast("Stats unavailable", ToastKind::Error);
            }
        }

        let bounds = self.world.borrow().bounds();
        if bounds != self.camera.world {
            self.camera.set_world(bounds);
        }
        if !self.camera.initialized && bounds.max_x > 0 && bounds.max_y > 0 {
            let (cx, cy) = self.home_point();
            self.camera.center_on(cx, cy);
            self.camera.initialized = true;
        }
    }

    /// The local player's castle if known, else the world centre.
    fn home_point(&self) -> (f64, f64) {
        let world = self.world.borrow();
        let local = world.local_player().map(|l| l.player_number);
        let castle = world
            .tiles()
            .filter(|t| t.terrain == TerrainType::Castle)
            .find(|t| local.is_none_or(|p| t.is_owned_by(p)));
        match castle {
            Some(t) => (t.coord.x as f64 + 0.5, t.coord.y as f64 + 0.5),
            None => {
                let b = world.bounds();
                (b.max_x as f64 / 2.0, b.max_y as f64 / 2.0)
            }
        }
    }

    pub fn render(&self, painter: &mut dyn Painter) {
        let world = self.world.borrow();
        draw_frame(
            painter,
            &FrameView {
                camera: &self.camera,
                world: &world,
                mode: self.mode,
                hover: self.hover,
            },
        );
    }

    pub fn render_minimap(&self, painter: &mut dyn Painter, w: f64, h: f64) -> Option<MinimapProjection> {
        draw_minimap(painter, &self.world.borrow(), &self.camera, w, h)
    }

    pub fn minimap_recenter(&mut self, proj: &MinimapProjection, mx: f64, my: f64) {
        let (wx, wy) = proj.to_world(mx, my);
        self.camera.center_on(wx, wy);
    }

    pub fn mouse_down(&mut self, x: f64, y: f64) {
        self.drag.press(x, y);
    }

    pub fn mouse_move(&mut self, x: f64, y: f64) {
        let inside = x >= 0.0 && y >= 0.0 && x < self.camera.viewport_w && y < self.camera.viewport_h;
        self.hover = inside.then(|| self.camera.screen_to_tile(x, y));
        if let Some((dx, dy)) = self.drag.motion(x, y) {
            self.camera.pan(dx, dy);
        }
    }

    /// Ends a press. A press that never became a drag counts as a click.
    pub fn mouse_up(&mut self, x: f64, y: f64) -> Option<Result<(), PlacementError>> {
        if self.drag.release() {
            return Some(self.click(x, y));
        }
        None
    }

    pub fn wheel(&mut self, delta_y: f64, x: f64, y: f64) {
        if delta_y != 0.0 {
            self.camera.zoom_at(-delta_y.signum(), x, y);
        }
    }

    fn click(&mut self, x: f64, y: f64) -> Result<(), PlacementError> {
        let coord = self.camera.screen_to_tile(x, y);
        match self.mode {
            InteractionMode::Select => {
                let mut world = self.world.borrow_mut();
                let target = world.tile(coord).map(|t| t.coord);
                world.select(target);
                Ok(())
            }
            InteractionMode::Place(kind) => self.try_place(coord, kind),
        }
    }

    /// Re-checks legality against the current store and only then sends.
    pub fn try_place(&mut self, coord: TileCoord, kind: PlaceableKind) -> Result<(), PlacementError> {
        let Some(def) = crate::model::placeable(kind) else {
            return Err(PlacementError::UnknownTile);
        };
        let verdict = {
            let world = self.world.borrow();
            check_placement(
                world.tile(coord),
                def,
                world.local_player().map(|l| l.player_number),
                &world.resources(),
            )
        };
        if let Err(e) = verdict {
            self.toast(e.to_string(), ToastKind::Error);
            return Err(e);
        }
        if self.connection.send(&SocketCommand::place(coord, kind)) {
            self.cancel_placement();
        } else {
            self.toast("Not connected", ToastKind::Error);
        }
        Ok(())
    }

    pub fn enter_placement(&mut self, kind: PlaceableKind) {
        self.mode = InteractionMode::Place(kind);
        self.input.push(InputContext::Placement);
    }

    pub fn cancel_placement(&mut self) {
        self.mode = InteractionMode::Select;
        self.input.pop(InputContext::Placement);
    }

    pub fn toast(&self, text: impl Into<String>, kind: ToastKind) {
        self.hud.borrow_mut().push_toast(text, kind, self.clock.get());
    }

    pub fn send_creep(&mut self, creep_type: &str) -> bool {
        let Some(def) = creep_definition(creep_type) else {
            log::warn!("unknown creep type {}", creep_type);
            return false;
        };
        if !self.world.borrow().resources().covers(&def.send_cost) {
            self.toast(format!("Not enough gold for {}", def.name), ToastKind::Error);
            return false;
        }
        self.connection.send(&SocketCommand::send_creep(def.id))
    }

    pub fn stats_open(&self) -> bool {
        self.stats_opened_at.is_some()
    }

    /// Asks the server for stats and shows the panel until the reply
    /// arrives or the wait times out.
    pub fn open_stats(&mut self) -> bool {
        if !self.connection.send(&SocketCommand::get_stats()) {
            self.toast("Not connected", ToastKind::Error);
            return false;
        }
        self.hud.borrow_mut().clear_stats();
        self.stats_opened_at = Some(self.clock.get());
        self.input.push(InputContext::Modal);
        true
    }

    pub fn close_stats(&mut self) {
        self.stats_opened_at = None;
        self.input.pop(InputContext::Modal);
    }

    pub fn toggle_stats(&mut self) {
        if self.stats_open() {
            self.close_stats();
        } else {
            self.open_stats();
        }
    }

    /// Applies a key binding for the current input context.
    pub fn key(&mut self, key: &KeyPress) -> Option<InputAction> {
        let action = self.input.resolve(key)?;
        match action {
            InputAction::SelectionCancel => self.cancel_placement(),
            InputAction::CameraReset => self.camera.reset(),
            InputAction::ZoomIn => self.camera.zoom_in(),
            InputAction::ZoomOut => self.camera.zoom_out(),
            InputAction::Build(id) => self.enter_placement(PlaceableKind::Building(id)),
            InputAction::Tower(id) => self.enter_placement(PlaceableKind::Tower(id)),
            InputAction::SendCreep(slot) => {
                if let Some(def) = CREEP_DEFINITIONS.get(slot) {
                    self.send_creep(def.id);
                }
            }
            InputAction::MenuStats => self.toggle_stats(),
            InputAction::MenuToggle => {
                if self.stats_open() {
                    self.close_stats();
                } else {
                    self.world.borrow_mut().select(None);
                }
            }
        }
        Some(action)
    }

    #[cfg(test)]
    pub(crate) fn transport_mut(&mut self) -> &mut T {
        self.connection.transport_mut()
    }

    #[cfg(test)]
    pub(crate) fn inbox(&self) -> Inbox {
        self.inbox.clone()
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &P {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::TransportEvent;
    use crate::net::connection::tests::MockTransport;
    use crate::net::session::tests::MemorySession;
    use crate::net::Credential;
    use crate::model::Structure;
    use serde_json::{Value, json};

    #[derive(Default)]
    struct RecordingScheduler {
        scheduled: Rc<RefCell<Vec<(u32, u64)>>>,
    }

    impl ReconnectScheduler for RecordingScheduler {
        fn schedule(&mut self, delay_ms: u32, generation: u64) {
            self.scheduled.borrow_mut().push((delay_ms, generation));
        }
    }

    type TestClient = GameClient<MockTransport, RecordingScheduler, MemorySession>;

    fn client() -> (TestClient, Rc<RefCell<Vec<(u32, u64)>>>) {
        let scheduler = RecordingScheduler::default();
        let scheduled = scheduler.scheduled.clone();
        let session = MemorySession {
            credential: Some(Credential {
                user_id: "u1".into(),
                username: "ada".into(),
                token: "tok".into(),
            }),
            logouts: Vec::new(),
        };
        let c = GameClient::new(ClientConfig::default(), MockTransport::default(), scheduler, session, new_inbox());
        (c, scheduled)
    }

    fn push(c: &TestClient, ev: TransportEvent) {
        c.inbox().borrow_mut().push_back(NetEvent::Transport(ev));
    }

    fn server(c: &TestClient, topic: &str, data: Value) {
        let frame = json!({"subject": "GAME", "topic": topic, "data": data}).to_string();
        push(c, TransportEvent::Message(frame));
    }

    fn connected() -> TestClient {
        let (mut c, _) = client();
        c.start();
        c.transport_mut().open = true;
        push(&c, TransportEvent::Opened);
        c.pump(0.0);
        c
    }

    fn sent_topics(c: &mut TestClient) -> Vec<String> {
        c.transport_mut()
            .sent
            .iter()
            .filter_map(|f| SocketCommand::parse(f).ok())
            .map(|cmd| cmd.topic)
            .collect()
    }

    fn seed_map(c: &TestClient) {
        server(c, "PLAYER_INFO", json!({"playerNumber": 1, "colorIndex": 0}));
        server(
            c,
            "FULL_MAP",
            json!({
                "width": 4, "height": 4,
                "tiles": [
                    {"x": 0, "y": 0, "terrainType": 3, "owners": [1]},
                    {"x": 1, "y": 0, "terrainType": 1, "owners": [1]},
                    {"x": 2, "y": 0, "terrainType": 7, "owners": [1]}
                ],
                "playerColorMap": {"1": 0}
            }),
        );
        server(c, "RESOURCE_UPDATE", json!({"wood": 100, "stone": 100, "gold": 100}));
    }

    #[test]
    fn login_goes_out_once_the_socket_opens() {
        let mut c = connected();
        assert_eq!(c.connection_state(), ConnectionState::Connected);
        assert_eq!(sent_topics(&mut c), vec!["LOGIN"]);
    }

    #[test]
    fn deltas_flow_into_store_in_arrival_order() {
        let mut c = connected();
        seed_map(&c);
        server(&c, "SPAWN_CREEP", json!({"creepId": "c1", "creepType": "GHOST", "x": 0.5, "y": 0.5,
            "playerNumber": 1, "hitpoints": 40, "maxHitpoints": 40, "speed": 1.0}));
        server(&c, "UPDATE_CREEP", json!({"creepId": "c1", "x": 2.5, "y": 0.5, "hitpoints": 30}));
        server(&c, "RESOURCE_UPDATE", json!({"wood": "bad"}));
        c.pump(10.0);
        {
            let w = c.world();
            assert_eq!(w.tile_count(), 3);
            assert_eq!(w.resources().wood, 100);
            assert_eq!(w.creep("c1").map(|cr| cr.target_x), Some(2.5));
        }
        c.tick(0.0);
        c.tick(1000.0);
        assert!((c.world().creep("c1").unwrap().x - 1.5).abs() < 1e-9);
        c.tick(10_000.0);
        assert_eq!(c.world().creep("c1").unwrap().x, 2.5);
        assert!(c.camera.initialized);
    }

    #[test]
    fn click_in_placement_mode_sends_and_leaves_mode() {
        let mut c = connected();
        seed_map(&c);
        c.pump(0.0);
        c.tick(0.0);
        c.camera.reset();
        c.enter_placement(PlaceableKind::Building(1));
        c.mouse_down(10.0, 10.0);
        c.mouse_move(11.0, 10.0);
        assert_eq!(c.mouse_up(11.0, 10.0), Some(Ok(())));
        assert_eq!(c.mode, InteractionMode::Select);
        let last = c.transport_mut().sent.last().cloned().unwrap();
        let cmd = SocketCommand::parse(&last).unwrap();
        assert!(cmd.is("GAME", "PLACE_BUILDING"));
        assert_eq!(cmd.data["buildingType"], 1);
    }

    #[test]
    fn illegal_placement_toasts_and_sends_nothing() {
        let mut c = connected();
        seed_map(&c);
        c.pump(0.0);
        c.camera.reset();
        c.enter_placement(PlaceableKind::Building(1));
        let before = c.transport_mut().sent.len();
        c.mouse_down(40.0, 10.0);
        assert_eq!(c.mouse_up(40.0, 10.0), Some(Err(PlacementError::TerrainNotAllowed)));
        assert_eq!(c.transport_mut().sent.len(), before);
        assert!(c.mode.is_placing());
        assert_eq!(c.hud().toasts().len(), 1);
    }

    #[test]
    fn drag_pans_instead_of_clicking() {
        let mut c = connected();
        seed_map(&c);
        c.pump(0.0);
        c.tick(0.0);
        c.camera.set_viewport(64.0, 64.0);
        c.camera.reset();
        c.mouse_down(100.0, 100.0);
        c.mouse_move(80.0, 100.0);
        assert_eq!(c.mouse_up(80.0, 100.0), None);
        assert_eq!(c.camera.x, 20.0);
        assert!(c.world().selected().is_none());
    }

    #[test]
    fn select_click_tracks_later_updates() {
        let mut c = connected();
        seed_map(&c);
        c.pump(0.0);
        c.camera.reset();
        c.mouse_down(5.0, 5.0);
        c.mouse_up(5.0, 5.0);
        server(&c, "BUILDING_CHANGED", json!({"x": 0, "y": 0, "buildingType": 1, "playerNumber": 1}));
        c.pump(0.0);
        assert!(matches!(
            c.world().selected().map(|t| t.structure.clone()),
            Some(Structure::Building { building_type: 1, .. })
        ));
    }

    #[test]
    fn reconnects_back_off_then_log_out() {
        let (mut c, scheduled) = client();
        c.start();
        for _ in 0..6 {
            push(&c, TransportEvent::Closed);
            c.pump(0.0);
            if let Some(&(_, generation)) = scheduled.borrow().last() {
                c.inbox().borrow_mut().push_back(NetEvent::ReconnectDue(generation));
            }
            c.pump(0.0);
        }
        let delays: Vec<u32> = scheduled.borrow().iter().map(|(d, _)| *d).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
        assert_eq!(c.logged_out(), Some(LogoutReason::ServerUnreachable));
        assert_eq!(c.session().logouts, vec![LogoutReason::ServerUnreachable]);
        assert_eq!(c.connection_state(), ConnectionState::ServerUnreachable);
        assert!(!c.has_credential());
    }

    #[test]
    fn token_rejection_forces_logout_without_retry() {
        let (mut c, scheduled) = client();
        c.start();
        push(&c, TransportEvent::Message(r#"{"subject":"CORE","topic":"TOKEN_INVALID"}"#.into()));
        push(&c, TransportEvent::Closed);
        c.pump(0.0);
        assert!(scheduled.borrow().is_empty());
        assert_eq!(c.session().logouts, vec![LogoutReason::CredentialRejected]);
    }

    #[test]
    fn hotkeys_drive_placement_and_creeps() {
        let mut c = connected();
        seed_map(&c);
        c.pump(0.0);
        assert_eq!(c.key(&KeyPress::plain("e")), Some(InputAction::Build(3)));
        assert!(c.mode.is_placing());
        assert_eq!(c.key(&KeyPress::plain("Escape")), Some(InputAction::SelectionCancel));
        assert_eq!(c.mode, InteractionMode::Select);
        c.key(&KeyPress::plain("2"));
        assert_eq!(sent_topics(&mut c).last().map(String::as_str), Some("SEND_CREEP"));
    }

    #[test]
    fn unaffordable_creep_is_not_sent() {
        let mut c = connected();
        server(&c, "RESOURCE_UPDATE", json!({"wood": 0, "stone": 0, "gold": 4}));
        c.pump(0.0);
        assert!(!c.send_creep("RUNNER"));
        assert_eq!(c.hud().toasts().len(), 1);
    }

    #[test]
    fn stats_panel_waits_for_reply_then_times_out() {
        let mut c = connected();
        c.pump(1000.0);
        c.tick(1000.0);
        assert_eq!(c.key(&KeyPress::plain("Tab")), Some(InputAction::MenuStats));
        assert!(c.stats_open());
        assert_eq!(sent_topics(&mut c).last().map(String::as_str), Some("GET_STATS"));

        server(&c, "STATS", json!({"gameDurationMs": 61000, "players": [{"playerNumber": 1, "creepsKilled": 4}]}));
        c.pump(2000.0);
        c.tick(7000.0);
        assert!(c.stats_open());
        assert_eq!(c.hud().stats.as_ref().map(|s| s.players[0].creeps_killed), Some(4));

        c.key(&KeyPress::plain("Escape"));
        assert!(!c.stats_open());

        c.open_stats();
        assert!(c.hud().stats.is_none());
        c.tick(12_500.0);
        assert!(!c.stats_open());
        assert_eq!(c.hud().toasts().last().map(|t| t.text.as_str()), Some("Stats unavailable"));
    }

    #[test]
    fn hud_deltas_update_overlay_state() {
        let mut c = connected();
        server(&c, "COUNTDOWN", json!({"seconds": 5}));
        server(&c, "PLAYER_TAKES_DAMAGE", json!({"playerNumber": 2, "damage": 3, "remainingHitpoints": 17}));
        server(&c, "GAME_OVER", json!({"playerNumber": 1, "isWinner": true}));
        server(&c, "ERROR_MESSAGE", json!({"message": "Too close to road"}));
        c.pump(1000.0);
        let hud = c.hud();
        assert_eq!(hud.countdown_remaining(1000.0), Some(5));
        assert_eq!(hud.player_hp.get(&2), Some(&17));
        assert!(hud.outcome.is_some_and(|o| o.is_winner));
        assert_eq!(hud.toasts()[0].text, "Too close to road");
    }

    #[test]
    fn shutdown_closes_and_detaches() {
        let mut c = connected();
        assert_eq!(c.channel.len(), 1);
        c.shutdown();
        assert_eq!(c.connection_state(), ConnectionState::Disconnected);
        assert!(c.channel.is_empty());
    }
}
