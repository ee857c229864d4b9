use crate::model::{
    BUILDINGS, CREEP_DEFINITIONS, Placeable, PlaceableKind, PlayerResources, ResourceCost, TOWERS,
};
use crate::state::input::action_meta;
use crate::state::InputAction;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ActionPanelProps {
    pub resources: PlayerResources,
    pub placing: Option<PlaceableKind>,
    pub on_place: Callback<PlaceableKind>,
    pub on_send_creep: Callback<&'static str>,
    pub on_stats: Callback<()>,
}

fn cost_text(cost: &ResourceCost) -> String {
    let mut parts = Vec::new();
    if cost.wood > 0 {
        parts.push(format!("{}🪵", cost.wood));
    }
    if cost.stone > 0 {
        parts.push(format!("{}🪨", cost.stone));
    }
    if cost.gold > 0 {
        parts.push(format!("{}🪙", cost.gold));
    }
    parts.join(" ")
}

/// `(label, key)` of the binding that triggers `action`.
fn hotkey(action: InputAction) -> Option<(&'static str, String)> {
    action_meta(action).map(|m| (m.label, m.binding.display()))
}

#[function_component]
pub fn ActionPanel(props: &ActionPanelProps) -> Html {
    let btn_style = |active: bool, enabled: bool| {
        format!(
            "display:flex; flex-direction:column; align-items:center; gap:2px; min-width:64px; padding:4px 6px; border-radius:6px; border:1px solid {}; background:{}; opacity:{};",
            if active { "#58a6ff" } else { "#30363d" },
            if active { "#1f3a5f" } else { "#1c2128" },
            if enabled { "1" } else { "0.45" },
        )
    };

    let placeable_button = |def: &'static Placeable, action: InputAction| {
        let enabled = props.resources.covers(&def.cost);
        let active = props.placing == Some(def.kind);
        let onclick = {
            let cb = props.on_place.clone();
            let kind = def.kind;
            Callback::from(move |_| cb.emit(kind))
        };
        let key = hotkey(action);
        let title = match &key {
            Some((label, k)) => format!("{} [{}] ({})", label, k, cost_text(&def.cost)),
            None => format!("{} ({})", def.name, cost_text(&def.cost)),
        };
        html! {
            <button style={btn_style(active, enabled)} disabled={!enabled && !active} {onclick} {title}>
                <span style="font-size:18px;">{ def.icon }</span>
                <span style="font-size:11px;">{ def.name }</span>
                <span style="font-size:10px; opacity:0.7;">{ cost_text(&def.cost) }</span>
                { if let Some((_, k)) = key { html!{ <span style="font-size:10px; color:#d29922;">{ k }</span> } } else { html!{} } }
            </button>
        }
    };

    let stats_cb = {
        let cb = props.on_stats.clone();
        Callback::from(move |_| cb.emit(()))
    };

    html! {<div style="position:absolute; left:50%; bottom:12px; transform:translateX(-50%); background:rgba(22,27,34,0.92); border:1px solid #30363d; border-radius:10px; padding:8px 12px; display:flex; flex-direction:column; gap:6px; text-align:center;">
        <div style="display:flex; gap:6px; align-items:stretch;">
            { for BUILDINGS.iter().map(|def| {
                let id = match def.kind { PlaceableKind::Building(id) | PlaceableKind::Tower(id) => id };
                placeable_button(def, InputAction::Build(id))
            }) }
            <span style="width:1px; background:#30363d;"></span>
            { for TOWERS.iter().map(|def| {
                let id = match def.kind { PlaceableKind::Building(id) | PlaceableKind::Tower(id) => id };
                placeable_button(def, InputAction::Tower(id))
            }) }
        </div>
        <div style="display:flex; gap:6px; align-items:center; justify-content:center;">
            <span style="font-size:11px; opacity:0.7;">{"Send"}</span>
            { for CREEP_DEFINITIONS.iter().enumerate().map(|(slot, def)| {
                let enabled = props.resources.covers(&def.send_cost);
                let onclick = {
                    let cb = props.on_send_creep.clone();
                    let id = def.id;
                    Callback::from(move |_| cb.emit(id))
                };
                let key = hotkey(InputAction::SendCreep(slot));
                let title = format!("Send {} ({})", def.name, cost_text(&def.send_cost));
                html! {
                    <button style={btn_style(false, enabled)} disabled={!enabled} {onclick} {title}>
                        <span style="font-size:16px;">{ def.icon }</span>
                        <span style="font-size:10px; opacity:0.7;">{ cost_text(&def.send_cost) }</span>
                        { if let Some((_, k)) = key { html!{ <span style="font-size:10px; color:#d29922;">{ k }</span> } } else { html!{} } }
                    </button>
                }
            }) }
            <span style="width:1px; align-self:stretch; background:#30363d;"></span>
            <button onclick={stats_cb} title="Game stats (Tab)">{"Stats"}</button>
        </div>
    </div> }
}
