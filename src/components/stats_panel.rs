use crate::protocol::GameStats;
use crate::util::format_time;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct StatsPanelProps {
    pub show: bool,
    pub stats: Option<GameStats>,
    pub local_player: Option<u32>,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn StatsPanel(props: &StatsPanelProps) -> Html {
    if !props.show {
        return html! {};
    }
    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let cell = "padding:3px 8px; text-align:right; font-variant-numeric:tabular-nums;";
    let body = match &props.stats {
        None => html! { <div style="opacity:0.7; padding:8px 0;">{"Loading stats..."}</div> },
        Some(stats) => html! {<>
            <div style="display:flex; justify-content:space-between; gap:12px;">
                <span style="opacity:0.7;">{"Duration"}</span>
                <span style="color:#d29922; font-weight:600;">{ format_time(stats.game_duration_ms / 1000) }</span>
            </div>
            <table style="border-collapse:collapse; margin-top:6px;">
                <thead><tr style="opacity:0.7;">
                    <th style="padding:3px 8px; text-align:left;">{"Player"}</th>
                    <th style={cell}>{"Gold +"}</th>
                    <th style={cell}>{"Gold -"}</th>
                    <th style={cell}>{"Kills"}</th>
                    <th style={cell}>{"Sent"}</th>
                    <th style={cell}>{"Dmg Dealt"}</th>
                    <th style={cell}>{"Dmg Taken"}</th>
                    <th style={cell}>{"Buildings"}</th>
                    <th style={cell}>{"Towers"}</th>
                </tr></thead>
                <tbody>
                { for stats.players.iter().map(|p| {
                    let me = props.local_player == Some(p.player_number);
                    html! {<tr style={ if me { "color:#58a6ff; font-weight:600;" } else { "" } }>
                        <td style="padding:3px 8px;">{ format!("P{}", p.player_number) }</td>
                        <td style={cell}>{ p.gold_earned }</td>
                        <td style={cell}>{ p.gold_spent }</td>
                        <td style={cell}>{ p.creeps_killed }</td>
                        <td style={cell}>{ p.creeps_sent }</td>
                        <td style={cell}>{ p.damage_dealt }</td>
                        <td style={cell}>{ p.damage_taken }</td>
                        <td style={cell}>{ p.buildings_placed }</td>
                        <td style={cell}>{ p.towers_placed }</td>
                    </tr>}
                }) }
                </tbody>
            </table>
        </>},
    };
    html! {<div style="position:absolute; left:50%; top:80px; transform:translateX(-50%); background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; padding:10px 14px; min-width:320px; display:flex; flex-direction:column; gap:4px; font-size:12px; line-height:1.3;">
        <div style="display:flex; justify-content:space-between; align-items:center; font-weight:600; font-size:14px;">
            <span>{"Game Stats"}</span>
            <button onclick={close} style="padding:2px 8px;">{"×"}</button>
        </div>
        { body }
    </div> }
}
