use crate::model::PlayerResources;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ResourceBarProps {
    pub resources: PlayerResources,
    pub player_number: Option<u32>,
    pub player_color: &'static str,
    pub hitpoints: Option<i32>,
}

#[function_component]
pub fn ResourceBar(props: &ResourceBarProps) -> Html {
    let row_style = "display:flex; align-items:center; gap:8px;"; // icon | label | value
    let icon_style = "width:20px; text-align:center; flex-shrink:0;";
    let label_style = "flex:1; font-weight:500;";
    let value_style =
        "min-width:70px; text-align:right; font-variant-numeric:tabular-nums; font-weight:600;";
    let row = |icon: &str, label: &str, value: String, color: &str| {
        html! {
            <div style={row_style}>
                <span style={format!("{} color:{};", icon_style, color)}>{ icon.to_string() }</span>
                <span style={format!("{} color:{};", label_style, color)}>{ label.to_string() }</span>
                <span style={format!("{} color:{};", value_style, color)}>{ value }</span>
            </div>
        }
    };
    let res = props.resources;
    html! {
        <div style="position:absolute; top:12px; left:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:10px 14px; min-width:230px; display:flex; flex-direction:column; gap:10px; font-size:14px;">
            { if let Some(p) = props.player_number {
                html!{ <div style="display:flex; align-items:center; gap:8px; font-size:12px; opacity:0.85;">
                    <span style={format!("width:12px; height:12px; border-radius:3px; background:{};", props.player_color)}></span>
                    <span>{ format!("Player {}", p) }</span>
                </div> }
            } else { html!{} } }
            { row("🪵", "Wood", res.wood.to_string(), "#c08a4e") }
            { row("🪨", "Stone", res.stone.to_string(), "#9ea7b3") }
            { row("🪙", "Gold", res.gold.to_string(), "#d4af37") }
            { if let Some(hp) = props.hitpoints {
                row("❤", "Castle", hp.to_string(), "#f85149")
            } else { html!{} } }
        </div>
    }
}
