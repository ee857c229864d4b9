use crate::model::{Structure, Tile, building_name, tower_name};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct TileInfoPanelProps {
    pub tile: Option<Tile>,
    /// `(player number, colour)` for each owner of the tile.
    pub owners: Vec<(u32, &'static str)>,
    pub local_player: Option<u32>,
}

fn structure_label(structure: &Structure) -> Option<(String, Option<u32>)> {
    match structure {
        Structure::None => None,
        Structure::Road => Some(("Road".to_string(), None)),
        Structure::Building {
            building_type,
            owner,
        } => Some((building_name(*building_type).to_string(), *owner)),
        Structure::Tower { tower_type, owner } => {
            Some((tower_name(*tower_type).to_string(), *owner))
        }
    }
}

#[function_component]
pub fn TileInfoPanel(props: &TileInfoPanelProps) -> Html {
    let Some(tile) = &props.tile else {
        return html! {};
    };

    let panel_style = "position:absolute; right:12px; top:50%; transform:translateY(-50%); \
        background:rgba(22,27,34,0.95); border:1px solid #30363d; border-radius:8px; \
        padding:12px 16px; min-width:220px; max-width:280px; font-size:13px; color:#c9d1d9;";
    let header_style = "font-weight:600; font-size:15px; margin-bottom:8px; display:flex; align-items:center; gap:8px;";
    let section_style = "margin-top:10px; padding-top:8px; border-top:1px solid #30363d;";
    let stat_row_style =
        "display:flex; justify-content:space-between; margin:4px 0; font-size:12px;";
    let stat_label_style = "color:#8b949e;";
    let stat_value_style = "font-weight:500;";

    let structure = structure_label(&tile.structure).map(|(name, owner)| {
        let owner_text = match owner {
            Some(p) if props.local_player == Some(p) => "You".to_string(),
            Some(p) => format!("Player {}", p),
            None => "-".to_string(),
        };
        html! {
            <div style={section_style}>
                <div style={stat_row_style}>
                    <span style={stat_label_style}>{"Structure"}</span>
                    <span style={stat_value_style}>{ name }</span>
                </div>
                <div style={stat_row_style}>
                    <span style={stat_label_style}>{"Owner"}</span>
                    <span style={stat_value_style}>{ owner_text }</span>
                </div>
            </div>
        }
    });

    let owned_by_me = props
        .local_player
        .is_some_and(|p| tile.is_owned_by(p));

    html! {
        <div style={panel_style}>
            <div style={header_style}>
                <span style={format!("width:14px; height:14px; border-radius:3px; background:{};", tile.terrain.color())}></span>
                <span>{ tile.terrain.name() }</span>
            </div>
            <div style={stat_row_style}>
                <span style={stat_label_style}>{"Position"}</span>
                <span style={stat_value_style}>{ format!("{}, {}", tile.coord.x, tile.coord.y) }</span>
            </div>
            <div style={stat_row_style}>
                <span style={stat_label_style}>{"Territory"}</span>
                <span style="display:flex; gap:4px; align-items:center;">
                    { if props.owners.is_empty() {
                        html!{ <span style={stat_value_style}>{"Unclaimed"}</span> }
                    } else {
                        html!{ <>{ for props.owners.iter().map(|(p, color)| html!{
                            <span title={format!("Player {}", p)} style={format!("width:12px; height:12px; border-radius:3px; background:{};", color)}></span>
                        }) }</> }
                    } }
                </span>
            </div>
            { structure.unwrap_or_else(|| html! {}) }
            { if !owned_by_me && props.local_player.is_some() {
                html!{ <div style="margin-top:8px; font-size:11px; color:#8b949e;">{"Outside your territory"}</div> }
            } else { html!{} } }
        </div>
    }
}
