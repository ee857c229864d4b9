use crate::model::GameOutcome;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct GameOverOverlayProps {
    pub outcome: Option<GameOutcome>,
    pub show_stats: Callback<()>,
    pub to_lobby: Callback<()>,
}

#[function_component]
pub fn GameOverOverlay(props: &GameOverOverlayProps) -> Html {
    let Some(outcome) = props.outcome else {
        return html! {};
    };
    let stats_btn = {
        let cb = props.show_stats.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let lobby_btn = {
        let cb = props.to_lobby.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let (title, color) = if outcome.is_winner {
        ("Victory", "#3fb950")
    } else {
        ("Defeat", "#f85149")
    };
    html! {
        <div style={format!("position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); border:2px solid {}; padding:24px 32px; border-radius:12px; text-align:center; min-width:320px;", color)}>
            <h2 style={format!("margin:0 0 12px 0; color:{};", color)}>{ title }</h2>
            <p style="margin:4px 0;">{ format!("Player {}", outcome.player_number) }</p>
            <div style="margin-top:16px; display:flex; gap:12px; justify-content:center;">
                <button onclick={stats_btn}>{"Game Stats"}</button>
                <button onclick={lobby_btn}>{"Back to Lobby"}</button>
            </div>
        </div>
    }
}
