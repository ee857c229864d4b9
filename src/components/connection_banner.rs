use crate::net::ConnectionState;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ConnectionBannerProps {
    pub state: ConnectionState,
    pub on_reconnect: Callback<()>,
}

#[function_component]
pub fn ConnectionBanner(props: &ConnectionBannerProps) -> Html {
    let color = match props.state {
        ConnectionState::Connected => return html! {},
        ConnectionState::Connecting => "#d29922",
        ConnectionState::Disconnected => "#8b949e",
        ConnectionState::Error | ConnectionState::ServerUnreachable => "#f85149",
    };
    let retry = {
        let cb = props.on_reconnect.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let can_retry = matches!(
        props.state,
        ConnectionState::Disconnected | ConnectionState::ServerUnreachable
    );
    html! {<div style={format!("position:absolute; top:12px; right:12px; background:rgba(22,27,34,0.92); border:1px solid {}; border-radius:8px; padding:6px 10px; display:flex; gap:8px; align-items:center; font-size:12px;", color)}>
        <span style={format!("width:8px; height:8px; border-radius:50%; background:{};", color)}></span>
        <span>{ props.state.label() }</span>
        { if can_retry { html!{ <button onclick={retry} style="padding:2px 8px; font-size:11px;">{"Reconnect"}</button> } } else { html!{} } }
    </div>}
}
