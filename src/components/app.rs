use super::game_view::GameView;
use crate::config::ClientConfig;
use crate::net::session::LOGIN_ROUTE;
use crate::net::{BrowserSession, SessionStore};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct AppProps {
    pub config: ClientConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    // Read once: a forced logout leaves its reason in sessionStorage.
    let logged_in = use_state(|| BrowserSession.credential().is_some());
    let notice = use_state(BrowserSession::take_logout_message);

    if *logged_in {
        return html! { <GameView config={props.config.clone()} /> };
    }
    html! {<div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(0,0,0,0.85); border:1px solid #30363d; padding:24px 32px; border-radius:12px; text-align:center; min-width:320px; color:#c9d1d9;">
        <h2 style="margin:0 0 12px 0;">{"Turrest"}</h2>
        { if let Some(msg) = &*notice {
            html!{ <p style="margin:4px 0; color:#f85149;">{ msg.clone() }</p> }
        } else {
            html!{ <p style="margin:4px 0;">{"You are not logged in."}</p> }
        } }
        <a href={LOGIN_ROUTE} style="display:inline-block; margin-top:16px; color:#58a6ff;">{"Go to login"}</a>
    </div>}
}
