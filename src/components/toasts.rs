use crate::state::hud::Toast;
use crate::state::ToastKind;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ToastsProps {
    pub toasts: Vec<Toast>,
}

#[function_component]
pub fn Toasts(props: &ToastsProps) -> Html {
    if props.toasts.is_empty() {
        return html! {};
    }
    html! {<div style="position:absolute; left:50%; top:64px; transform:translateX(-50%); display:flex; flex-direction:column; gap:6px; align-items:center; pointer-events:none;">
        { for props.toasts.iter().map(|t| {
            let border = match t.kind {
                ToastKind::Error => "#f85149",
                ToastKind::Info => "#58a6ff",
            };
            html!{ <div key={t.id} style={format!("font-size:13px; line-height:1.25; background:#1c2128; border:1px solid {}; padding:6px 10px; border-radius:6px;", border)}>{ t.text.clone() }</div> }
        }) }
    </div>}
}
