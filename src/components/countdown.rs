use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct CountdownProps {
    pub seconds_left: Option<u32>,
}

#[function_component(Countdown)]
pub fn countdown(props: &CountdownProps) -> Html {
    let Some(secs) = props.seconds_left else {
        return html! {};
    };
    html! {<div style="position:absolute; top:12px; left:50%; transform:translateX(-50%); display:flex; flex-direction:column; align-items:center; gap:4px; pointer-events:none;">
        <div style="font-size:12px; opacity:0.8; text-transform:uppercase; letter-spacing:1px;">{"Game starts in"}</div>
        <div style="font-size:32px; font-weight:700; color:#d29922;">{ secs }</div>
    </div>}
}
