use yew::prelude::*;

pub const MINIMAP_SIZE: u32 = 180;

#[derive(Properties, PartialEq, Clone)]
pub struct MinimapProps {
    pub canvas_ref: NodeRef,
    /// Emits a minimap pixel the camera should centre on.
    pub on_point: Callback<(f64, f64)>,
}

#[function_component(Minimap)]
pub fn minimap(props: &MinimapProps) -> Html {
    let onmousedown = {
        let cb = props.on_point.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            cb.emit((e.offset_x() as f64, e.offset_y() as f64));
        })
    };
    let onmousemove = {
        let cb = props.on_point.clone();
        Callback::from(move |e: MouseEvent| {
            if e.buttons() & 1 == 1 {
                cb.emit((e.offset_x() as f64, e.offset_y() as f64));
            }
        })
    };
    html! {<div style="position:absolute; right:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:6px;">
        <canvas ref={props.canvas_ref.clone()} width={MINIMAP_SIZE.to_string()} height={MINIMAP_SIZE.to_string()}
            style="display:block; cursor:crosshair;" {onmousedown} {onmousemove}></canvas>
    </div>}
}
