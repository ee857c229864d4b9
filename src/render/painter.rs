//! Drawing surface abstraction. The frame code only talks to [`Painter`];
//! the canvas implementation lives here too, and tests record calls instead.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use web_sys::CanvasRenderingContext2d;

use super::assets::{SpriteAtlas, SpriteKey};

pub trait Painter {
    fn clear(&mut self, w: f64, h: f64, color: &str);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, width: f64);
    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: &str, width: f64);
    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str);
    fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str, width: f64);
    fn text(&mut self, text: &str, cx: f64, cy: f64, size_px: f64, color: &str);
    /// Draws a sprite scaled into the rect. `false` when the image is not
    /// ready, so the caller can fall back to primitives.
    fn sprite(&mut self, key: &SpriteKey, x: f64, y: f64, w: f64, h: f64) -> bool;
}

pub struct CanvasPainter {
    ctx: CanvasRenderingContext2d,
    atlas: Rc<RefCell<SpriteAtlas>>,
}

impl CanvasPainter {
    pub fn new(ctx: CanvasRenderingContext2d, atlas: Rc<RefCell<SpriteAtlas>>) -> Self {
        Self { ctx, atlas }
    }
}

impl Painter for CanvasPainter {
    fn clear(&mut self, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(0.0, 0.0, w, h);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: &str, width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(x0, y0);
        self.ctx.line_to(x1, y1);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        if self.ctx.arc(cx, cy, r.max(0.0), 0.0, PI * 2.0).is_ok() {
            self.ctx.fill();
        }
    }

    fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str, width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        if self.ctx.arc(cx, cy, r.max(0.0), 0.0, PI * 2.0).is_ok() {
            self.ctx.stroke();
        }
    }

    fn text(&mut self, text: &str, cx: f64, cy: f64, size_px: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(&format!("{}px sans-serif", size_px.max(1.0).round()));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        let _ = self.ctx.fill_text(text, cx, cy);
    }

    fn sprite(&mut self, key: &SpriteKey, x: f64, y: f64, w: f64, h: f64) -> bool {
        let Some(img) = self.atlas.borrow_mut().ready_image(key) else {
            return false;
        };
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(&img, x, y, w, h)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Op {
        Clear,
        FillRect { x: f64, y: f64, w: f64, h: f64, color: String },
        StrokeRect { x: f64, y: f64, w: f64, h: f64, color: String },
        Line { x0: f64, y0: f64, x1: f64, y1: f64, color: String },
        FillCircle { cx: f64, cy: f64, r: f64, color: String },
        StrokeCircle { cx: f64, cy: f64, r: f64, color: String },
        Text { text: String, cx: f64, cy: f64 },
        Sprite { key: SpriteKey, x: f64, y: f64 },
    }

    /// Records draw calls. Sprites listed in `ready` draw; the rest report
    /// not-ready.
    #[derive(Default)]
    pub(crate) struct RecordingPainter {
        pub ops: Vec<Op>,
        pub ready: HashSet<SpriteKey>,
    }

    impl RecordingPainter {
        pub fn lines_with(&self, color: &str) -> Vec<(f64, f64, f64, f64)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Line { x0, y0, x1, y1, color: c } if c == color => Some((*x0, *y0, *x1, *y1)),
                    _ => None,
                })
                .collect()
        }

        pub fn fills_with(&self, color: &str) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::FillRect { color: c, .. } | Op::FillCircle { color: c, .. } if c == color))
                .count()
        }
    }

    impl Painter for RecordingPainter {
        fn clear(&mut self, _w: f64, _h: f64, _color: &str) {
            self.ops.push(Op::Clear);
        }

        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
            self.ops.push(Op::FillRect { x, y, w, h, color: color.into() });
        }

        fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str, _width: f64) {
            self.ops.push(Op::StrokeRect { x, y, w, h, color: color.into() });
        }

        fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: &str, _width: f64) {
            self.ops.push(Op::Line { x0, y0, x1, y1, color: color.into() });
        }

        fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str) {
            self.ops.push(Op::FillCircle { cx, cy, r, color: color.into() });
        }

        fn stroke_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str, _width: f64) {
            self.ops.push(Op::StrokeCircle { cx, cy, r, color: color.into() });
        }

        fn text(&mut self, text: &str, cx: f64, cy: f64, _size_px: f64, _color: &str) {
            self.ops.push(Op::Text { text: text.into(), cx, cy });
        }

        fn sprite(&mut self, key: &SpriteKey, x: f64, y: f64, _w: f64, _h: f64) -> bool {
            if !self.ready.contains(key) {
                return false;
            }
            self.ops.push(Op::Sprite { key: key.clone(), x, y });
            true
        }
    }
}
