//! Canvas2D backend
//!
//! The backing store is sized to the displayed size times the device pixel
//! ratio; each frame starts by mapping logical 400x800 onto it.

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::color::Color;
use super::surface::{RenderSurface, TextAlign};
use crate::consts::{LOGICAL_HEIGHT, LOGICAL_WIDTH};

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
}

impl CanvasSurface {
    /// Returns `None` if the canvas has no 2D context
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            ctx,
            images: HashMap::new(),
        })
    }

    /// Start loading an image under `key`; drawing falls back until it is ready
    pub fn load_image(&mut self, key: &str, url: &str) {
        let Ok(img) = HtmlImageElement::new() else {
            log::warn!("Could not create image element for {key}");
            return;
        };
        img.set_src(url);
        self.images.insert(key.to_string(), img);
    }

    /// Match the backing store to the displayed size
    pub fn resize(&self, device_pixel_ratio: f64) {
        let w = (self.canvas.client_width() as f64 * device_pixel_ratio).round() as u32;
        let h = (self.canvas.client_height() as f64 * device_pixel_ratio).round() as u32;
        if w > 0 && h > 0 && (self.canvas.width() != w || self.canvas.height() != h) {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
        }
    }

    /// Reset the transform to logical coordinates
    pub fn begin_frame(&self) {
        let sx = self.canvas.width() as f64 / LOGICAL_WIDTH as f64;
        let sy = self.canvas.height() as f64 / LOGICAL_HEIGHT as f64;
        self.ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0).ok();
        self.ctx.set_global_alpha(1.0);
    }

    fn path(&self, points: &[Vec2]) {
        self.ctx.begin_path();
        if let Some((first, rest)) = points.split_first() {
            self.ctx.move_to(first.x as f64, first.y as f64);
            for p in rest {
                self.ctx.line_to(p.x as f64, p.y as f64);
            }
        }
    }
}

impl RenderSurface for CanvasSurface {
    fn clear(&mut self, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(0.0, 0.0, LOGICAL_WIDTH as f64, LOGICAL_HEIGHT as f64);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.ctx.translate(offset.x as f64, offset.y as f64).ok();
    }

    fn rotate(&mut self, radians: f32) {
        self.ctx.rotate(radians as f64).ok();
    }

    fn scale(&mut self, factor: f32) {
        self.ctx.scale(factor as f64, factor as f64).ok();
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn fill_rect(&mut self, corner: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(corner.x as f64, corner.y as f64, size.x as f64, size.y as f64);
    }

    fn stroke_rect(&mut self, corner: Vec2, size: Vec2, width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx
            .stroke_rect(corner.x as f64, corner.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, std::f64::consts::TAU)
            .ok();
        self.ctx.fill();
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, std::f64::consts::TAU)
            .ok();
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.path(points);
        self.ctx.close_path();
        self.ctx.fill();
    }

    fn stroke_polyline(&mut self, points: &[Vec2], width: f32, color: Color, closed: bool) {
        if points.len() < 2 {
            return;
        }
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.path(points);
        if closed {
            self.ctx.close_path();
        }
        self.ctx.stroke();
    }

    fn text(&mut self, text: &str, pos: Vec2, size: f32, align: TextAlign, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("bold {}px sans-serif", size.round()));
        self.ctx.set_text_align(match align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.set_text_baseline("middle");
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }

    fn image(&mut self, key: &str, corner: Vec2, size: Vec2) -> bool {
        let Some(img) = self.images.get(key) else {
            return false;
        };
        if !img.complete() || img.natural_width() == 0 {
            return false;
        }
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                img,
                corner.x as f64,
                corner.y as f64,
                size.x as f64,
                size.y as f64,
            )
            .is_ok()
    }
}
