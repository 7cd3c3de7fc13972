use std::f64::consts::PI;

use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData};

use super::{GridImage, MarkerKind, Scene};

const BACKGROUND: &str = "#0e1116";
const PATH_COLOR: &str = "rgba(94,82,125,0.7)";
const PATH_WIDTH_M: f64 = 0.03;
const CLOUD_COLOR: &str = "rgba(255,99,71,0.85)";
const CLOUD_DOT_PX: f64 = 2.0;

/// Draws a [`Scene`] onto a 2D canvas context, caching the grid bitmap and
/// the marker image.
#[derive(Default)]
pub struct Renderer {
    grid_bitmap: Option<(u64, HtmlCanvasElement)>,
    marker_image: Option<(String, HtmlImageElement)>,
}

impl Renderer {
    pub fn draw(&mut self, ctx: &CanvasRenderingContext2d, scene: &Scene, now_ms: f64) {
        let (w, h) = scene.canvas_size;
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);

        if let Some(grid) = scene.grid.visible() {
            self.draw_grid(ctx, scene, grid);
        }
        if scene.show_path {
            if let Some(path) = scene.path.visible() {
                draw_path(ctx, scene, path);
            }
        }
        if scene.show_cloud {
            if let Some(points) = scene.cloud.visible() {
                ctx.set_fill_style_str(CLOUD_COLOR);
                let half = CLOUD_DOT_PX * 0.5;
                for p in points {
                    let s = scene.camera.map_to_screen(*p);
                    ctx.fill_rect(s.x - half, s.y - half, CLOUD_DOT_PX, CLOUD_DOT_PX);
                }
            }
        }
        let pulse = 1.0 + 0.15 * (1.0 + (now_ms * 2.0 * PI / 1200.0).sin()) * 0.5;
        let image = scene
            .marker_image
            .as_deref()
            .and_then(|url| self.marker_image(url));
        for layer in [&scene.goal, &scene.robot, &scene.preview] {
            if let Some(marker) = layer.visible() {
                let at = scene.camera.map_to_screen(marker.position);
                ctx.save();
                ctx.translate(at.x, at.y).ok();
                ctx.rotate(marker.rotation.to_radians()).ok();
                match &image {
                    Some(img) => draw_image_marker(ctx, img, marker.kind, scene.camera.zoom, pulse),
                    None => draw_marker(ctx, marker.kind, pulse),
                }
                ctx.restore();
            }
        }
    }

    /// The configured marker bitmap once it has loaded. Arrows are drawn
    /// until then.
    fn marker_image(&mut self, url: &str) -> Option<HtmlImageElement> {
        let stale = self
            .marker_image
            .as_ref()
            .is_none_or(|(loaded, _)| loaded != url);
        if stale {
            let img = match HtmlImageElement::new() {
                Ok(img) => img,
                Err(e) => {
                    tracing::warn!("cannot create marker image: {:?}", e);
                    return None;
                }
            };
            img.set_src(url);
            self.marker_image = Some((url.to_string(), img));
        }
        let (_, img) = self.marker_image.as_ref()?;
        (img.complete() && img.natural_width() > 0).then(|| img.clone())
    }

    fn draw_grid(&mut self, ctx: &CanvasRenderingContext2d, scene: &Scene, grid: &GridImage) {
        let stale = self
            .grid_bitmap
            .as_ref()
            .is_none_or(|(version, _)| *version != grid.version);
        if stale {
            match rasterize(grid) {
                Some(canvas) => self.grid_bitmap = Some((grid.version, canvas)),
                None => {
                    tracing::warn!("could not rasterize occupancy grid");
                    return;
                }
            }
        }
        let Some((_, bitmap)) = &self.grid_bitmap else {
            return;
        };
        let (size_x, size_y) = grid.size();
        let top_left = scene.camera.map_to_screen(crate::state::MapPoint::new(
            grid.origin.x,
            grid.origin.y + size_y,
        ));
        let zoom = scene.camera.zoom;
        ctx.set_image_smoothing_enabled(false);
        ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            bitmap,
            top_left.x,
            top_left.y,
            size_x * zoom,
            size_y * zoom,
        )
        .ok();
    }
}

fn rasterize(grid: &GridImage) -> Option<HtmlCanvasElement> {
    if grid.width == 0 || grid.height == 0 {
        return None;
    }
    let document = web_sys::window()?.document()?;
    let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
    canvas.set_width(grid.width);
    canvas.set_height(grid.height);
    let ctx = canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()?;
    let data =
        ImageData::new_with_u8_clamped_array_and_sh(Clamped(&grid.rgba), grid.width, grid.height)
            .ok()?;
    ctx.put_image_data(&data, 0.0, 0.0).ok()?;
    Some(canvas)
}

fn draw_path(ctx: &CanvasRenderingContext2d, scene: &Scene, path: &[crate::state::MapPoint]) {
    let mut points = path.iter().map(|p| scene.camera.map_to_screen(*p));
    let Some(first) = points.next() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in points {
        ctx.line_to(p.x, p.y);
    }
    ctx.set_stroke_style_str(PATH_COLOR);
    ctx.set_line_width((PATH_WIDTH_M * scene.camera.zoom).max(1.5));
    ctx.stroke();
}

fn draw_marker(ctx: &CanvasRenderingContext2d, kind: MarkerKind, pulse: f64) {
    match kind {
        MarkerKind::Robot => arrow(ctx, 20.0 * pulse, "#583c8a", "#b9a7e0"),
        MarkerKind::Orientation => arrow(ctx, 25.0, "rgba(0,255,0,0.66)", "rgba(0,120,0,0.9)"),
        MarkerKind::Goal => {
            let r = 8.0 * pulse;
            ctx.begin_path();
            ctx.arc(0.0, 0.0, r, 0.0, PI * 2.0).ok();
            ctx.set_fill_style_str("rgba(248,81,73,0.55)");
            ctx.fill();
            ctx.set_stroke_style_str("#f85149");
            ctx.set_line_width(1.5);
            ctx.stroke();
            // heading tick
            ctx.begin_path();
            ctx.move_to(0.0, 0.0);
            ctx.line_to(r * 1.8, 0.0);
            ctx.stroke();
        }
    }
}

/// Bitmap facing +x, sized in metres so it scales with the map.
fn draw_image_marker(
    ctx: &CanvasRenderingContext2d,
    img: &HtmlImageElement,
    kind: MarkerKind,
    zoom: f64,
    pulse: f64,
) {
    let style = kind.image_style();
    let side = style.size * zoom * if style.pulse { pulse } else { 1.0 };
    ctx.set_global_alpha(style.alpha);
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, -side * 0.5, -side * 0.5, side, side)
        .ok();
}

/// Arrow pointing along +x, centred on the origin.
fn arrow(ctx: &CanvasRenderingContext2d, size: f64, fill: &str, stroke: &str) {
    let half = size * 0.5;
    ctx.begin_path();
    ctx.move_to(half, 0.0);
    ctx.line_to(-half, half * 0.8);
    ctx.line_to(-half * 0.4, 0.0);
    ctx.line_to(-half, -half * 0.8);
    ctx.close_path();
    ctx.set_fill_style_str(fill);
    ctx.fill();
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(1.0);
    ctx.stroke();
}
