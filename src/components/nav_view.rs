use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
    WheelEvent,
};
use yew::prelude::*;

use crate::context::Console;
use crate::scene::render::Renderer;
use crate::state::{PointerEvent, ScreenPoint, TeleopState};

#[derive(Properties, PartialEq, Clone)]
pub struct NavViewProps {
    /// Fired whenever the held keys or speed level change.
    pub on_teleop: Callback<TeleopState>,
}

fn canvas_point(canvas: &HtmlCanvasElement, e: &MouseEvent) -> ScreenPoint {
    let rect = canvas.get_bounding_client_rect();
    ScreenPoint::new(
        e.client_x() as f64 - rect.left(),
        e.client_y() as f64 - rect.top(),
    )
}

#[function_component(NavView)]
pub fn nav_view(props: &NavViewProps) -> Html {
    let canvas_ref = use_node_ref();
    let console = use_context::<Console>();
    {
        let canvas_ref = canvas_ref.clone();
        let on_teleop = props.on_teleop.clone();
        use_effect_with((), move |_| {
            let cleanup = match (canvas_ref.cast::<HtmlCanvasElement>(), console) {
                (Some(canvas), Some(console)) => mount(canvas, console, on_teleop),
                _ => None,
            };
            if cleanup.is_none() {
                tracing::error!("map view could not attach to its canvas");
            }
            move || {
                if let Some(cleanup) = cleanup {
                    cleanup();
                }
            }
        });
    }
    html! {
        <canvas ref={canvas_ref} id="map-canvas" style="display:block; width:100%; height:100%; cursor:crosshair;"></canvas>
    }
}

/// Wire the canvas and window listeners, start the frame loop and the
/// teleop interval. Returns the teardown.
fn mount(
    canvas: HtmlCanvasElement,
    console: Console,
    on_teleop: Callback<TeleopState>,
) -> Option<impl FnOnce()> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
    let scene = console.ctx.scene.clone();
    let navigator = console.navigator.clone();
    let controller = console.controller.clone();

    let compute_and_apply_canvas_size = {
        let canvas = canvas.clone();
        let document = document.clone();
        let window = window.clone();
        let scene = scene.clone();
        move || {
            let bar_height: f64 = document
                .get_element_by_id("top-bar")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                .map(|el| el.client_height() as f64)
                .unwrap_or(0.0);
            let width = window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(800.0);
            let height = window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(600.0)
                - bar_height;
            canvas.set_width(width.max(0.0) as u32);
            canvas.set_height(height.max(0.0) as u32);
            scene.borrow_mut().canvas_size = (canvas.width() as f64, canvas.height() as f64);
        }
    };
    compute_and_apply_canvas_size();
    {
        // a map that arrived before the canvas existed was fitted to the default size
        let mut s = scene.borrow_mut();
        if s.camera.initialized {
            s.fit_to_grid();
        }
    }

    // RAF loop
    let raf_id = Rc::new(Cell::new(None));
    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    {
        let frame_loop = frame.clone();
        let raf_id = raf_id.clone();
        let window_loop = window.clone();
        let scene = scene.clone();
        let mut renderer = Renderer::default();
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            renderer.draw(&ctx, &scene.borrow(), now);
            if let Some(cb) = frame_loop.borrow().as_ref() {
                if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    raf_id.set(Some(id));
                }
            }
        }) as Box<dyn FnMut(f64)>));
    }
    if let Some(cb) = frame.borrow().as_ref() {
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            raf_id.set(Some(id));
        }
    }

    // Teleop interval
    let teleop_tick = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move || {
            controller.borrow_mut().tick();
        }) as Box<dyn FnMut()>)
    };
    let period_ms = 1000 / console.ctx.config.teleop.rate_hz.max(1) as i32;
    let teleop_tick_id = window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            teleop_tick.as_ref().unchecked_ref(),
            period_ms,
        )
        .ok()?;

    // Wheel zoom
    let wheel_cb = {
        let scene = scene.clone();
        let canvas_w = canvas.clone();
        Closure::wrap(Box::new(move |e: WheelEvent| {
            e.prevent_default();
            let at = canvas_point(&canvas_w, &e);
            scene.borrow_mut().camera.zoom_at(at, e.delta_y());
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("wheel", wheel_cb.as_ref().unchecked_ref())
        .ok()?;

    let mousedown_cb = {
        let scene = scene.clone();
        let navigator = navigator.clone();
        let canvas_m = canvas.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            if e.button() == 0 {
                let at = canvas_point(&canvas_m, &e);
                navigator.borrow_mut().dispatch(PointerEvent::Down(at));
            } else {
                scene
                    .borrow_mut()
                    .camera
                    .begin_pan(e.client_x() as f64, e.client_y() as f64);
            }
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("mousedown", mousedown_cb.as_ref().unchecked_ref())
        .ok()?;

    let mousemove_cb = {
        let scene = scene.clone();
        let navigator = navigator.clone();
        let canvas_m = canvas.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            let panning = scene.borrow().camera.panning;
            if panning {
                scene
                    .borrow_mut()
                    .camera
                    .pan_to(e.client_x() as f64, e.client_y() as f64);
            } else {
                let at = canvas_point(&canvas_m, &e);
                navigator.borrow_mut().dispatch(PointerEvent::Move(at));
            }
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("mousemove", mousemove_cb.as_ref().unchecked_ref())
        .ok()?;

    let mouseup_cb = {
        let scene = scene.clone();
        let navigator = navigator.clone();
        let canvas_m = canvas.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            scene.borrow_mut().camera.panning = false;
            if e.button() == 0 {
                let at = canvas_point(&canvas_m, &e);
                navigator.borrow_mut().dispatch(PointerEvent::Up(at));
            }
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("mouseup", mouseup_cb.as_ref().unchecked_ref())
        .ok()?;

    let dblclick_cb = {
        let navigator = navigator.clone();
        let canvas_m = canvas.clone();
        Closure::wrap(Box::new(move |e: MouseEvent| {
            let at = canvas_point(&canvas_m, &e);
            navigator.borrow_mut().dispatch(PointerEvent::DoubleClick(at));
        }) as Box<dyn FnMut(_)>)
    };
    canvas
        .add_event_listener_with_callback("dblclick", dblclick_cb.as_ref().unchecked_ref())
        .ok()?;

    let contextmenu_cb = Closure::wrap(Box::new(move |e: web_sys::Event| {
        e.prevent_default();
    }) as Box<dyn FnMut(_)>);
    canvas
        .add_event_listener_with_callback("contextmenu", contextmenu_cb.as_ref().unchecked_ref())
        .ok()?;

    let resize_cb = {
        let compute_and_apply_canvas_size = compute_and_apply_canvas_size.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            compute_and_apply_canvas_size();
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
        .ok()?;

    // Keyboard driving
    let keydown_cb = {
        let controller = controller.clone();
        let on_teleop = on_teleop.clone();
        Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let key = e.key();
            if key.starts_with("Arrow") {
                e.prevent_default();
            }
            if e.repeat() {
                return;
            }
            let changed = {
                let mut c = controller.borrow_mut();
                c.key_down(&key).then(|| c.state().clone())
            };
            if let Some(state) = changed {
                on_teleop.emit(state);
            }
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
        .ok()?;

    let keyup_cb = {
        let controller = controller.clone();
        let on_teleop = on_teleop.clone();
        Closure::wrap(Box::new(move |e: KeyboardEvent| {
            let changed = {
                let mut c = controller.borrow_mut();
                c.key_up(&e.key()).then(|| c.state().clone())
            };
            if let Some(state) = changed {
                on_teleop.emit(state);
            }
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("keyup", keyup_cb.as_ref().unchecked_ref())
        .ok()?;

    // keyup never arrives for keys released while the page is unfocused
    let blur_cb = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |_e: web_sys::Event| {
            let state = {
                let mut c = controller.borrow_mut();
                c.release_all();
                c.state().clone()
            };
            on_teleop.emit(state);
        }) as Box<dyn FnMut(_)>)
    };
    window
        .add_event_listener_with_callback("blur", blur_cb.as_ref().unchecked_ref())
        .ok()?;

    // Cleanup
    Some(move || {
        let _ = canvas.remove_event_listener_with_callback(
            "wheel",
            wheel_cb.as_ref().unchecked_ref(),
        );
        let _ = canvas.remove_event_listener_with_callback(
            "mousedown",
            mousedown_cb.as_ref().unchecked_ref(),
        );
        let _ = canvas.remove_event_listener_with_callback(
            "mousemove",
            mousemove_cb.as_ref().unchecked_ref(),
        );
        let _ = canvas.remove_event_listener_with_callback(
            "dblclick",
            dblclick_cb.as_ref().unchecked_ref(),
        );
        let _ = canvas.remove_event_listener_with_callback(
            "contextmenu",
            contextmenu_cb.as_ref().unchecked_ref(),
        );
        for (event, cb) in [
            ("mouseup", mouseup_cb.as_ref()),
            ("resize", resize_cb.as_ref()),
            ("keydown", keydown_cb.as_ref()),
            ("keyup", keyup_cb.as_ref()),
            ("blur", blur_cb.as_ref()),
        ] {
            let _ = window.remove_event_listener_with_callback(event, cb.unchecked_ref());
        }
        window.clear_interval_with_handle(teleop_tick_id);
        if let Some(id) = raf_id.get() {
            let _ = window.cancel_animation_frame(id);
        }
        frame.borrow_mut().take();
        drop(teleop_tick);
    })
}
