//! WASM bindings for the cayley-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Everything crosses the boundary as JSON strings; failures come back as a
//! scene whose `error` field is set, and are also logged to the console.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::EngineConfig;
use crate::error::CayleyError;
use crate::layout::{Bounds, LayoutKind};
use crate::output::SceneOutput;
use crate::scene::{CayleyView, PointerEvent};
use crate::view::{PanZoomDelta, ViewPoint};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
}

fn scene_json(scene: &SceneOutput) -> String {
    serde_json::to_string(scene).unwrap_or_else(|e| {
        console_error(&format!("Error serializing scene: {e}"));
        r#"{"error":{"message":"serialization failed","kind":"config"}}"#.to_string()
    })
}

fn error_json(err: &CayleyError) -> String {
    console_error(&format!("Error: {err}"));
    scene_json(&SceneOutput::from_error(err))
}

/// One-shot layout: config in, final scene out. The force strategy is run to
/// settlement before returning.
#[wasm_bindgen]
pub fn layout_json(config_json: &str) -> String {
    match CayleyView::from_json(config_json) {
        Ok(mut view) => {
            view.settle();
            scene_json(&view.scene())
        }
        Err(e) => error_json(&e),
    }
}

/// requestAnimationFrame loop that ticks the view and hands each frame's scene
/// to a JS callback. Stops by itself once the simulation ends; dropping it
/// cancels the pending frame.
struct FrameLoop {
    handle: Rc<Cell<Option<i32>>>,
    closure: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
}

impl FrameLoop {
    fn start(view: Rc<RefCell<CayleyView>>, on_frame: js_sys::Function) -> Option<FrameLoop> {
        let window = web_sys::window()?;
        let handle = Rc::new(Cell::new(None));
        let closure: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

        let next = Rc::clone(&closure);
        let pending = Rc::clone(&handle);
        let frame_window = window.clone();
        *closure.borrow_mut() = Some(Closure::new(move || {
            pending.set(None);
            let (outcome, json) = {
                let mut view = view.borrow_mut();
                let outcome = view.tick();
                (outcome, scene_json(&view.scene()))
            };
            if let Err(e) = on_frame.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                console_error(&format!("Error in frame callback: {e:?}"));
            }
            if outcome.is_running() {
                if let Some(cb) = next.borrow().as_ref() {
                    pending.set(frame_window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
                }
            }
        }));

        let first = closure
            .borrow()
            .as_ref()
            .and_then(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
        handle.set(first);
        Some(FrameLoop { handle, closure })
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        if let (Some(id), Some(window)) = (self.handle.take(), web_sys::window()) {
            if let Err(e) = window.cancel_animation_frame(id) {
                console_error(&format!("Error cancelling animation frame: {e:?}"));
            }
        }
        // breaks the closure's reference back to its own slot
        if let Ok(mut slot) = self.closure.try_borrow_mut() {
            slot.take();
        }
    }
}

/// A live view held on the JS side. Every method returns the resulting scene
/// as JSON.
#[wasm_bindgen]
pub struct CayleyScene {
    view: Rc<RefCell<CayleyView>>,
    on_frame: Option<js_sys::Function>,
    frames: Option<FrameLoop>,
}

#[wasm_bindgen]
impl CayleyScene {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<CayleyScene, JsValue> {
        let view = CayleyView::from_json(config_json).map_err(|e| {
            console_error(&format!("Error creating scene: {e}"));
            JsValue::from_str(&e.to_string())
        })?;
        Ok(CayleyScene {
            view: Rc::new(RefCell::new(view)),
            on_frame: None,
            frames: None,
        })
    }

    /// Register the per-frame callback. While the force strategy runs it is
    /// called once per animation frame with the scene JSON.
    pub fn on_frame(&mut self, callback: js_sys::Function) {
        self.on_frame = Some(callback);
        self.restart_frames();
    }

    pub fn scene(&self) -> String {
        scene_json(&self.view.borrow().scene())
    }

    /// Advance the simulation by hand, for callers that drive their own loop.
    pub fn tick(&mut self) -> String {
        let mut view = self.view.borrow_mut();
        view.tick();
        scene_json(&view.scene())
    }

    pub fn set_strategy(&mut self, name: &str) -> String {
        match name.parse::<LayoutKind>() {
            Ok(kind) => self.update(|view| view.set_strategy(kind)),
            Err(e) => error_json(&e),
        }
    }

    pub fn set_bounds(&mut self, width: f64, height: f64) -> String {
        self.update(|view| {
            let bounds = Bounds::new(width, height)?;
            view.set_bounds(bounds)
        })
    }

    pub fn set_depth(&mut self, depth: i32) -> String {
        self.update(|view| {
            let config = EngineConfig { depth: i64::from(depth), ..view.config().clone() };
            view.reconfigure(config)
        })
    }

    pub fn configure(&mut self, config_json: &str) -> String {
        self.update(|view| view.reconfigure(EngineConfig::from_json(config_json)?))
    }

    pub fn pointer(&mut self, event_json: &str) -> String {
        let event: PointerEvent = match serde_json::from_str(event_json) {
            Ok(event) => event,
            Err(e) => return error_json(&CayleyError::from(e)),
        };
        let mut view = self.view.borrow_mut();
        match view.handle_pointer(event) {
            Ok(()) => scene_json(&view.scene()),
            Err(e) => error_json(&e),
        }
    }

    pub fn pan_zoom(&mut self, dx: f64, dy: f64, zoom: f64, anchor_x: Option<f64>, anchor_y: Option<f64>) -> String {
        let anchor = anchor_x.zip(anchor_y).map(|(x, y)| ViewPoint { x, y });
        let mut view = self.view.borrow_mut();
        match view.pan_zoom(PanZoomDelta { dx, dy, zoom, anchor }) {
            Ok(()) => scene_json(&view.scene()),
            Err(e) => error_json(&e),
        }
    }

    pub fn reset_view(&mut self) -> String {
        let mut view = self.view.borrow_mut();
        view.reset_view();
        scene_json(&view.scene())
    }
}

impl CayleyScene {
    /// Relayout through `f`. The frame loop is torn down first so no frame
    /// from the old run can land after the new layout.
    fn update(&mut self, f: impl FnOnce(&mut CayleyView) -> crate::error::Result<()>) -> String {
        self.frames = None;
        let result = f(&mut self.view.borrow_mut());
        self.restart_frames();
        match result {
            Ok(()) => self.scene(),
            Err(e) => error_json(&e),
        }
    }

    fn restart_frames(&mut self) {
        self.frames = None;
        if !self.view.borrow().is_animating() {
            return;
        }
        if let Some(callback) = &self.on_frame {
            self.frames = FrameLoop::start(Rc::clone(&self.view), callback.clone());
        }
    }
}
