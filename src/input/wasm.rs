use std::sync::Arc;

use anyhow::{anyhow, Result};
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{window, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent};

use super::{InputState, KeyCode};

type Listener = Closure<dyn FnMut(Event)>;

/// Forwards DOM input events into the shared [`InputState`]. Listeners are
/// removed again when the handler is dropped.
pub struct WasmInputHandler {
    listeners: Vec<(EventTarget, &'static str, Listener)>,
}

impl WasmInputHandler {
    pub fn attach(canvas: &HtmlCanvasElement, input: Arc<InputState>) -> Result<Self> {
        let window = window().ok_or_else(|| anyhow!("window not available"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("document not available"))?;
        let document: EventTarget = document.into();
        let canvas: EventTarget = canvas.clone().into();
        let window: EventTarget = window.into();

        let mut handler = Self {
            listeners: Vec::new(),
        };

        {
            let input = Arc::clone(&input);
            handler.listen(&document, "keydown", move |event| {
                if let Some(code) = event.dyn_ref::<KeyboardEvent>().and_then(map_key) {
                    input.set_key_down(code);
                }
            })?;
        }
        {
            let input = Arc::clone(&input);
            handler.listen(&document, "keyup", move |event| {
                if let Some(code) = event.dyn_ref::<KeyboardEvent>().and_then(map_key) {
                    input.set_key_up(code);
                }
            })?;
        }
        {
            let input = Arc::clone(&input);
            handler.listen(&window, "blur", move |_| input.release_all())?;
        }
        handler.listen(&canvas, "click", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                input.push_click(offset(event));
            }
        })?;

        Ok(handler)
    }

    fn listen<F>(&mut self, target: &EventTarget, kind: &'static str, callback: F) -> Result<()>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("unable to listen for {kind}: {err:?}"))?;
        self.listeners.push((target.clone(), kind, closure));
        Ok(())
    }
}

impl Drop for WasmInputHandler {
    fn drop(&mut self) {
        for (target, kind, closure) in self.listeners.drain(..) {
            let _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        }
    }
}

fn map_key(event: &KeyboardEvent) -> Option<KeyCode> {
    KeyCode::from_name(&event.key())
}

fn offset(event: &MouseEvent) -> Vec2 {
    Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
}
