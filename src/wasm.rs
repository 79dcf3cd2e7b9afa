#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, HtmlCanvasElement, Response};

use crate::input::wasm::WasmInputHandler;
use crate::viewport::SharedViewport;
use crate::{GameData, GameSession, InputState};

#[wasm_bindgen(start)]
pub fn init_logging() {
    console_error_panic_hook::set_once();
}

/// Browser entry point. The host creates it with [`WasmGame::load`] and
/// draws the render commands handed to the `on_frame` callback.
#[wasm_bindgen]
pub struct WasmGame {
    inner: Rc<RefCell<AppState>>,
    frame_callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Fetches game data from `data_url` and builds the scene. There is no
    /// retry or timeout: an unreachable service leaves the promise pending
    /// or rejected.
    pub async fn load(canvas_id: String, data_url: String) -> Result<WasmGame, JsValue> {
        let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("document not available"))?;
        let canvas = document
            .get_element_by_id(&canvas_id)
            .ok_or_else(|| JsValue::from_str("canvas element not found"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("element is not a canvas"))?;

        let data = fetch_game_data(&data_url).await?;
        log_to_console(&format!(
            "Loaded {} character(s) and {} dimension(s)",
            data.characters.len(),
            data.dimensions.len()
        ));

        let viewport = Arc::new(SharedViewport::new(canvas.width(), canvas.height()));
        let input = Arc::new(InputState::new());
        let input_handler = WasmInputHandler::attach(&canvas, Arc::clone(&input))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let session = GameSession::new(data, viewport.clone());

        let state = AppState {
            session,
            input,
            viewport,
            canvas,
            _input_handler: input_handler,
            on_frame: None,
            last_timestamp: None,
            running: false,
        };

        Ok(Self {
            inner: Rc::new(RefCell::new(state)),
            frame_callback: Rc::new(RefCell::new(None)),
        })
    }

    /// Starts the `requestAnimationFrame` loop. `on_frame` receives each
    /// frame's render command as a JSON string.
    pub fn start(&self, on_frame: js_sys::Function) -> Result<(), JsValue> {
        {
            let mut state = self.inner.borrow_mut();
            state.on_frame = Some(on_frame);
            if state.running {
                return Ok(());
            }
            state.running = true;
            state.last_timestamp = None;
        }
        schedule_animation_loop(Rc::clone(&self.inner), Rc::clone(&self.frame_callback))
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    /// Stops scheduling new frames after the current one.
    pub fn stop(&self) {
        self.inner.borrow_mut().running = false;
    }
}

struct AppState {
    session: GameSession,
    input: Arc<InputState>,
    viewport: Arc<SharedViewport>,
    canvas: HtmlCanvasElement,
    _input_handler: WasmInputHandler,
    on_frame: Option<js_sys::Function>,
    last_timestamp: Option<f64>,
    running: bool,
}

impl AppState {
    fn frame(&mut self, timestamp: f64) -> Result<()> {
        let dt = self
            .last_timestamp
            .map(|last| ((timestamp - last) / 1000.0) as f32)
            .unwrap_or(0.0);
        self.last_timestamp = Some(timestamp);
        self.viewport
            .update(self.canvas.client_width() as u32, self.canvas.client_height() as u32);

        let command = self.session.update(dt, &self.input.snapshot());

        for click in self.input.drain_clicks() {
            if let Some(hit) = self.session.click(click) {
                log_to_console(&format!("Clicked on: {}", hit.name));
            }
        }

        if let Some(on_frame) = &self.on_frame {
            let json = command.to_json()?;
            on_frame
                .call1(&JsValue::NULL, &JsValue::from_str(&json))
                .map_err(|err| anyhow!("frame callback failed: {err:?}"))?;
        }
        Ok(())
    }
}

fn schedule_animation_loop(
    app: Rc<RefCell<AppState>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
) -> Result<()> {
    let window = window().ok_or_else(|| anyhow!("window not available"))?;
    let next = Rc::clone(&callback);

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        {
            let mut state = app.borrow_mut();
            if !state.running {
                return;
            }
            if let Err(err) = state.frame(timestamp) {
                web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
            }
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Some(closure) = next.borrow().as_ref() {
            if let Err(err) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
                web_sys::console::error_1(&err);
            }
        }
    }) as Box<dyn FnMut(f64)>));

    let scheduled = callback.borrow();
    let closure = scheduled
        .as_ref()
        .ok_or_else(|| anyhow!("animation callback missing"))?;
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
    Ok(())
}

async fn fetch_game_data(url: &str) -> Result<GameData, JsValue> {
    let window = window().ok_or_else(|| JsValue::from_str("window not available"))?;
    let response = JsFuture::from(window.fetch_with_str(url)).await?;
    let response: Response = response.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "GET {url} failed with status {}",
            response.status()
        )));
    }
    let body = JsFuture::from(response.text()?).await?;
    let body = body
        .as_string()
        .ok_or_else(|| JsValue::from_str("game data response is not text"))?;
    GameData::from_json(&body).map_err(|err| JsValue::from_str(&format!("{err:#}")))
}

fn log_to_console(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
