//! Browser entry point
//!
//! Fetches the dataset bundle relative to the page, then mounts the egui
//! app on the `canvas` element. A failed load still mounts the app so the
//! error is visible in the page, not only in the console.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::app::DashboardApp;
use crate::config::DashboardConfig;
use crate::core::{load_all, DataSource};

/// Page global overriding the dataset URL prefix.
const DATA_URL_GLOBAL: &str = "__demographics_data_url";

struct FetchSource {
    base: String,
}

impl FetchSource {
    async fn get(&self, file_name: &str) -> Result<String, JsValue> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::SameOrigin);

        let url = format!("{}/{}", self.base.trim_end_matches('/'), file_name);
        let request = Request::new_with_str_and_init(&url, &opts)?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
        }
        let text = JsFuture::from(response.text()?).await?;
        text.as_string().ok_or_else(|| JsValue::from_str("body is not text"))
    }
}

impl DataSource for FetchSource {
    async fn fetch(&self, file_name: &'static str) -> Result<String, String> {
        self.get(file_name)
            .await
            .map_err(|e| e.as_string().unwrap_or_else(|| format!("{e:?}")))
    }
}

fn data_url(default: &str) -> String {
    web_sys::window()
        .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str(DATA_URL_GLOBAL)).ok())
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| default.to_string())
}

fn canvas() -> Result<web_sys::HtmlCanvasElement, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("canvas"))
        .ok_or_else(|| JsValue::from_str("no canvas element"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str("#canvas is not a canvas element"))
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    wasm_bindgen_futures::spawn_local(async {
        let config = DashboardConfig::default();
        let source = FetchSource {
            base: data_url(&config.data_dir),
        };
        tracing::info!(base = %source.base, "Loading datasets");
        let loaded = load_all(&source).await;

        let canvas = match canvas() {
            Ok(canvas) => canvas,
            Err(e) => {
                tracing::error!(error = ?e, "Cannot mount dashboard");
                return;
            }
        };
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, loaded)))),
            )
            .await;
        if let Err(e) = started {
            tracing::error!(error = ?e, "Failed to start eframe");
        }
    });
}
