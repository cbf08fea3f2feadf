//! WASM bridge for OV: exposes the overlay editor core to the browser page.
//!
//! Compiled via `wasm-pack build --target web`. The page keeps drawing the
//! image and the label elements itself; it forwards DOM events here and
//! re-renders from `labels_json()` whenever a handler returns `true`.

use kurbo::{Point, Rect, Size};
use ov_core::geom::Surface;
use ov_core::id::LabelId;
use ov_core::metrics::{ApproxMetrics, TextMetrics};
use ov_core::model::{ImageSource, TextLabel};
use ov_core::session::SessionState;
use ov_editor::{ControllerConfig, EventOutcome, InputEvent, InteractionController, Modifiers};
use ov_render::font::font_from_bytes;
use ov_render::{CompositionExporter, ExportConfig, ExportError, GlyphMetrics, MemoryImageLoader};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Hit-test metrics: estimated until the page hands over the font it
/// renders with, then glyph-accurate.
enum CanvasMetrics {
    Approx(ApproxMetrics),
    Glyph(GlyphMetrics),
}

impl TextMetrics for CanvasMetrics {
    fn measure(&self, text: &str, font_size: f32) -> Size {
        match self {
            Self::Approx(m) => m.measure(text, font_size),
            Self::Glyph(m) => m.measure(text, font_size),
        }
    }
}

/// One label as the page renders it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LabelView<'a> {
    id: &'a str,
    content: &'a str,
    x: f64,
    y: f64,
    font_size: f32,
    color: String,
    text_shadow: Option<String>,
    selected: bool,
    editing: bool,
}

impl<'a> LabelView<'a> {
    fn new(label: &'a TextLabel, selected: Option<LabelId>, editing: Option<LabelId>) -> Self {
        Self {
            id: label.id.as_str(),
            content: &label.content,
            x: label.position.x,
            y: label.position.y,
            font_size: label.font_size,
            color: label.color.to_css(),
            text_shadow: label.shadow.as_ref().map(|s| s.to_css()),
            selected: selected == Some(label.id),
            editing: editing == Some(label.id),
        }
    }
}

/// The main WASM-facing editor controller.
///
/// Holds the session, the interaction state machine and the exporter. All
/// interaction from the page goes through this struct.
#[wasm_bindgen]
pub struct OverlayCanvas {
    session: SessionState,
    controller: InteractionController<CanvasMetrics>,
    exporter: CompositionExporter<MemoryImageLoader>,
}

#[wasm_bindgen]
impl OverlayCanvas {
    /// Create an editor for an image container of the given size, seeded
    /// with the welcome label.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        let mut session = SessionState::with_welcome_label();
        session.set_surface(Surface::new(width, height));
        let config = ExportConfig {
            font_paths: Vec::new(),
            ..ExportConfig::default()
        };

        Self {
            session,
            controller: InteractionController::with_metrics(
                ControllerConfig::default(),
                CanvasMetrics::Approx(ApproxMetrics),
            ),
            exporter: CompositionExporter::with_font(MemoryImageLoader::new(), config, None),
        }
    }

    /// Install the font used for export and hit testing.
    /// Returns `false` if the bytes are not a usable font.
    pub fn load_font(&mut self, bytes: Vec<u8>) -> bool {
        let Some(font) = font_from_bytes(bytes) else {
            return false;
        };
        self.controller
            .set_metrics(CanvasMetrics::Glyph(GlyphMetrics::new(font.clone())));
        self.exporter.set_font(Some(font));
        true
    }

    /// Use the image the page loaded under `handle` (e.g. an object URL) as
    /// the background. `bytes` is the encoded file.
    pub fn set_image(&mut self, handle: &str, bytes: Vec<u8>) {
        if let ImageSource::Handle(old) = self.session.image_source()
            && old != handle
        {
            let old = old.clone();
            self.exporter.loader_mut().remove(&old);
        }
        self.exporter.loader_mut().insert(handle, bytes);
        self.session
            .set_image_source(ImageSource::Handle(handle.to_string()));
    }

    /// Go back to the placeholder background.
    pub fn clear_image(&mut self) {
        if let Some(handle) = self.session.image_source().handle().map(str::to_string) {
            self.exporter.loader_mut().remove(&handle);
        }
        self.session.set_image_source(ImageSource::Default);
    }

    /// Image currently in use, or empty for the placeholder.
    pub fn image_handle(&self) -> String {
        self.session
            .image_source()
            .handle()
            .unwrap_or_default()
            .to_string()
    }

    /// Resize the image container.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.set_surface(Surface::new(width, height));
    }

    /// "Add Text" button. Returns true if the mode changed.
    pub fn add_text_mode(&mut self) -> bool {
        self.dispatch(InputEvent::EnterPlacingText, Point::ZERO).changed
    }

    // ─── Pointer events ──────────────────────────────────────────────────
    //
    // `x`/`y` are `clientX`/`clientY`; `left`/`top` come from the image
    // container's `getBoundingClientRect()`. `target_id` is the `data-id` of
    // the label element that received the event, or `undefined` when the
    // press landed on the image.

    /// Handle pointer down. Returns true if anything changed.
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        left: f64,
        top: f64,
        target_id: Option<String>,
    ) -> bool {
        let event = InputEvent::PointerDown {
            x,
            y,
            target: target_label(target_id.as_deref()),
        };
        self.dispatch(event, Point::new(left, top)).changed
    }

    /// Handle pointer move. Returns true if a label moved.
    pub fn handle_pointer_move(&mut self, x: f64, y: f64, left: f64, top: f64) -> bool {
        let event = InputEvent::pointer_move(x, y);
        self.dispatch(event, Point::new(left, top)).changed
    }

    /// Handle pointer up. Returns true if a drag ended.
    pub fn handle_pointer_up(&mut self, x: f64, y: f64, left: f64, top: f64) -> bool {
        let event = InputEvent::pointer_up(x, y);
        self.dispatch(event, Point::new(left, top)).changed
    }

    /// Handle double-click. Returns true if inline editing opened.
    pub fn handle_double_click(
        &mut self,
        x: f64,
        y: f64,
        left: f64,
        top: f64,
        target_id: Option<String>,
    ) -> bool {
        let event = InputEvent::DoubleClick {
            x,
            y,
            target: target_label(target_id.as_deref()),
        };
        self.dispatch(event, Point::new(left, top)).changed
    }

    // ─── Keyboard & inline input ─────────────────────────────────────────

    /// Handle a key press. Returns JSON `{"changed":bool,"action":string|null}`;
    /// the page runs host-level actions such as `"export"` itself.
    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> String {
        let event = InputEvent::Key {
            key: key.to_string(),
            modifiers: Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        };
        let outcome = self.dispatch(event, Point::ZERO);
        key_result_json(&outcome)
    }

    /// The inline input's value after each keystroke.
    pub fn handle_text_input(&mut self, value: &str) -> bool {
        self.dispatch(InputEvent::text(value), Point::ZERO).changed
    }

    /// The inline input lost focus.
    pub fn handle_blur(&mut self) -> bool {
        self.dispatch(InputEvent::Blur, Point::ZERO).changed
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// All labels bottom to top, as JSON for the page to render.
    pub fn labels_json(&self) -> String {
        let selected = self.session.selected();
        let editing = self.session.editing();
        let views: Vec<LabelView<'_>> = self
            .session
            .labels()
            .iter()
            .map(|label| LabelView::new(label, selected, editing))
            .collect();
        serde_json::to_string(&views).unwrap_or_else(|_| "[]".to_string())
    }

    /// `"idle"`, `"placing-text"`, `"dragging"` or `"editing"`.
    pub fn mode_name(&self) -> String {
        self.session.mode().name().to_string()
    }

    /// Selected label id, or empty string.
    pub fn selected_id(&self) -> String {
        self.session
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Label being edited, or empty string.
    pub fn editing_id(&self) -> String {
        self.session
            .editing()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Compose the background and labels into a PNG.
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.export_bytes()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Suggested download name for `export_png` output.
    pub fn export_file_name(&self) -> String {
        self.exporter.config().file_name.clone()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_busy()
    }
}

impl OverlayCanvas {
    fn dispatch(&mut self, event: InputEvent, container_origin: Point) -> EventOutcome {
        let container = Rect::from_origin_size(container_origin, self.session.surface().size());
        self.controller.handle(&mut self.session, &event, container)
    }

    fn export_bytes(&self) -> Result<Vec<u8>, ExportError> {
        self.exporter.export_session(&self.session)
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }
}

fn target_label(target_id: Option<&str>) -> Option<LabelId> {
    target_id.filter(|id| !id.is_empty()).map(LabelId::intern)
}

fn key_result_json(outcome: &EventOutcome) -> String {
    serde_json::json!({
        "changed": outcome.changed,
        "action": outcome.action.map(|a| a.name()),
    })
    .to_string()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("OV WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
