//! WASM bridge for the page builder: exposes the schema engine to the
//! TypeScript canvas app and the render page.
//!
//! Compiled via `wasm-pack build --target web`. Standalone functions take and
//! return JSON strings (`{"ok":true,...}` or `{"ok":false,"error":"..."}`);
//! [`PbCanvas`] holds the editing session.

use pb_core::id::ClockIdGenerator;
use pb_core::lint::{LintDiagnostic, lint_schema};
use pb_core::transport::{DEFAULT_SCHEMA_PARAM, render_link};
use pb_core::{ComponentNode, ComponentType, NodeId, PageSchema, Position};
use pb_editor::{CommandStack, GraphMutation, LivePreview, PreviewObserver, SchemaEvent, SchemaStore};
use pb_render::page::render_page_from_query;
use pb_render::{PageOptions, RenderOptions, render_schema_html};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

/// Undo depth for one canvas session.
const UNDO_DEPTH: usize = 200;

/// The main WASM-facing canvas controller.
///
/// Holds the graph store, command stack, and live preview. All interaction
/// from the canvas app goes through this struct.
#[wasm_bindgen]
pub struct PbCanvas {
    store: SchemaStore,
    commands: CommandStack,
    preview: LivePreview,
}

#[wasm_bindgen]
impl PbCanvas {
    /// Create a canvas over an empty schema.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            store: SchemaStore::new(PageSchema::default(), Box::new(ClockIdGenerator::new())),
            commands: CommandStack::new(UNDO_DEPTH),
            preview: LivePreview::new(RenderOptions::default()),
        }
    }

    /// Replace the document with `source` after normalizing it. Not undoable.
    /// Returns `true` when the payload was already canonical.
    pub fn set_schema_json(&mut self, source: &str) -> bool {
        let canonical = PageSchema::from_json(source)
            .ok()
            .filter(|s| s.validate().is_ok());
        let was_canonical = canonical.is_some();
        let schema = match canonical {
            Some(schema) => schema,
            None => {
                let mut ids = ClockIdGenerator::new();
                pb_core::normalize_str(source, &mut ids)
            }
        };
        self.store.apply(GraphMutation::Replace {
            schema: Box::new(schema),
        });
        self.commands = CommandStack::new(UNDO_DEPTH);
        was_canonical
    }

    /// The current document as canonical JSON.
    pub fn get_schema_json(&self) -> String {
        self.store.schema().to_json()
    }

    /// Current store revision.
    pub fn revision(&self) -> f64 {
        self.store.revision() as f64
    }

    /// Call `callback(revision, structural)` after every change and on
    /// `request_refresh`.
    pub fn set_refresh_callback(&mut self, callback: js_sys::Function) {
        self.store.bus_mut().subscribe(Box::new(JsObserver { callback }));
    }

    /// Ask every subscribed preview to re-render.
    pub fn request_refresh(&mut self) {
        self.preview.invalidate();
        self.store.request_refresh();
    }

    /// Preview markup; re-rendered only when the document changed.
    pub fn preview_html(&mut self) -> String {
        self.preview.html(&mut self.store).to_string()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Add a `kind` node at `(x, y)` under `parent` (empty = unparented).
    /// Returns the new id.
    pub fn add_node(&mut self, kind: &str, parent: &str, x: f64, y: f64) -> String {
        let component = ComponentType::parse(kind);
        let id = self.store.next_id(component.as_str());
        let node = ComponentNode::new(id, component, Position::new(x, y));
        let parent = (!parent.is_empty()).then(|| NodeId::intern(parent));
        let mutation = GraphMutation::AddNode {
            node: Box::new(node),
            parent,
        };
        if self.commands.execute(&mut self.store, mutation, "Add node") {
            id.as_str().to_string()
        } else {
            String::new()
        }
    }

    pub fn remove_node(&mut self, id: &str) -> bool {
        let mutation = GraphMutation::RemoveNode { id: NodeId::intern(id) };
        self.commands.execute(&mut self.store, mutation, "Delete node")
    }

    pub fn move_node(&mut self, id: &str, dx: f64, dy: f64) -> bool {
        let mutation = GraphMutation::MoveNode { id: NodeId::intern(id), dx, dy };
        self.commands.execute(&mut self.store, mutation, "Move node")
    }

    pub fn set_label(&mut self, id: &str, label: &str) -> bool {
        let mutation = GraphMutation::SetLabel {
            id: NodeId::intern(id),
            label: label.to_string(),
        };
        self.commands.execute(&mut self.store, mutation, "Rename node")
    }

    /// Set a prop from its JSON text; anything that is not JSON is stored as
    /// a plain string.
    pub fn set_prop(&mut self, id: &str, key: &str, value: &str) -> bool {
        let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
        let mutation = GraphMutation::SetProp {
            id: NodeId::intern(id),
            key: key.to_string(),
            value,
        };
        self.commands.execute(&mut self.store, mutation, "Edit property")
    }

    pub fn remove_prop(&mut self, id: &str, key: &str) -> bool {
        let mutation = GraphMutation::RemoveProp {
            id: NodeId::intern(id),
            key: key.to_string(),
        };
        self.commands.execute(&mut self.store, mutation, "Remove property")
    }

    pub fn connect(&mut self, child: &str, parent: &str) -> bool {
        let mutation = GraphMutation::Connect {
            child: NodeId::intern(child),
            parent: NodeId::intern(parent),
        };
        self.commands.execute(&mut self.store, mutation, "Connect")
    }

    pub fn disconnect(&mut self, edge: &str) -> bool {
        let mutation = GraphMutation::Disconnect { edge: NodeId::intern(edge) };
        self.commands.execute(&mut self.store, mutation, "Disconnect")
    }

    /// Start a drag gesture; moves until `end_drag` undo as one step.
    pub fn begin_drag(&mut self) {
        self.commands.begin_batch(&self.store);
    }

    pub fn end_drag(&mut self) {
        self.commands.end_batch(&self.store, "Move node");
    }

    // ─── Undo/redo ───────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.commands.undo(&mut self.store).is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.commands.redo(&mut self.store).is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.commands.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.commands.can_redo()
    }

    // ─── Panels ──────────────────────────────────────────────────────────

    /// Diagnostics for the current document, as `lint_json` returns them.
    pub fn lint(&self) -> String {
        ok(json!({ "diagnostics": diagnostics_json(&lint_schema(self.store.schema())) }))
    }

    /// Render-page URL for the current document.
    pub fn render_link(&self, base_url: &str) -> String {
        link_json(self.store.schema(), base_url)
    }
}

impl Default for PbCanvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards schema events to a JS callback.
struct JsObserver {
    callback: js_sys::Function,
}

impl PreviewObserver for JsObserver {
    fn on_event(&mut self, event: &SchemaEvent) {
        let structural = matches!(event, SchemaEvent::Changed { structural: true, .. });
        let result = self.callback.call2(
            &JsValue::NULL,
            &JsValue::from_f64(event.revision() as f64),
            &JsValue::from_bool(structural),
        );
        if let Err(err) = result {
            log::warn!("refresh callback threw: {err:?}");
        }
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("PB WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// Normalize an untrusted (AI or pasted) payload. Never fails:
/// `{"ok":true,"schema":{...}}`.
#[wasm_bindgen]
pub fn normalize_json(source: &str) -> String {
    let schema = pb_core::normalize_str(source, &mut ClockIdGenerator::new());
    schema_json(&schema)
}

/// Deterministic fallback schema for `prompt`: `{"ok":true,"schema":{...}}`.
#[wasm_bindgen]
pub fn generate_fallback_json(prompt: &str) -> String {
    let schema = pb_core::generate(prompt, &mut ClockIdGenerator::new());
    schema_json(&schema)
}

/// Render a canonical schema to an HTML fragment: `{"ok":true,"html":"..."}`.
#[wasm_bindgen]
pub fn render_html(source: &str, compact: bool) -> String {
    let options = if compact {
        RenderOptions::compact()
    } else {
        RenderOptions::default()
    };
    match PageSchema::from_json(source) {
        Ok(schema) => ok(json!({ "html": render_schema_html(&schema, &options) })),
        Err(e) => error(&e.to_string()),
    }
}

/// The full render page for a `location.search` string. Decoding failures
/// are shown inside the page, so this is always `{"ok":true,"html":"..."}`.
#[wasm_bindgen]
pub fn render_page(query: &str) -> String {
    ok(json!({ "html": render_page_from_query(query, &PageOptions::default()) }))
}

/// Render-page URL for a canonical schema: `{"ok":true,"url":"..."}`.
#[wasm_bindgen]
pub fn encode_render_link(source: &str, base_url: &str) -> String {
    match PageSchema::from_json(source) {
        Ok(schema) => link_json(&schema, base_url),
        Err(e) => error(&e.to_string()),
    }
}

/// Lint a canonical schema: `{"ok":true,"diagnostics":[...]}`.
#[wasm_bindgen]
pub fn lint_json(source: &str) -> String {
    match PageSchema::from_json(source) {
        Ok(schema) => ok(json!({ "diagnostics": diagnostics_json(&lint_schema(&schema)) })),
        Err(e) => error(&e.to_string()),
    }
}

/// Strict canonical check: `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(source: &str) -> String {
    let checked = PageSchema::from_json(source)
        .map_err(|e| e.to_string())
        .and_then(|schema| schema.validate().map_err(|e| e.to_string()));
    match checked {
        Ok(()) => ok(json!({})),
        Err(e) => error(&e),
    }
}

fn schema_json(schema: &PageSchema) -> String {
    match serde_json::to_value(schema) {
        Ok(value) => ok(json!({ "schema": value })),
        Err(e) => error(&format!("Serialization error: {e}")),
    }
}

fn link_json(schema: &PageSchema, base_url: &str) -> String {
    match render_link(base_url, schema, DEFAULT_SCHEMA_PARAM) {
        Ok(url) => ok(json!({ "url": url.as_str() })),
        Err(e) => error(&format!("invalid base URL: {e}")),
    }
}

fn diagnostics_json(diagnostics: &[LintDiagnostic]) -> Value {
    diagnostics
        .iter()
        .map(|d| {
            json!({
                "nodeId": d.node_id.as_str(),
                "message": d.message,
                "severity": d.severity.as_str(),
                "rule": d.rule,
            })
        })
        .collect()
}

/// `{"ok":true, ...fields}`.
fn ok(fields: Value) -> String {
    let mut body = json!({ "ok": true });
    if let (Some(body), Value::Object(fields)) = (body.as_object_mut(), fields) {
        body.extend(fields);
    }
    body.to_string()
}

fn error(message: &str) -> String {
    json!({ "ok": false, "error": message }).to_string()
}
