use crate::calc::{GradeScale, BUILTIN_SCALES};
use crate::input;
use crate::ipc::error::{calc_err, err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn active_json(state: &AppState) -> serde_json::Value {
    json!({
        "active": state.active_scale(),
        "source": state.active_source().as_str()
    })
}

fn handle_scale_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut result = active_json(state);
    result["builtins"] = json!(BUILTIN_SCALES);
    result["configured"] = json!({
        "name": state.config.scale.name(),
        "source": state.config.source.as_str(),
        "file": state
            .config
            .scale_file
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    });
    ok(&req.id, result)
}

fn handle_scale_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let scale = if let Some(name) = req.params.get("builtin").and_then(|v| v.as_str()) {
        match GradeScale::builtin(name) {
            Some(s) => s,
            None => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("unknown builtin scale: {}", name),
                    Some(json!({ "builtins": BUILTIN_SCALES })),
                )
            }
        }
    } else if req.params.get("bands").is_some() {
        match input::parse_scale(&req.params, "override") {
            Ok(s) => s,
            Err(e) => return calc_err(req, e),
        }
    } else {
        return err(&req.id, "bad_params", "missing builtin or bands", None);
    };

    tracing::info!(scale = %scale.name(), bands = scale.bands().len(), "scale override set");
    state.scale_override = Some(scale);
    ok(&req.id, active_json(state))
}

fn handle_scale_clear_override(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.scale_override.take().is_some() {
        tracing::info!(scale = %state.config.scale.name(), "scale override cleared");
    }
    ok(&req.id, active_json(state))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "scale.get" => Some(handle_scale_get(state, req)),
        "scale.update" => Some(handle_scale_update(state, req)),
        "scale.clearOverride" => Some(handle_scale_clear_override(state, req)),
        _ => None,
    }
}
