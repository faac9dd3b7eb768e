pub mod classes;
pub mod core;
pub mod dashboard;
pub mod grades;
pub mod students;

use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::store::Store;

/// Shared params helpers. Required-field presence is enforced here, at
/// the request boundary; the store itself validates nothing.
pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{} must not be empty", key),
            None,
        )),
        None => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

pub fn optional_str(req: &Request, key: &str) -> String {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

pub fn required_f64(req: &Request, key: &str) -> Result<f64, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn store_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut Store, serde_json::Value> {
    state
        .store
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn store_ref<'a>(state: &'a AppState, req: &Request) -> Result<&'a Store, serde_json::Value> {
    state
        .store
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}
