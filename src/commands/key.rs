//! API key commands. The key is kept in the local store, obfuscated but not
//! encrypted.

use super::Reply;
use crate::core_state::CoreState;
use crate::render;

pub fn set_key(state: &CoreState, key: &str, json: bool) -> Result<Reply, String> {
    let saved = state
        .orchestrator()
        .set_credential(key)
        .map_err(|e| format!("Could not save API key: {e}"))?;
    if !saved {
        return Err("API key is empty".into());
    }
    tracing::info!("API key saved");
    Ok(if json {
        Reply::ok(render::to_json(true, serde_json::json!({ "saved": true })))
    } else {
        Reply::ok("API key saved. It is stored obfuscated, not encrypted.\n")
    })
}

pub fn clear_key(state: &CoreState, json: bool) -> Result<Reply, String> {
    state
        .orchestrator()
        .forget_credential()
        .map_err(|e| format!("Could not remove API key: {e}"))?;
    tracing::info!("API key removed");
    Ok(if json {
        Reply::ok(render::to_json(true, serde_json::json!({ "saved": false })))
    } else {
        Reply::ok("API key removed.\n")
    })
}

pub fn key_status(state: &CoreState, json: bool) -> Reply {
    let saved = state.orchestrator().has_credential();
    if json {
        return Reply::ok(render::to_json(
            true,
            serde_json::json!({ "saved": saved, "data_dir": state.data_dir }),
        ));
    }
    let mut text = if saved {
        "API key: saved\n".to_string()
    } else {
        "API key: not set (run `horadric key set <KEY>` or try `horadric demo`)\n".to_string()
    };
    if let Some(dir) = &state.data_dir {
        text.push_str(&format!("Data dir: {}\n", dir.display()));
    }
    Reply::ok(text)
}
