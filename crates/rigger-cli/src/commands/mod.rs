pub mod completions;
pub mod parse;
pub mod render;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;
pub const EXIT_RENDER_ERROR: u8 = 3;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn yaml(value: &impl serde::Serialize) -> Result<String, String> {
    serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
}

/// Pick the process exit code for an error message returned by a command.
pub fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("parsing deployment manifest") {
        EXIT_MANIFEST_ERROR
    } else if msg.starts_with("rendering ") {
        EXIT_RENDER_ERROR
    } else {
        EXIT_FAILURE
    }
}
