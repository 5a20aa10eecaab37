//! Shared configuration paths.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.dnd-responder/`:
//!
//! ```text
//! ~/.dnd-responder/
//! ├── config/       # .env.local and google_token.json
//! └── state/        # whitelist.json, markers.json
//! ```
//!
//! # Environment Variables
//!
//! - `RESPONDER_STATE_DIR`: Override the base state directory

use std::path::PathBuf;
use std::sync::OnceLock;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "RESPONDER_STATE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".dnd-responder";

const CONFIG_SUBDIR: &str = "config";
const STATE_SUBDIR: &str = "state";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the base state directory.
///
/// Determined by:
/// 1. `RESPONDER_STATE_DIR` environment variable if set
/// 2. `~/.dnd-responder` if home directory is available
/// 3. `.dnd-responder` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the user config directory.
pub fn config_dir() -> PathBuf {
    state_dir().join(CONFIG_SUBDIR)
}

/// Get the runtime state directory.
pub fn runtime_state_dir() -> PathBuf {
    state_dir().join(STATE_SUBDIR)
}

/// Get the `.env.local` file path (API keys, tokens).
pub fn env_file() -> PathBuf {
    config_dir().join(".env.local")
}

/// Get the Google Calendar token file path.
pub fn google_token_file() -> PathBuf {
    config_dir().join("google_token.json")
}

/// Get the default whitelist file path.
pub fn whitelist_file() -> PathBuf {
    runtime_state_dir().join("whitelist.json")
}

/// Get the source marker file path.
pub fn markers_file() -> PathBuf {
    runtime_state_dir().join("markers.json")
}

/// Ensure the config and state directories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(config_dir())?;
    std::fs::create_dir_all(runtime_state_dir())?;
    Ok(())
}
