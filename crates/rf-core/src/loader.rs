//! Generic JSON/YAML catalog loader
//!
//! Mirrors the `rf-slot-lab` GDD-parser convention: deserialize into the
//! data model, then let the caller apply its own invariant checks. This
//! module only knows how to get bytes off disk into a `T`; it does not know
//! what makes a machine or player record valid.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{CoreError, CoreResult};

/// Load a single JSON or YAML document into `T`, dispatching on extension.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let raw = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&raw)?),
        Some("yaml") | Some("yml") => Ok(serde_yml::from_str(&raw)?),
        other => Err(CoreError::UnsupportedExtension(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}
