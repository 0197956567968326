//! Process-wide registry for preconfigured HTTP clients.
//!
//! Callers that need custom TLS roots, proxies, or connection tuning build
//! their own `reqwest::Client`, register it under a name, and refer to it
//! with [`TrinoClientBuilder::custom_client`](crate::client::TrinoClientBuilder::custom_client).
//! Lookups are frequent and concurrent, registrations rare, so the index is
//! guarded by a read/write lock.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::error::{Result, TrinoLinkError};

static REGISTRY: OnceLock<RwLock<HashMap<String, reqwest::Client>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<String, reqwest::Client>> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Boolean-looking keys would be ambiguous in configuration strings.
fn is_reserved(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "1" | "t" | "true" | "0" | "f" | "false"
    )
}

/// Associate a client with a key in the process-wide registry.
pub fn register_custom_client(key: &str, client: reqwest::Client) -> Result<()> {
    if is_reserved(key) {
        return Err(TrinoLinkError::Configuration(format!(
            "custom client key {:?} is reserved",
            key
        )));
    }
    registry()
        .write()
        .expect("custom client registry poisoned")
        .insert(key.to_string(), client);
    Ok(())
}

/// Remove the client associated with the key, if any.
pub fn deregister_custom_client(key: &str) {
    registry()
        .write()
        .expect("custom client registry poisoned")
        .remove(key);
}

pub(crate) fn custom_client(key: &str) -> Option<reqwest::Client> {
    registry()
        .read()
        .expect("custom client registry poisoned")
        .get(key)
        .cloned()
}
