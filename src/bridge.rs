//! FILENAME: src/bridge.rs
// PURPOSE: Capability bridge between the sandboxed webview and the backend.
// CONTEXT: The webview cannot touch host facilities directly. It gets exactly
//          four operations: three asynchronous delegations routed by channel
//          name to privileged handlers, plus one synchronous version read.

use std::collections::HashMap;

use serde_json::Value;
use tauri::State;

use crate::log_debug;

/// Channel routing a ticket payload to the printing handler.
pub const CHANNEL_PRINT_TICKET: &str = "print-ticket";
/// Channel routing an export payload to the data transfer handler.
pub const CHANNEL_EXPORT_DATA: &str = "export-data";
/// Channel requesting the latest snapshot from the data transfer handler.
pub const CHANNEL_IMPORT_DATA: &str = "import-data";

/// A privileged handler behind a named channel. `None` means the request
/// carries no payload (import). The handler owns payload validation; the
/// bridge forwards whatever it is given.
pub type ChannelHandler = Box<dyn Fn(Option<Value>) -> Result<Value, String> + Send + Sync>;

/// The explicit bridge surface. Built once during app setup and managed as
/// Tauri state; nothing else is reachable from the webview.
pub struct Bridge {
    handlers: HashMap<&'static str, ChannelHandler>,
    app_version: String,
}

impl Bridge {
    /// Create an empty bridge carrying the host application version.
    pub fn new(app_version: impl Into<String>) -> Self {
        Bridge {
            handlers: HashMap::new(),
            app_version: app_version.into(),
        }
    }

    /// Register the handler for a named channel. Each channel is registered
    /// exactly once, at setup time.
    pub fn register(
        &mut self,
        channel: &'static str,
        handler: ChannelHandler,
    ) -> Result<(), String> {
        if self.handlers.contains_key(channel) {
            return Err(format!("Channel '{}' already registered", channel));
        }
        self.handlers.insert(channel, handler);
        Ok(())
    }

    /// Route a request to the handler registered for `channel`. The payload
    /// goes through untouched and the handler's result (or failure) comes
    /// back untouched.
    fn dispatch(&self, channel: &str, payload: Option<Value>) -> Result<Value, String> {
        let handler = self
            .handlers
            .get(channel)
            .ok_or_else(|| format!("No handler registered for channel '{}'", channel))?;
        log_debug!("BRIDGE", "dispatch channel={}", channel);
        handler(payload)
    }

    /// Forward a ticket payload to the `print-ticket` handler.
    pub fn print_ticket(&self, ticket_data: Value) -> Result<Value, String> {
        self.dispatch(CHANNEL_PRINT_TICKET, Some(ticket_data))
    }

    /// Forward an export payload to the `export-data` handler.
    pub fn export_data(&self, data: Value) -> Result<Value, String> {
        self.dispatch(CHANNEL_EXPORT_DATA, Some(data))
    }

    /// Issue a zero-payload request on the `import-data` channel.
    pub fn import_data(&self) -> Result<Value, String> {
        self.dispatch(CHANNEL_IMPORT_DATA, None)
    }

    /// The host application version, read directly from registration-time
    /// metadata. Synchronous on purpose: this never goes through dispatch.
    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    /// The channels this bridge can reach, sorted by name.
    pub fn channels(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

// ============================================================================
// TAURI COMMANDS (the webview-facing surface)
// ============================================================================

#[tauri::command]
pub async fn print_ticket(
    bridge: State<'_, Bridge>,
    ticket_data: Value,
) -> Result<Value, String> {
    bridge.print_ticket(ticket_data)
}

#[tauri::command]
pub async fn export_data(bridge: State<'_, Bridge>, data: Value) -> Result<Value, String> {
    bridge.export_data(data)
}

#[tauri::command]
pub async fn import_data(bridge: State<'_, Bridge>) -> Result<Value, String> {
    bridge.import_data()
}

/// Synchronous by contract: callers rely on the version being available
/// without a round trip through a channel handler.
#[tauri::command]
pub fn get_app_version(bridge: State<'_, Bridge>) -> String {
    bridge.app_version().to_string()
}
