//! FILENAME: src/lib.rs
// PURPOSE: Main library entry point (Tauri bridge assembly).
// CONTEXT: The webview reaches the backend only through the capability
//          bridge; the bridge is assembled and registered once during setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tauri::Manager;

pub mod bridge;
pub mod logging;
pub mod printing;
pub mod transfer;

pub use bridge::{
    Bridge, ChannelHandler, CHANNEL_EXPORT_DATA, CHANNEL_IMPORT_DATA, CHANNEL_PRINT_TICKET,
};
pub use logging::{get_log_path, init_log_file, next_seq, write_log};
pub use printing::{format_amount, parse_ticket, render_ticket, Spooler, Ticket, TicketItem};
pub use transfer::ExportStore;

#[cfg(test)]
mod tests;

// ============================================================================
// BRIDGE ASSEMBLY
// ============================================================================

/// Assemble the capability bridge: wire the privileged handlers to their
/// channels and capture the host application version. Called exactly once,
/// during Tauri setup.
pub fn create_bridge(app_version: String, data_dir: &Path) -> Result<Bridge, String> {
    log_info!("SYS", "Assembling capability bridge, data_dir={:?}", data_dir);

    let spooler = printing::Spooler::new(data_dir.join("tickets"))?;
    let store = Arc::new(transfer::ExportStore::new(data_dir.join("exports"))?);

    let mut bridge = Bridge::new(app_version);

    bridge.register(
        CHANNEL_PRINT_TICKET,
        Box::new(move |payload| {
            let payload = payload.ok_or_else(|| "print-ticket requires a payload".to_string())?;
            spooler.print(&payload)
        }),
    )?;

    let export_store = Arc::clone(&store);
    bridge.register(
        CHANNEL_EXPORT_DATA,
        Box::new(move |payload| {
            let payload = payload.ok_or_else(|| "export-data requires a payload".to_string())?;
            export_store.export(&payload)
        }),
    )?;

    bridge.register(CHANNEL_IMPORT_DATA, Box::new(move |_| store.import()))?;

    Ok(bridge)
}

/// Highest sequence suffix among `<prefix>*-NNNNN<suffix>` files already in
/// `dir`. Spool and export counters continue from here, so a restarted
/// process never reuses a name from an earlier run.
pub(crate) fn highest_file_seq(dir: &Path, prefix: &str, suffix: &str) -> u64 {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter_map(|name| {
            let stem = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
            stem.rsplit('-').next()?.parse::<u64>().ok()
        })
        .max()
        .unwrap_or(0)
}

/// Resolve the directory holding the log file, ticket spool and export
/// snapshots. Environment override first, then next to the executable,
/// then the current directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CO_CAISSE_DATA") {
        return PathBuf::from(dir);
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            return parent.join("co-caisse-data");
        }
    }

    std::env::current_dir()
        .map(|cwd| cwd.join("co-caisse-data"))
        .unwrap_or_else(|_| PathBuf::from("co-caisse-data"))
}

// ============================================================================
// TAURI APP ENTRY
// ============================================================================

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let data_dir = resolve_data_dir();

    match logging::init_log_file(&data_dir) {
        Ok(path) => {
            log_info!("SYS", "Co-Caisse backend starting, log={}", path.display());
        }
        Err(e) => {
            eprintln!("[LOG_INIT] FAILED: {}", e);
            eprintln!("[LOG_INIT] Continuing with console-only logging");
        }
    }

    tauri::Builder::default()
        .setup(move |app| {
            let version = app.package_info().version.to_string();
            let bridge = create_bridge(version, &data_dir)?;
            app.manage(bridge);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            bridge::print_ticket,
            bridge::export_data,
            bridge::import_data,
            bridge::get_app_version,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
