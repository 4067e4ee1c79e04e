//! FILENAME: src/printing.rs
// PURPOSE: Privileged handler behind the "print-ticket" channel.
// CONTEXT: Renders an opaque ticket payload into a fixed-width receipt and
//          spools it to disk. Payload validation happens here, not in the
//          bridge: the bridge forwards whatever the webview sent.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::log_info;

/// Receipt width in characters (standard 80mm thermal roll).
pub const TICKET_WIDTH: usize = 42;

/// Largest amount a receipt line can carry ("9999999.99" still fits the roll).
pub const MAX_AMOUNT: f64 = 9_999_999.99;

fn default_quantity() -> u32 {
    1
}

/// One sold line on a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketItem {
    pub label: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub unit_price: f64,
}

impl TicketItem {
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Ticket payload as the printing handler understands it. The bridge never
/// sees this shape; it ships the raw JSON through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub header: Option<String>,
    pub items: Vec<TicketItem>,
    /// Declared total from the front-end; wins over the computed sum.
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
}

impl Ticket {
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(|item| item.amount()).sum()
    }

    pub fn effective_total(&self) -> f64 {
        self.total.unwrap_or_else(|| self.computed_total())
    }
}

fn check_amount(what: &str, amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount.abs() > MAX_AMOUNT {
        return Err(format!("Amount out of range for {}: {}", what, amount));
    }
    Ok(())
}

/// Parse a raw payload into a ticket. Rejects anything without at least one
/// item, and any amount that cannot fit on a receipt line; everything else
/// is optional.
pub fn parse_ticket(payload: &Value) -> Result<Ticket, String> {
    let ticket: Ticket = serde_json::from_value(payload.clone())
        .map_err(|e| format!("Invalid ticket payload: {}", e))?;
    if ticket.items.is_empty() {
        return Err("Ticket has no items".to_string());
    }
    for item in &ticket.items {
        check_amount(&format!("item '{}'", item.label), item.unit_price)?;
        check_amount(&format!("item '{}'", item.label), item.amount())?;
    }
    if let Some(total) = ticket.total {
        check_amount("declared total", total)?;
    }
    check_amount("computed total", ticket.computed_total())?;
    Ok(ticket)
}

// ============================================================================
// RECEIPT RENDERING
// ============================================================================

pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Center `text` within the receipt width.
fn center(text: &str) -> String {
    let len = text.chars().count();
    if len >= TICKET_WIDTH {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((TICKET_WIDTH - len) / 2), text)
}

/// One line with `left` text and a right-aligned amount.
fn amount_line(left: &str, amount: f64) -> String {
    let amount_str = format_amount(amount);
    let max_left = TICKET_WIDTH.saturating_sub(amount_str.len() + 1);
    let left_trimmed: String = left.chars().take(max_left).collect();
    let padding = TICKET_WIDTH.saturating_sub(left_trimmed.chars().count() + amount_str.len());
    format!("{}{}{}", left_trimmed, " ".repeat(padding), amount_str)
}

fn separator() -> String {
    "-".repeat(TICKET_WIDTH)
}

/// Render a ticket into receipt text. `printed_at` is passed in so callers
/// (and tests) control the timestamp line.
pub fn render_ticket(ticket: &Ticket, printed_at: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(ref header) = ticket.header {
        for header_line in header.lines() {
            lines.push(center(header_line));
        }
        lines.push(separator());
    }

    for item in &ticket.items {
        if item.quantity > 1 {
            lines.push(item.label.clone());
            let detail = format!("  {} x {}", item.quantity, format_amount(item.unit_price));
            lines.push(amount_line(&detail, item.amount()));
        } else {
            lines.push(amount_line(&item.label, item.amount()));
        }
    }

    lines.push(separator());
    lines.push(amount_line("TOTAL", ticket.effective_total()));

    if let Some(ref payment) = ticket.payment {
        lines.push(format!("Paiement: {}", payment));
    }

    lines.push(separator());

    if let Some(ref footer) = ticket.footer {
        for footer_line in footer.lines() {
            lines.push(center(footer_line));
        }
    }

    lines.push(printed_at.to_string());

    let mut receipt = lines.join("\n");
    receipt.push('\n');
    receipt
}

// ============================================================================
// SPOOLER
// ============================================================================

/// Writes rendered receipts into a spool directory, one file per ticket.
pub struct Spooler {
    dir: PathBuf,
    /// Continues from the highest sequence already spooled, so ticket names
    /// stay unique across process restarts within the same second.
    seq: AtomicU64,
}

impl Spooler {
    pub fn new(dir: PathBuf) -> Result<Self, String> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create spool dir at {:?}: {}", dir, e))?;
        let seq = AtomicU64::new(crate::highest_file_seq(&dir, "ticket-", ".txt"));
        Ok(Spooler { dir, seq })
    }

    /// Handler entry point for the "print-ticket" channel.
    pub fn print(&self, payload: &Value) -> Result<Value, String> {
        let ticket = parse_ticket(payload)?;
        let printed_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let receipt = render_ticket(&ticket, &printed_at);

        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.dir.join(format!("ticket-{}-{:05}.txt", stamp, seq));

        std::fs::write(&path, &receipt)
            .map_err(|e| format!("Failed to spool ticket to {:?}: {}", path, e))?;

        let total = ticket.effective_total();
        log_info!(
            "PRINT",
            "Spooled ticket: {} items, total={}",
            ticket.items.len(),
            format_amount(total)
        );

        Ok(json!({
            "path": path.to_string_lossy(),
            "lines": receipt.lines().count(),
            "total": total,
        }))
    }
}
