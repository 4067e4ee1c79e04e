//! FILENAME: src/tests.rs
// PURPOSE: Unit tests for receipt rendering and bridge assembly.

use serde_json::json;

use crate::bridge::Bridge;
use crate::printing::{format_amount, parse_ticket, render_ticket, MAX_AMOUNT, TICKET_WIDTH};

#[test]
fn test_format_amount() {
    assert_eq!(format_amount(0.0), "0.00");
    assert_eq!(format_amount(2.4), "2.40");
    assert_eq!(format_amount(1234.567), "1234.57");
}

#[test]
fn test_parse_ticket_defaults() {
    let payload = json!({
        "items": [{ "label": "Cafe", "unitPrice": 1.2 }]
    });
    let ticket = parse_ticket(&payload).unwrap();
    assert_eq!(ticket.items.len(), 1);
    assert_eq!(ticket.items[0].quantity, 1);
    assert!(ticket.header.is_none());
    assert!(ticket.total.is_none());
}

#[test]
fn test_parse_ticket_rejects_empty_items() {
    let payload = json!({ "items": [] });
    let err = parse_ticket(&payload).unwrap_err();
    assert_eq!(err, "Ticket has no items");
}

#[test]
fn test_parse_ticket_rejects_non_object() {
    let payload = json!("not a ticket");
    assert!(parse_ticket(&payload).is_err());
}

#[test]
fn test_computed_and_effective_total() {
    let payload = json!({
        "items": [
            { "label": "Cafe", "quantity": 2, "unitPrice": 1.2 },
            { "label": "Croissant", "unitPrice": 1.1 }
        ]
    });
    let ticket = parse_ticket(&payload).unwrap();
    assert!((ticket.computed_total() - 3.5).abs() < 1e-9);
    assert!((ticket.effective_total() - 3.5).abs() < 1e-9);

    let declared = json!({
        "items": [{ "label": "Cafe", "unitPrice": 1.2 }],
        "total": 99.0
    });
    let ticket = parse_ticket(&declared).unwrap();
    assert!((ticket.effective_total() - 99.0).abs() < 1e-9);
}

#[test]
fn test_render_ticket_layout() {
    let payload = json!({
        "header": "CO-CAISSE",
        "items": [
            { "label": "Cafe allonge", "quantity": 2, "unitPrice": 1.2 },
            { "label": "Croissant", "unitPrice": 1.1 }
        ],
        "payment": "carte",
        "footer": "Merci de votre visite"
    });
    let ticket = parse_ticket(&payload).unwrap();
    let receipt = render_ticket(&ticket, "2026-08-30 12:00:00");

    // Amount lines are exactly receipt-width with right-aligned amounts
    let total_line = receipt
        .lines()
        .find(|line| line.starts_with("TOTAL"))
        .unwrap();
    assert_eq!(total_line.len(), TICKET_WIDTH);
    assert!(total_line.ends_with("3.50"));

    assert!(receipt.contains("CO-CAISSE"));
    assert!(receipt.contains("  2 x 1.20"));
    assert!(receipt.contains("Paiement: carte"));
    assert!(receipt.contains("Merci de votre visite"));
    assert!(receipt.ends_with("2026-08-30 12:00:00\n"));
}

#[test]
fn test_parse_ticket_rejects_out_of_range_amounts() {
    // A unit price wider than the receipt line must be a handler failure,
    // not a rendering panic
    let huge_price = json!({
        "items": [{ "label": "Cafe", "unitPrice": 1e50 }]
    });
    let err = parse_ticket(&huge_price).unwrap_err();
    assert!(err.contains("out of range"), "unexpected error: {}", err);

    // A sane unit price whose line amount overflows the bound is rejected too
    let huge_line = json!({
        "items": [{ "label": "Cafe", "quantity": 4_000_000u32, "unitPrice": 9.0 }]
    });
    assert!(parse_ticket(&huge_line).unwrap_err().contains("out of range"));

    let huge_total = json!({
        "items": [{ "label": "Cafe", "unitPrice": 2.4 }],
        "total": 1e50
    });
    assert!(parse_ticket(&huge_total).unwrap_err().contains("out of range"));
}

#[test]
fn test_render_ticket_handles_max_amount() {
    let payload = json!({
        "items": [{ "label": "Grosse commande", "unitPrice": MAX_AMOUNT }]
    });
    let ticket = parse_ticket(&payload).unwrap();
    let receipt = render_ticket(&ticket, "2026-08-30 12:00:00");
    for line in receipt.lines() {
        assert!(line.len() <= TICKET_WIDTH, "line too wide: {:?}", line);
    }
    assert!(receipt.contains("9999999.99"));
}

#[test]
fn test_render_ticket_truncates_long_labels() {
    let payload = json!({
        "items": [{ "label": "X".repeat(80), "unitPrice": 1.0 }]
    });
    let ticket = parse_ticket(&payload).unwrap();
    let receipt = render_ticket(&ticket, "2026-08-30 12:00:00");
    for line in receipt.lines() {
        assert!(line.len() <= TICKET_WIDTH, "line too wide: {:?}", line);
    }
}

#[test]
fn test_bridge_rejects_duplicate_channel() {
    let mut bridge = Bridge::new("0.1.0");
    bridge
        .register("print-ticket", Box::new(|_| Ok(json!(null))))
        .unwrap();
    let err = bridge
        .register("print-ticket", Box::new(|_| Ok(json!(null))))
        .unwrap_err();
    assert!(err.contains("print-ticket"));
}

#[test]
fn test_bridge_unregistered_channel_is_failure() {
    let bridge = Bridge::new("0.1.0");
    let err = bridge.print_ticket(json!({})).unwrap_err();
    assert!(err.contains("print-ticket"));
}
