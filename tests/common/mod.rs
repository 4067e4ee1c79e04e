//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for Co-Caisse backend integration tests.

use caisse_lib::{create_bridge, Bridge};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Test harness owning a fully wired bridge over a scratch data directory.
pub struct TestHarness {
    pub bridge: Bridge,
    pub data_dir: TempDir,
}

impl TestHarness {
    /// Create a harness with the real printing and transfer handlers wired in.
    pub fn new() -> Self {
        let data_dir = TempDir::new().expect("temp dir");
        let bridge = create_bridge("0.1.0".to_string(), data_dir.path()).expect("bridge assembly");
        TestHarness { bridge, data_dir }
    }

    pub fn tickets_dir(&self) -> std::path::PathBuf {
        self.data_dir.path().join("tickets")
    }

    pub fn exports_dir(&self) -> std::path::PathBuf {
        self.data_dir.path().join("exports")
    }

    /// Names of spool files currently on disk, sorted.
    pub fn spooled_tickets(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.tickets_dir())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.file_name().into_string().ok())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TEST DATA FIXTURES
// ============================================================================

/// Sample ticket payloads, shaped the way the front-end sends them.
pub struct TicketFixture;

impl TicketFixture {
    pub fn simple() -> Value {
        json!({
            "items": [
                { "label": "Cafe allonge", "unitPrice": 2.4 }
            ]
        })
    }

    pub fn full() -> Value {
        json!({
            "header": "CO-CAISSE\n12 rue du Marche",
            "items": [
                { "label": "Cafe allonge", "quantity": 2, "unitPrice": 2.4 },
                { "label": "Croissant", "quantity": 3, "unitPrice": 1.1 },
                { "label": "Jus d'orange", "unitPrice": 3.5 }
            ],
            "payment": "carte",
            "footer": "Merci de votre visite"
        })
    }
}

/// Sample export payload: a small snapshot of POS data.
pub fn sample_export_payload() -> Value {
    json!({
        "products": [
            { "name": "Cafe allonge", "price": 2.4, "category": "boissons" },
            { "name": "Croissant", "price": 1.1, "category": "viennoiseries" }
        ],
        "sales": [
            { "ticket": 1, "total": 5.9, "payment": "carte" },
            { "ticket": 2, "total": 2.4, "payment": "especes" }
        ],
        "settings": { "currency": "EUR", "vat": 10.0 }
    })
}
