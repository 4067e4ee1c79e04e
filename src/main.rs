//! FILENAME: src/main.rs
// PURPOSE: Desktop entry point for the Co-Caisse backend.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    caisse_lib::run();
}
