//! # Streamline Suite Entry Point
//!
//! The `suite` binary. Setup and dispatch live in `lib.rs` so command
//! handlers can be tested without a process.

#[tokio::main]
async fn main() {
    let code = suite_cli::main_entry().await;
    std::process::exit(code);
}
