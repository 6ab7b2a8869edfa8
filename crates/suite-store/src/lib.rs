//! # suite-store: Application State & Persistence for Streamline Suite
//!
//! Everything the suite remembers between and during commands.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   SuiteConfig ──► data_dir ──► FileStore ──► CompanyProfile             │
//! │                                                 │                       │
//! │   seed::records() ─┐                            ▼                       │
//! │   --records file ──┴──────────────────────► AppState                    │
//! │                                                 ▲                       │
//! │   template file ──► upload::read_upload ──► build_custom_template       │
//! │                                             (validated on save)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`] - AppState, record collections and actions
//! - [`company`] - Persisted company profile and custom templates
//! - [`storage`] - KeyValueStore, FileStore, MemoryStore
//! - [`upload`] - Template background upload
//! - [`config`] - TOML configuration with env overrides
//! - [`seed`] - Demo records
//! - [`error`] - Store error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod company;
pub mod config;
pub mod error;
pub mod seed;
pub mod state;
pub mod storage;
pub mod upload;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use company::{CompanyProfile, CompanyUpdate, COMPANY_DETAILS_KEY};
pub use config::SuiteConfig;
pub use error::{StoreError, StoreResult};
pub use state::{AppState, Collection, RecordsFile, StockMovement};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use upload::{build_custom_template, read_upload, Upload, UploadKind};
