// All core functionality is in drillsheet-core
// This CLI acts as a thin wrapper around the core library

// CLI-specific modules
pub mod input;

// Re-export core types for convenience
pub use drillsheet_core::*;

// Re-export CLI utilities
pub use input::{load_dump, resolve_config, save_stages, CONFIG_ENV};
