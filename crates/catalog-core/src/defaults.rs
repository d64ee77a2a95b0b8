//! Default constants for the recipe catalog.
//!
//! Crates reference these instead of defining their own magic numbers.

// =============================================================================
// DATABASE
// =============================================================================

/// Database URL used when `DATABASE_URL` is not set.
pub const DATABASE_URL: &str = "postgres://localhost/catalog";

/// Maximum number of pooled connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Minimum number of pooled connections kept open.
pub const DB_MIN_CONNECTIONS: u32 = 1;

/// Connection acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Idle connection timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

/// Maximum connection lifetime in seconds (30 minutes).
pub const DB_MAX_LIFETIME_SECS: u64 = 1800;

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// Units of measure seeded into an empty catalog.
pub const SEED_UNITS: &[&str] = &[
    "Each",
    "Teaspoon",
    "Tablespoon",
    "Cup",
    "Pinch",
    "Ounce",
    "Dash",
    "Pint",
];

/// Categories seeded into an empty catalog.
pub const SEED_CATEGORIES: &[&str] = &["American", "Italian", "Mexican", "Fast Food"];
