//! # catalog-core
//!
//! Core types, traits, and abstractions for the recipe catalog.
//!
//! This crate provides the recipe aggregate model, its transfer
//! representations and converters, and the repository traits the storage
//! and service crates are written against.
//!
//! ## Logging
//!
//! Every crate logs through `tracing` with the structured fields
//! `subsystem` ("service", "db", "seed"), `component` and `op`, plus
//! `recipe_id` / `ingredient_id` where an entity is involved.
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Data may be written but cannot be confirmed (inconsistent write) |
//! | WARN  | Recoverable anomaly, request continues |
//! | INFO  | Lifecycle events (pool, schema, seeding) |
//! | DEBUG | Decision points (update vs create path, resolver stage) |
//! | TRACE | Per-item iteration (reference hydration) |

pub mod converters;
pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;
pub mod transfer;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use converters::{
    BiConverter, CategoryConverter, IngredientConverter, NotesConverter, RecipeConverter,
    UnitOfMeasureConverter,
};
pub use error::{EntityKind, Error, Result};
pub use models::*;
pub use traits::*;
pub use transfer::*;
pub use uuid_utils::{new_id, present_id};
