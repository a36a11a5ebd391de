//! Shared type definitions for the Reflex experiment suite.
//!
//! This crate is the single source of truth for the types shared between
//! the simulation engine, the decision oracle, and the runner. Types
//! defined here flow downstream to `TypeScript` via `ts-rs` for the
//! browser experiment front-ends.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for session and marker identifiers
//! - [`enums`] -- Roles, lifecycle phases, outcomes, and marker kinds
//! - [`structs`] -- Vectors, round records, session results, markers,
//!   and the export document

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{MarkerKind, Role, RoundOutcome, RoundPhase, SessionPhase};
pub use ids::{MarkerId, SessionId};
pub use structs::{MarkerEvent, RoundRecord, SessionExport, SessionResult, Vec2};

#[cfg(test)]
mod tests {
    //! Integration tests for type exports and `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. Importing them here triggers generation.
        // The actual files are written to the `bindings/` directory
        // relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::MarkerId::export_all();

        // Enums
        let _ = crate::enums::Role::export_all();
        let _ = crate::enums::SessionPhase::export_all();
        let _ = crate::enums::RoundPhase::export_all();
        let _ = crate::enums::RoundOutcome::export_all();
        let _ = crate::enums::MarkerKind::export_all();

        // Structs
        let _ = crate::structs::Vec2::export_all();
        let _ = crate::structs::RoundRecord::export_all();
        let _ = crate::structs::SessionResult::export_all();
        let _ = crate::structs::MarkerEvent::export_all();
        let _ = crate::structs::SessionExport::export_all();
    }
}
