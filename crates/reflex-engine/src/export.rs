//! Session export: the JSON document handed to downstream analysis.
//!
//! The export bundles the effective configuration, every completed
//! round record, the derived summary, and the captured marker stream
//! into one human-inspectable blob. It is deliberately unversioned;
//! analysis scripts read it ad hoc.

use std::path::Path;

use reflex_types::{MarkerKind, SessionExport};
use tracing::info;

use crate::error::EngineError;
use crate::session::Session;

/// Build the export document for a finished session and record the
/// export itself as a marker.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPhase`] if the session has not
/// finished, or [`EngineError::Export`] if the configuration cannot be
/// serialized.
pub fn build_export(session: &mut Session) -> Result<SessionExport, EngineError> {
    let Some(result) = session.result().cloned() else {
        return Err(EngineError::InvalidPhase {
            action: "export",
            phase: session.phase(),
        });
    };
    let config = serde_json::to_value(session.config()).map_err(|e| EngineError::Export {
        message: e.to_string(),
    })?;
    session.emit(MarkerKind::DataExport, serde_json::json!({}));
    Ok(SessionExport {
        session_id: session.id(),
        started_at: session.started_at(),
        exported_at: chrono::Utc::now(),
        config,
        records: session.records().to_vec(),
        result,
        markers: session.markers().to_vec(),
    })
}

/// Serialize the export as pretty JSON and write it to `path`.
///
/// # Errors
///
/// Returns [`EngineError::Export`] on serialization or I/O failure.
pub fn write_export(export: &SessionExport, path: &Path) -> Result<(), EngineError> {
    let json = serde_json::to_string_pretty(export).map_err(|e| EngineError::Export {
        message: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|e| EngineError::Export {
        message: format!("failed to write {}: {e}", path.display()),
    })?;
    info!(path = %path.display(), records = export.records.len(), "session exported");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use reflex_types::SessionPhase;

    use super::*;
    use crate::config::SessionConfig;
    use crate::marker::MemorySink;

    #[test]
    fn export_requires_a_finished_session() {
        let mut session = Session::new(
            SessionConfig::default(),
            Box::new(MemorySink::new()),
            StdRng::seed_from_u64(1),
        );
        let err = build_export(&mut session).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidPhase {
                phase: SessionPhase::Instruction,
                ..
            }
        ));
    }

    #[test]
    fn export_of_aborted_session_covers_completed_rounds() {
        let mut session = Session::new(
            SessionConfig::default(),
            Box::new(MemorySink::new()),
            StdRng::seed_from_u64(1),
        );
        session.start().unwrap();
        session.abort().unwrap();

        let export = build_export(&mut session).unwrap();
        assert!(export.records.is_empty());
        assert_eq!(export.result.predator_rounds, 0);
        // The export marker itself is part of the captured stream.
        assert!(
            export
                .markers
                .iter()
                .any(|m| m.kind == MarkerKind::DataExport)
        );
    }
}
