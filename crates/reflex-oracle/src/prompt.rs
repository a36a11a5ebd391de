//! Prompt template rendering via `minijinja`.
//!
//! The oracle ships self-contained: a default system and trial template
//! are compiled in, so no files are needed at runtime. An operator can
//! still override either template by pointing the configuration at a
//! directory containing `system.j2` and/or `trial.j2`.

use minijinja::Environment;

use crate::error::OracleError;

/// Default system message: the oracle plays the experiment's opponent.
const DEFAULT_SYSTEM: &str = "\
You are the opponent in a competitive speed-choice experiment. Each \
trial you pick one option by its 0-based index. Play to win, but vary \
your choices so the participant cannot trivially predict you. Respond \
with JSON only: {\"choice\": <index>, \"rationale\": \"<one sentence>\"}.";

/// Default trial message: serialized trial context plus the option list.
const DEFAULT_TRIAL: &str = "\
## Trial {{ round }} of {{ total_rounds }}
Score: you {{ opponent_score }}, participant {{ player_score }}.
{% if history %}Participant's recent choices: {{ history }}.
{% endif %}Options (choose one index 0-{{ max_index }}):
{% for option in options %}- {{ loop.index0 }}: {{ option }}
{% endfor %}
Respond with JSON: {\"choice\": <index>, \"rationale\": \"...\"}";

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message establishing the opponent's task.
    pub system: String,
    /// User message containing the trial context and options.
    pub user: String,
}

/// Manages prompt template loading and rendering.
///
/// Wraps a `minijinja` [`Environment`] with the oracle's two templates
/// loaded, preferring on-disk overrides when a directory is configured.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Create a prompt engine. With `templates_dir` set, `system.j2`
    /// and `trial.j2` are read from it; missing files fall back to the
    /// compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Template`] if a template fails to
    /// compile.
    pub fn new(templates_dir: Option<&str>) -> Result<Self, OracleError> {
        let mut env = Environment::new();

        let system = load_override(templates_dir, "system.j2")
            .unwrap_or_else(|| DEFAULT_SYSTEM.to_owned());
        let trial =
            load_override(templates_dir, "trial.j2").unwrap_or_else(|| DEFAULT_TRIAL.to_owned());

        env.add_template_owned("system", system)
            .map_err(|e| OracleError::Template(format!("failed to add system template: {e}")))?;
        env.add_template_owned("trial", trial)
            .map_err(|e| OracleError::Template(format!("failed to add trial template: {e}")))?;

        Ok(Self { env })
    }

    /// Render the prompt for one trial decision from its serialized
    /// context.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Template`] if rendering fails.
    pub fn render(&self, context: &serde_json::Value) -> Result<RenderedPrompt, OracleError> {
        let system = self
            .env
            .get_template("system")
            .map_err(|e| OracleError::Template(format!("missing system template: {e}")))?
            .render(context)
            .map_err(|e| OracleError::Template(format!("system render failed: {e}")))?;

        let user = self
            .env
            .get_template("trial")
            .map_err(|e| OracleError::Template(format!("missing trial template: {e}")))?
            .render(context)
            .map_err(|e| OracleError::Template(format!("trial render failed: {e}")))?;

        Ok(RenderedPrompt { system, user })
    }
}

/// Read a template override from disk, if the directory and file exist.
fn load_override(dir: Option<&str>, filename: &str) -> Option<String> {
    let dir = dir?;
    std::fs::read_to_string(format!("{dir}/{filename}")).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn trial_context() -> serde_json::Value {
        serde_json::json!({
            "round": 3,
            "total_rounds": 10,
            "player_score": 20,
            "opponent_score": 10,
            "history": "40, 50, 40",
            "max_index": 3,
            "options": ["20 units/s", "30 units/s", "40 units/s", "50 units/s"],
        })
    }

    #[test]
    fn default_templates_render() {
        let engine = PromptEngine::new(None).unwrap();
        let prompt = engine.render(&trial_context()).unwrap();
        assert!(prompt.system.contains("JSON"));
        assert!(prompt.user.contains("Trial 3 of 10"));
        assert!(prompt.user.contains("0: 20 units/s"));
        assert!(prompt.user.contains("40, 50, 40"));
    }

    #[test]
    fn empty_history_is_omitted() {
        let mut context = trial_context();
        if let Some(obj) = context.as_object_mut() {
            obj.insert("history".to_owned(), serde_json::json!(""));
        }
        let engine = PromptEngine::new(None).unwrap();
        let prompt = engine.render(&context).unwrap();
        assert!(!prompt.user.contains("recent choices"));
    }

    #[test]
    fn disk_override_takes_precedence() {
        let unique = format!(
            "reflex_oracle_templates_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("system.j2"), "Custom system for round {{ round }}").unwrap();

        let engine = PromptEngine::new(dir.to_str()).unwrap();
        let prompt = engine.render(&trial_context()).unwrap();
        assert_eq!(prompt.system, "Custom system for round 3");
        // trial.j2 was not overridden: the default still renders.
        assert!(prompt.user.contains("Trial 3 of 10"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
