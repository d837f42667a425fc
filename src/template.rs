//! Prompt templates and the mode registry.
//!
//! A [`PromptTemplate`] is pure string substitution: `{key}` placeholders are
//! replaced with caller-supplied values, `{{`/`}}` escape literal braces, and
//! there is no control flow. The [`ModeRegistry`] maps mode identifiers to
//! templates and is immutable once built.

use std::collections::{BTreeSet, HashMap};

use crate::error::{OneshotError, Result};

/// Sentinel that should never appear in real templates.
const ESCAPE_SENTINEL_OPEN: &str = "\x00LBRACE\x00";
/// Sentinel for escaped closing brace.
const ESCAPE_SENTINEL_CLOSE: &str = "\x00RBRACE\x00";

/// A fixed prompt template for one mode.
///
/// The placeholder set is extracted at construction and never changes.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    id: String,
    text: String,
    placeholders: BTreeSet<String>,
}

impl PromptTemplate {
    /// Create a template, extracting its `{placeholder}` set.
    ///
    /// Escaped braces (`{{`, `}}`) are not counted as placeholders.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let placeholders = scan_placeholders(&text);
        Self {
            id: id.into(),
            text,
            placeholders,
        }
    }

    /// The mode identifier this template belongs to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The set of required input keys.
    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    /// Substitute all placeholders with values from `inputs`.
    ///
    /// Fails with [`OneshotError::MissingPlaceholder`] if any required key is
    /// absent. A successful render contains no unresolved placeholders.
    pub fn render(&self, inputs: &HashMap<String, String>) -> Result<String> {
        // Pass 1: protect escaped braces
        let mut rendered = self.text.replace("{{", ESCAPE_SENTINEL_OPEN);
        rendered = rendered.replace("}}", ESCAPE_SENTINEL_CLOSE);

        // Pass 2: substitute placeholders
        for key in &self.placeholders {
            let value = inputs
                .get(key)
                .ok_or_else(|| OneshotError::MissingPlaceholder {
                    mode: self.id.clone(),
                    placeholder: key.clone(),
                })?;
            let placeholder = format!("{{{}}}", key);
            rendered = rendered.replace(&placeholder, value);
        }

        // Pass 3: restore escaped braces
        rendered = rendered.replace(ESCAPE_SENTINEL_OPEN, "{");
        rendered = rendered.replace(ESCAPE_SENTINEL_CLOSE, "}");
        Ok(rendered)
    }
}

/// Extract `{name}` placeholders from template text.
///
/// A placeholder name is one or more ASCII alphanumerics, `_`, or `-`.
/// Anything else between braces is treated as literal text.
fn scan_placeholders(text: &str) -> BTreeSet<String> {
    let protected = text
        .replace("{{", ESCAPE_SENTINEL_OPEN)
        .replace("}}", ESCAPE_SENTINEL_CLOSE);

    let mut names = BTreeSet::new();
    let mut rest = protected.as_str();
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                if !name.is_empty()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
                {
                    names.insert(name.to_string());
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

/// Registry mapping mode identifiers to prompt templates.
///
/// Built once at startup, never mutated afterwards.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use llm_oneshot::ModeRegistry;
///
/// let registry = ModeRegistry::new().with("greet", "Say hello to {name}.");
/// let inputs = HashMap::from([("name".to_string(), "Alice".to_string())]);
/// assert_eq!(registry.render("greet", &inputs).unwrap(), "Say hello to Alice.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    modes: HashMap<String, PromptTemplate>,
}

impl ModeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mode, consuming and returning the registry (builder style).
    pub fn with(mut self, mode: impl Into<String>, template_text: impl Into<String>) -> Self {
        let mode = mode.into();
        self.modes
            .insert(mode.clone(), PromptTemplate::new(mode, template_text));
        self
    }

    /// Look up the template for a mode.
    pub fn get(&self, mode: &str) -> Option<&PromptTemplate> {
        self.modes.get(mode)
    }

    /// Registered mode identifiers, sorted.
    pub fn mode_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.modes.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered modes.
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    /// Whether the registry has no modes.
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Render the prompt for a mode.
    ///
    /// Fails with [`OneshotError::UnknownMode`] for unregistered modes and
    /// [`OneshotError::MissingPlaceholder`] for incomplete inputs.
    pub fn render(&self, mode: &str, inputs: &HashMap<String, String>) -> Result<String> {
        let template = self
            .get(mode)
            .ok_or_else(|| OneshotError::UnknownMode(mode.to_string()))?;
        template.render(inputs)
    }

    /// The built-in mode catalog covering the four bundled use cases:
    /// code review, medical note structuring, meeting notes, and image
    /// captioning.
    ///
    /// Review and meeting modes take `{code}`/`{language}` and `{transcript}`
    /// inputs; `symptom-extraction` takes `{note}`; caption modes take no
    /// text input (the image rides alongside the prompt).
    pub fn builtin() -> Self {
        Self::new()
            .with(
                "review-general",
                "You are a senior developer performing a comprehensive code review.\n\
                 Review the following code for bugs, code quality, performance, and\n\
                 readability. Be specific with line numbers when pointing out issues.\n\n\
                 Code to review:\n```{language}\n{code}\n```",
            )
            .with(
                "bug-detection",
                "You are a bug detection expert. Analyze the following code ONLY for\n\
                 bugs and errors: logic errors, off-by-one errors, null handling,\n\
                 edge cases, and runtime exceptions. List each bug with its location\n\
                 and a suggested fix.\n\n\
                 Code to analyze:\n```{language}\n{code}\n```",
            )
            .with(
                "code-quality",
                "You are a code quality expert. Review the following code for naming,\n\
                 organization, DRY violations, and documentation. Provide specific\n\
                 suggestions for improvement.\n\n\
                 Code to review:\n```{language}\n{code}\n```",
            )
            .with(
                "performance-review",
                "You are a performance optimization expert. Analyze the following code\n\
                 for time and space complexity, inefficient operations, and caching\n\
                 opportunities. Provide specific optimization suggestions.\n\n\
                 Code to analyze:\n```{language}\n{code}\n```",
            )
            .with(
                "security-review",
                "You are a security expert. Analyze the following code for injection\n\
                 vulnerabilities, authentication issues, data exposure, and input\n\
                 validation gaps. List each vulnerability with severity and\n\
                 remediation steps.\n\n\
                 Code to analyze:\n```{language}\n{code}\n```",
            )
            .with(
                "symptom-extraction",
                "You are a medical information extraction assistant. Extract the\n\
                 following from the doctor's note and return ONLY valid JSON with\n\
                 these fields: symptoms (list), diagnosis, medications (list),\n\
                 follow_up. Use \"Not specified\" for missing fields. Return ONLY the\n\
                 JSON object, no additional text.\n\n\
                 Doctor's note:\n{note}\n\nJSON output:",
            )
            .with(
                "meeting-summary",
                "Summarize the following meeting transcript in a few concise\n\
                 paragraphs, covering the main discussion points and decisions.\n\n\
                 Transcript:\n{transcript}",
            )
            .with(
                "action-items",
                "Extract every action item from the following meeting transcript.\n\
                 For each item, name the owner if one was mentioned.\n\n\
                 Transcript:\n{transcript}",
            )
            .with(
                "key-topics",
                "List the key topics discussed in the following meeting transcript,\n\
                 one per line.\n\n\
                 Transcript:\n{transcript}",
            )
            .with(
                "caption-standard",
                "Describe this image in one detailed sentence.",
            )
            .with(
                "caption-professional",
                "Provide a professional, objective description of the image content\n\
                 suitable for a business context.",
            )
            .with(
                "caption-funny",
                "Write a humorous and witty caption for this image.",
            )
            .with(
                "caption-creative",
                "Write a creative, poetic, or storytelling caption for this image.",
            )
            .with(
                "caption-social",
                "Write an engaging social media caption for this image that would get\n\
                 many likes.",
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_basic() {
        let registry = ModeRegistry::new().with("greet", "Hello {name}, review {code}");
        let result = registry
            .render("greet", &inputs(&[("name", "Alice"), ("code", "x = 1")]))
            .unwrap();
        assert_eq!(result, "Hello Alice, review x = 1");
    }

    #[test]
    fn test_render_no_placeholders() {
        let registry = ModeRegistry::new().with("static", "static prompt");
        let result = registry.render("static", &inputs(&[])).unwrap();
        assert_eq!(result, "static prompt");
    }

    #[test]
    fn test_render_unknown_mode() {
        let registry = ModeRegistry::new().with("known", "text");
        let err = registry.render("missing", &inputs(&[])).unwrap_err();
        assert_eq!(err, OneshotError::UnknownMode("missing".into()));
    }

    #[test]
    fn test_render_missing_placeholder() {
        let registry = ModeRegistry::new().with("greet", "Hello {name}");
        let err = registry.render("greet", &inputs(&[])).unwrap_err();
        assert_eq!(
            err,
            OneshotError::MissingPlaceholder {
                mode: "greet".into(),
                placeholder: "name".into()
            }
        );
    }

    #[test]
    fn test_render_escaped_braces() {
        let registry =
            ModeRegistry::new().with("json", "Type is {schema}, format: {{\"type\": \"object\"}}");
        let result = registry
            .render("json", &inputs(&[("schema", "string")]))
            .unwrap();
        assert_eq!(result, r#"Type is string, format: {"type": "object"}"#);
    }

    #[test]
    fn test_scan_placeholders() {
        let template = PromptTemplate::new("t", "a {one} b {two} c {one} {{not-this}}");
        let names: Vec<&str> = template.placeholders().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn test_scan_ignores_non_identifier_braces() {
        let template = PromptTemplate::new("t", "code like { x + 1 } is literal, {real} is not");
        let names: Vec<&str> = template.placeholders().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["real"]);
    }

    #[test]
    fn test_builtin_modes_render_cleanly() {
        let registry = ModeRegistry::builtin();
        assert!(!registry.is_empty());

        let full_inputs = inputs(&[
            ("code", "fn main() {}"),
            ("language", "rust"),
            ("note", "Patient has fever."),
            ("transcript", "We discussed the roadmap."),
        ]);

        for mode in registry.mode_ids() {
            let prompt = registry.render(mode, &full_inputs).unwrap();
            // No unresolved placeholders survive a complete input set.
            for key in registry.get(mode).unwrap().placeholders() {
                assert!(
                    !prompt.contains(&format!("{{{}}}", key)),
                    "mode '{}' left '{{{}}}' unresolved",
                    mode,
                    key
                );
            }
        }
    }

    #[test]
    fn test_builtin_has_expected_modes() {
        let registry = ModeRegistry::builtin();
        for mode in [
            "bug-detection",
            "symptom-extraction",
            "meeting-summary",
            "caption-funny",
        ] {
            assert!(registry.get(mode).is_some(), "missing mode '{}'", mode);
        }
    }

    #[test]
    fn test_caption_modes_take_no_inputs() {
        let registry = ModeRegistry::builtin();
        assert!(registry
            .get("caption-funny")
            .unwrap()
            .placeholders()
            .is_empty());
    }
}
