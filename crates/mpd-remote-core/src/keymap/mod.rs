//! The remote's key-mapping table.
//!
//! Remotes differ in which scan codes their buttons emit, so the mapping
//! from logical button name (`"VOLUME_UP"`) to numeric key code lives in an
//! external JSON resource, loaded once at startup:
//!
//! ```json
//! {
//!     "STOP": 128,
//!     "PLAY": 207,
//!     "VOLUME_DOWN": 114,
//!     "VOLUME_UP": 115,
//!     "MUTE": 113,
//!     "PREVIOUS": 165,
//!     "NEXT": 163
//! }
//! ```
//!
//! [`KeyMap`] keeps both directions: name→code to build the command table,
//! and code→name for log lines and icon lookups. A resource missing any of
//! the required names is rejected at load time — the agent cannot operate
//! with a partial table.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

/// Logical button names every mapping resource must define.
pub const REQUIRED_KEYS: [&str; 7] = [
    "STOP",
    "PLAY",
    "VOLUME_DOWN",
    "VOLUME_UP",
    "MUTE",
    "PREVIOUS",
    "NEXT",
];

/// Error type for key-map loading.
#[derive(Debug, Error)]
pub enum KeymapError {
    /// The resource is not valid JSON of the expected shape.
    #[error("failed to parse key-map resource: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required logical button name is absent from the resource.
    #[error("key-map resource is missing required name {0:?}")]
    MissingKey(String),
}

/// Bidirectional mapping between logical button names and key codes.
#[derive(Debug, Clone)]
pub struct KeyMap {
    codes: HashMap<String, u16>,
    names: HashMap<u16, String>,
}

impl KeyMap {
    /// Parses a key-map from its JSON resource text.
    ///
    /// Duplicate codes across different names are tolerated: the reverse
    /// table keeps the last mapping encountered, and the collision is
    /// flagged in the log. Forward lookups are unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::Parse`] for malformed JSON and
    /// [`KeymapError::MissingKey`] when a required name is absent.
    pub fn from_json(json: &str) -> Result<Self, KeymapError> {
        let codes: HashMap<String, u16> = serde_json::from_str(json)?;

        for required in REQUIRED_KEYS {
            if !codes.contains_key(required) {
                return Err(KeymapError::MissingKey(required.to_string()));
            }
        }

        let mut names: HashMap<u16, String> = HashMap::with_capacity(codes.len());
        for (name, &code) in &codes {
            if let Some(previous) = names.insert(code, name.clone()) {
                warn!("key code {code} is mapped to both {previous:?} and {name:?}");
            }
        }

        Ok(Self { codes, names })
    }

    /// Key code for a logical button name.
    pub fn code(&self, name: &str) -> Option<u16> {
        self.codes.get(name).copied()
    }

    /// Logical button name for a key code, if the remote defines one.
    pub fn name(&self, code: u16) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    /// Number of mapped buttons.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns `true` if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_MAP: &str = r#"{
        "STOP": 128,
        "PLAY": 207,
        "VOLUME_DOWN": 114,
        "VOLUME_UP": 115,
        "MUTE": 113,
        "PREVIOUS": 165,
        "NEXT": 163
    }"#;

    #[test]
    fn test_from_json_loads_forward_and_reverse_tables() {
        // Arrange / Act
        let map = KeyMap::from_json(FULL_MAP).expect("full map must load");

        // Assert
        assert_eq!(map.code("VOLUME_UP"), Some(115));
        assert_eq!(map.name(115), Some("VOLUME_UP"));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn test_missing_required_name_is_rejected() {
        // Arrange: no MUTE entry
        let json = r#"{
            "STOP": 1, "PLAY": 2, "VOLUME_DOWN": 3,
            "VOLUME_UP": 4, "PREVIOUS": 5, "NEXT": 6
        }"#;

        // Act
        let result = KeyMap::from_json(json);

        // Assert
        assert!(
            matches!(result, Err(KeymapError::MissingKey(ref name)) if name == "MUTE"),
            "expected MissingKey(MUTE), got: {result:?}"
        );
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let result = KeyMap::from_json("{ not json");
        assert!(matches!(result, Err(KeymapError::Parse(_))));
    }

    #[test]
    fn test_non_integer_code_is_a_parse_error() {
        let result = KeyMap::from_json(r#"{"STOP": "oops"}"#);
        assert!(matches!(result, Err(KeymapError::Parse(_))));
    }

    #[test]
    fn test_duplicate_code_keeps_one_name_and_still_loads() {
        // Arrange: PLAY and an extra name share code 207. Accepted behavior:
        // the reverse table keeps whichever mapping iterates last.
        let json = r#"{
            "STOP": 128, "PLAY": 207, "VOLUME_DOWN": 114,
            "VOLUME_UP": 115, "MUTE": 113, "PREVIOUS": 165,
            "NEXT": 163, "OK_BUTTON": 207
        }"#;

        // Act
        let map = KeyMap::from_json(json).expect("duplicates must not fail the load");

        // Assert – forward lookups keep both; the reverse entry is one of the two
        assert_eq!(map.code("PLAY"), Some(207));
        assert_eq!(map.code("OK_BUTTON"), Some(207));
        let name = map.name(207).expect("code 207 must resolve");
        assert!(name == "PLAY" || name == "OK_BUTTON");
    }

    #[test]
    fn test_unknown_code_resolves_to_none() {
        let map = KeyMap::from_json(FULL_MAP).expect("load");
        assert_eq!(map.name(999), None);
        assert_eq!(map.code("POWER"), None);
    }

    #[test]
    fn test_extra_names_beyond_required_are_kept() {
        // Display-enabled remotes map extra buttons purely for icon lookups.
        let json = r#"{
            "STOP": 128, "PLAY": 207, "VOLUME_DOWN": 114,
            "VOLUME_UP": 115, "MUTE": 113, "PREVIOUS": 165,
            "NEXT": 163, "MENU": 139
        }"#;
        let map = KeyMap::from_json(json).expect("load");
        assert_eq!(map.code("MENU"), Some(139));
        assert_eq!(map.name(139), Some("MENU"));
    }
}
