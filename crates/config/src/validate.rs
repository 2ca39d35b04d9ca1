//! Configuration validation engine.
//!
//! Validates TOML configuration files against the known schema, flags
//! unknown/misspelled fields, and reports problems that would stop the
//! watcher or the Discord client from coming up.

use std::{collections::HashMap, path::Path};

use secrecy::ExposeSecret;

use crate::{env_subst::substitute_env, schema::VerwatchConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "type-error", "value", "file-ref"
    pub category: &'static str,
    /// Dotted path, e.g. "watch.interval_secs"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<std::path::PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

// ── Schema tree for unknown-field detection ─────────────────────────────────

/// Represents the expected shape of the configuration schema.
enum KnownKeys {
    /// A table with fixed field names.
    Struct(HashMap<&'static str, KnownKeys>),
    /// Scalar value — stop recursion.
    Leaf,
}

/// Build the schema map mirroring every field in `schema.rs`.
fn build_schema_map() -> KnownKeys {
    use KnownKeys::{Leaf, Struct};

    Struct(HashMap::from([
        (
            "watch",
            Struct(HashMap::from([
                ("endpoint", Leaf),
                ("interval_secs", Leaf),
                ("request_timeout_secs", Leaf),
                ("platform", Leaf),
                ("version_field", Leaf),
                ("date_field", Leaf),
                ("state_file", Leaf),
            ])),
        ),
        (
            "discord",
            Struct(HashMap::from([
                ("token", Leaf),
                ("channel_id", Leaf),
                ("ping_role_id", Leaf),
                ("command_prefix", Leaf),
            ])),
        ),
    ]))
}

// ── Levenshtein distance ────────────────────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.len();
    let b_len = b.len();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

/// Find the best match for `needle` among `candidates` using Levenshtein
/// distance. Returns `Some(best)` if the distance is <= `max_distance`.
fn suggest<'a>(needle: &str, candidates: &[&'a str], max_distance: usize) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(needle, candidate);
        if d > 0 && d <= max_distance && best.as_ref().is_none_or(|(_, bd)| d < *bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}

// ── Core validation ─────────────────────────────────────────────────────────

/// Validate a config file at the given path, or discover the default config
/// file location if `path` is `None`.
#[must_use]
pub fn validate(path: Option<&Path>) -> ValidationResult {
    let config_path = if let Some(p) = path {
        Some(p.to_path_buf())
    } else {
        crate::loader::find_config_file()
    };

    let Some(ref actual_path) = config_path else {
        return ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Info,
                category: "file-ref",
                path: String::new(),
                message: "no config file found; using defaults".into(),
            }],
            config_path: None,
        };
    };

    match std::fs::read_to_string(actual_path) {
        Ok(content) => {
            // Same env substitution the load path applies, so checks see the
            // values the running process would see.
            let content = substitute_env(&content);
            let mut result = validate_content(actual_path, &content);
            result.config_path = Some(actual_path.clone());
            result
        },
        Err(e) => ValidationResult {
            diagnostics: vec![Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("failed to read config file: {e}"),
            }],
            config_path: Some(actual_path.clone()),
        },
    }
}

/// Dispatch on file extension. TOML gets the full unknown-field walk; YAML
/// and JSON get a parse check plus the value checks.
fn validate_content(path: &Path, content: &str) -> ValidationResult {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => validate_parsed(serde_yaml::from_str(content)),
        Some("json") => validate_parsed(serde_json::from_str(content)),
        _ => validate_toml_str(content),
    }
}

fn validate_parsed<E: std::fmt::Display>(parsed: Result<VerwatchConfig, E>) -> ValidationResult {
    let mut diagnostics = Vec::new();
    match parsed {
        Ok(config) => check_values(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "syntax",
            path: String::new(),
            message: format!("parse error: {e}"),
        }),
    }
    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Validate a TOML string without file-system side effects (useful for
/// tests). The input is expected to already have env placeholders
/// substituted.
#[must_use]
pub fn validate_toml_str(toml_str: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    // 1. Syntax — parse raw TOML
    let toml_value: toml::Value = match toml::from_str(toml_str) {
        Ok(v) => v,
        Err(e) => {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "syntax",
                path: String::new(),
                message: format!("TOML syntax error: {e}"),
            });
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    // 2. Unknown fields — walk the TOML tree against KnownKeys
    let schema = build_schema_map();
    check_unknown_fields(&toml_value, &schema, "", &mut diagnostics);

    // 3. Type and value checks on the parsed config
    match toml::from_str::<VerwatchConfig>(toml_str) {
        Ok(config) => check_values(&config, &mut diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "type-error",
            path: String::new(),
            message: format!("type error: {e}"),
        }),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Walk the TOML value tree against the schema tree and flag unknown keys.
fn check_unknown_fields(
    value: &toml::Value,
    schema: &KnownKeys,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let (toml::Value::Table(table), KnownKeys::Struct(fields)) = (value, schema) {
        let known_keys: Vec<&str> = fields.keys().copied().collect();
        for (key, child_value) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if let Some(child_schema) = fields.get(key.as_str()) {
                check_unknown_fields(child_value, child_schema, &path, diagnostics);
            } else {
                let level = if prefix.is_empty() {
                    "at top level "
                } else {
                    ""
                };
                let suggestion = suggest(key, &known_keys, 3);
                let msg = if let Some(s) = suggestion {
                    format!("unknown field {level}(did you mean \"{s}\"?)")
                } else {
                    format!("unknown field {level}")
                };
                diagnostics.push(Diagnostic {
                    severity: Severity::Error,
                    category: "unknown-field",
                    path,
                    message: msg.trim().to_string(),
                });
            }
        }
    }
}

/// Value-level checks on a config that parsed cleanly.
fn check_values(config: &VerwatchConfig, diagnostics: &mut Vec<Diagnostic>) {
    let token = config.discord.token.expose_secret();
    if token.is_empty() {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "discord.token".into(),
            message: "discord token is empty".into(),
        });
    } else if token.contains("${") {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "value",
            path: "discord.token".into(),
            message: "discord token contains an unresolved ${VAR} placeholder".into(),
        });
    }

    if config.discord.channel_id == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "discord.channel_id".into(),
            message: "channel_id is 0; set the channel that should receive notifications".into(),
        });
    }

    if config.discord.ping_role_id == Some(0) {
        diagnostics.push(Diagnostic {
            severity: Severity::Info,
            category: "value",
            path: "discord.ping_role_id".into(),
            message: "ping_role_id is 0; notifications will not mention a role".into(),
        });
    }

    let endpoint = &config.watch.endpoint;
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "watch.endpoint".into(),
            message: format!("endpoint must be an http(s) URL, got \"{endpoint}\""),
        });
    }

    if config.watch.interval_secs == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "watch.interval_secs".into(),
            message: "poll interval must be at least 1 second".into(),
        });
    }

    if config.watch.request_timeout_secs == 0 {
        diagnostics.push(Diagnostic {
            severity: Severity::Error,
            category: "value",
            path: "watch.request_timeout_secs".into(),
            message: "request timeout must be at least 1 second".into(),
        });
    } else if config.watch.request_timeout_secs >= config.watch.interval_secs
        && config.watch.interval_secs > 0
    {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            category: "value",
            path: "watch.request_timeout_secs".into(),
            message: "request timeout is not shorter than the poll interval; slow fetches will skip ticks"
                .into(),
        });
    }

    for (path, value) in [
        ("watch.version_field", &config.watch.version_field),
        ("watch.date_field", &config.watch.date_field),
    ] {
        if value.is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                category: "value",
                path: path.into(),
                message: "response field name is empty".into(),
            });
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Config body that passes every check; tests tweak one piece at a time.
    const GOOD: &str = r#"
[watch]
endpoint = "https://example.com/versions"
interval_secs = 100
request_timeout_secs = 30

[discord]
token = "abc.def.ghi"
channel_id = 123456
"#;

    #[test]
    fn levenshtein_identical() {
        assert_eq!(levenshtein("endpoint", "endpoint"), 0);
    }

    #[test]
    fn levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn levenshtein_single_edit() {
        assert_eq!(levenshtein("endpoint", "endpont"), 1); // deletion
        assert_eq!(levenshtein("channel_id", "chanel_id"), 1); // deletion
        assert_eq!(levenshtein("token", "toket"), 1); // substitution
    }

    #[test]
    fn suggest_finds_close_match() {
        let candidates = &["endpoint", "interval_secs", "platform"];
        assert_eq!(suggest("endpont", candidates, 3), Some("endpoint"));
        assert_eq!(suggest("platfrom", candidates, 3), Some("platform"));
    }

    #[test]
    fn suggest_returns_none_for_distant() {
        let candidates = &["endpoint", "interval_secs", "platform"];
        assert_eq!(suggest("xxxxxxxxx", candidates, 3), None);
    }

    #[test]
    fn good_config_is_clean() {
        let result = validate_toml_str(GOOD);
        assert!(
            !result.has_errors(),
            "expected no errors, got: {:?}",
            result.diagnostics
        );
    }

    #[test]
    fn unknown_top_level_key_with_suggestion() {
        let result = validate_toml_str("wath = 42\n");
        let unknown = result
            .diagnostics
            .iter()
            .find(|d| d.category == "unknown-field" && d.path == "wath");
        assert!(
            unknown.is_some(),
            "expected unknown-field diagnostic for 'wath'"
        );
        let d = unknown.unwrap();
        assert_eq!(d.severity, Severity::Error);
        assert!(
            d.message.contains("watch"),
            "expected suggestion 'watch' in message: {}",
            d.message
        );
    }

    #[test]
    fn unknown_nested_key_with_suggestion() {
        let toml = r#"
[discord]
chanel_id = 123
"#;
        let result = validate_toml_str(toml);
        let unknown = result
            .diagnostics
            .iter()
            .find(|d| d.category == "unknown-field" && d.path == "discord.chanel_id");
        assert!(
            unknown.is_some(),
            "expected unknown-field for 'discord.chanel_id', got: {:?}",
            result.diagnostics
        );
        assert!(unknown.unwrap().message.contains("channel_id"));
    }

    #[test]
    fn syntax_error_reported() {
        let result = validate_toml_str("[watch\nendpoint = ");
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn type_error_reported() {
        let result = validate_toml_str("[watch]\ninterval_secs = \"soon\"\n");
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "type-error")
        );
    }

    #[test]
    fn yaml_config_gets_value_checks() {
        let yaml = "discord:\n  token: abc.def.ghi\n  channel_id: 0\n";
        let result = validate_parsed(serde_yaml::from_str::<VerwatchConfig>(yaml));
        assert!(result.has_errors());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.path == "discord.channel_id")
        );
    }

    #[test]
    fn yaml_syntax_error_reported() {
        let result = validate_parsed(serde_yaml::from_str::<VerwatchConfig>("discord: ["));
        assert!(result.has_errors());
        assert_eq!(result.diagnostics[0].category, "syntax");
    }

    #[test]
    fn empty_token_is_error() {
        let result = validate_toml_str(&GOOD.replace("abc.def.ghi", ""));
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error && d.path == "discord.token")
        );
    }

    #[test]
    fn unresolved_token_placeholder_is_warning() {
        let result = validate_toml_str(&GOOD.replace("abc.def.ghi", "${DISCORD_TOKEN}"));
        let d = result
            .diagnostics
            .iter()
            .find(|d| d.path == "discord.token")
            .unwrap();
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn zero_channel_is_error() {
        let result = validate_toml_str(&GOOD.replace("channel_id = 123456", "channel_id = 0"));
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error && d.path == "discord.channel_id")
        );
    }

    #[test]
    fn non_http_endpoint_is_error() {
        let result =
            validate_toml_str(&GOOD.replace("https://example.com/versions", "ftp://example.com"));
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error && d.path == "watch.endpoint")
        );
    }

    #[test]
    fn zero_interval_is_error() {
        let result = validate_toml_str(&GOOD.replace("interval_secs = 100", "interval_secs = 0"));
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error && d.path == "watch.interval_secs")
        );
    }

    #[test]
    fn timeout_longer_than_interval_is_warning() {
        let result = validate_toml_str(&GOOD.replace(
            "request_timeout_secs = 30",
            "request_timeout_secs = 100",
        ));
        let d = result
            .diagnostics
            .iter()
            .find(|d| d.path == "watch.request_timeout_secs")
            .unwrap();
        assert_eq!(d.severity, Severity::Warning);
        assert!(!result.has_errors());
    }

    /// Schema drift guard: verify every key from `VerwatchConfig::default()`
    /// is represented in `build_schema_map()`.
    #[test]
    fn schema_drift_guard() {
        let config = VerwatchConfig::default();
        let toml_value = toml::Value::try_from(&config).expect("serialize default config");
        let schema = build_schema_map();
        let mut missing = Vec::new();
        collect_missing_keys(&toml_value, &schema, "", &mut missing);
        assert!(
            missing.is_empty(),
            "schema map is missing keys present in VerwatchConfig::default(): {missing:?}\n\
             Update build_schema_map() in validate.rs to include these fields."
        );
    }

    /// Helper for schema drift guard: recursively collect keys in `value` that
    /// are not present in `schema`.
    fn collect_missing_keys(
        value: &toml::Value,
        schema: &KnownKeys,
        prefix: &str,
        missing: &mut Vec<String>,
    ) {
        if let (toml::Value::Table(table), KnownKeys::Struct(fields)) = (value, schema) {
            for (key, child_value) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                if let Some(child_schema) = fields.get(key.as_str()) {
                    collect_missing_keys(child_value, child_schema, &path, missing);
                } else {
                    missing.push(path);
                }
            }
        }
    }
}
