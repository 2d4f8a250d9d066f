//! `ConfigStore`: named, typed parameters with scoped validity (§4.5).
//!
//! Distinct from [`engine_config`](crate::config::engine_config), which is
//! the serde-backed on-disk shape a user edits; `ConfigStore` is the
//! runtime registry the rest of the engine actually consults, with the
//! constraint enforcement the source applies per parameter.

pub mod engine_config;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::warn;

/// A parameter's constraint tag, controlling when it may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamConstraint {
    /// May only be set before `Session::init` completes.
    InitOnly,
    /// May only be set after `init`.
    NonInitOnly,
    /// May only be set when the engine is built/run with debug features
    /// enabled.
    DebugOnly,
    /// No restriction.
    Unrestricted,
}

/// A parameter's runtime value, one of the four scalar kinds named in
/// §4.5.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Bool(bool),
    Double(f64),
    Str(String),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Double(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone)]
struct ParamEntry {
    value: ParamValue,
    constraint: ParamConstraint,
}

/// Lifecycle phase a `ConfigStore` is operating in, used to enforce
/// `ParamConstraint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    PreInit,
    PostInit,
}

/// Named typed-parameter registry with scoped validity.
///
/// Entries are stored in a `BTreeMap` rather than a `HashMap` so that
/// `print_variables` can produce the stable, deterministic order §4.5
/// requires without an extra sort pass.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    entries: BTreeMap<String, ParamEntry>,
    phase: StorePhase,
}

impl Default for StorePhase {
    fn default() -> Self {
        StorePhase::PreInit
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> StorePhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: StorePhase) {
        self.phase = phase;
    }

    /// Registers `name` with a default value and constraint. Re-registering
    /// an existing name overwrites its default but is a no-op for already
    /// user-set values; callers normally register all known parameters once
    /// at startup before applying any file/CLI overrides.
    pub fn register(&mut self, name: impl Into<String>, default: ParamValue, constraint: ParamConstraint) {
        self.entries.entry(name.into()).or_insert(ParamEntry {
            value: default,
            constraint,
        });
    }

    /// Attempts to set `name` to `value`, honoring the registered
    /// constraint and the current phase. Returns `false` (value unchanged)
    /// on a constraint violation or unknown name, matching the source's
    /// `ok=false` contract rather than an error return.
    pub fn set(&mut self, name: &str, value: ParamValue) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            warn!(parameter = name, "attempt to set unknown parameter");
            return false;
        };
        let allowed = match entry.constraint {
            ParamConstraint::InitOnly => self.phase == StorePhase::PreInit,
            ParamConstraint::NonInitOnly => self.phase == StorePhase::PostInit,
            ParamConstraint::DebugOnly => cfg!(debug_assertions),
            ParamConstraint::Unrestricted => true,
        };
        if !allowed {
            warn!(
                parameter = name,
                constraint = ?entry.constraint,
                phase = ?self.phase,
                "parameter constraint violated; value unchanged"
            );
            return false;
        }
        entry.value = value;
        true
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name).map(|e| &e.value)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ParamValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParamValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Applies a line-oriented `key=value` config file's contents. Blank
    /// lines and lines starting with `#` are ignored. Each assignment goes
    /// through the same constraint filter as [`ConfigStore::set`]; a
    /// rejected line is logged and skipped rather than aborting the whole
    /// file.
    pub fn apply_file_contents(&mut self, contents: &str) {
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, raw_value)) = line.split_once('=') else {
                warn!(line = lineno + 1, "ignoring malformed config line");
                continue;
            };
            let key = key.trim();
            let raw_value = raw_value.trim();
            let value = self.coerce(key, raw_value);
            if !self.set(key, value) {
                warn!(line = lineno + 1, parameter = key, "config line rejected");
            }
        }
    }

    /// Parses a `key=value` CLI `-c` flag the same way a config file line
    /// would be parsed, then applies it. Used to implement "multiple `-c`
    /// flags are applied after init, overriding file values" (§4.5).
    pub fn apply_cli_override(&mut self, assignment: &str) -> bool {
        let Some((key, raw_value)) = assignment.split_once('=') else {
            warn!(assignment, "malformed -c assignment, expected key=value");
            return false;
        };
        let key = key.trim();
        let raw_value = raw_value.trim();
        let value = self.coerce(key, raw_value);
        self.set(key, value)
    }

    /// Coerces a raw string to the already-registered type of `name`, or to
    /// `ParamValue::Str` if `name` is unknown (the eventual `set` call will
    /// reject unknown names).
    fn coerce(&self, name: &str, raw: &str) -> ParamValue {
        match self.entries.get(name).map(|e| &e.value) {
            Some(ParamValue::Int(_)) => raw.parse().map(ParamValue::Int).unwrap_or_else(|_| ParamValue::Str(raw.to_string())),
            Some(ParamValue::Bool(_)) => match raw {
                "1" | "true" | "T" | "t" => ParamValue::Bool(true),
                "0" | "false" | "F" | "f" => ParamValue::Bool(false),
                _ => ParamValue::Str(raw.to_string()),
            },
            Some(ParamValue::Double(_)) => raw.parse().map(ParamValue::Double).unwrap_or_else(|_| ParamValue::Str(raw.to_string())),
            _ => ParamValue::Str(raw.to_string()),
        }
    }

    /// Dumps all parameters in a stable, deterministic order (lexical by
    /// name, guaranteed by `BTreeMap` iteration) into `sink`, one
    /// `name\tvalue` line per parameter.
    pub fn print_variables(&self, sink: &mut String) {
        for (name, entry) in &self.entries {
            let _ = writeln!(sink, "{name}\t{}", entry.value);
        }
    }
}
