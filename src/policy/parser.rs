//! Inline cache-policy directive parsing
//!
//! A statement opts into caching with a leading comment directive:
//!
//! ```sql
//! -- cache-policy --> Sliding|00:05:00|tenant-42|false
//! SELECT * FROM [Users] WHERE [Id] = @p0
//! ```
//!
//! The payload is pipe-delimited with fixed positions: expiration mode,
//! duration (`HH:MM:SS` or integer seconds), salt, and a skip flag.
//! Trailing fields may be omitted and take defaults. A payload that cannot
//! be parsed is treated as "no directive", never as an error.

use std::time::Duration;

use tracing::debug;

use crate::dependencies::is_mutating_statement;

use super::CachePolicy;
use super::DEFAULT_CACHE_DURATION;
use super::ExpirationMode;

/// The comment tag that introduces a cache-policy directive.
pub const DIRECTIVE_TAG: &str = "-- cache-policy";

const DIRECTIVE_SEPARATOR: &str = "-->";
const PART_SEPARATOR: char = '|';

/// Parses per-statement cache policies from directive comments, falling
/// back to a configured default policy for plain read statements.
#[derive(Debug, Clone, Default)]
pub struct PolicyParser {
    default_policy: Option<CachePolicy>,
}

impl PolicyParser {
    /// Creates a parser with an optional default policy applied to
    /// directive-less read statements.
    pub fn new(default_policy: Option<CachePolicy>) -> Self {
        Self { default_policy }
    }

    /// Returns the policy governing a statement, or `None` when nothing
    /// should be cached and the result must pass through untouched.
    ///
    /// A directive takes precedence over the default policy. Mutating
    /// statements are never auto-cached by the default policy; they are
    /// still dependency-extracted for invalidation by the caller.
    pub fn parse(&self, text: &str) -> Option<CachePolicy> {
        if let Some(directive) = parse_directive(text) {
            if directive.skip {
                debug!("directive requested no caching for this statement");
                return None;
            }
            return Some(directive.policy);
        }

        match &self.default_policy {
            Some(default) if !is_mutating_statement(text) => Some(default.clone()),
            _ => None,
        }
    }
}

/// Removes the directive line from statement text.
///
/// The cleaned text feeds the key builder, so a statement hashes
/// identically whether or not it carried a directive.
pub fn strip_directive(text: &str) -> String {
    if !text.contains(DIRECTIVE_TAG) {
        return text.to_string();
    }
    text.lines()
        .filter(|line| !line.trim_start().starts_with(DIRECTIVE_TAG))
        .collect::<Vec<_>>()
        .join("\n")
}

struct ParsedDirective {
    policy: CachePolicy,
    skip: bool,
}

fn parse_directive(text: &str) -> Option<ParsedDirective> {
    let line = text
        .lines()
        .find(|line| line.trim_start().starts_with(DIRECTIVE_TAG))?;
    let payload = line
        .split_once(DIRECTIVE_SEPARATOR)
        .map(|(_, rest)| rest.trim())?;

    let mut parts = payload.split(PART_SEPARATOR).map(str::trim);

    let mode = match parts.next().filter(|p| !p.is_empty()) {
        Some(part) => parse_mode(part)?,
        None => ExpirationMode::default(),
    };
    let duration = match parts.next().filter(|p| !p.is_empty()) {
        Some(part) => parse_duration(part)?,
        None => DEFAULT_CACHE_DURATION,
    };
    let salt = parts.next().unwrap_or("").to_string();
    let skip = match parts.next().filter(|p| !p.is_empty()) {
        Some(part) => parse_bool(part)?,
        None => false,
    };

    Some(ParsedDirective {
        policy: CachePolicy {
            mode,
            duration,
            salt,
            ..CachePolicy::default()
        },
        skip,
    })
}

fn parse_mode(part: &str) -> Option<ExpirationMode> {
    match part.to_ascii_lowercase().as_str() {
        "absolute" => Some(ExpirationMode::Absolute),
        "sliding" => Some(ExpirationMode::Sliding),
        "neverremove" => Some(ExpirationMode::NeverRemove),
        "neverexpire" => Some(ExpirationMode::NeverExpire),
        _ => None,
    }
}

/// Accepts `HH:MM:SS` or a plain integer number of seconds.
fn parse_duration(part: &str) -> Option<Duration> {
    if let Ok(seconds) = part.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let mut fields = part.split(':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let seconds: u64 = fields.next()?.parse().ok()?;
    if fields.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

fn parse_bool(part: &str) -> Option<bool> {
    match part.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_directive() {
        let parser = PolicyParser::new(None);
        let text = "-- cache-policy --> Sliding|00:45:00|salty|false\nSELECT 1";
        let policy = parser.parse(text).unwrap();
        assert_eq!(policy.mode, ExpirationMode::Sliding);
        assert_eq!(policy.duration, Duration::from_secs(45 * 60));
        assert_eq!(policy.salt, "salty");
    }

    #[test]
    fn test_duration_in_plain_seconds() {
        let parser = PolicyParser::new(None);
        let policy = parser
            .parse("-- cache-policy --> Absolute|90\nSELECT 1")
            .unwrap();
        assert_eq!(policy.duration, Duration::from_secs(90));
    }

    #[test]
    fn test_omitted_trailing_fields_take_defaults() {
        let parser = PolicyParser::new(None);
        let policy = parser.parse("-- cache-policy --> Absolute\nSELECT 1").unwrap();
        assert_eq!(policy.duration, DEFAULT_CACHE_DURATION);
        assert_eq!(policy.salt, "");
    }

    #[test]
    fn test_skip_flag_disables_caching() {
        let parser = PolicyParser::new(None);
        assert!(parser
            .parse("-- cache-policy --> Absolute|60||true\nSELECT 1")
            .is_none());
    }

    #[test]
    fn test_garbage_payload_degrades_to_no_directive() {
        let parser = PolicyParser::new(None);
        assert!(parser.parse("-- cache-policy --> Banana|later\nSELECT 1").is_none());
    }

    #[test]
    fn test_no_directive_no_default_means_not_cacheable() {
        let parser = PolicyParser::new(None);
        assert!(parser.parse("SELECT 1").is_none());
    }

    #[test]
    fn test_default_policy_applies_to_reads_only() {
        let default = CachePolicy::absolute(Duration::from_secs(60));
        let parser = PolicyParser::new(Some(default.clone()));
        assert_eq!(parser.parse("SELECT * FROM [Users]"), Some(default));
        assert!(parser.parse("UPDATE [Users] SET [Name] = @p0").is_none());
    }

    #[test]
    fn test_directive_overrides_default() {
        let parser = PolicyParser::new(Some(CachePolicy::absolute(Duration::from_secs(60))));
        let policy = parser
            .parse("-- cache-policy --> Sliding|30\nSELECT 1")
            .unwrap();
        assert_eq!(policy.mode, ExpirationMode::Sliding);
    }

    #[test]
    fn test_strip_directive_removes_only_the_tag_line() {
        let text = "-- cache-policy --> Absolute|60\nSELECT 1\nFROM [Users]";
        assert_eq!(strip_directive(text), "SELECT 1\nFROM [Users]");
    }

    #[test]
    fn test_strip_directive_is_identity_without_tag() {
        assert_eq!(strip_directive("SELECT 1"), "SELECT 1");
    }
}
