use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: json5::Error,
    },
    #[error("Unknown culture '{0}' (expected one of: invariant, en-US, en-GB, de-DE, fr-FR)")]
    UnknownCulture(String),
}

/// Order of the day, month and year fields in a culture's short date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Dmy,
    Mdy,
    Ymd,
}

/// Number and date conventions used when parsing filter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Culture {
    name: &'static str,
    decimal_separator: char,
    group_separator: char,
    date_order: DateOrder,
    date_separator: char,
}

const CULTURES: &[Culture] = &[
    Culture {
        name: "invariant",
        decimal_separator: '.',
        group_separator: ',',
        date_order: DateOrder::Mdy,
        date_separator: '/',
    },
    Culture {
        name: "en-US",
        decimal_separator: '.',
        group_separator: ',',
        date_order: DateOrder::Mdy,
        date_separator: '/',
    },
    Culture {
        name: "en-GB",
        decimal_separator: '.',
        group_separator: ',',
        date_order: DateOrder::Dmy,
        date_separator: '/',
    },
    Culture {
        name: "de-DE",
        decimal_separator: ',',
        group_separator: '.',
        date_order: DateOrder::Dmy,
        date_separator: '.',
    },
    Culture {
        name: "fr-FR",
        decimal_separator: ',',
        group_separator: '\u{202f}',
        date_order: DateOrder::Dmy,
        date_separator: '/',
    },
];

impl Culture {
    pub fn invariant() -> Self {
        CULTURES[0].clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    pub fn group_separator(&self) -> char {
        self.group_separator
    }

    pub fn date_order(&self) -> DateOrder {
        self.date_order
    }

    pub fn date_separator(&self) -> char {
        self.date_separator
    }

    /// chrono format string for the culture's short date.
    pub fn short_date_format(&self) -> String {
        let sep = self.date_separator;
        match self.date_order {
            DateOrder::Dmy => format!("%d{sep}%m{sep}%Y"),
            DateOrder::Mdy => format!("%m{sep}%d{sep}%Y"),
            DateOrder::Ymd => format!("%Y{sep}%m{sep}%d"),
        }
    }

    /// Rewrites culture-formatted number text into the invariant form
    /// (`-1234.5`), or `None` if it contains anything but a number.
    pub fn normalize_number(&self, text: &str) -> Option<String> {
        let mut normalized = String::with_capacity(text.len());
        for c in text.trim().chars() {
            if c == self.group_separator
                || (self.group_separator.is_whitespace() && c.is_whitespace())
            {
                continue;
            }
            if c == self.decimal_separator {
                normalized.push('.');
            } else if c.is_ascii_digit() || matches!(c, '+' | '-' | 'e' | 'E') {
                normalized.push(c);
            } else {
                return None;
            }
        }
        (!normalized.is_empty()).then_some(normalized)
    }
}

impl Default for Culture {
    fn default() -> Self {
        Self::invariant()
    }
}

impl FromStr for Culture {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.is_empty() {
            return Ok(Self::invariant());
        }
        CULTURES
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| ConfigError::UnknownCulture(s.to_string()))
    }
}

impl TryFrom<String> for Culture {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl<'de> Deserialize<'de> for Culture {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Culture::try_from(name).map_err(de::Error::custom)
    }
}

impl From<Culture> for String {
    fn from(value: Culture) -> Self {
        value.name.to_string()
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Options threaded through every filter parse and compile call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterConfiguration {
    culture: Culture,
    /// Drop values that fail to parse instead of raising.
    ignore_parse_exceptions: bool,
}

impl FilterConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    pub fn with_ignore_parse_exceptions(mut self, ignore: bool) -> Self {
        self.ignore_parse_exceptions = ignore;
        self
    }

    pub fn culture(&self) -> &Culture {
        &self.culture
    }

    pub fn ignore_parse_exceptions(&self) -> bool {
        self.ignore_parse_exceptions
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FilterConfiguration, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_configuration().as_ref().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FilterConfiguration, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    json5::from_str::<FilterConfiguration>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_configuration() -> Arc<FilterConfiguration> {
    static DEFAULT_CONFIGURATION: LazyLock<Arc<FilterConfiguration>> =
        LazyLock::new(|| Arc::new(FilterConfiguration::default()));
    DEFAULT_CONFIGURATION.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_culture_lookup_is_case_insensitive() {
        let culture: Culture = "DE-de".parse().unwrap();
        assert_eq!(culture.name(), "de-DE");
        assert_eq!(culture.short_date_format(), "%d.%m.%Y");
        assert!("xx-XX".parse::<Culture>().is_err());
    }

    #[test]
    fn test_normalize_number_per_culture() {
        let de: Culture = "de-DE".parse().unwrap();
        assert_eq!(de.normalize_number("-1.234,5"), Some("-1234.5".to_string()));
        assert_eq!(de.normalize_number("abc"), None);

        let fr: Culture = "fr-FR".parse().unwrap();
        assert_eq!(fr.normalize_number("1 234,5"), Some("1234.5".to_string()));

        let invariant = Culture::invariant();
        assert_eq!(invariant.normalize_number("1,000.25"), Some("1000.25".to_string()));
        assert_eq!(invariant.normalize_number(""), None);
    }

    #[test]
    fn test_default_configuration_is_shared() {
        let a = default_configuration();
        let b = default_configuration();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.culture().name(), "invariant");
        assert!(!a.ignore_parse_exceptions());
    }

    #[test]
    fn test_load_config_from_json5_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "{{ culture: 'de-DE', ignore_parse_exceptions: true, // lenient\n}}"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.culture().name(), "de-DE");
        assert!(config.ignore_parse_exceptions());
    }

    #[test]
    fn test_configuration_deserializes_from_owned_text() {
        let raw = String::from(r#"{ "culture": "fr-FR" }"#);
        let config: FilterConfiguration = serde_json::from_str(&raw).unwrap();
        drop(raw);
        assert_eq!(config.culture().name(), "fr-FR");
        assert!(!config.ignore_parse_exceptions());

        let written = serde_json::to_string(&config).unwrap();
        assert!(written.contains(r#""culture":"fr-FR""#));
    }

    #[test]
    fn test_load_config_reports_unknown_culture() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ culture: 'tlh' }}").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
