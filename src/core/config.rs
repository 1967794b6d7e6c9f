//! Loader configuration for the native mapping API
//!
//! `LoaderOptions` describes how the Maps JavaScript API is bootstrapped:
//! which key, which optional libraries, which release channel. The same value
//! tells a backend which optional capabilities it may assume, so overlays that
//! depend on an optional library (the drawing manager) can fail fast when it
//! was not requested.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::{constants, MapError, Result};

/// Everything outside the RFC 3986 unreserved set is escaped, except the
/// comma that list-valued parameters rely on
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b',');

/// Optional libraries that must be requested when the API is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Library {
    Drawing,
    Geometry,
    LocalContext,
    Marker,
    Places,
    Visualization,
}

impl Library {
    pub fn as_str(&self) -> &'static str {
        match self {
            Library::Drawing => "drawing",
            Library::Geometry => "geometry",
            Library::LocalContext => "localContext",
            Library::Marker => "marker",
            Library::Places => "places",
            Library::Visualization => "visualization",
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release channel of the API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiVersion {
    #[default]
    Weekly,
    Quarterly,
    Beta,
    Alpha,
    /// A pinned release such as `"3.55"`
    Pinned(String),
}

impl ApiVersion {
    pub fn as_str(&self) -> &str {
        match self {
            ApiVersion::Weekly => "weekly",
            ApiVersion::Quarterly => "quarterly",
            ApiVersion::Beta => "beta",
            ApiVersion::Alpha => "alpha",
            ApiVersion::Pinned(version) => version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
    pub api_key: String,
    pub libraries: Vec<Library>,
    pub version: ApiVersion,
    pub language: Option<String>,
    pub region: Option<String>,
    pub map_ids: Vec<String>,
    pub channel: Option<String>,
    /// Global name of the InfoBox add-on's constructor
    pub infobox_constructor: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            libraries: Vec::new(),
            version: ApiVersion::default(),
            language: None,
            region: None,
            map_ids: Vec::new(),
            channel: None,
            infobox_constructor: constants::DEFAULT_INFOBOX_CONSTRUCTOR.to_string(),
        }
    }
}

impl LoaderOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_library(mut self, library: Library) -> Self {
        if !self.libraries.contains(&library) {
            self.libraries.push(library);
        }
        self
    }

    pub fn with_version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Parses and validates options from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: LoaderOptions = serde_json::from_str(json)
            .map_err(|e| MapError::ParseError(format!("Invalid loader options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(MapError::Config("api key must not be empty".to_string()));
        }

        for (index, library) in self.libraries.iter().enumerate() {
            if self.libraries[..index].contains(library) {
                return Err(MapError::Config(format!(
                    "library `{}` listed more than once",
                    library
                )));
            }
        }

        if self.infobox_constructor.trim().is_empty() {
            return Err(MapError::Config(
                "infobox constructor name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn has_library(&self, library: Library) -> bool {
        self.libraries.contains(&library)
    }

    /// Bootstrap URL of the API script, invoking `callback` once loaded
    pub fn script_url(&self, callback: &str) -> String {
        let mut params: Vec<(&str, String)> = vec![("key", self.api_key.clone())];

        if !self.libraries.is_empty() {
            let libraries: Vec<&str> = self.libraries.iter().map(Library::as_str).collect();
            params.push(("libraries", libraries.join(",")));
        }

        params.push(("v", self.version.as_str().to_string()));

        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }
        if !self.map_ids.is_empty() {
            params.push(("map_ids", self.map_ids.join(",")));
        }
        if let Some(channel) = &self.channel {
            params.push(("channel", channel.clone()));
        }

        params.push(("callback", callback.to_string()));

        let query: Vec<String> = params
            .iter()
            .map(|(name, value)| format!("{}={}", name, utf8_percent_encode(value, QUERY_VALUE)))
            .collect();

        format!("{}?{}", constants::MAPS_SCRIPT_BASE_URL, query.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = LoaderOptions::default();
        assert_eq!(options.version, ApiVersion::Weekly);
        assert!(options.libraries.is_empty());
        assert_eq!(options.infobox_constructor, "InfoBox");
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_with_library_deduplicates() {
        let options = LoaderOptions::new("key")
            .with_library(Library::Drawing)
            .with_library(Library::Drawing)
            .with_library(Library::Places);
        assert_eq!(options.libraries, vec![Library::Drawing, Library::Places]);
        assert!(options.has_library(Library::Drawing));
        assert!(!options.has_library(Library::Geometry));
    }

    #[test]
    fn test_validate_rejects_duplicate_libraries() {
        let mut options = LoaderOptions::new("key");
        options.libraries = vec![Library::Drawing, Library::Drawing];
        assert!(matches!(options.validate(), Err(MapError::Config(_))));
    }

    #[test]
    fn test_from_json_str() {
        let options = LoaderOptions::from_json_str(
            r#"{ "apiKey": "abc", "libraries": ["drawing", "localContext"], "version": "beta" }"#,
        )
        .unwrap();
        assert_eq!(options.api_key, "abc");
        assert_eq!(
            options.libraries,
            vec![Library::Drawing, Library::LocalContext]
        );
        assert_eq!(options.version, ApiVersion::Beta);

        let pinned = LoaderOptions::from_json_str(r#"{ "apiKey": "abc", "version": { "pinned": "3.55" } }"#)
            .unwrap();
        assert_eq!(pinned.version.as_str(), "3.55");

        assert!(matches!(
            LoaderOptions::from_json_str("{ not json"),
            Err(MapError::ParseError(_))
        ));
        assert!(matches!(
            LoaderOptions::from_json_str(r#"{ "libraries": [] }"#),
            Err(MapError::Config(_))
        ));
    }

    #[test]
    fn test_script_url() {
        let options = LoaderOptions::new("my key")
            .with_library(Library::Drawing)
            .with_library(Library::Places)
            .with_language("en")
            .with_region("GB");
        let url = options.script_url("initMap");
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/js?key=my%20key&libraries=drawing,places\
             &v=weekly&language=en&region=GB&callback=initMap"
        );
    }

    #[test]
    fn test_script_url_escapes_reserved_characters() {
        let options = LoaderOptions::new("a&b=c/d~e").with_language("fr-CA");
        let url = options.script_url("cb.é");
        assert!(url.contains("key=a%26b%3Dc%2Fd~e&"));
        assert!(url.contains("language=fr-CA&"));
        assert!(url.ends_with("callback=cb.%C3%A9"));
    }

    #[test]
    fn test_script_url_minimal() {
        let url = LoaderOptions::new("k").script_url(constants::DEFAULT_LOADER_CALLBACK);
        assert_eq!(
            url,
            "https://maps.googleapis.com/maps/api/js?key=k&v=weekly&callback=__mapbridgeInit"
        );
    }
}
