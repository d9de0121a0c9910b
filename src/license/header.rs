//! License header templates
//!
//! A header is fixed text with `${name}` placeholder tokens plus a property
//! map. Rendering is plain substitution; every token must have a property.
//! Whitespace inside the braces is ignored, so `${ year }` names `year`.

use chrono::Datelike;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Property bound to the build's execution year
pub const YEAR_PROPERTY: &str = "year";

/// Header written by `init` next to a fresh configuration
pub const DEFAULT_TEMPLATE: &str = "\
Copyright ${year} ${author}

Licensed under the Apache License, Version 2.0 (the \"License\");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an \"AS IS\" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
";

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\$\{\s*([^}]*?)\s*\}").expect("placeholder pattern is valid");
    static ref PLACEHOLDER_NAME: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("placeholder name pattern is valid");
}

/// Errors raised while rendering a header template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LicenseError {
    #[error("unresolved placeholder '${{{placeholder}}}'")]
    UnresolvedPlaceholder { placeholder: String },
}

/// Header template with its substitution properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseHeader {
    pub template: String,
    pub properties: BTreeMap<String, String>,
}

impl LicenseHeader {
    /// Create a header with `year` bound to the current local year
    pub fn new(template: impl Into<String>) -> Self {
        Self::with_year(template, chrono::Local::now().year())
    }

    /// Create a header with a fixed `year`
    ///
    /// # Examples
    ///
    /// ```
    /// use build_propagator::license::LicenseHeader;
    ///
    /// let header = LicenseHeader::with_year("Copyright ${year} Example", 2024);
    /// assert_eq!(header.render().unwrap(), "Copyright 2024 Example");
    /// ```
    pub fn with_year(template: impl Into<String>, year: i32) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert(YEAR_PROPERTY.to_string(), year.to_string());
        Self {
            template: template.into(),
            properties,
        }
    }

    /// Add or replace a property, returning the header for chaining
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Placeholder names used by the template, in order of first appearance
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&self.template) {
            let name = &caps[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Render with the header's own properties
    pub fn render(&self) -> Result<String, LicenseError> {
        render(&self.template, &self.properties)
    }

    /// Render with extra properties layered over the header's own
    pub fn render_with(&self, overlay: &BTreeMap<String, String>) -> Result<String, LicenseError> {
        if overlay.is_empty() {
            return self.render();
        }

        let mut properties = self.properties.clone();
        properties.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        render(&self.template, &properties)
    }
}

/// Substitute every `${name}` token in `template` from `properties`
///
/// Fails on the first token without a property.
///
/// # Examples
///
/// ```
/// use build_propagator::license::{render, LicenseError};
/// use std::collections::BTreeMap;
///
/// let mut properties = BTreeMap::new();
/// properties.insert("year".to_string(), "2024".to_string());
///
/// assert_eq!(render("(c) ${year}", &properties).unwrap(), "(c) 2024");
/// assert_eq!(
///     render("(c) ${year} ${owner}", &properties),
///     Err(LicenseError::UnresolvedPlaceholder { placeholder: "owner".to_string() })
/// );
/// ```
pub fn render(template: &str, properties: &BTreeMap<String, String>) -> Result<String, LicenseError> {
    if let Some(caps) = PLACEHOLDER.captures_iter(template).find(|caps| {
        let name = &caps[1];
        !PLACEHOLDER_NAME.is_match(name) || !properties.contains_key(name)
    }) {
        return Err(LicenseError::UnresolvedPlaceholder {
            placeholder: caps[1].to_string(),
        });
    }

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        properties
            .get(&caps[1])
            .cloned()
            .unwrap_or_default()
    });

    Ok(rendered.into_owned())
}
