// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Component references of the form `name:version`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

#[cfg(test)]
#[path = "./reference_test.rs"]
mod reference_test;

/// Identifies one version of a component, canonically `<name>:<version>`.
///
/// The name may itself contain slashes (`github.com/acme/app`) but never a
/// colon, so the text always splits into exactly two parts on the first `:`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentReference {
    value: String,
    split: usize,
}

impl ComponentReference {
    /// Build a reference from its name and version.
    pub fn new<N: AsRef<str>, V: AsRef<str>>(name: N, version: V) -> crate::Result<Self> {
        format!("{}:{}", name.as_ref(), version.as_ref()).parse()
    }

    pub fn name(&self) -> &str {
        &self.value[..self.split]
    }

    pub fn version(&self) -> &str {
        &self.value[self.split + 1..]
    }

    /// Split into `(name, version)`.
    pub fn split(&self) -> (&str, &str) {
        (self.name(), self.version())
    }

    /// Whether this reference points at any version of `name`.
    pub fn has_name(&self, name: &str) -> bool {
        self.name() == name
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Flat file name for this reference, eg `github.com_acme_app-1.0.0.json`.
    pub fn filename(&self) -> String {
        format!("{}.json", self.value.replace('/', "_").replace(':', "-"))
    }
}

impl FromStr for ComponentReference {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let Some(split) = s.find(':') else {
            return Err(Error::InvalidReference(s.to_string()));
        };
        let (name, version) = (&s[..split], &s[split + 1..]);
        if name.is_empty() || version.is_empty() || version.contains(':') {
            return Err(Error::InvalidReference(s.to_string()));
        }
        Ok(Self {
            value: s.to_string(),
            split,
        })
    }
}

impl fmt::Display for ComponentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl Serialize for ComponentReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de> Deserialize<'de> for ComponentReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
