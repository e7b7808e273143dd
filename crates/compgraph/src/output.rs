// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Artifacts handed to the manifest generation layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ComponentReference;
use crate::model::ImageSource;

#[cfg(test)]
#[path = "./output_test.rs"]
mod output_test;

/// Image vector document of one component.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ImageVector {
    pub images: Vec<ImageSource>,
}

impl ImageVector {
    pub fn new(images: Vec<ImageSource>) -> Self {
        Self { images }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Component names mapped to the sorted versions seen for each.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ComponentInventory {
    pub components: BTreeMap<String, Vec<String>>,
}

impl ComponentInventory {
    pub fn from_references<'a, I>(references: I) -> Self
    where
        I: IntoIterator<Item = &'a ComponentReference>,
    {
        let mut components: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for reference in references {
            components
                .entry(reference.name().to_string())
                .or_default()
                .push(reference.version().to_string());
        }
        for versions in components.values_mut() {
            versions.sort();
            versions.dedup();
        }
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Render any output artifact as YAML text.
pub fn render_yaml<T: Serialize>(value: &T) -> crate::Result<String> {
    Ok(serde_yaml::to_string(value)?)
}
