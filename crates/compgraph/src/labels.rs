// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Descriptor labels consumed when building the graph.
//!
//! # Resource labels (`ociImage` resources)
//! - `imagevector.gardener.cloud/name` - logical image name
//! - `imagevector.gardener.cloud/repository` - source repository of the image
//! - `imagevector.gardener.cloud/target-version` - target version constraint
//! - `gardener.cloud/cve-categorisation` - passed through to the image vector
//! - `imagevector.gardener.cloud/original-ref` - image reference before rewriting
//!
//! # Component reference labels
//! - `imagevector.gardener.cloud/images` - images the referencing component
//!   takes from the referenced one
//!
//! # Component labels
//! - `imagevector.gardener.cloud/application-image-source` - marks the one
//!   component whose images back mapped image declarations
//! - `imagevector.gardener.cloud/mapped-images` - `{repository, name}` pairs
//!   re-exported from the application image source

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::descriptor::Label;
use crate::{ComponentReference, Error};

#[cfg(test)]
#[path = "./labels_test.rs"]
mod labels_test;

pub const NAME: &str = "imagevector.gardener.cloud/name";
pub const REPOSITORY: &str = "imagevector.gardener.cloud/repository";
pub const TARGET_VERSION: &str = "imagevector.gardener.cloud/target-version";
pub const CVE_CATEGORISATION: &str = "gardener.cloud/cve-categorisation";
pub const ORIGINAL_REF: &str = "imagevector.gardener.cloud/original-ref";
pub const IMAGES: &str = "imagevector.gardener.cloud/images";
pub const APPLICATION_IMAGE_SOURCE: &str = "imagevector.gardener.cloud/application-image-source";
pub const MAPPED_IMAGES: &str = "imagevector.gardener.cloud/mapped-images";

/// Find a label by name.
pub fn find<'a>(labels: &'a [Label], name: &str) -> Option<&'a Label> {
    labels.iter().find(|label| label.name == name)
}

/// Read a string-valued label, failing if it holds anything but a string.
pub fn string_value(
    labels: &[Label],
    name: &str,
    component: &ComponentReference,
) -> crate::Result<Option<String>> {
    match find(labels, name).map(|label| &label.value) {
        None => Ok(None),
        Some(serde_json::Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(Error::InvalidLabel {
            component: component.clone(),
            label: name.to_string(),
            reason: format!("expected a string, got {other}"),
        }),
    }
}

/// Read a boolean label; `"true"` strings are accepted as well.
pub fn bool_value(
    labels: &[Label],
    name: &str,
    component: &ComponentReference,
) -> crate::Result<bool> {
    match find(labels, name).map(|label| &label.value) {
        None => Ok(false),
        Some(serde_json::Value::Bool(value)) => Ok(*value),
        Some(serde_json::Value::String(value)) => Ok(value == "true"),
        Some(other) => Err(Error::InvalidLabel {
            component: component.clone(),
            label: name.to_string(),
            reason: format!("expected a boolean, got {other}"),
        }),
    }
}

/// Deserialize a structured label value.
pub fn decode<T: DeserializeOwned>(
    labels: &[Label],
    name: &str,
    component: &ComponentReference,
) -> crate::Result<Option<T>> {
    let Some(label) = find(labels, name) else {
        return Ok(None);
    };
    serde_json::from_value(label.value.clone())
        .map(Some)
        .map_err(|err| Error::InvalidLabel {
            component: component.clone(),
            label: name.to_string(),
            reason: err.to_string(),
        })
}

/// Value of the `images` label on a component reference.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImagesLabel {
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

/// One image a referencing component takes from a referenced component.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<ResourceId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

/// Resource identity inside the referenced component.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResourceId {
    pub name: String,
}
