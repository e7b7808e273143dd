// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Component descriptor documents as fetched from a registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ComponentReference;

#[cfg(test)]
#[path = "./descriptor_test.rs"]
mod descriptor_test;

/// Schema metadata of a descriptor document.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorMeta {
    pub schema_version: String,
}

impl Default for DescriptorMeta {
    fn default() -> Self {
        Self {
            schema_version: "v2".to_string(),
        }
    }
}

/// Top level component descriptor document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComponentDescriptor {
    #[serde(default)]
    pub meta: DescriptorMeta,
    pub component: Component,
}

impl ComponentDescriptor {
    /// Parse a descriptor from JSON text.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reference of the component this descriptor describes.
    pub fn reference(&self) -> crate::Result<ComponentReference> {
        self.component.reference()
    }
}

/// Component metadata with its resources and outgoing references.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceEntry>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component_references: Vec<ComponentReferenceEntry>,
}

impl Component {
    pub fn reference(&self) -> crate::Result<ComponentReference> {
        ComponentReference::new(&self.name, &self.version)
    }
}

/// A named label with an arbitrary JSON value.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub value: serde_json::Value,
}

impl Label {
    pub fn new<N: Into<String>, V: Into<serde_json::Value>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One resource entry of a descriptor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub name: String,
    pub version: String,

    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
}

/// Access specification telling where a resource lives.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    #[serde(rename = "type")]
    pub access_type: String,

    /// Registry reference for `ociArtifact`/`ociRegistry` access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<String>,

    /// Blob digest for `localBlob` access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Outgoing reference to another component version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentReferenceEntry {
    pub name: String,
    pub component_name: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl ComponentReferenceEntry {
    pub fn reference(&self) -> crate::Result<ComponentReference> {
        ComponentReference::new(&self.component_name, &self.version)
    }
}

/// Identity of a locally fetched blob.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    pub name: String,
    pub version: String,
    pub resource_type: String,
}

impl BlobKey {
    pub fn new<N: Into<String>, V: Into<String>, T: Into<String>>(
        name: N,
        version: V,
        resource_type: T,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            resource_type: resource_type.into(),
        }
    }

    pub fn for_resource(resource: &ResourceEntry) -> Self {
        Self::new(&resource.name, &resource.version, &resource.resource_type)
    }
}

/// Raw blob contents keyed by the resource they belong to.
pub type Blobs = HashMap<BlobKey, Vec<u8>>;
