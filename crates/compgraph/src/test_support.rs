// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Descriptor builders shared by unit tests.

use serde_json::json;

use crate::descriptor::{
    Access, Component, ComponentDescriptor, ComponentReferenceEntry, Label, ResourceEntry,
};
use crate::labels;
use crate::model::{HELM_CHART, OCI_IMAGE};
use crate::ComponentReference;

pub fn reference(value: &str) -> ComponentReference {
    value.parse().expect("valid test reference")
}

pub fn descriptor(name: &str, version: &str) -> ComponentDescriptor {
    ComponentDescriptor {
        component: Component {
            name: name.to_string(),
            version: version.to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn oci_access(image_reference: &str) -> Option<Access> {
    Some(Access {
        access_type: "ociArtifact".to_string(),
        image_reference: Some(image_reference.to_string()),
        ..Default::default()
    })
}

/// An `ociImage` resource with an explicit image vector name.
pub fn named_image(name: &str, version: &str, image_reference: &str) -> ResourceEntry {
    ResourceEntry {
        labels: vec![Label::new(labels::NAME, name)],
        ..lookup_image(name, version, image_reference)
    }
}

/// An `ociImage` resource without a name label.
pub fn lookup_image(resource_name: &str, version: &str, image_reference: &str) -> ResourceEntry {
    ResourceEntry {
        name: resource_name.to_string(),
        version: version.to_string(),
        resource_type: OCI_IMAGE.to_string(),
        access: oci_access(image_reference),
        ..Default::default()
    }
}

pub fn helm_chart(name: &str, version: &str, image_reference: &str) -> ResourceEntry {
    ResourceEntry {
        name: name.to_string(),
        version: version.to_string(),
        resource_type: HELM_CHART.to_string(),
        access: oci_access(image_reference),
        ..Default::default()
    }
}

pub fn component_ref(name: &str, version: &str) -> ComponentReferenceEntry {
    ComponentReferenceEntry {
        name: name.replace('/', "-"),
        component_name: name.to_string(),
        version: version.to_string(),
        labels: Vec::new(),
    }
}

/// A component reference taking `(image name, resource name)` pairs from the target.
pub fn component_ref_with_images(
    name: &str,
    version: &str,
    images: &[(&str, &str)],
) -> ComponentReferenceEntry {
    let images: Vec<serde_json::Value> = images
        .iter()
        .map(|(image, resource)| json!({ "name": image, "resourceId": { "name": resource } }))
        .collect();
    ComponentReferenceEntry {
        labels: vec![Label::new(labels::IMAGES, json!({ "images": images }))],
        ..component_ref(name, version)
    }
}
