// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Turns fetched descriptors into graph edges, resources and image sources.

use crate::descriptor::{BlobKey, Blobs, ComponentDescriptor, ComponentReferenceEntry, ResourceEntry};
use crate::labels::{self, ImagesLabel};
use crate::model::{
    Dependency, ExtendedImageSource, ImageBinding, ImageSource, MappedImage, Resource,
    ResourceType,
};
use crate::{ComponentReference, Error};

#[cfg(test)]
#[path = "./extract_test.rs"]
mod extract_test;

/// Everything the graph records about one descriptor.
#[derive(Debug, Clone)]
pub struct ExtractedComponent {
    pub reference: ComponentReference,
    pub resources: Vec<Resource>,
    /// The component's own image sources, carried on its self-edge.
    pub image_sources: Vec<ExtendedImageSource>,
    /// Outgoing edges, one per distinct target in declaration order.
    pub references: Vec<Dependency>,
    pub application_image_source: bool,
    pub mapped_images: Vec<MappedImage>,
}

/// Extract the graph model from a descriptor and its locally fetched blobs.
pub fn extract(descriptor: &ComponentDescriptor, blobs: &Blobs) -> crate::Result<ExtractedComponent> {
    let component = &descriptor.component;
    let reference = component.reference()?;

    let mut resources = Vec::new();
    let mut image_sources = Vec::new();
    for entry in &component.resources {
        let Some(resource_type) = ResourceType::parse(&entry.resource_type) else {
            tracing::trace!(%reference, resource = %entry.name, kind = %entry.resource_type, "ignoring resource");
            continue;
        };
        let resource = extract_resource(&reference, entry, resource_type, blobs)?;
        if resource_type == ResourceType::OciImage {
            image_sources.push(oci_image_source(&reference, entry, &resource.value)?);
        }
        resources.push(resource);
    }

    let mut references: Vec<Dependency> = Vec::new();
    for entry in &component.component_references {
        let target = entry.reference()?;
        let sources = reference_image_sources(&reference, entry, &target)?;
        match references.iter_mut().find(|dep| dep.component == target) {
            Some(existing) => existing.image_sources.extend(sources),
            None => references.push(Dependency {
                component: target,
                image_sources: sources,
            }),
        }
    }

    let application_image_source =
        labels::bool_value(&component.labels, labels::APPLICATION_IMAGE_SOURCE, &reference)?;
    let mapped_images: Vec<MappedImage> =
        labels::decode(&component.labels, labels::MAPPED_IMAGES, &reference)?.unwrap_or_default();

    Ok(ExtractedComponent {
        reference,
        resources,
        image_sources,
        references,
        application_image_source,
        mapped_images,
    })
}

fn extract_resource(
    component: &ComponentReference,
    entry: &ResourceEntry,
    resource_type: ResourceType,
    blobs: &Blobs,
) -> crate::Result<Resource> {
    let value = match resource_type {
        ResourceType::OciImage | ResourceType::HelmChart => entry
            .access
            .as_ref()
            .and_then(|access| access.image_reference.clone())
            .ok_or_else(|| Error::MissingImageReference {
                component: component.clone(),
                name: entry.name.clone(),
            })?,
        ResourceType::HelmChartImageMap => {
            let blob = blobs
                .get(&BlobKey::for_resource(entry))
                .ok_or_else(|| Error::MissingLocalBlob {
                    component: component.clone(),
                    name: entry.name.clone(),
                    version: entry.version.clone(),
                    resource_type: entry.resource_type.clone(),
                })?;
            String::from_utf8(blob.clone()).map_err(|_| Error::InvalidBlob {
                component: component.clone(),
                name: entry.name.clone(),
            })?
        }
    };

    Ok(Resource {
        name: entry.name.clone(),
        version: entry.version.clone(),
        resource_type,
        value,
    })
}

/// Build the image source declared by an `ociImage` resource.
fn oci_image_source(
    component: &ComponentReference,
    entry: &ResourceEntry,
    image_reference: &str,
) -> crate::Result<ExtendedImageSource> {
    let explicit_name = labels::string_value(&entry.labels, labels::NAME, component)?;
    let (repository, tag) = split_image_reference(image_reference);

    let binding = match explicit_name {
        Some(_) => ImageBinding::Direct,
        None => ImageBinding::LookupOnly,
    };

    let image = ImageSource {
        name: explicit_name.unwrap_or_else(|| entry.name.clone()),
        reference: Some(image_reference.to_string()),
        source_repository: labels::string_value(&entry.labels, labels::REPOSITORY, component)?,
        repository: Some(repository),
        tag,
        version: Some(entry.version.clone()),
        target_version: labels::string_value(&entry.labels, labels::TARGET_VERSION, component)?,
        labels: labels::find(&entry.labels, labels::CVE_CATEGORISATION)
            .cloned()
            .into_iter()
            .collect(),
    };

    Ok(ExtendedImageSource {
        image,
        binding,
        resource_name: Some(entry.name.clone()),
        original_ref: labels::string_value(&entry.labels, labels::ORIGINAL_REF, component)?,
    })
}

/// Image sources a component reference attributes to its edge.
fn reference_image_sources(
    component: &ComponentReference,
    entry: &ComponentReferenceEntry,
    target: &ComponentReference,
) -> crate::Result<Vec<ExtendedImageSource>> {
    let Some(label) = labels::decode::<ImagesLabel>(&entry.labels, labels::IMAGES, component)?
    else {
        return Ok(Vec::new());
    };

    label
        .images
        .into_iter()
        .map(|image| {
            let binding = match (&image.resource_id, &image.repository) {
                (Some(id), _) => ImageBinding::Referenced {
                    component: target.clone(),
                    lookup_name: id.name.clone(),
                },
                (None, Some(_)) => ImageBinding::Direct,
                (None, None) => {
                    return Err(Error::InvalidLabel {
                        component: component.clone(),
                        label: labels::IMAGES.to_string(),
                        reason: format!(
                            "image {:?} has neither a resourceId nor a repository",
                            image.name
                        ),
                    });
                }
            };
            Ok(ExtendedImageSource {
                image: ImageSource {
                    name: image.name,
                    reference: None,
                    source_repository: image.source_repository,
                    repository: image.repository,
                    tag: image.tag,
                    version: None,
                    target_version: image.target_version,
                    labels: image.labels,
                },
                binding,
                resource_name: None,
                original_ref: None,
            })
        })
        .collect()
}

/// Split an image reference into repository and tag.
///
/// The tag separator is the last `:` after the last `/`, so registry ports
/// stay part of the repository. Digest references yield no tag.
pub fn split_image_reference(reference: &str) -> (String, Option<String>) {
    if let Some((repository, _digest)) = reference.split_once('@') {
        return (repository.to_string(), None);
    }
    let name_start = reference.rfind('/').map_or(0, |pos| pos + 1);
    match reference[name_start..].rfind(':') {
        Some(pos) => {
            let split = name_start + pos;
            (
                reference[..split].to_string(),
                Some(reference[split + 1..].to_string()),
            )
        }
        None => (reference.to_string(), None),
    }
}
