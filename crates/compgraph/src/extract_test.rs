// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;
use serde_json::json;

use super::*;
use crate::descriptor::{Access, Label};
use crate::model::HELM_CHART_IMAGEMAP;
use crate::test_support::*;

fn imagemap_resource() -> ResourceEntry {
    ResourceEntry {
        name: "chart-imagemap".to_string(),
        version: "1.0.0".to_string(),
        resource_type: HELM_CHART_IMAGEMAP.to_string(),
        access: Some(Access {
            access_type: "localBlob".to_string(),
            local_reference: Some("sha256:abcd".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[rstest]
fn test_named_image_is_direct() {
    let mut desc = descriptor("acme/app", "1.0.0");
    let mut resource = named_image("app", "1.0.0", "registry.acme.io/app:1.0.0");
    resource.labels.extend([
        Label::new(labels::TARGET_VERSION, ">= 1.30"),
        Label::new(labels::REPOSITORY, "github.com/acme/app"),
        Label::new(labels::CVE_CATEGORISATION, json!({ "network_exposure": "public" })),
        Label::new(labels::ORIGINAL_REF, "docker.io/acme/app:1.0.0"),
    ]);
    desc.component.resources.push(resource);

    let extracted = extract(&desc, &Blobs::new()).expect("Should extract");
    assert_eq!(extracted.reference, reference("acme/app:1.0.0"));
    assert_eq!(extracted.resources.len(), 1);
    assert_eq!(extracted.resources[0].resource_type, ResourceType::OciImage);
    assert_eq!(extracted.resources[0].value, "registry.acme.io/app:1.0.0");

    let source = &extracted.image_sources[0];
    assert_eq!(source.binding, ImageBinding::Direct);
    assert_eq!(source.image.name, "app");
    assert_eq!(source.image.repository.as_deref(), Some("registry.acme.io/app"));
    assert_eq!(source.image.tag.as_deref(), Some("1.0.0"));
    assert_eq!(source.image.reference.as_deref(), Some("registry.acme.io/app:1.0.0"));
    assert_eq!(source.image.version.as_deref(), Some("1.0.0"));
    assert_eq!(source.image.target_version.as_deref(), Some(">= 1.30"));
    assert_eq!(source.image.source_repository.as_deref(), Some("github.com/acme/app"));
    assert_eq!(source.image.labels.len(), 1);
    assert_eq!(source.image.labels[0].name, labels::CVE_CATEGORISATION);
    assert_eq!(source.original_ref.as_deref(), Some("docker.io/acme/app:1.0.0"));
    assert_eq!(source.resource_name.as_deref(), Some("app"));
}

#[rstest]
fn test_unnamed_image_is_lookup_only() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component
        .resources
        .push(lookup_image("proxy-image", "2.0.0", "registry.acme.io/proxy:2.0.0"));

    let extracted = extract(&desc, &Blobs::new()).unwrap();
    let source = &extracted.image_sources[0];
    assert!(source.is_lookup_only());
    assert_eq!(source.image.name, "proxy-image");
    assert_eq!(source.effective_name(), "proxy-image");
}

#[rstest]
fn test_helm_chart_has_no_image_source() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component
        .resources
        .push(helm_chart("chart", "1.0.0", "registry.acme.io/charts/app:1.0.0"));

    let extracted = extract(&desc, &Blobs::new()).unwrap();
    assert!(extracted.image_sources.is_empty());
    assert_eq!(extracted.resources[0].resource_type, ResourceType::HelmChart);
    assert_eq!(extracted.resources[0].value, "registry.acme.io/charts/app:1.0.0");
}

#[rstest]
fn test_imagemap_reads_local_blob() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component.resources.push(imagemap_resource());
    let mut blobs = Blobs::new();
    blobs.insert(
        BlobKey::new("chart-imagemap", "1.0.0", HELM_CHART_IMAGEMAP),
        br#"{"app":{"repository":"image.repository"}}"#.to_vec(),
    );

    let extracted = extract(&desc, &blobs).unwrap();
    assert_eq!(extracted.resources[0].resource_type, ResourceType::HelmChartImageMap);
    assert_eq!(
        extracted.resources[0].value,
        r#"{"app":{"repository":"image.repository"}}"#
    );
}

#[rstest]
fn test_imagemap_without_blob_fails() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component.resources.push(imagemap_resource());

    match extract(&desc, &Blobs::new()) {
        Err(Error::MissingLocalBlob { name, resource_type, .. }) => {
            assert_eq!(name, "chart-imagemap");
            assert_eq!(resource_type, HELM_CHART_IMAGEMAP);
        }
        other => panic!("Expected MissingLocalBlob, got: {:?}", other),
    }
}

#[rstest]
fn test_imagemap_with_binary_blob_fails() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component.resources.push(imagemap_resource());
    let mut blobs = Blobs::new();
    blobs.insert(
        BlobKey::new("chart-imagemap", "1.0.0", HELM_CHART_IMAGEMAP),
        vec![0xff, 0xfe, 0x00],
    );

    assert!(matches!(extract(&desc, &blobs), Err(Error::InvalidBlob { .. })));
}

#[rstest]
fn test_missing_image_reference_fails() {
    let mut desc = descriptor("acme/app", "1.0.0");
    let mut resource = named_image("app", "1.0.0", "unused:1");
    resource.access = None;
    desc.component.resources.push(resource);

    assert!(matches!(
        extract(&desc, &Blobs::new()),
        Err(Error::MissingImageReference { .. })
    ));
}

#[rstest]
fn test_unknown_resource_types_are_ignored() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component.resources.push(ResourceEntry {
        name: "docs".to_string(),
        version: "1.0.0".to_string(),
        resource_type: "blob".to_string(),
        ..Default::default()
    });

    let extracted = extract(&desc, &Blobs::new()).unwrap();
    assert!(extracted.resources.is_empty());
    assert!(extracted.image_sources.is_empty());
}

#[rstest]
fn test_references_to_same_target_are_merged() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component.component_references.extend([
        component_ref_with_images("acme/dep", "0.3.0", &[("proxy", "proxy-image")]),
        component_ref("acme/other", "2.0.0"),
        component_ref_with_images("acme/dep", "0.3.0", &[("sidecar", "sidecar-image")]),
    ]);

    let extracted = extract(&desc, &Blobs::new()).unwrap();
    assert_eq!(extracted.references.len(), 2);
    let dep = &extracted.references[0];
    assert_eq!(dep.component, reference("acme/dep:0.3.0"));
    let names: Vec<&str> = dep.image_sources.iter().map(|s| s.image.name.as_str()).collect();
    assert_eq!(names, vec!["proxy", "sidecar"]);
    assert_eq!(
        dep.image_sources[0].binding,
        ImageBinding::Referenced {
            component: reference("acme/dep:0.3.0"),
            lookup_name: "proxy-image".to_string(),
        }
    );
    assert!(extracted.references[1].image_sources.is_empty());
}

#[rstest]
fn test_reference_image_with_repository_is_direct() {
    let mut desc = descriptor("acme/app", "1.0.0");
    let mut entry = component_ref("acme/dep", "0.3.0");
    entry.labels.push(Label::new(
        labels::IMAGES,
        json!({ "images": [ { "name": "busybox", "repository": "docker.io/library/busybox", "tag": "1.36" } ] }),
    ));
    desc.component.component_references.push(entry);

    let extracted = extract(&desc, &Blobs::new()).unwrap();
    let source = &extracted.references[0].image_sources[0];
    assert_eq!(source.binding, ImageBinding::Direct);
    assert_eq!(source.image.repository.as_deref(), Some("docker.io/library/busybox"));
    assert_eq!(source.image.tag.as_deref(), Some("1.36"));
}

#[rstest]
fn test_reference_image_without_source_fails() {
    let mut desc = descriptor("acme/app", "1.0.0");
    let mut entry = component_ref("acme/dep", "0.3.0");
    entry.labels.push(Label::new(
        labels::IMAGES,
        json!({ "images": [ { "name": "dangling" } ] }),
    ));
    desc.component.component_references.push(entry);

    assert!(matches!(
        extract(&desc, &Blobs::new()),
        Err(Error::InvalidLabel { .. })
    ));
}

#[rstest]
fn test_component_labels() {
    let mut desc = descriptor("acme/kubernetes", "1.0.0");
    desc.component.labels.extend([
        Label::new(labels::APPLICATION_IMAGE_SOURCE, true),
        Label::new(
            labels::MAPPED_IMAGES,
            json!([ { "repository": "registry.acme.io/hyperkube", "name": "hyperkube" } ]),
        ),
    ]);

    let extracted = extract(&desc, &Blobs::new()).unwrap();
    assert!(extracted.application_image_source);
    assert_eq!(
        extracted.mapped_images,
        vec![MappedImage {
            repository: "registry.acme.io/hyperkube".to_string(),
            name: "hyperkube".to_string(),
        }]
    );
}

#[rstest]
fn test_malformed_reference_fails() {
    let mut desc = descriptor("acme/app", "1.0.0");
    desc.component
        .component_references
        .push(component_ref("acme/dep", ""));

    assert!(matches!(
        extract(&desc, &Blobs::new()),
        Err(Error::InvalidReference(_))
    ));
}

#[rstest]
#[case("registry.acme.io/app:1.0.0", "registry.acme.io/app", Some("1.0.0"))]
#[case("localhost:5000/app:v2", "localhost:5000/app", Some("v2"))]
#[case("localhost:5000/app", "localhost:5000/app", None)]
#[case("app", "app", None)]
#[case("registry.acme.io/app@sha256:abcd", "registry.acme.io/app", None)]
fn test_split_image_reference(
    #[case] input: &str,
    #[case] repository: &str,
    #[case] tag: Option<&str>,
) {
    let (repo, t) = split_image_reference(input);
    assert_eq!(repo, repository);
    assert_eq!(t.as_deref(), tag);
}
