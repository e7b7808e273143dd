// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;

#[fixture]
fn component() -> ComponentReference {
    ComponentReference::new("acme/app", "1.0.0").unwrap()
}

#[rstest]
fn test_string_value(component: ComponentReference) {
    let labels = vec![Label::new(NAME, "app"), Label::new(TARGET_VERSION, 3)];
    assert_eq!(
        string_value(&labels, NAME, &component).unwrap(),
        Some("app".to_string())
    );
    assert_eq!(string_value(&labels, REPOSITORY, &component).unwrap(), None);
    match string_value(&labels, TARGET_VERSION, &component) {
        Err(Error::InvalidLabel { label, .. }) => assert_eq!(label, TARGET_VERSION),
        other => panic!("Expected InvalidLabel, got: {:?}", other),
    }
}

#[rstest]
#[case(json!(true), true)]
#[case(json!(false), false)]
#[case(json!("true"), true)]
#[case(json!("no"), false)]
fn test_bool_value(component: ComponentReference, #[case] value: serde_json::Value, #[case] expected: bool) {
    let labels = vec![Label::new(APPLICATION_IMAGE_SOURCE, value)];
    assert_eq!(
        bool_value(&labels, APPLICATION_IMAGE_SOURCE, &component).unwrap(),
        expected
    );
}

#[rstest]
fn test_bool_value_missing_is_false(component: ComponentReference) {
    assert!(!bool_value(&[], APPLICATION_IMAGE_SOURCE, &component).unwrap());
}

#[rstest]
fn test_decode_images_label(component: ComponentReference) {
    let labels = vec![Label::new(
        IMAGES,
        json!({
            "images": [
                { "name": "proxy", "resourceId": { "name": "proxy-image" }, "targetVersion": ">= 1.30" },
                { "name": "external", "repository": "docker.io/library/busybox", "tag": "1.36" }
            ]
        }),
    )];
    let decoded: ImagesLabel = decode(&labels, IMAGES, &component).unwrap().unwrap();
    assert_eq!(decoded.images.len(), 2);
    assert_eq!(
        decoded.images[0].resource_id.as_ref().map(|id| id.name.as_str()),
        Some("proxy-image")
    );
    assert_eq!(decoded.images[0].target_version.as_deref(), Some(">= 1.30"));
    assert_eq!(decoded.images[1].tag.as_deref(), Some("1.36"));
}

#[rstest]
fn test_decode_invalid_shape(component: ComponentReference) {
    let labels = vec![Label::new(IMAGES, json!({ "images": "nope" }))];
    let result: crate::Result<Option<ImagesLabel>> = decode(&labels, IMAGES, &component);
    assert!(matches!(result, Err(Error::InvalidLabel { .. })));
}
