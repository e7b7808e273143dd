// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

use rstest::rstest;

use super::*;
use crate::model::{Resource, ResourceType};
use crate::test_support::reference;

#[rstest]
fn test_inventory_groups_and_sorts_versions() {
    let refs = vec![
        reference("acme/b:2.0.0"),
        reference("acme/a:1.1.0"),
        reference("acme/b:1.0.0"),
        reference("acme/a:1.0.0"),
        reference("acme/a:1.0.0"),
    ];
    let inventory = ComponentInventory::from_references(&refs);

    assert_eq!(inventory.len(), 2);
    assert_eq!(inventory.components["acme/a"], vec!["1.0.0", "1.1.0"]);
    assert_eq!(inventory.components["acme/b"], vec!["1.0.0", "2.0.0"]);
}

#[rstest]
fn test_inventory_yaml_is_a_plain_mapping() {
    let refs = vec![reference("acme/a:1.0.0")];
    let yaml = render_yaml(&ComponentInventory::from_references(&refs)).unwrap();
    assert!(!yaml.contains("components"));

    let back: BTreeMap<String, Vec<String>> = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back["acme/a"], vec!["1.0.0"]);
}

#[rstest]
fn test_image_vector_yaml_uses_camel_case() {
    let vector = ImageVector::new(vec![ImageSource {
        name: "hyperkube".to_string(),
        repository: Some("registry.acme.io/hyperkube".to_string()),
        tag: Some("v1.30.1".to_string()),
        version: Some("1.30.1".to_string()),
        target_version: Some("1.30.1".to_string()),
        ..Default::default()
    }]);
    let yaml = render_yaml(&vector).unwrap();

    assert!(yaml.contains("targetVersion: 1.30.1"));
    assert!(!yaml.contains("ref:"));
    assert!(!yaml.contains("labels"));

    let back: ImageVector = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, vector);
}

#[rstest]
fn test_resource_type_serializes_to_wire_names() {
    let resource = Resource {
        name: "chart".to_string(),
        version: "1.0.0".to_string(),
        resource_type: ResourceType::HelmChart,
        value: "registry.acme.io/charts/app:1.0.0".to_string(),
    };
    let yaml = render_yaml(&vec![resource]).unwrap();
    assert!(yaml.contains("type: helmChart/v1"));
}
