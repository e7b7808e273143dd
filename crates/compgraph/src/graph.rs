// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Thread-safe dependency graph of components.
//!
//! All state lives behind one lock and is only reachable through composite
//! operations, so a caller can never observe a half-merged descriptor.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::Mutex;

use crate::descriptor::{Blobs, ComponentDescriptor};
use crate::extract::{ExtractedComponent, extract};
use crate::model::{Dependency, Dependent, MappedImage, Resource};
use crate::output::ComponentInventory;
use crate::{ComponentReference, Error};

#[cfg(test)]
#[path = "./graph_test.rs"]
mod graph_test;

/// Dependency graph populated by a walk and queried afterwards.
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) state: Mutex<GraphState>,
}

#[derive(Debug, Default)]
pub(crate) struct GraphState {
    /// Who depends on each known component. Keys are the known components.
    pub(crate) dependents: BTreeMap<ComponentReference, BTreeSet<Dependent>>,
    /// Outgoing edges; a merged component's self-edge comes first.
    pub(crate) dependencies: HashMap<ComponentReference, Vec<Dependency>>,
    pub(crate) resources: HashMap<ComponentReference, Vec<Resource>>,
    pub(crate) mapped_images: HashMap<ComponentReference, Vec<MappedImage>>,
    pub(crate) application_image_source: Option<ComponentReference>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched descriptor's resources and own image sources.
    ///
    /// Merging the same component again replaces what was recorded before.
    pub fn merge_descriptor(
        &self,
        descriptor: &ComponentDescriptor,
        blobs: &Blobs,
    ) -> crate::Result<()> {
        let extracted = extract(descriptor, blobs)?;
        self.state.lock().merge(&extracted)
    }

    /// Mark `component` as a walk root, whether or not it is known yet.
    ///
    /// Roots are registered before walking so the marker does not depend on
    /// which root happens to be merged first.
    pub fn add_root(&self, component: &ComponentReference) {
        self.state
            .lock()
            .dependents
            .entry(component.clone())
            .or_default()
            .insert(Dependent::Root);
    }

    /// Record that `parent` depends on `dependency.component`.
    ///
    /// Returns true only the first time the target is seen at all, which is
    /// the caller's cue to expand it. Self-loops are dropped.
    pub fn add_edge(&self, parent: &ComponentReference, dependency: Dependency) -> bool {
        self.state.lock().add_edge(parent, dependency)
    }

    /// Merge a descriptor and add one edge per distinct referenced component.
    ///
    /// Returns the referenced components that were seen for the first time.
    pub fn merge_descriptor_and_discover_edges(
        &self,
        descriptor: &ComponentDescriptor,
        blobs: &Blobs,
    ) -> crate::Result<Vec<ComponentReference>> {
        let extracted = extract(descriptor, blobs)?;
        let mut state = self.state.lock();
        state.merge(&extracted)?;

        let mut discovered = Vec::new();
        for dependency in &extracted.references {
            let target = dependency.component.clone();
            if state.add_edge(&extracted.reference, dependency.clone()) {
                discovered.push(target);
            }
        }
        tracing::debug!(
            component = %extracted.reference,
            edges = extracted.references.len(),
            discovered = discovered.len(),
            "merged descriptor"
        );
        Ok(discovered)
    }

    /// All known components, sorted.
    pub fn components(&self) -> Vec<ComponentReference> {
        self.state.lock().dependents.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().dependents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_known(&self, component: &ComponentReference) -> bool {
        self.state.lock().dependents.contains_key(component)
    }

    /// Resources extracted from the component's descriptor.
    pub fn resources(&self, component: &ComponentReference) -> Vec<Resource> {
        self.state
            .lock()
            .resources
            .get(component)
            .cloned()
            .unwrap_or_default()
    }

    /// Direct dependents of a component, roots first.
    pub fn dependents(&self, component: &ComponentReference) -> Vec<Dependent> {
        self.state
            .lock()
            .dependents
            .get(component)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Outgoing edges of a component, its self-edge first.
    pub fn dependencies(&self, component: &ComponentReference) -> Vec<Dependency> {
        self.state
            .lock()
            .dependencies
            .get(component)
            .cloned()
            .unwrap_or_default()
    }

    /// Components that were merged as walk roots.
    pub fn roots(&self) -> Vec<ComponentReference> {
        self.state
            .lock()
            .dependents
            .iter()
            .filter(|(_, dependents)| dependents.contains(&Dependent::Root))
            .map(|(component, _)| component.clone())
            .collect()
    }

    /// The component labeled as the application image source, if any.
    pub fn application_image_source(&self) -> Option<ComponentReference> {
        self.state.lock().application_image_source.clone()
    }

    pub fn mapped_images(&self, component: &ComponentReference) -> Vec<MappedImage> {
        self.state
            .lock()
            .mapped_images
            .get(component)
            .cloned()
            .unwrap_or_default()
    }

    /// Known component names with every version seen for each.
    pub fn component_inventory(&self) -> ComponentInventory {
        let state = self.state.lock();
        ComponentInventory::from_references(state.dependents.keys())
    }
}

impl GraphState {
    fn merge(&mut self, extracted: &ExtractedComponent) -> crate::Result<()> {
        let component = &extracted.reference;

        if extracted.application_image_source {
            match &self.application_image_source {
                Some(existing) if existing != component => {
                    return Err(Error::DuplicateApplicationImageSource {
                        existing: existing.clone(),
                        conflicting: component.clone(),
                    });
                }
                _ => self.application_image_source = Some(component.clone()),
            }
        }

        let self_edge = Dependency {
            component: component.clone(),
            image_sources: extracted.image_sources.clone(),
        };
        let edges = self.dependencies.entry(component.clone()).or_default();
        match edges.iter_mut().find(|edge| &edge.component == component) {
            Some(existing) => *existing = self_edge,
            None => edges.insert(0, self_edge),
        }

        self.resources
            .insert(component.clone(), extracted.resources.clone());
        if extracted.mapped_images.is_empty() {
            self.mapped_images.remove(component);
        } else {
            self.mapped_images
                .insert(component.clone(), extracted.mapped_images.clone());
        }

        self.dependents
            .entry(component.clone())
            .or_insert_with(|| BTreeSet::from([Dependent::Root]));
        Ok(())
    }

    fn add_edge(&mut self, parent: &ComponentReference, dependency: Dependency) -> bool {
        let target = dependency.component.clone();
        if &target == parent {
            tracing::trace!(component = %parent, "dropping self reference");
            return false;
        }

        let edges = self.dependencies.entry(parent.clone()).or_default();
        match edges.iter_mut().find(|edge| edge.component == target) {
            Some(existing) => *existing = dependency,
            None => edges.push(dependency),
        }

        let dependent = Dependent::Component(parent.clone());
        match self.dependents.get_mut(&target) {
            Some(dependents) => {
                dependents.insert(dependent);
                false
            }
            None => {
                tracing::trace!(component = %target, parent = %parent, "discovered component");
                self.dependents.insert(target, BTreeSet::from([dependent]));
                true
            }
        }
    }
}
