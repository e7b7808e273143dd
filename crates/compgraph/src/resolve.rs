// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0

//! Image vector resolution over a walked graph.

use crate::graph::{Graph, GraphState};
use crate::model::{ExtendedImageSource, ImageBinding, ImageSource};
use crate::{ComponentReference, Error};

#[cfg(test)]
#[path = "./resolve_test.rs"]
mod resolve_test;

impl Graph {
    /// Compute the images `component` needs to deploy.
    ///
    /// Referenced images are looked up in the component they point at,
    /// mapped images are fanned out from the application image source and
    /// the result is sorted by name then target version. With
    /// `use_original_refs` images are reported at their pre-rewrite location.
    pub fn resolve_image_vector(
        &self,
        component: &ComponentReference,
        use_original_refs: bool,
    ) -> crate::Result<Vec<ImageSource>> {
        self.state
            .lock()
            .resolve_image_vector(component, use_original_refs)
    }
}

/// A resolved image together with where it lived before any registry rewrite.
struct ResolvedImage<'a> {
    image: ImageSource,
    original_ref: Option<&'a str>,
}

impl ResolvedImage<'_> {
    fn into_image(self, use_original_refs: bool) -> ImageSource {
        let mut image = self.image;
        if let Some(original) = self.original_ref.filter(|_| use_original_refs) {
            let (repository, tag) = match original.split_once(':') {
                Some((repository, tag)) => (repository, Some(tag.to_string())),
                None => (original, None),
            };
            image.repository = Some(repository.to_string());
            image.tag = tag;
            image.reference = None;
        }
        image
    }
}

impl GraphState {
    fn resolve_image_vector(
        &self,
        component: &ComponentReference,
        use_original_refs: bool,
    ) -> crate::Result<Vec<ImageSource>> {
        let mut resolved = self.resolve_edges(component)?;

        // Rules name the rewritten repository, so match before substituting
        // original references.
        if let Some(mapped) = self.mapped_images.get(component) {
            let source = self
                .application_image_source
                .as_ref()
                .ok_or_else(|| Error::MissingApplicationImageSource(component.clone()))?;
            let matrix = self.resolve_edges(source)?;
            for rule in mapped {
                let matching = matrix.iter().filter(|entry| {
                    entry.image.repository.as_deref() == Some(rule.repository.as_str())
                });
                for entry in matching {
                    resolved.push(ResolvedImage {
                        image: ImageSource {
                            name: rule.name.clone(),
                            target_version: entry.image.version.clone(),
                            ..entry.image.clone()
                        },
                        original_ref: entry.original_ref,
                    });
                }
            }
        }

        let mut images: Vec<ImageSource> = resolved
            .into_iter()
            .map(|entry| entry.into_image(use_original_refs))
            .collect();
        sort_images(&mut images);
        Ok(images)
    }

    /// Resolve the image sources on every outgoing edge of `component`.
    fn resolve_edges(
        &self,
        component: &ComponentReference,
    ) -> crate::Result<Vec<ResolvedImage<'_>>> {
        if !self.dependents.contains_key(component) {
            return Err(Error::UnknownComponent(component.clone()));
        }

        let mut images = Vec::new();
        let edges = self.dependencies.get(component).map(Vec::as_slice).unwrap_or_default();
        for edge in edges {
            for source in &edge.image_sources {
                let (mut image, original_ref) = match &source.binding {
                    ImageBinding::LookupOnly => continue,
                    ImageBinding::Direct => (source.image.clone(), source.original_ref.as_deref()),
                    ImageBinding::Referenced {
                        component: referenced,
                        lookup_name,
                    } => {
                        let found = self.lookup(component, referenced, lookup_name)?;
                        (adopt(source, found), found.original_ref.as_deref())
                    }
                };

                if image.repository.is_some() && image.tag.is_some() {
                    image.reference = None;
                }
                images.push(ResolvedImage {
                    image,
                    original_ref,
                });
            }
        }
        Ok(images)
    }

    /// Find the image source of `referenced` that `component` asks for by name.
    fn lookup<'a>(
        &'a self,
        component: &ComponentReference,
        referenced: &ComponentReference,
        lookup_name: &str,
    ) -> crate::Result<&'a ExtendedImageSource> {
        let candidates = self
            .dependencies
            .get(referenced)
            .and_then(|edges| edges.iter().find(|edge| &edge.component == referenced))
            .map(|edge| edge.image_sources.as_slice())
            .unwrap_or_default();

        candidates
            .iter()
            .find(|candidate| candidate.effective_name() == lookup_name)
            .ok_or_else(|| Error::ImageNotFound {
                component: component.clone(),
                referenced: referenced.clone(),
                lookup_name: lookup_name.to_string(),
                candidates: candidates
                    .iter()
                    .map(|candidate| candidate.effective_name().to_string())
                    .collect(),
            })
    }
}

/// Take location and version from `found`, identity from the referencing side.
fn adopt(source: &ExtendedImageSource, found: &ExtendedImageSource) -> ImageSource {
    let mut image = found.image.clone();
    image.name = source.image.name.clone();
    image.target_version = source.image.target_version.clone();
    if source.image.source_repository.is_some() {
        image.source_repository = source.image.source_repository.clone();
    }
    for label in &source.image.labels {
        image.labels.retain(|existing| existing.name != label.name);
        image.labels.push(label.clone());
    }
    image
}

/// Order images by name, then target version.
pub fn sort_images(images: &mut [ImageSource]) {
    images.sort_by(|a, b| {
        let a_key = (a.name.as_str(), a.target_version.as_deref().unwrap_or_default());
        let b_key = (b.name.as_str(), b.target_version.as_deref().unwrap_or_default());
        a_key.cmp(&b_key)
    });
}
