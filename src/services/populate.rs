use crate::config::SlugConfig;
use crate::models::{Attributes, FieldKind, FieldPopulate, PopulateTree, SchemaRegistry};
use std::collections::BTreeMap;

/// Resolves content type and component uids to their attributes.
pub trait SchemaLookup {
    fn attributes(&self, uid: &str) -> Option<&Attributes>;
}

impl SchemaLookup for SchemaRegistry {
    fn attributes(&self, uid: &str) -> Option<&Attributes> {
        self.attributes_of(uid)
    }
}

/// Builds the populate instruction for `uid`, descending into components and dynamic zones.
///
/// The depth check comes before any schema lookup, so self-referencing or cyclic components
/// stop at `max_depth` like any other chain.
pub fn build_populate<S: SchemaLookup + ?Sized>(
    schemas: &S,
    uid: &str,
    max_depth: usize,
    depth: usize,
) -> PopulateTree {
    if depth >= max_depth {
        return PopulateTree::Wildcard;
    }
    let Some(attributes) = schemas.attributes(uid) else {
        tracing::debug!("No schema for {}, populating shallowly", uid);
        return PopulateTree::Wildcard;
    };

    let mut fields = BTreeMap::new();
    for (name, attribute) in attributes {
        let instruction = match &attribute.kind {
            FieldKind::Component { component, .. } => FieldPopulate::Nested(build_populate(
                schemas,
                component,
                max_depth,
                depth + 1,
            )),
            FieldKind::DynamicZone { components } => FieldPopulate::Variants(
                components
                    .iter()
                    .map(|variant| {
                        (
                            variant.clone(),
                            build_populate(schemas, variant, max_depth, depth + 1),
                        )
                    })
                    .collect(),
            ),
            FieldKind::Relation { .. } | FieldKind::Media { .. } => FieldPopulate::Shallow,
            FieldKind::Plain(_) => continue,
        };
        fields.insert(name.clone(), instruction);
    }

    PopulateTree::from_fields(fields)
}

/// Deep populate for a content type using its configured depth.
pub fn deep_populate<S: SchemaLookup + ?Sized>(
    schemas: &S,
    config: &SlugConfig,
    uid: &str,
) -> PopulateTree {
    build_populate(schemas, uid, config.populate_depth_for(uid), 0)
}
