//! Assembly of crate specs into a prim tree.

use super::value::ValueRep;
use super::{CrateFile, Spec, SpecType};
use crate::error::CrateError;
use std::collections::HashMap;
use usda_parser::{
    Attribute, Layer, Metadata, MetadataEntry, PrimSpec, PropertySpec, Relationship, Span,
    Specifier, Value, Variability,
};

/// Crate field names whose text-layer metadata key differs.
const RENAMED_FIELDS: &[(&str, &str)] = &[
    ("variantSelection", "variants"),
    ("variantSetNames", "variantSets"),
];

/// A prim whose children have not all been attached yet.
struct PendingPrim {
    spec: PrimSpec,
    child_order: Vec<String>,
    property_order: Vec<String>,
}

impl PendingPrim {
    fn finish(mut self) -> PrimSpec {
        let children = std::mem::take(&mut self.spec.children);
        self.spec.children = in_order(children, &self.child_order, |c| c.name.clone());
        let properties = std::mem::take(&mut self.spec.properties);
        self.spec.properties = in_order(properties, &self.property_order, property_name);
        self.spec
    }
}

fn property_name(property: &PropertySpec) -> String {
    match property {
        PropertySpec::Attribute(attr) => attr.name.clone(),
        PropertySpec::Relationship(rel) => rel.name.clone(),
    }
}

/// Order `items` by the names in `order`; unlisted items follow sorted by
/// name.
fn in_order<T>(items: Vec<T>, order: &[String], name: impl Fn(&T) -> String) -> Vec<T> {
    let mut by_name: HashMap<String, T> = items.into_iter().map(|item| (name(&item), item)).collect();
    let mut ordered: Vec<T> = order.iter().filter_map(|n| by_name.remove(n)).collect();

    let mut rest: Vec<(String, T)> = by_name.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));
    ordered.extend(rest.into_iter().map(|(_, item)| item));
    ordered
}

/// `/A/B` → `/A`, `/A` → `/`.
fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(index) => &path[..index],
    }
}

impl CrateFile<'_> {
    /// Build the layer: pseudo-root fields become layer metadata, prim
    /// specs nest by path and properties attach to their prim.
    pub(crate) fn build_layer(&self) -> Result<Layer, CrateError> {
        let mut layer = Layer {
            version: format!("{}.{}.{}", self.version.0, self.version.1, self.version.2),
            ..Layer::default()
        };
        let mut root_order = Vec::new();
        let mut prims: HashMap<String, PendingPrim> = HashMap::new();
        let mut properties: Vec<(String, PropertySpec)> = Vec::new();

        for spec in &self.specs {
            let path = self.path(spec.path)?;
            // Variant and relationship target paths.
            if path.contains('{') || path.contains('[') {
                log::debug!("skipping {path}");
                continue;
            }

            match spec.spec_type {
                SpecType::PseudoRoot => {
                    for (field, rep) in self.spec_fields(spec)? {
                        if field == "primChildren" {
                            root_order = self.token_list(rep)?;
                        } else {
                            self.add_metadata(&mut layer.metadata, field, rep)?;
                        }
                    }
                }
                SpecType::Prim => {
                    prims.insert(path.to_string(), self.prim(path, spec)?);
                }
                SpecType::Attribute | SpecType::Relationship => {
                    let Some((owner, name)) = path.rsplit_once('.') else {
                        return Err(CrateError::Corrupt(format!("property path {path} has no prim")));
                    };
                    properties.push((owner.to_string(), self.property(path, name, spec)?));
                }
                SpecType::Other(kind) => log::debug!("skipping {path}: spec type {kind}"),
            }
        }

        for (owner, property) in properties {
            match prims.get_mut(&owner) {
                Some(prim) => prim.spec.properties.push(property),
                None => log::debug!("dropping property of missing prim {owner}"),
            }
        }

        // Deepest first, so every prim is complete before its parent.
        let mut paths: Vec<String> = prims.keys().cloned().collect();
        paths.sort_by_key(|path| std::cmp::Reverse(path.matches('/').count()));

        let mut roots = Vec::new();
        for path in paths {
            let Some(pending) = prims.remove(&path) else {
                continue;
            };
            let prim = pending.finish();
            match parent_of(&path) {
                "/" => roots.push(prim),
                parent => match prims.get_mut(parent) {
                    Some(parent) => parent.spec.children.push(prim),
                    None => log::debug!("dropping {path}: parent has no spec"),
                },
            }
        }

        layer.prims = in_order(roots, &root_order, |p| p.name.clone());
        Ok(layer)
    }

    fn prim(&self, path: &str, spec: &Spec) -> Result<PendingPrim, CrateError> {
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        let mut prim = PendingPrim {
            spec: PrimSpec {
                specifier: Specifier::Over,
                type_name: None,
                name,
                metadata: Metadata::default(),
                properties: Vec::new(),
                children: Vec::new(),
                span: Span::zero(),
            },
            child_order: Vec::new(),
            property_order: Vec::new(),
        };

        for (field, rep) in self.spec_fields(spec)? {
            match field {
                "specifier" => {
                    prim.spec.specifier = match self.decode_value(rep)?.as_ref().and_then(Value::as_str) {
                        Some("def") => Specifier::Def,
                        Some("class") => Specifier::Class,
                        _ => Specifier::Over,
                    };
                }
                "typeName" => {
                    prim.spec.type_name = self
                        .decode_value(rep)?
                        .as_ref()
                        .and_then(Value::as_str)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string);
                }
                "primChildren" => prim.child_order = self.token_list(rep)?,
                "properties" => prim.property_order = self.token_list(rep)?,
                _ => self.add_metadata(&mut prim.spec.metadata, field, rep)?,
            }
        }
        Ok(prim)
    }

    fn property(&self, path: &str, name: &str, spec: &Spec) -> Result<PropertySpec, CrateError> {
        let fields = self.spec_fields(spec)?;

        if spec.spec_type == SpecType::Relationship {
            let mut relationship = Relationship {
                name: name.to_string(),
                custom: false,
                list_op: None,
                targets: Vec::new(),
                metadata: Metadata::default(),
                span: Span::zero(),
            };
            for (field, rep) in fields {
                match field {
                    "custom" => relationship.custom = self.flag(rep)?,
                    "targetPaths" => {}
                    _ => self.add_metadata(&mut relationship.metadata, field, rep)?,
                }
            }
            return Ok(PropertySpec::Relationship(relationship));
        }

        let mut attribute = Attribute::new(name, "", Span::zero());
        for (field, rep) in fields {
            match field {
                "typeName" => {
                    let type_name = self.decode_value(rep)?;
                    let type_name = type_name.as_ref().and_then(Value::as_str).unwrap_or_default();
                    match type_name.strip_suffix("[]") {
                        Some(element) => {
                            attribute.type_name = element.to_string();
                            attribute.is_array = true;
                        }
                        None => attribute.type_name = type_name.to_string(),
                    }
                }
                "default" => attribute.default = self.decode_value(rep)?,
                "variability" => {
                    if self.decode_value(rep)?.as_ref().and_then(Value::as_str) == Some("uniform") {
                        attribute.variability = Variability::Uniform;
                    }
                }
                "custom" => attribute.custom = self.flag(rep)?,
                "timeSamples" => log::debug!("{path}: time samples are not read"),
                "connectionPaths" => {}
                _ => self.add_metadata(&mut attribute.metadata, field, rep)?,
            }
        }
        Ok(PropertySpec::Attribute(attribute))
    }

    fn flag(&self, rep: ValueRep) -> Result<bool, CrateError> {
        Ok(self
            .decode_value(rep)?
            .as_ref()
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    fn token_list(&self, rep: ValueRep) -> Result<Vec<String>, CrateError> {
        Ok(self
            .decode_value(rep)?
            .as_ref()
            .and_then(Value::as_token_list)
            .map(|names| names.into_iter().map(str::to_string).collect())
            .unwrap_or_default())
    }

    /// Record a field as metadata.
    ///
    /// Values this reader does not decode are kept as `None` so the key is
    /// still visible, e.g. to detect composition arcs.
    fn add_metadata(
        &self,
        metadata: &mut Metadata,
        field: &str,
        rep: ValueRep,
    ) -> Result<(), CrateError> {
        let value = self.decode_value(rep)?;
        if field == "documentation" {
            metadata.doc = value.as_ref().and_then(Value::as_str).map(str::to_string);
            return Ok(());
        }

        let key = RENAMED_FIELDS
            .iter()
            .find(|(from, _)| *from == field)
            .map_or(field, |(_, to)| to);
        metadata.entries.push(MetadataEntry {
            key: key.to_string(),
            list_op: None,
            value: value.unwrap_or(Value::None),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/World"), "/");
        assert_eq!(parent_of("/World/Box"), "/World");
    }

    #[test]
    fn test_in_order_puts_unlisted_last() {
        let names = vec!["c".to_string(), "a".to_string(), "b".to_string(), "d".to_string()];
        let order = vec!["b".to_string(), "missing".to_string(), "c".to_string()];
        assert_eq!(in_order(names, &order, |n| n.clone()), ["b", "c", "a", "d"]);
    }
}
