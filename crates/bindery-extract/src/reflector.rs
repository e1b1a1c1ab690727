//! Wire name lookup for parameter structs.
//!
//! A [`Reflector`] indexes a [`Schema`] two ways:
//!
//! - wire name to [`ParamField`], used when offering flat request values
//!   (headers, form, query, path) to the struct;
//! - Rust field name to wire name, used to rewrite validation error paths
//!   such as `items[1].quantity` into what the client sent.
//!
//! Both indexes are flat. Flattened structs contribute their fields at the
//! level of the struct that holds them. Nested structs and slices of
//! structs are indexed too, but their fields cannot be set from flat
//! sources; they only bind from a JSON body.

use bindery_core::{FieldShape, ParamSource, ParseError, Params, Schema, TypeRegistry};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// A field that declares a wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamField {
    /// The wire name.
    pub name: &'static str,
    /// The declared source.
    pub source: ParamSource,
    /// The Rust field name.
    pub field: &'static str,
    /// True if flat string sources can set this field.
    pub bindable: bool,
}

impl ParamField {
    /// Returns true if a value arriving on `channel` may set this field.
    pub fn can_set_from(&self, channel: ParamSource) -> bool {
        self.source.can_set_from(channel)
    }
}

/// Wire name indexes for one parameter struct type.
#[derive(Debug)]
pub struct Reflector {
    schema: &'static Schema,
    params_by_wire: HashMap<&'static str, ParamField>,
    wire_by_field: HashMap<&'static str, &'static str>,
}

impl Reflector {
    /// Indexes `schema`.
    pub fn build(schema: &'static Schema) -> Self {
        let mut reflector = Self {
            schema,
            params_by_wire: HashMap::new(),
            wire_by_field: HashMap::new(),
        };
        let mut path = Vec::new();
        reflector.index(schema, true, &mut path);
        trace!(
            params = schema.type_name,
            wire_names = reflector.params_by_wire.len(),
            "built reflector"
        );
        reflector
    }

    /// Returns the shared reflector for `P`, building it on first use.
    pub fn for_type<P: Params>() -> Arc<Self> {
        static CACHE: OnceLock<RwLock<HashMap<TypeId, Arc<Reflector>>>> = OnceLock::new();
        let cache = CACHE.get_or_init(Default::default);
        let key = TypeId::of::<P>();
        if let Some(reflector) = cache.read().get(&key) {
            return Arc::clone(reflector);
        }
        let built = Arc::new(Self::build(P::schema()));
        Arc::clone(cache.write().entry(key).or_insert(built))
    }

    // `path` holds the schemas being walked, so self-referencing structs
    // are indexed once.
    fn index(
        &mut self,
        schema: &'static Schema,
        top_level: bool,
        path: &mut Vec<&'static Schema>,
    ) {
        if path.iter().any(|seen| std::ptr::eq(*seen, schema)) {
            return;
        }
        path.push(schema);
        for field in schema.fields {
            if let FieldShape::Flatten(inner) = field.shape {
                self.index(inner(), top_level, path);
                continue;
            }
            if let Some(tag) = field.param {
                let entry = ParamField {
                    name: tag.name,
                    source: tag.source,
                    field: field.name,
                    bindable: top_level && matches!(field.shape, FieldShape::Scalar),
                };
                let shadowed = self
                    .params_by_wire
                    .get(tag.name)
                    .is_some_and(|existing| existing.bindable && !entry.bindable);
                if !shadowed {
                    self.params_by_wire.insert(tag.name, entry);
                }
                self.wire_by_field.insert(field.name, tag.name);
            }
            if let Some(inner) = field.shape.inner() {
                self.index(inner, false, path);
            }
        }
        path.pop();
    }

    /// Returns the struct name.
    pub fn type_name(&self) -> &'static str {
        self.schema.type_name
    }

    /// Looks up a field by wire name.
    pub fn param_field(&self, wire_name: &str) -> Option<&ParamField> {
        self.params_by_wire.get(wire_name)
    }

    /// Returns the wire name for a Rust field name, if it has one.
    pub fn wire_name(&self, field: &str) -> Option<&'static str> {
        self.wire_by_field.get(field).copied()
    }

    /// Parses `raw` into the field described by `field`.
    pub fn set_field<P: Params>(
        &self,
        params: &mut P,
        field: &ParamField,
        raw: &str,
        types: &TypeRegistry,
    ) -> Result<(), ParseError> {
        params.set_field(field.field, raw, types)
    }

    /// Rewrites a field path (`note.text`, `items[1].qty`) into wire names.
    ///
    /// Each name segment is resolved against the struct it belongs to,
    /// then against the flat index. Segments that resolve to nothing are
    /// kept as written. Index runs (`[1]`) pass through unchanged.
    pub fn map_field_path(&self, path: &str) -> String {
        let mut out = String::with_capacity(path.len());
        let mut scope = Some(self.schema);
        let mut run = String::new();
        let mut in_index = false;
        for c in path.chars() {
            match c {
                '.' if !in_index => {
                    scope = self.flush(&mut run, scope, &mut out);
                    out.push('.');
                }
                '[' if !in_index => {
                    scope = self.flush(&mut run, scope, &mut out);
                    in_index = true;
                    out.push('[');
                }
                ']' if in_index => {
                    in_index = false;
                    out.push(']');
                }
                _ if in_index => out.push(c),
                _ => run.push(c),
            }
        }
        self.flush(&mut run, scope, &mut out);
        out
    }

    // Writes the mapped name for `run` and returns the schema its children
    // live in. An empty run (after an index) keeps the current scope.
    fn flush(
        &self,
        run: &mut String,
        scope: Option<&'static Schema>,
        out: &mut String,
    ) -> Option<&'static Schema> {
        if run.is_empty() {
            return scope;
        }
        let field = scope.and_then(|schema| schema.field(run));
        let mapped = match field {
            Some(field) => field.wire_name(),
            None => self.wire_name(run),
        };
        match mapped {
            Some(name) => out.push_str(name),
            None => out.push_str(run),
        }
        run.clear();
        field.and_then(|field| field.shape.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_core::{FieldSchema, ParamTag};

    const fn scalar(name: &'static str, wire: Option<(&'static str, ParamSource)>) -> FieldSchema {
        FieldSchema {
            name,
            param: match wire {
                Some((name, source)) => Some(ParamTag { name, source }),
                None => None,
            },
            default: None,
            rules: None,
            shape: FieldShape::Scalar,
        }
    }

    static ITEM: Schema = Schema {
        type_name: "Item",
        fields: &[
            scalar("sku", Some(("SKU", ParamSource::Json))),
            scalar("qty", Some(("quantity", ParamSource::Json))),
        ],
    };

    static BASE: Schema = Schema {
        type_name: "Base",
        fields: &[scalar("org_id", Some(("org", ParamSource::Path)))],
    };

    static ORDER: Schema = Schema {
        type_name: "Order",
        fields: &[
            FieldSchema {
                name: "base",
                param: None,
                default: None,
                rules: None,
                shape: FieldShape::Flatten(base),
            },
            scalar("limit", Some(("limit", ParamSource::Query))),
            scalar("note", None),
            FieldSchema {
                name: "items",
                param: Some(ParamTag {
                    name: "lineItems",
                    source: ParamSource::Json,
                }),
                default: None,
                rules: None,
                shape: FieldShape::NestedSlice(item),
            },
            // Same wire name as a nested field: the bindable one wins.
            scalar("sku_filter", Some(("SKU", ParamSource::Query))),
        ],
    };

    fn base() -> &'static Schema {
        &BASE
    }

    fn item() -> &'static Schema {
        &ITEM
    }

    #[test]
    fn test_index_promotes_flattened_fields() {
        let reflector = Reflector::build(&ORDER);
        let org = reflector.param_field("org").unwrap();
        assert_eq!(org.field, "org_id");
        assert!(org.bindable);
        assert!(org.can_set_from(ParamSource::Path));
        assert!(!org.can_set_from(ParamSource::Query));
    }

    #[test]
    fn test_nested_fields_are_not_bindable() {
        let reflector = Reflector::build(&ORDER);
        assert!(!reflector.param_field("quantity").unwrap().bindable);
        assert!(!reflector.param_field("lineItems").unwrap().bindable);
        assert!(reflector.param_field("note").is_none());
    }

    #[test]
    fn test_bindable_entry_is_not_shadowed() {
        let reflector = Reflector::build(&ORDER);
        let sku = reflector.param_field("SKU").unwrap();
        assert_eq!(sku.field, "sku_filter");
        assert!(sku.bindable);
    }

    #[test]
    fn test_map_field_path() {
        let reflector = Reflector::build(&ORDER);
        assert_eq!(reflector.map_field_path("limit"), "limit");
        assert_eq!(reflector.map_field_path("org_id"), "org");
        assert_eq!(reflector.map_field_path("items[1].qty"), "lineItems[1].quantity");
        assert_eq!(reflector.map_field_path("items[0].sku"), "lineItems[0].SKU");
        assert_eq!(reflector.map_field_path("note"), "note");
        assert_eq!(reflector.map_field_path("unknown.qty"), "unknown.quantity");
        assert_eq!(reflector.map_field_path("items[a.b]"), "lineItems[a.b]");
    }

    #[test]
    fn test_self_referencing_schema() {
        static NODE: Schema = Schema {
            type_name: "Node",
            fields: &[
                scalar("label", Some(("label", ParamSource::Json))),
                FieldSchema {
                    name: "children",
                    param: Some(ParamTag {
                        name: "children",
                        source: ParamSource::Json,
                    }),
                    default: None,
                    rules: None,
                    shape: FieldShape::NestedSlice(node),
                },
            ],
        };
        fn node() -> &'static Schema {
            &NODE
        }
        let reflector = Reflector::build(&NODE);
        assert_eq!(
            reflector.map_field_path("children[0].children[2].label"),
            "children[0].children[2].label"
        );
    }

    proptest::proptest! {
        #[test]
        fn prop_indexes_pass_through(i in 0usize..10_000, j in 0usize..10_000) {
            let reflector = Reflector::build(&ORDER);
            proptest::prop_assert_eq!(
                reflector.map_field_path(&format!("items[{i}].qty")),
                format!("lineItems[{i}].quantity")
            );
            proptest::prop_assert_eq!(
                reflector.map_field_path(&format!("items[{i}][{j}]")),
                format!("lineItems[{i}][{j}]")
            );
        }

        #[test]
        fn prop_unknown_fields_are_verbatim(name in "zz[a-z_]{0,12}") {
            let reflector = Reflector::build(&ORDER);
            proptest::prop_assert_eq!(reflector.map_field_path(&name), name);
        }
    }
}
