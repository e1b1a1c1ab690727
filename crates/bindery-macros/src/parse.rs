//! Parsing for the derive macros.
//!
//! Turns a `DeriveInput` plus its `#[param(...)]` / `#[validate(...)]`
//! attributes into a field model the expanders work from.

use proc_macro2::Span;
use syn::{
    ext::IdentExt, spanned::Spanned, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident,
    LitStr, Path, PathArguments, Token, Type,
};

/// The channel a field declares, in lookup priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    Json,
    Form,
    Path,
    Query,
    Header,
}

impl Source {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "json" => Some(Self::Json),
            "form" => Some(Self::Form),
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            _ => None,
        }
    }

    /// The `ParamSource` variant name.
    pub fn variant(self) -> Ident {
        let name = match self {
            Self::Json => "Json",
            Self::Form => "Form",
            Self::Path => "Path",
            Self::Query => "Query",
            Self::Header => "Header",
        };
        Ident::new(name, Span::call_site())
    }
}

/// A resolved wire declaration.
#[derive(Debug, Clone)]
pub struct Wire {
    pub source: Source,
    pub name: String,
}

/// How a field nests.
#[derive(Debug, Clone)]
pub enum Shape {
    Scalar,
    Nested,
    /// `Vec<T>` of nested structs; holds `T`.
    NestedSlice(Type),
    Flatten,
}

/// One field of a derived struct.
#[derive(Debug, Clone)]
pub struct Field {
    pub ident: Ident,
    /// The field name without any `r#` prefix.
    pub name: String,
    pub ty: Type,
    pub wire: Option<Wire>,
    /// Declared `json = "-"`.
    pub json_skip: bool,
    pub default: Option<LitStr>,
    pub rules: Option<LitStr>,
    pub shape: Shape,
}

impl Field {
    /// True if the JSON body decodes into this field.
    pub fn in_patch(&self) -> bool {
        match &self.wire {
            Some(wire) => wire.source == Source::Json,
            None => !self.json_skip,
        }
    }

    /// The JSON key this field decodes from.
    pub fn json_key(&self) -> &str {
        match &self.wire {
            Some(wire) if wire.source == Source::Json => &wire.name,
            _ => &self.name,
        }
    }

    /// The `validate` rules, unless absent or `-`.
    pub fn active_rules(&self) -> Option<&LitStr> {
        self.rules.as_ref().filter(|rules| rules.value() != "-")
    }

    /// True if validation skips the field entirely.
    pub fn skips_validation(&self) -> bool {
        self.rules.as_ref().is_some_and(|rules| rules.value() == "-")
    }
}

/// A struct accepted by either derive.
#[derive(Debug)]
pub struct Input {
    pub ident: Ident,
    pub krate: Path,
    pub fields: Vec<Field>,
}

/// Which derive is parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derive {
    Params,
    Validate,
}

impl Derive {
    fn container_attr(self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::Validate => "validate",
        }
    }
}

impl Input {
    pub fn parse(input: &DeriveInput, derive: Derive) -> syn::Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(syn::Error::new(
                input.generics.span(),
                "parameter structs cannot be generic",
            ));
        }

        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                _ => {
                    return Err(syn::Error::new(
                        input.ident.span(),
                        "expected a struct with named fields",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "expected a struct with named fields",
                ))
            }
        };

        let krate = parse_crate_path(&input.attrs, derive.container_attr())?;

        let fields = named
            .named
            .iter()
            .map(|field| {
                let ident = field.ident.clone().ok_or_else(|| {
                    syn::Error::new(field.span(), "expected a named field")
                })?;
                match derive {
                    Derive::Params => parse_param_field(ident, &field.ty, &field.attrs),
                    Derive::Validate => parse_validate_field(ident, &field.ty, &field.attrs),
                }
            })
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Self {
            ident: input.ident.clone(),
            krate,
            fields,
        })
    }
}

fn parse_crate_path(attrs: &[Attribute], name: &str) -> syn::Result<Path> {
    let mut krate: Path = syn::parse_quote!(::bindery);
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(name)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                krate = lit.parse()?;
                Ok(())
            } else {
                Err(meta.error(format!("unknown `{name}` option")))
            }
        })?;
    }
    Ok(krate)
}

/// Returns `T` for a type spelled `Vec<T>`.
pub fn vec_element(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Vec" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn nested_shape(ty: &Type) -> Shape {
    match vec_element(ty) {
        Some(elem) => Shape::NestedSlice(elem.clone()),
        None => Shape::Nested,
    }
}

/// Resolves a declared name: text before the first comma, falling back to
/// the field name when that part is empty.
fn wire_name(declared: Option<&LitStr>, field: &str, source: Source) -> String {
    let name = match declared {
        Some(lit) => {
            let value = lit.value();
            match value.split(',').next() {
                Some(first) if !first.is_empty() => first.to_string(),
                _ => field.to_string(),
            }
        }
        None => field.to_string(),
    };
    if source == Source::Header {
        name.to_ascii_lowercase()
    } else {
        name
    }
}

fn parse_param_field(ident: Ident, ty: &Type, attrs: &[Attribute]) -> syn::Result<Field> {
    let name = ident.unraw().to_string();
    let mut sources: Vec<(Source, Option<LitStr>)> = Vec::new();
    let mut default = None;
    let mut rules = None;
    let mut nested = false;
    let mut flatten = false;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("param")) {
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();
            if let Some(source) = Source::from_key(&key) {
                let declared = if meta.input.peek(Token![=]) {
                    Some(meta.value()?.parse::<LitStr>()?)
                } else {
                    None
                };
                sources.push((source, declared));
                return Ok(());
            }
            match key.as_str() {
                "default" => default = Some(meta.value()?.parse::<LitStr>()?),
                "validate" => rules = Some(meta.value()?.parse::<LitStr>()?),
                "nested" => nested = true,
                "flatten" => flatten = true,
                _ => return Err(meta.error(format!("unknown param option `{key}`"))),
            }
            Ok(())
        })?;
    }

    let json_skip = sources
        .iter()
        .any(|(source, declared)| *source == Source::Json && is_skip(declared.as_ref()));
    // Highest priority source wins; the rest are ignored.
    let wire = sources
        .into_iter()
        .filter(|(_, declared)| !is_skip(declared.as_ref()))
        .min_by_key(|(source, _)| *source)
        .map(|(source, declared)| Wire {
            source,
            name: wire_name(declared.as_ref(), &name, source),
        });

    let shape = if flatten {
        if nested || wire.is_some() || default.is_some() || rules.is_some() {
            return Err(syn::Error::new(
                ident.span(),
                "`flatten` cannot be combined with other param options",
            ));
        }
        Shape::Flatten
    } else if nested {
        if wire.as_ref().is_some_and(|wire| wire.source != Source::Json) {
            return Err(syn::Error::new(
                ident.span(),
                "nested structs can only be declared with `json`",
            ));
        }
        if default.is_some() {
            return Err(syn::Error::new(
                ident.span(),
                "nested structs cannot have a default",
            ));
        }
        nested_shape(ty)
    } else {
        Shape::Scalar
    };

    Ok(Field {
        ident,
        name,
        ty: ty.clone(),
        wire,
        json_skip,
        default,
        rules,
        shape,
    })
}

fn is_skip(declared: Option<&LitStr>) -> bool {
    declared.is_some_and(|lit| lit.value() == "-")
}

fn parse_validate_field(ident: Ident, ty: &Type, attrs: &[Attribute]) -> syn::Result<Field> {
    let name = ident.unraw().to_string();
    let mut rules = None;
    let mut nested = false;
    let mut flatten = false;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("validate")) {
        if let Ok(lit) = attr.parse_args::<LitStr>() {
            rules = Some(lit);
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rules") {
                rules = Some(meta.value()?.parse::<LitStr>()?);
            } else if meta.path.is_ident("nested") {
                nested = true;
            } else if meta.path.is_ident("flatten") {
                flatten = true;
            } else {
                return Err(meta.error("expected `rules`, `nested` or `flatten`"));
            }
            Ok(())
        })?;
    }

    let shape = if flatten {
        Shape::Flatten
    } else if nested {
        nested_shape(ty)
    } else {
        Shape::Scalar
    };

    Ok(Field {
        ident,
        name,
        ty: ty.clone(),
        wire: None,
        json_skip: false,
        default: None,
        rules,
        shape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn params(input: DeriveInput) -> syn::Result<Input> {
        Input::parse(&input, Derive::Params)
    }

    #[test]
    fn test_parse_sources_and_names() {
        let input = params(parse_quote! {
            struct P {
                #[param(path = "id")]
                id: i64,
                #[param(query)]
                limit: i32,
                #[param(header = "X-Request-ID")]
                request_id: String,
                #[param(json = ",omitempty")]
                r#type: String,
                plain: String,
            }
        })
        .unwrap();

        let wires: Vec<_> = input
            .fields
            .iter()
            .map(|f| f.wire.as_ref().map(|w| (w.source, w.name.as_str())))
            .collect();
        assert_eq!(
            wires,
            vec![
                Some((Source::Path, "id")),
                Some((Source::Query, "limit")),
                Some((Source::Header, "x-request-id")),
                Some((Source::Json, "type")),
                None,
            ]
        );
        assert_eq!(input.fields[3].name, "type");
    }

    #[test]
    fn test_patch_membership() {
        let input = params(parse_quote! {
            struct P {
                #[param(json = "a")]
                a: i64,
                #[param(query = "b")]
                b: i64,
                #[param(json = "-")]
                c: i64,
                #[param(json = "-", query = "d")]
                d: i64,
                e: i64,
            }
        })
        .unwrap();
        let in_patch: Vec<_> = input.fields.iter().map(Field::in_patch).collect();
        assert_eq!(in_patch, vec![true, false, false, false, true]);
        assert_eq!(input.fields[3].wire.as_ref().unwrap().source, Source::Query);
    }

    #[test]
    fn test_highest_priority_source_wins() {
        let input = params(parse_quote! {
            struct P {
                #[param(query = "b", json = "a")]
                a: i64,
                #[param(header = "X-Org", path = "org")]
                org: String,
                #[param(json = "-", header, form = "f")]
                f: String,
            }
        })
        .unwrap();
        let wires: Vec<_> = input
            .fields
            .iter()
            .map(|f| f.wire.as_ref().map(|w| (w.source, w.name.as_str())))
            .collect();
        assert_eq!(
            wires,
            vec![
                Some((Source::Json, "a")),
                Some((Source::Path, "org")),
                Some((Source::Form, "f")),
            ]
        );
        assert!(input.fields[0].in_patch());
    }

    #[test]
    fn test_nested_shapes() {
        let input = params(parse_quote! {
            struct P {
                #[param(json = "note", nested)]
                note: Note,
                #[param(json = "items", nested)]
                items: Vec<Item>,
                #[param(flatten)]
                base: Base,
            }
        })
        .unwrap();
        assert!(matches!(input.fields[0].shape, Shape::Nested));
        assert!(matches!(input.fields[1].shape, Shape::NestedSlice(_)));
        assert!(matches!(input.fields[2].shape, Shape::Flatten));
    }

    #[test]
    fn test_nested_requires_json() {
        assert!(params(parse_quote! {
            struct P {
                #[param(query = "n", nested)]
                n: Note,
            }
        })
        .is_err());
    }

    #[test]
    fn test_generic_rejected() {
        assert!(params(parse_quote! {
            struct P<T> {
                t: T,
            }
        })
        .is_err());
    }

    #[test]
    fn test_crate_path() {
        let input = params(parse_quote! {
            #[params(crate = "bindery_core")]
            struct P {}
        })
        .unwrap();
        assert!(input.krate.is_ident("bindery_core"));
    }

    #[test]
    fn test_validate_attrs() {
        let input = Input::parse(
            &parse_quote! {
                struct V {
                    #[validate("min=1")]
                    a: i64,
                    #[validate(nested, rules = "nonzero")]
                    b: Vec<Inner>,
                    #[validate("-")]
                    c: i64,
                }
            },
            Derive::Validate,
        )
        .unwrap();
        assert_eq!(input.fields[0].active_rules().unwrap().value(), "min=1");
        assert!(matches!(input.fields[1].shape, Shape::NestedSlice(_)));
        assert!(input.fields[2].skips_validation());
        assert!(input.fields[2].active_rules().is_none());
    }
}
