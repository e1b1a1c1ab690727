//! Code generation for `#[derive(Params)]` and `#[derive(Validate)]`.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, LitStr};

use crate::parse::{Derive, Field, Input, Shape};

/// Expands `#[derive(Params)]`: the `Params` impl, its JSON patch type and
/// the `Validate` impl.
pub fn expand_params(input: &DeriveInput) -> syn::Result<TokenStream> {
    let input = Input::parse(input, Derive::Params)?;
    let ident = &input.ident;
    let krate = &input.krate;
    let private = quote!(#krate::__private);
    let core = quote!(#private::bindery_core);
    let type_name = ident.to_string();
    let serde_crate = quote!(#private::serde).to_string();

    let schema_fields = input.fields.iter().map(|field| schema_entry(field, &core));
    let set_arms = input.fields.iter().filter_map(|field| set_arm(field, &core, &private));
    let default_stmts = input
        .fields
        .iter()
        .filter_map(|field| default_stmt(field, &type_name, &core, &private));
    let patch_fields = input
        .fields
        .iter()
        .filter(|field| field.in_patch() || matches!(field.shape, Shape::Flatten))
        .map(|field| patch_field(field, &core));
    let patch_applies = input
        .fields
        .iter()
        .filter(|field| field.in_patch() || matches!(field.shape, Shape::Flatten))
        .map(|field| patch_apply(field, &core, &private));
    let validate_impl = validate_impl(&input, &quote!(#private::validator));

    let patch = format_ident!("{}Patch", ident);

    Ok(quote! {
        const _: () = {
            #[doc(hidden)]
            #[derive(#private::serde::Deserialize)]
            #[serde(crate = #serde_crate)]
            pub struct #patch {
                #(#patch_fields,)*
            }

            #[automatically_derived]
            #[allow(unused_variables)]
            impl #core::Params for #ident {
                type Patch = #patch;

                fn schema() -> &'static #core::Schema {
                    static SCHEMA: #core::Schema = #core::Schema {
                        type_name: #type_name,
                        fields: &[#(#schema_fields),*],
                    };
                    &SCHEMA
                }

                fn set_field(
                    &mut self,
                    field: &str,
                    raw: &str,
                    types: &#core::TypeRegistry,
                ) -> ::std::result::Result<(), #core::ParseError> {
                    match field {
                        #(#set_arms)*
                        _ => #private::unknown_field(#type_name, field),
                    }
                }

                fn apply_defaults(
                    &mut self,
                    types: &#core::TypeRegistry,
                ) -> ::std::result::Result<(), #core::DefaultError> {
                    #(#default_stmts)*
                    ::std::result::Result::Ok(())
                }

                fn apply_patch(&mut self, patch: Self::Patch) {
                    #(#patch_applies)*
                }
            }

            #validate_impl
        };
    })
}

/// Expands `#[derive(Validate)]`.
pub fn expand_validate(input: &DeriveInput) -> syn::Result<TokenStream> {
    let input = Input::parse(input, Derive::Validate)?;
    let krate = &input.krate;
    Ok(validate_impl(&input, &quote!(#krate::__private::validator)))
}

fn some_lit(lit: Option<&LitStr>) -> TokenStream {
    match lit {
        Some(lit) => quote!(::std::option::Option::Some(#lit)),
        None => quote!(::std::option::Option::None),
    }
}

fn schema_entry(field: &Field, core: &TokenStream) -> TokenStream {
    let name = &field.name;
    let param = match &field.wire {
        Some(wire) => {
            let wire_name = &wire.name;
            let source = wire.source.variant();
            quote! {
                ::std::option::Option::Some(#core::ParamTag {
                    name: #wire_name,
                    source: #core::ParamSource::#source,
                })
            }
        }
        None => quote!(::std::option::Option::None),
    };
    let default = some_lit(field.default.as_ref());
    let rules = some_lit(field.rules.as_ref());
    let ty = &field.ty;
    let shape = match &field.shape {
        Shape::Scalar => quote!(#core::FieldShape::Scalar),
        Shape::Nested => quote!(#core::FieldShape::Nested(<#ty as #core::Params>::schema)),
        Shape::NestedSlice(elem) => {
            quote!(#core::FieldShape::NestedSlice(<#elem as #core::Params>::schema))
        }
        Shape::Flatten => quote!(#core::FieldShape::Flatten(<#ty as #core::Params>::schema)),
    };
    quote! {
        #core::FieldSchema {
            name: #name,
            param: #param,
            default: #default,
            rules: #rules,
            shape: #shape,
        }
    }
}

fn set_arm(field: &Field, core: &TokenStream, private: &TokenStream) -> Option<TokenStream> {
    let ident = &field.ident;
    let name = &field.name;
    let ty = &field.ty;
    match field.shape {
        Shape::Scalar if field.wire.is_some() => Some(quote! {
            #name => #private::bind_value(&mut self.#ident, raw, types),
        }),
        Shape::Flatten => Some(quote! {
            name if <#ty as #core::Params>::schema().field(name).is_some() => {
                #core::Params::set_field(&mut self.#ident, name, raw, types)
            }
        }),
        _ => None,
    }
}

fn default_stmt(
    field: &Field,
    type_name: &str,
    core: &TokenStream,
    private: &TokenStream,
) -> Option<TokenStream> {
    let ident = &field.ident;
    let name = &field.name;
    match field.shape {
        Shape::Nested | Shape::Flatten => Some(quote! {
            #core::Params::apply_defaults(&mut self.#ident, types)?;
        }),
        Shape::Scalar => field.default.as_ref().map(|literal| {
            quote! {
                #private::apply_default(&mut self.#ident, #type_name, #name, #literal, types)?;
            }
        }),
        Shape::NestedSlice(_) => None,
    }
}

fn patch_field(field: &Field, core: &TokenStream) -> TokenStream {
    let ident = &field.ident;
    let key = field.json_key();
    let ty = &field.ty;
    match &field.shape {
        Shape::Scalar => quote! {
            #[serde(rename = #key, default)]
            #ident: ::std::option::Option<#ty>
        },
        Shape::Nested => quote! {
            #[serde(rename = #key, default)]
            #ident: ::std::option::Option<<#ty as #core::Params>::Patch>
        },
        Shape::NestedSlice(elem) => quote! {
            #[serde(rename = #key, default)]
            #ident: ::std::option::Option<::std::vec::Vec<<#elem as #core::Params>::Patch>>
        },
        Shape::Flatten => quote! {
            #[serde(flatten)]
            #ident: <#ty as #core::Params>::Patch
        },
    }
}

fn patch_apply(field: &Field, core: &TokenStream, private: &TokenStream) -> TokenStream {
    let ident = &field.ident;
    match &field.shape {
        Shape::Scalar => quote! {
            if let ::std::option::Option::Some(value) = patch.#ident {
                self.#ident = value;
            }
        },
        Shape::Nested => quote! {
            if let ::std::option::Option::Some(value) = patch.#ident {
                #core::Params::apply_patch(&mut self.#ident, value);
            }
        },
        Shape::NestedSlice(elem) => quote! {
            if let ::std::option::Option::Some(items) = patch.#ident {
                self.#ident = #private::patch_slice::<#elem>(items);
            }
        },
        Shape::Flatten => quote! {
            #core::Params::apply_patch(&mut self.#ident, patch.#ident);
        },
    }
}

fn validate_impl(input: &Input, validator: &TokenStream) -> TokenStream {
    let ident = &input.ident;
    let stmts = input
        .fields
        .iter()
        .filter(|field| !field.skips_validation())
        .map(|field| validate_stmt(field, validator));
    quote! {
        #[automatically_derived]
        #[allow(unused_variables)]
        impl #validator::Validate for #ident {
            fn validate_fields(&self, visitor: &mut dyn #validator::FieldVisitor) {
                #(#stmts)*
            }
        }
    }
}

fn validate_stmt(field: &Field, validator: &TokenStream) -> TokenStream {
    let ident = &field.ident;
    let name = &field.name;
    let rules = field.active_rules();
    match &field.shape {
        Shape::Scalar => match rules {
            Some(rules) => quote! {
                visitor.visit_field(#name, #rules, #validator::Inspect::inspect(&self.#ident));
            },
            None => TokenStream::new(),
        },
        Shape::Nested => {
            let own = rules.map(|rules| {
                quote! {
                    visitor.visit_field(#name, #rules, #validator::FieldValue::Struct);
                }
            });
            quote! {
                #own
                visitor.visit_nested(#name, ::std::option::Option::None, &self.#ident);
            }
        }
        Shape::NestedSlice(_) => {
            let own = rules.map(|rules| {
                quote! {
                    visitor.visit_field(
                        #name,
                        #rules,
                        #validator::FieldValue::List(
                            ::std::vec![#validator::FieldValue::Struct; self.#ident.len()],
                        ),
                    );
                }
            });
            quote! {
                #own
                for (index, item) in self.#ident.iter().enumerate() {
                    visitor.visit_nested(#name, ::std::option::Option::Some(index), item);
                }
            }
        }
        Shape::Flatten => quote! {
            #validator::Validate::validate_fields(&self.#ident, visitor);
        },
    }
}
