//! Derive macro for sprig-reactive.
//!
//! `#[derive(Observable)]` turns a struct with named fields into an observable
//! object: every tracked field gets a getter that reports a read and a setter
//! that reports a write, and the struct implements `sprig_reactive::Observable`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sprig_reactive::{NotifierNode, Observable, ReactiveList};
//!
//! #[derive(Default, Observable)]
//! pub struct Foo {
//!     #[reactive(notifier)]
//!     node: NotifierNode,
//!     bar: String,
//!     #[reactive(rename = "Baz")]
//!     baz: i32,
//!     #[reactive(nested)]
//!     qux: ReactiveList<String>,
//!     #[reactive(nested)]
//!     corge: Option<Corge>,
//!     #[reactive(skip)]
//!     cache: Vec<u8>,
//! }
//!
//! // Generated:
//! //   fn bar(&self) -> &String
//! //   fn set_bar(&mut self, value: String) -> bool
//! //   fn baz(&self) -> &i32                      (path segment "Baz")
//! //   fn set_baz(&mut self, value: i32) -> bool
//! //   fn qux(&self) -> &ReactiveList<String>
//! //   fn qux_mut(&mut self) -> &mut ReactiveList<String>
//! //   fn set_qux(&mut self, value: ReactiveList<String>) -> bool
//! //   fn corge(&self) -> &Option<Corge>
//! //   fn corge_mut(&mut self) -> &mut Option<Corge>
//! //   fn set_corge(&mut self, value: Option<Corge>) -> bool
//! ```
//!
//! Setters of plain fields require `PartialEq` and skip equal values. Nested
//! fields hold another observable (`T` or `Option<T>`); their setters detach
//! the old value and link the new one under the property name.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Data, DeriveInput, Field, Fields, GenericArgument, Ident, LitStr,
    PathArguments, Type,
};

/// How a field takes part in tracking.
enum FieldKind {
    /// The `NotifierNode` of the object.
    Notifier,
    /// A plain value, compared on write.
    Value,
    /// An observable value linked into the containment tree.
    Nested { optional: bool },
    /// Not tracked; no accessors are generated.
    Skip,
}

struct TrackedField<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    segment: String,
    kind: FieldKind,
}

/// Parsed `#[reactive(...)]` flags of one field.
#[derive(Default)]
struct FieldAttrs {
    notifier: bool,
    nested: bool,
    skip: bool,
    rename: Option<LitStr>,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("reactive")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("notifier") {
                    attrs.notifier = true;
                } else if meta.path.is_ident("nested") {
                    attrs.nested = true;
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                } else if meta.path.is_ident("rename") {
                    attrs.rename = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("expected `notifier`, `nested`, `skip` or `rename = \"...\"`"));
                }
                Ok(())
            })?;
        }
        Ok(attrs)
    }
}

/// Returns the inner type if `ty` is spelled `Option<T>`.
fn extract_option_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Option" {
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(GenericArgument::Type(inner_ty)) = args.args.first() {
                    return Some(inner_ty);
                }
            }
        }
    }
    None
}

/// Field name without a raw identifier prefix.
fn unraw(ident: &Ident) -> String {
    let name = ident.to_string();
    match name.strip_prefix("r#") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

fn classify(field: &Field) -> syn::Result<Option<TrackedField<'_>>> {
    let Some(ident) = field.ident.as_ref() else {
        return Ok(None);
    };
    let attrs = FieldAttrs::parse(field)?;

    let flags = [attrs.notifier, attrs.nested, attrs.skip]
        .iter()
        .filter(|flag| **flag)
        .count();
    if flags > 1 {
        return Err(syn::Error::new_spanned(
            ident,
            "`notifier`, `nested` and `skip` are mutually exclusive",
        ));
    }
    if let Some(rename) = &attrs.rename {
        if attrs.notifier || attrs.skip {
            return Err(syn::Error::new_spanned(
                rename,
                "`rename` only applies to tracked fields",
            ));
        }
    }

    let kind = if attrs.notifier {
        FieldKind::Notifier
    } else if attrs.skip {
        FieldKind::Skip
    } else if attrs.nested {
        FieldKind::Nested {
            optional: extract_option_inner_type(&field.ty).is_some(),
        }
    } else {
        FieldKind::Value
    };
    let segment = attrs
        .rename
        .map(|rename| rename.value())
        .unwrap_or_else(|| unraw(ident));

    Ok(Some(TrackedField {
        ident,
        ty: &field.ty,
        segment,
        kind,
    }))
}

fn accessors(field: &TrackedField<'_>, node: &Ident, vis: &syn::Visibility) -> TokenStream2 {
    let ident = field.ident;
    let ty = field.ty;
    let segment = &field.segment;
    let setter = format_ident!("set_{}", unraw(ident));
    let getter_doc = format!("Returns `{}`, recording a read of `{}`.", unraw(ident), segment);
    let setter_doc = format!(
        "Stores `{}`, recording a write of `{}`. Returns true if a write was recorded.",
        unraw(ident),
        segment
    );

    let getter = quote! {
        #[doc = #getter_doc]
        #vis fn #ident(&self) -> &#ty {
            ::sprig_reactive::observable::read(&self.#node, #segment, &self.#ident)
        }
    };

    match field.kind {
        FieldKind::Value => quote! {
            #getter

            #[doc = #setter_doc]
            #vis fn #setter(&mut self, value: #ty) -> bool {
                ::sprig_reactive::observable::write_value(&self.#node, #segment, &mut self.#ident, value)
            }
        },
        FieldKind::Nested { optional } => {
            let mutable = format_ident!("{}_mut", unraw(ident));
            let mutable_doc = format!(
                "Returns `{}` mutably for in-place writes, recording a read of `{}`.",
                unraw(ident),
                segment
            );
            let write = if optional {
                quote!(::sprig_reactive::observable::write_nested_option)
            } else {
                quote!(::sprig_reactive::observable::write_nested)
            };
            quote! {
                #getter

                #[doc = #mutable_doc]
                #vis fn #mutable(&mut self) -> &mut #ty {
                    ::sprig_reactive::observable::read_mut(&self.#node, #segment, &mut self.#ident)
                }

                #[doc = #setter_doc]
                #vis fn #setter(&mut self, value: #ty) -> bool {
                    #write(&self.#node, #segment, &mut self.#ident, value)
                }
            }
        }
        FieldKind::Notifier | FieldKind::Skip => TokenStream2::new(),
    }
}

fn link(field: &TrackedField<'_>, node: &Ident) -> Option<TokenStream2> {
    let ident = field.ident;
    let segment = &field.segment;
    match field.kind {
        FieldKind::Nested { optional: false } => Some(quote! {
            ::sprig_reactive::observable::link_child(&self.#node, #segment, &self.#ident);
        }),
        FieldKind::Nested { optional: true } => Some(quote! {
            ::sprig_reactive::observable::link_child_option(&self.#node, #segment, &self.#ident);
        }),
        _ => None,
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Observable can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Observable can only be derived for structs",
            ))
        }
    };

    let mut tracked = Vec::new();
    for field in fields {
        if let Some(field) = classify(field)? {
            tracked.push(field);
        }
    }

    let mut notifiers = tracked
        .iter()
        .filter(|field| matches!(field.kind, FieldKind::Notifier));
    let node = match (notifiers.next(), notifiers.next()) {
        (Some(field), None) => field.ident,
        (Some(_), Some(second)) => {
            return Err(syn::Error::new_spanned(
                second.ident,
                "only one field can be marked `#[reactive(notifier)]`",
            ))
        }
        (None, _) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Observable requires a `NotifierNode` field marked `#[reactive(notifier)]`",
            ))
        }
    };

    let name = &input.ident;
    let vis = &input.vis;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let methods = tracked.iter().map(|field| accessors(field, node, vis));
    let links = tracked.iter().filter_map(|field| link(field, node));

    Ok(quote! {
        #[allow(dead_code)]
        impl #impl_generics #name #ty_generics #where_clause {
            #(#methods)*
        }

        impl #impl_generics ::sprig_reactive::Observable for #name #ty_generics #where_clause {
            fn notifier(&self) -> &::sprig_reactive::NotifierNode {
                &self.#node
            }

            fn link_children(&self) {
                #(#links)*
            }
        }
    })
}

/// Derives `Observable` and instrumented accessors for a struct.
///
/// Field attributes, all under `#[reactive(...)]`:
/// - `notifier`: the `NotifierNode` field (exactly one is required)
/// - `nested`: the field holds an observable `T` or `Option<T>`
/// - `skip`: no accessors are generated
/// - `rename = "..."`: path segment used instead of the field name
#[proc_macro_derive(Observable, attributes(reactive))]
pub fn derive_observable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
