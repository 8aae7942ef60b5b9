//! Procedural macros for `nurio-events`.
//!
//! - `#[derive(Event)]`: Implements `nurio_events::Event` and `Display` for your type.
//!   Structs are named after the type, enums after the variant. The rendering lists
//!   every field with its `Debug` value in declaration order, e.g.
//!   `ConnectTestEvent(who_is_connecting="alice")`.
//! - `#[derive(Constructor)]`: Generates `new(...)` taking every field, in declaration order.
//! - `#[derive(Getters)]`: Generates one `&self` accessor per named field.
//!
//! Usage:
//! ```rust,ignore
//! use nurio_events::{Constructor, Event, Getters};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash, Event, Constructor, Getters)]
//! struct ConnectEvent {
//!     who_is_connecting: String,
//! }
//!
//! let event = ConnectEvent::new("alice".to_string());
//! assert_eq!(event.who_is_connecting(), "alice");
//! assert_eq!(event.to_string(), r#"ConnectEvent(who_is_connecting="alice")"#);
//! ```
//!
//! Container attributes accepted by `#[derive(Event)]`:
//! - `#[event(name = "...")]` overrides the value returned by `Event::name`.
//! - `#[event(no_display)]` skips the `Display` impl when the type provides its own.
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, Fields, Ident, LitStr, ext::IdentExt, parse_macro_input, parse_quote,
};

#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_event(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Derives a `new` constructor that requires every field of the struct.
///
/// Named fields become parameters of the same name; tuple fields become
/// `field0`, `field1`, ... The constructor has the visibility of the struct.
#[proc_macro_derive(Constructor)]
pub fn derive_constructor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_constructor(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Derives read-only accessors for every named field.
///
/// Each accessor is named after its field and returns a shared reference.
/// No setters are generated, so fields can't change after construction.
///
/// Accessors are inherent methods and win over trait methods of the same
/// name. A field called `name` makes `event.name()` return the field; use
/// `Event::name(&event)` or `AnyEvent::event_name` for the event name. A
/// field called `new` conflicts with the method `Constructor` generates,
/// so the two derives can't be combined on such a struct.
#[proc_macro_derive(Getters)]
pub fn derive_getters(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_getters(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

struct EventAttrs {
    name: Option<LitStr>,
    display: bool,
}

fn event_attrs(input: &DeriveInput) -> syn::Result<EventAttrs> {
    let mut attrs = EventAttrs {
        name: None,
        display: true,
    };
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("event")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                attrs.name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("no_display") {
                attrs.display = false;
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"` or `no_display`"))
            }
        })?;
    }
    Ok(attrs)
}

fn expand_event(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let attrs = event_attrs(input)?;
    let ident = &input.ident;
    let type_name = ident.unraw().to_string();

    // Type parameters must satisfy the Event supertraits for the impl to hold.
    let mut event_generics = input.generics.clone();
    let type_params: Vec<Ident> = event_generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    let event_where = event_generics.make_where_clause();
    for param in &type_params {
        event_where.predicates.push(parse_quote! {
            #param: ::core::clone::Clone
                + ::core::cmp::Eq
                + ::core::hash::Hash
                + ::core::fmt::Debug
                + ::core::marker::Send
                + ::core::marker::Sync
                + 'static
        });
    }
    let (impl_generics, ty_generics, where_clause) = event_generics.split_for_impl();

    // (path, label, fields) for the struct itself or for each enum variant.
    let arms: Vec<(TokenStream2, String, &Fields)> = match &input.data {
        Data::Struct(data) => vec![(quote! { Self }, type_name.clone(), &data.fields)],
        Data::Enum(data) => data
            .variants
            .iter()
            .map(|variant| {
                let variant_ident = &variant.ident;
                (
                    quote! { Self::#variant_ident },
                    variant_ident.unraw().to_string(),
                    &variant.fields,
                )
            })
            .collect(),
        Data::Union(_) => {
            return Err(Error::new_spanned(ident, "Event can't be derived for unions"));
        }
    };

    let name_impl = match (&attrs.name, &input.data) {
        (Some(name), _) => quote! {
            fn name(&self) -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#name)
            }
        },
        (None, Data::Enum(_)) => {
            let match_arms = arms.iter().map(|(path, label, fields)| {
                let pattern = match fields {
                    Fields::Unit => quote! { #path },
                    Fields::Unnamed(_) => quote! { #path(..) },
                    Fields::Named(_) => quote! { #path { .. } },
                };
                quote! { #pattern => ::std::borrow::Cow::Borrowed(#label) }
            });
            // Empty enums have no values, so the match is exhaustive with no arms.
            quote! {
                fn name(&self) -> ::std::borrow::Cow<'static, str> {
                    match *self {
                        #(#match_arms),*
                    }
                }
            }
        }
        (None, _) => quote! {
            fn name(&self) -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#type_name)
            }
        },
    };

    let display_impl = if attrs.display {
        let is_enum = matches!(input.data, Data::Enum(_));
        let match_arms = arms.iter().map(|(path, label, fields)| {
            let label = if is_enum {
                format!("{type_name}::{label}")
            } else {
                label.clone()
            };
            render_arm(path, &label, fields)
        });

        let body = if arms.is_empty() {
            quote! { match *self {} }
        } else {
            quote! {
                match self {
                    #(#match_arms)*
                }
            }
        };

        let mut generics = input.generics.clone();
        let where_clause = generics.make_where_clause();
        for param in &type_params {
            where_clause
                .predicates
                .push(parse_quote! { #param: ::core::fmt::Debug });
        }
        let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

        quote! {
            impl #impl_generics ::core::fmt::Display for #ident #ty_generics #where_clause {
                fn fmt(&self, __formatter: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    #body
                }
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl #impl_generics ::nurio_events::Event for #ident #ty_generics #where_clause {
            #name_impl
        }

        #display_impl
    })
}

/// One `match self` arm writing `Label(field=value, ...)`.
fn render_arm(path: &TokenStream2, label: &str, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Unit => quote! {
            #path => __formatter.write_str(#label),
        },
        Fields::Named(named) => {
            let bindings: Vec<&Ident> = named
                .named
                .iter()
                .filter_map(|f| f.ident.as_ref())
                .collect();
            let writes = bindings.iter().enumerate().map(|(i, binding)| {
                let sep = if i == 0 { "" } else { ", " };
                let format = format!("{sep}{}={{:?}}", binding.unraw());
                quote! { ::core::write!(__formatter, #format, #binding)?; }
            });
            quote! {
                #path { #(#bindings),* } => {
                    __formatter.write_str(#label)?;
                    __formatter.write_str("(")?;
                    #(#writes)*
                    __formatter.write_str(")")
                }
            }
        }
        Fields::Unnamed(unnamed) => {
            let bindings: Vec<Ident> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("__field{}", i))
                .collect();
            let writes = bindings.iter().enumerate().map(|(i, binding)| {
                let format = if i == 0 { "{:?}" } else { ", {:?}" };
                quote! { ::core::write!(__formatter, #format, #binding)?; }
            });
            quote! {
                #path(#(#bindings),*) => {
                    __formatter.write_str(#label)?;
                    __formatter.write_str("(")?;
                    #(#writes)*
                    __formatter.write_str(")")
                }
            }
        }
    }
}

fn expand_constructor(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "Constructor can only be derived for structs",
        ));
    };
    let ident = &input.ident;
    let vis = &input.vis;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (params, body) = match &data.fields {
        Fields::Named(named) => {
            let names: Vec<&Ident> = named
                .named
                .iter()
                .filter_map(|f| f.ident.as_ref())
                .collect();
            let types = named.named.iter().map(|f| &f.ty);
            (
                quote! { #(#names: #types),* },
                quote! { Self { #(#names),* } },
            )
        }
        Fields::Unnamed(unnamed) => {
            let names: Vec<Ident> = (0..unnamed.unnamed.len())
                .map(|i| format_ident!("field{}", i))
                .collect();
            let types = unnamed.unnamed.iter().map(|f| &f.ty);
            (
                quote! { #(#names: #types),* },
                quote! { Self(#(#names),*) },
            )
        }
        Fields::Unit => (quote! {}, quote! { Self }),
    };

    Ok(quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            /// Creates a new value from all of its fields.
            #[allow(clippy::too_many_arguments)]
            #[must_use]
            #vis fn new(#params) -> Self {
                #body
            }
        }
    })
}

fn expand_getters(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named,
            _ => {
                return Err(Error::new_spanned(
                    &input.ident,
                    "Getters requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input.ident,
                "Getters can only be derived for structs",
            ));
        }
    };
    let ident = &input.ident;
    let vis = &input.vis;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let getters = named.named.iter().filter_map(|field| {
        let name = field.ident.as_ref()?;
        let ty = &field.ty;
        let doc = format!("Returns the `{}` field.", name.unraw());
        Some(quote! {
            #[doc = #doc]
            #[inline]
            #vis fn #name(&self) -> &#ty {
                &self.#name
            }
        })
    });

    Ok(quote! {
        impl #impl_generics #ident #ty_generics #where_clause {
            #(#getters)*
        }
    })
}
