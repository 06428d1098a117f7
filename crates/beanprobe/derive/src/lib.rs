//! Procedural macros for deriving the Bean registration tables.
//!
//! `#[derive(Bean)]` implements `beanprobe::Bean` (property table, construction
//! paths, clear and post-construct hooks, serialization capability) and
//! `beanprobe::PropertyType`, so the struct can itself be used as a nested
//! property. `#[derive(BeanEnum)]` implements `PropertyType` for fieldless enums.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parenthesized, parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr,
    Token, Type,
};

/// Derives `Bean` and `PropertyType` for a struct with named fields.
///
/// Container attributes, under `#[bean(...)]`:
/// * `default` registers a zero-argument path through `Default`
/// * `constructor(name, Ty, ..)` registers `Self::name(Ty, ..) -> Self`
/// * `deprecated_constructor(name, Ty, ..)` registers a path that is never used
/// * `clear = "method"` registers the reset operation
/// * `post_construct = "method"` adds a hook (repeatable)
/// * `serializable` registers a bincode capability
///
/// Field attributes: `skip`, `read_only`, `write_only`, `rename = "name"`,
/// `get = "method"`, `set = "method"` and `try_set = "method"`; the latter
/// returns `Result<(), E>` with `E: Display`.
///
/// The struct must also be `Clone`, `PartialEq` and `Debug` to be carried as
/// a nested property value.
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate_bean_impl(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => TokenStream::from(error.to_compile_error()),
    }
}

/// Derives `PropertyType` for a fieldless enum; the first variant is the
/// synthesized default.
#[proc_macro_derive(BeanEnum)]
pub fn derive_bean_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate_enum_impl(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => TokenStream::from(error.to_compile_error()),
    }
}

//-----------------------------------------------------------------------------
// Attribute parsing
//-----------------------------------------------------------------------------

enum PathSpec {
    Default,
    Constructor {
        name: Ident,
        parameters: Vec<Type>,
        deprecated: bool,
    },
}

#[derive(Default)]
struct ContainerAttrs {
    paths: Vec<PathSpec>,
    clear: Option<Ident>,
    post_construct: Vec<Ident>,
    serializable: bool,
}

#[derive(Default)]
struct FieldAttrs {
    skip: bool,
    read_only: bool,
    write_only: bool,
    rename: Option<String>,
    get: Option<Ident>,
    set: Option<Ident>,
    try_set: Option<Ident>,
}

fn bean_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("bean"))
}

fn parse_container_attrs(attrs: &[Attribute]) -> syn::Result<ContainerAttrs> {
    let mut parsed = ContainerAttrs::default();
    for attr in bean_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                parsed.paths.push(PathSpec::Default);
                return Ok(());
            }
            let deprecated = meta.path.is_ident("deprecated_constructor");
            if deprecated || meta.path.is_ident("constructor") {
                let content;
                parenthesized!(content in meta.input);
                let name: Ident = content.parse()?;
                let mut parameters = Vec::new();
                while !content.is_empty() {
                    content.parse::<Token![,]>()?;
                    if content.is_empty() {
                        break;
                    }
                    parameters.push(content.parse::<Type>()?);
                }
                parsed.paths.push(PathSpec::Constructor {
                    name,
                    parameters,
                    deprecated,
                });
                return Ok(());
            }
            if meta.path.is_ident("clear") {
                parsed.clear = Some(meta.value()?.parse::<LitStr>()?.parse()?);
                return Ok(());
            }
            if meta.path.is_ident("post_construct") {
                parsed
                    .post_construct
                    .push(meta.value()?.parse::<LitStr>()?.parse()?);
                return Ok(());
            }
            if meta.path.is_ident("serializable") {
                parsed.serializable = true;
                return Ok(());
            }
            Err(meta.error("unsupported bean container attribute"))
        })?;
    }
    Ok(parsed)
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in bean_attrs(&field.attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("read_only") {
                parsed.read_only = true;
            } else if meta.path.is_ident("write_only") {
                parsed.write_only = true;
            } else if meta.path.is_ident("rename") {
                parsed.rename = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("get") {
                parsed.get = Some(meta.value()?.parse::<LitStr>()?.parse()?);
            } else if meta.path.is_ident("set") {
                parsed.set = Some(meta.value()?.parse::<LitStr>()?.parse()?);
            } else if meta.path.is_ident("try_set") {
                parsed.try_set = Some(meta.value()?.parse::<LitStr>()?.parse()?);
            } else {
                return Err(meta.error("unsupported bean field attribute"));
            }
            Ok(())
        })?;
    }

    if parsed.read_only && parsed.write_only {
        return Err(syn::Error::new_spanned(
            field,
            "a property cannot be both read_only and write_only",
        ));
    }
    if parsed.set.is_some() && parsed.try_set.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "use either set or try_set, not both",
        ));
    }
    Ok(parsed)
}

//-----------------------------------------------------------------------------
// #[derive(Bean)]
//-----------------------------------------------------------------------------

fn generate_bean_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Bean can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Bean can only be derived for structs",
            ))
        }
    };

    let container = parse_container_attrs(&input.attrs)?;

    let mut properties = Vec::new();
    for field in fields {
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }
        properties.push(generate_property(field, &attrs));
    }

    let paths = container.paths.iter().map(generate_path);

    let clear_hook = container.clear.as_ref().map(|method| {
        quote! {
            fn clear_hook() -> ::std::option::Option<fn(&mut Self)> {
                ::std::option::Option::Some((|bean: &mut Self| {
                    bean.#method();
                }) as fn(&mut Self))
            }
        }
    });

    let post_construct = if container.post_construct.is_empty() {
        None
    } else {
        let hooks = container.post_construct.iter().map(|method| {
            quote! {
                (|bean: &mut Self| {
                    bean.#method();
                }) as fn(&mut Self)
            }
        });
        Some(quote! {
            fn post_construct_hooks() -> ::std::vec::Vec<fn(&mut Self)> {
                ::std::vec![#(#hooks),*]
            }
        })
    };

    let serialization = container.serializable.then(|| {
        quote! {
            fn serialization() -> ::std::option::Option<::beanprobe::SerializationCapability<Self>> {
                ::std::option::Option::Some(::beanprobe::SerializationCapability::bincode())
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::beanprobe::Bean for #name #ty_generics #where_clause {
            fn properties() -> ::std::vec::Vec<::beanprobe::PropertyDescriptor<Self>> {
                ::std::vec![#(#properties),*]
            }

            fn construction_paths() -> ::std::vec::Vec<::beanprobe::ConstructionPath<Self>> {
                ::std::vec![#(#paths),*]
            }

            #clear_hook
            #post_construct
            #serialization
        }

        impl #impl_generics ::beanprobe::PropertyType for #name #ty_generics #where_clause {
            fn descriptor() -> ::beanprobe::TypeDescriptor {
                ::beanprobe::bean::bean_descriptor::<Self>()
            }

            fn to_value(&self) -> ::beanprobe::Value {
                ::beanprobe::bean::bean_to_value(self)
            }

            fn from_value(
                value: ::beanprobe::Value,
            ) -> ::std::result::Result<Self, ::beanprobe::PropertyFault> {
                ::beanprobe::bean::bean_from_value(value)
            }
        }
    })
}

fn generate_property(field: &Field, attrs: &FieldAttrs) -> TokenStream2 {
    // Named fields only reach here.
    let ident = field.ident.clone().unwrap_or_else(|| Ident::new("_", Span::call_site()));
    let ty = &field.ty;
    let property_name = attrs.rename.clone().unwrap_or_else(|| ident.to_string());

    let getter = match &attrs.get {
        Some(method) => quote! {
            |bean: &Self| -> ::beanprobe::Value {
                <#ty as ::beanprobe::PropertyType>::to_value(
                    ::std::borrow::Borrow::<#ty>::borrow(&bean.#method()),
                )
            }
        },
        None => quote! {
            |bean: &Self| -> ::beanprobe::Value {
                <#ty as ::beanprobe::PropertyType>::to_value(&bean.#ident)
            }
        },
    };

    let setter = match (&attrs.set, &attrs.try_set) {
        (Some(method), _) => quote! {
            |bean: &mut Self, value: ::beanprobe::Value|
                -> ::std::result::Result<(), ::beanprobe::PropertyFault> {
                bean.#method(<#ty as ::beanprobe::PropertyType>::from_value(value)?);
                ::std::result::Result::Ok(())
            }
        },
        (None, Some(method)) => quote! {
            |bean: &mut Self, value: ::beanprobe::Value|
                -> ::std::result::Result<(), ::beanprobe::PropertyFault> {
                bean.#method(<#ty as ::beanprobe::PropertyType>::from_value(value)?)
                    .map_err(::beanprobe::PropertyFault::rejected)
            }
        },
        (None, None) => quote! {
            |bean: &mut Self, value: ::beanprobe::Value|
                -> ::std::result::Result<(), ::beanprobe::PropertyFault> {
                bean.#ident = <#ty as ::beanprobe::PropertyType>::from_value(value)?;
                ::std::result::Result::Ok(())
            }
        },
    };

    if attrs.read_only {
        quote! {
            ::beanprobe::PropertyDescriptor::read_only::<#ty>(#property_name, #getter)
        }
    } else if attrs.write_only {
        quote! {
            ::beanprobe::PropertyDescriptor::write_only::<#ty>(#property_name, #setter)
        }
    } else {
        quote! {
            ::beanprobe::PropertyDescriptor::read_write::<#ty>(#property_name, #getter, #setter)
        }
    }
}

fn generate_path(spec: &PathSpec) -> TokenStream2 {
    match spec {
        PathSpec::Default => quote! {
            ::beanprobe::ConstructionPath::default_path()
        },
        PathSpec::Constructor {
            name,
            parameters,
            deprecated,
        } => {
            let path_name = name.to_string();
            let deprecate = deprecated.then(|| quote! { .deprecated() });
            quote! {
                ::beanprobe::ConstructionPath::new(
                    #path_name,
                    ::std::vec![#(<#parameters as ::beanprobe::PropertyType>::descriptor()),*],
                    |arguments: ::std::vec::Vec<::beanprobe::Value>|
                        -> ::std::result::Result<Self, ::beanprobe::PropertyFault> {
                        #[allow(unused_mut, unused_variables)]
                        let mut arguments = arguments.into_iter();
                        ::std::result::Result::Ok(Self::#name(#(
                            <#parameters as ::beanprobe::PropertyType>::from_value(
                                arguments.next().unwrap_or(::beanprobe::Value::Absent),
                            )?
                        ),*))
                    },
                )
                #deprecate
            }
        }
    }
}

//-----------------------------------------------------------------------------
// #[derive(BeanEnum)]
//-----------------------------------------------------------------------------

fn generate_enum_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "BeanEnum can only be derived for enums",
        ));
    };

    let mut variants = Vec::new();
    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "BeanEnum variants cannot carry fields",
            ));
        }
        variants.push(&variant.ident);
    }
    let Some(first) = variants.first() else {
        return Err(syn::Error::new_spanned(
            name,
            "BeanEnum needs at least one variant",
        ));
    };

    let labels: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
    let first_label = first.to_string();

    Ok(quote! {
        impl #impl_generics ::beanprobe::PropertyType for #name #ty_generics #where_clause {
            fn descriptor() -> ::beanprobe::TypeDescriptor {
                ::beanprobe::TypeDescriptor::of::<Self>(::beanprobe::ValueKind::Enumerated {
                    first: || ::beanprobe::Value::Enumerated {
                        type_name: ::std::any::type_name::<Self>(),
                        variant: #first_label,
                    },
                })
            }

            fn to_value(&self) -> ::beanprobe::Value {
                let variant = match self {
                    #(Self::#variants => #labels,)*
                };
                ::beanprobe::Value::Enumerated {
                    type_name: ::std::any::type_name::<Self>(),
                    variant,
                }
            }

            fn from_value(
                value: ::beanprobe::Value,
            ) -> ::std::result::Result<Self, ::beanprobe::PropertyFault> {
                match value {
                    ::beanprobe::Value::Enumerated { type_name, variant }
                        if type_name == ::std::any::type_name::<Self>() =>
                    {
                        match variant {
                            #(#labels => ::std::result::Result::Ok(Self::#variants),)*
                            other => ::std::result::Result::Err(::beanprobe::PropertyFault::rejected(
                                ::std::format!("unknown variant {}", other),
                            )),
                        }
                    }
                    other => ::std::result::Result::Err(::beanprobe::PropertyFault::mismatch(
                        ::std::any::type_name::<Self>(),
                        other.variant_name(),
                    )),
                }
            }
        }
    })
}
