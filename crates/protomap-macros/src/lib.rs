//! protomap-macros - Derive macros for protomap
//!
//! This crate provides:
//! - `#[derive(Record)]` - Declare a record's field layout for the mapper
//! - `#[derive(ProtoMessage)]` - Implement the protocol-message capability

use darling::ast::Data;
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, parse_macro_input};

// ============================================================================
// #[derive(Record)]
// ============================================================================

/// Options for the Record derive macro
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(record), supports(struct_named))]
struct RecordOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, RecordFieldOpts>,

    /// Renaming rule applied to every field without an explicit name
    #[darling(default)]
    rename_all: Option<String>,
}

#[derive(Debug, FromField)]
#[darling(attributes(record))]
struct RecordFieldOpts {
    ident: Option<syn::Ident>,
    ty: syn::Type,

    #[darling(default)]
    rename: Option<String>,

    /// Raw `name[,option]*` annotation
    #[darling(default)]
    json: Option<String>,

    #[darling(default)]
    optional: bool,

    #[darling(default)]
    skip: bool,

    #[darling(default)]
    nested: bool,

    #[darling(default)]
    message: bool,
}

/// Derive macro for record types
///
/// Generates `Schema`, `Record` and `RecordField` impls so the type can be
/// classified, encoded and decoded by the mapper. Fields are plain serde data
/// unless marked `nested` (a record, `Option` or `Box` of one) or `message`
/// (a protocol message, `Option` or `Box` of one).
///
/// Optional fields (`optional`, or a `json` annotation with `omitempty` or
/// `omitzero`) must be `PartialEq + Default`: encode omits them when they
/// equal their default, so `Some(0)` is written and `None` is not.
///
/// # Example
///
/// ```ignore
/// #[derive(Default, Record)]
/// #[record(rename_all = "camelCase")]
/// struct User {
///     user_id: i64,
///     #[record(json = "nick,omitempty")]
///     nickname: String,
///     #[record(message)]
///     profile: Option<Profile>,
///     #[record(nested)]
///     address: Address,
///     #[record(skip)]
///     scratch: u32,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match RecordOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    match expand_record(opts) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.write_errors()),
    }
}

fn expand_record(opts: RecordOpts) -> darling::Result<TokenStream2> {
    let name = &opts.ident;
    if !opts.generics.params.is_empty() {
        return Err(darling::Error::custom("generic records are not supported").with_span(name));
    }
    let name_str = name.to_string();

    let fields = match opts.data {
        Data::Struct(fields) => fields.fields,
        Data::Enum(_) => return Err(darling::Error::unsupported_shape("enum").with_span(name)),
    };

    let mut errors = darling::Error::accumulator();
    let mut decls = Vec::new();
    let mut ref_arms = Vec::new();
    let mut mut_arms = Vec::new();
    let mut zero_arms = Vec::new();

    for field in fields.iter().filter(|f| !f.skip) {
        let Some(ident) = &field.ident else {
            continue;
        };
        if field.nested && field.message {
            errors.push(
                darling::Error::custom("a field cannot be both `nested` and `message`")
                    .with_span(ident),
            );
            continue;
        }
        if field.rename.is_some() && field.json.is_some() {
            errors.push(
                darling::Error::custom("use either `rename` or `json`, not both").with_span(ident),
            );
            continue;
        }

        let key = ident.unraw().to_string();
        let ty = &field.ty;

        let mut decl = if field.nested {
            quote! { ::protomap_core::FieldDecl::nested::<#ty>(#key) }
        } else if field.message {
            quote! { ::protomap_core::FieldDecl::message(#key) }
        } else {
            quote! { ::protomap_core::FieldDecl::value(#key) }
        };
        if let Some(rename) = &field.rename {
            decl = quote! { #decl.renamed(#rename) };
        }
        if let Some(json) = &field.json {
            decl = quote! { #decl.tagged(#json) };
        }
        if field.optional {
            decl = quote! { #decl.optional() };
        }
        decls.push(decl);

        if field.optional || field.json.as_deref().is_some_and(tag_marks_optional) {
            zero_arms.push(quote! {
                #key => ::core::option::Option::Some(::protomap_core::is_default(&self.#ident)),
            });
        }

        if field.nested {
            ref_arms.push(quote! {
                #key => ::core::option::Option::Some(::protomap_core::FieldRef::Record(
                    ::protomap_core::RecordField::record(&self.#ident),
                )),
            });
            mut_arms.push(quote! {
                #key => ::core::option::Option::Some(::protomap_core::FieldMut::Record(&mut self.#ident)),
            });
        } else if field.message {
            ref_arms.push(quote! {
                #key => ::core::option::Option::Some(::protomap_core::FieldRef::Message(
                    ::protomap_core::MessageField::message(&self.#ident),
                )),
            });
            mut_arms.push(quote! {
                #key => ::core::option::Option::Some(::protomap_core::FieldMut::Message(&mut self.#ident)),
            });
        } else {
            ref_arms.push(quote! {
                #key => ::core::option::Option::Some(::protomap_core::FieldRef::Value(&self.#ident)),
            });
            mut_arms.push(quote! {
                #key => ::core::option::Option::Some(::protomap_core::FieldMut::Value(&mut self.#ident)),
            });
        }
    }

    errors.finish()?;

    let rename_all = match &opts.rename_all {
        Some(rule) => quote! { ::core::option::Option::Some(#rule) },
        None => quote! { ::core::option::Option::None },
    };

    Ok(quote! {
        impl ::protomap_core::Schema for #name {
            fn descriptor() -> ::protomap_core::TypeDescriptor {
                ::protomap_core::TypeDescriptor::record::<Self>(
                    #name_str,
                    ::protomap_core::RecordDecl {
                        rename_all: #rename_all,
                        fields: ::std::vec![#(#decls),*],
                    },
                )
            }

            fn as_target(&self) -> ::protomap_core::Target<'_> {
                ::protomap_core::Target::Record(self)
            }

            fn as_target_mut(&mut self) -> ::protomap_core::TargetMut<'_> {
                ::protomap_core::TargetMut::Record(self)
            }
        }

        impl ::protomap_core::Record for #name {
            fn field(&self, name: &str) -> ::core::option::Option<::protomap_core::FieldRef<'_>> {
                match name {
                    #(#ref_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<::protomap_core::FieldMut<'_>> {
                match name {
                    #(#mut_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_is_zero(&self, name: &str) -> ::core::option::Option<bool> {
                match name {
                    #(#zero_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::protomap_core::RecordField for #name {
            fn record(&self) -> ::core::option::Option<&dyn ::protomap_core::Record> {
                ::core::option::Option::Some(self)
            }

            fn record_mut(&mut self) -> &mut dyn ::protomap_core::Record {
                self
            }

            fn record_descriptor() -> ::protomap_core::TypeDescriptor {
                <Self as ::protomap_core::Schema>::descriptor()
            }
        }
    })
}

/// Whether a `name[,option]*` annotation carries `omitempty` or `omitzero`
fn tag_marks_optional(json: &str) -> bool {
    json.split_once(',')
        .is_some_and(|(_, options)| options.split(',').any(|o| matches!(o, "omitempty" | "omitzero")))
}

// ============================================================================
// #[derive(ProtoMessage)]
// ============================================================================

/// Options for the ProtoMessage derive macro
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(proto), supports(struct_named))]
struct ProtoOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: Data<Ignored, ProtoFieldOpts>,

    /// Fully qualified message name (e.g., "acme.user.v1.Profile")
    #[darling(default)]
    name: Option<String>,
}

#[derive(Debug, FromField)]
#[darling(attributes(proto))]
struct ProtoFieldOpts {
    ident: Option<syn::Ident>,

    #[darling(default)]
    json_name: Option<String>,

    #[darling(default)]
    required: bool,

    #[darling(default)]
    skip: bool,
}

/// Derive macro for protocol message types
///
/// Every field must be `Serialize + DeserializeOwned`, and the type must
/// implement `Default` (used to clear the message before a decode).
///
/// # Example
///
/// ```ignore
/// #[derive(Default, ProtoMessage)]
/// #[proto(name = "acme.user.v1.Profile")]
/// struct Profile {
///     bio: String,
///     #[proto(json_name = "name", required)]
///     display_name: String,
/// }
/// ```
#[proc_macro_derive(ProtoMessage, attributes(proto))]
pub fn derive_proto_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ProtoOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return TokenStream::from(e.write_errors()),
    };

    match expand_proto_message(opts) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(e) => TokenStream::from(e.write_errors()),
    }
}

fn expand_proto_message(opts: ProtoOpts) -> darling::Result<TokenStream2> {
    let name = &opts.ident;
    if !opts.generics.params.is_empty() {
        return Err(darling::Error::custom("generic messages are not supported").with_span(name));
    }
    let name_str = name.to_string();
    let full_name = opts.name.clone().unwrap_or_else(|| name_str.clone());

    let fields = match opts.data {
        Data::Struct(fields) => fields.fields,
        Data::Enum(_) => return Err(darling::Error::unsupported_shape("enum").with_span(name)),
    };

    let mut descriptors = Vec::new();
    let mut getters = Vec::new();
    let mut setters = Vec::new();

    for field in fields.iter().filter(|f| !f.skip) {
        let Some(ident) = &field.ident else {
            continue;
        };
        let proto_name = ident.unraw().to_string();
        let json_name = field
            .json_name
            .clone()
            .unwrap_or_else(|| to_json_name(&proto_name));
        let required = field.required;

        descriptors.push(quote! {
            ::protomap_core::ProtoField {
                name: #proto_name,
                json_name: #json_name,
                required: #required,
            }
        });
        getters.push(quote! {
            #proto_name => ::protomap_core::__private::serde_json::to_value(&self.#ident)
                .map(::core::option::Option::Some),
        });
        setters.push(quote! {
            #proto_name => {
                self.#ident = ::protomap_core::__private::serde_json::from_value(value)?;
                ::core::result::Result::Ok(true)
            }
        });
    }

    Ok(quote! {
        impl ::protomap_core::ProtoMessage for #name {
            fn descriptor(&self) -> &'static ::protomap_core::MessageDescriptor {
                static DESCRIPTOR: ::protomap_core::MessageDescriptor =
                    ::protomap_core::MessageDescriptor {
                        full_name: #full_name,
                        fields: &[#(#descriptors),*],
                    };
                &DESCRIPTOR
            }

            fn field_value(
                &self,
                name: &str,
            ) -> ::core::result::Result<
                ::core::option::Option<::protomap_core::__private::serde_json::Value>,
                ::protomap_core::__private::serde_json::Error,
            > {
                match name {
                    #(#getters)*
                    _ => ::core::result::Result::Ok(::core::option::Option::None),
                }
            }

            fn set_field_value(
                &mut self,
                name: &str,
                value: ::protomap_core::__private::serde_json::Value,
            ) -> ::core::result::Result<bool, ::protomap_core::__private::serde_json::Error> {
                match name {
                    #(#setters)*
                    _ => ::core::result::Result::Ok(false),
                }
            }

            fn clear(&mut self) {
                *self = ::core::default::Default::default();
            }
        }

        impl ::protomap_core::MessageField for #name {
            fn message(&self) -> ::core::option::Option<&dyn ::protomap_core::ProtoMessage> {
                ::core::option::Option::Some(self)
            }

            fn message_mut(&mut self) -> &mut dyn ::protomap_core::ProtoMessage {
                self
            }
        }

        impl ::protomap_core::Schema for #name {
            fn descriptor() -> ::protomap_core::TypeDescriptor {
                ::protomap_core::TypeDescriptor::message::<Self>(#name_str)
            }

            fn as_target(&self) -> ::protomap_core::Target<'_> {
                ::protomap_core::Target::Message(self)
            }

            fn as_target_mut(&mut self) -> ::protomap_core::TargetMut<'_> {
                ::protomap_core::TargetMut::Message(self)
            }
        }
    })
}

/// Convert a snake_case field name to its protobuf JSON name (lowerCamelCase)
fn to_json_name(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize = false;
    for c in s.chars() {
        if c == '_' {
            capitalize = true;
        } else if capitalize {
            result.push(c.to_ascii_uppercase());
            capitalize = false;
        } else {
            result.push(c);
        }
    }
    result
}
