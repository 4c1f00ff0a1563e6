//! Procedural macros for Treegrid reflection.
//!
//! This crate provides `#[derive(Reflect)]`, which implements
//! `treegrid::model::Reflect` for a struct with named fields so it can be
//! walked, projected and edited without hand-written member tables.
//!
//! # Attributes
//!
//! ## `#[reflect]` on fields
//!
//! ```ignore
//! #[derive(Reflect)]
//! struct Employee {
//!     name: String,                      // property "Name"
//!
//!     #[reflect(ty = TypeDesc::Enum(&ROLE))]
//!     role: EnumValue,                   // property "Role", coerced to the enum
//!
//!     #[reflect(read_only)]
//!     tenure: TimeDelta,                 // property "Tenure", not writable
//!
//!     #[reflect(field)]
//!     employee_id: i64,                  // field "employee_id"
//!
//!     #[reflect(skip)]
//!     cache: Vec<u8>,                    // not reflected
//! }
//! ```
//!
//! Field attributes:
//! - `field`: Reflects the member as a plain field, named exactly like the
//!   Rust field. Members are properties by default, named in `PascalCase`.
//! - `rename = "Name"`: Overrides the member name
//! - `read_only`: Reads work, writes are rejected
//! - `ty = <expr>`: Declared `TypeDesc`, instead of the field type's
//!   `ReflectValue::TYPE_DESC`
//! - `skip`: Excludes the field
//!
//! Every reflected field's type must implement `ReflectValue`.
//!
//! ## `#[reflect]` on the struct
//!
//! - `name = "Type"`: The runtime type name. Defaults to the struct name.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, Field, Fields, Ident, LitStr, Type, parse_macro_input};

/// Derive `Reflect` for a struct with named fields.
///
/// This macro generates:
/// - A static member table in field declaration order
/// - `get`/`set` dispatching on the member name through `ReflectValue`
/// - `type_name` from the struct name or `#[reflect(name = "...")]`
///
/// # Example
///
/// ```ignore
/// use treegrid::model::{ObjectRef, Reflect, Value};
///
/// #[derive(Reflect)]
/// struct Address {
///     street: String,
///     zip_code: String,
/// }
///
/// let address = ObjectRef::new(Address { street: "Main St".into(), zip_code: "12345".into() });
/// assert_eq!(address.get("ZipCode"), Ok(Value::from("12345")));
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match impl_derive_reflect(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Parsed member information.
struct MemberInfo {
    field_name: Ident,
    field_type: Type,
    name: String,
    is_field: bool,
    read_only: bool,
    ty: Option<Expr>,
}

impl MemberInfo {
    /// The declared type expression for the member table.
    fn type_desc(&self) -> TokenStream2 {
        match &self.ty {
            Some(ty) => quote! { #ty },
            None => {
                let field_type = &self.field_type;
                quote! { <#field_type as ::treegrid::model::ReflectValue>::TYPE_DESC }
            }
        }
    }
}

fn impl_derive_reflect(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect derive does not support generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Reflect derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Reflect derive only supports structs",
            ));
        }
    };

    let type_name = parse_type_name(&input.attrs)?.unwrap_or_else(|| struct_name.to_string());

    let mut members = Vec::new();
    for field in fields.iter() {
        if let Some(member) = parse_member(field)? {
            if members.iter().any(|m: &MemberInfo| m.name == member.name) {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("duplicate reflected member '{}'", member.name),
                ));
            }
            members.push(member);
        }
    }

    let descriptors = generate_descriptors(&members);
    let getters = generate_getters(&members);
    let setters = generate_setters(&members);

    Ok(quote! {
        impl ::treegrid::model::Reflect for #struct_name {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn members(&self) -> &[::treegrid::model::MemberDescriptor] {
                static MEMBERS: &[::treegrid::model::MemberDescriptor] = &[#(#descriptors),*];
                MEMBERS
            }

            fn get(
                &self,
                member: &str,
            ) -> ::std::result::Result<::treegrid::model::Value, ::treegrid::model::ReflectError> {
                match member {
                    #(#getters)*
                    _ => ::std::result::Result::Err(
                        ::treegrid::model::ReflectError::unknown_member(#type_name, member),
                    ),
                }
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                member: &str,
                value: ::treegrid::model::Value,
            ) -> ::std::result::Result<(), ::treegrid::model::ReflectError> {
                match member {
                    #(#setters)*
                    _ => ::std::result::Result::Err(
                        ::treegrid::model::ReflectError::unknown_member(#type_name, member),
                    ),
                }
            }
        }
    })
}

/// Parse the struct-level `#[reflect(name = "...")]`.
fn parse_type_name(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;

    for attr in attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported struct attribute, expected `name`"))
            }
        })?;
    }

    Ok(name)
}

/// Parse one field. Returns `None` for skipped fields.
fn parse_member(field: &Field) -> syn::Result<Option<MemberInfo>> {
    let Some(field_name) = field.ident.clone() else {
        return Ok(None);
    };

    let mut skip = false;
    let mut is_field = false;
    let mut read_only = false;
    let mut rename = None;
    let mut ty = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
            } else if meta.path.is_ident("field") {
                is_field = true;
            } else if meta.path.is_ident("read_only") {
                read_only = true;
            } else if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                rename = Some(lit.value());
            } else if meta.path.is_ident("ty") {
                ty = Some(meta.value()?.parse::<Expr>()?);
            } else {
                return Err(meta.error(
                    "unsupported field attribute, expected `skip`, `field`, `read_only`, `rename` or `ty`",
                ));
            }
            Ok(())
        })?;
    }

    if skip {
        return Ok(None);
    }

    let rust_name = field_name.to_string();
    let rust_name = rust_name.trim_start_matches("r#");
    let name = match rename {
        Some(name) => name,
        None if is_field => rust_name.to_string(),
        None => pascal_case(rust_name),
    };

    Ok(Some(MemberInfo {
        field_name,
        field_type: field.ty.clone(),
        name,
        is_field,
        read_only,
        ty,
    }))
}

/// `home_address` -> `HomeAddress`.
fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Generate the `MemberDescriptor` table entries.
fn generate_descriptors(members: &[MemberInfo]) -> Vec<TokenStream2> {
    members
        .iter()
        .map(|member| {
            let name = &member.name;
            let type_desc = member.type_desc();
            let descriptor = if member.is_field {
                quote! { ::treegrid::model::MemberDescriptor::field(#name, #type_desc) }
            } else {
                quote! { ::treegrid::model::MemberDescriptor::property(#name, #type_desc) }
            };

            if member.read_only {
                quote! { #descriptor.read_only() }
            } else {
                descriptor
            }
        })
        .collect()
}

/// Generate the match arms of `get`.
fn generate_getters(members: &[MemberInfo]) -> Vec<TokenStream2> {
    members
        .iter()
        .map(|member| {
            let name = &member.name;
            let field_name = &member.field_name;
            let field_type = &member.field_type;
            quote! {
                #name => ::std::result::Result::Ok(
                    <#field_type as ::treegrid::model::ReflectValue>::to_value(&self.#field_name),
                ),
            }
        })
        .collect()
}

/// Generate the match arms of `set`.
fn generate_setters(members: &[MemberInfo]) -> Vec<TokenStream2> {
    members
        .iter()
        .map(|member| {
            let name = &member.name;
            if member.read_only {
                return quote! {
                    #name => ::std::result::Result::Err(
                        ::treegrid::model::ReflectError::read_only(#name),
                    ),
                };
            }

            let field_name = &member.field_name;
            let field_type = &member.field_type;
            let type_desc = member.type_desc();
            quote! {
                #name => {
                    self.#field_name =
                        <#field_type as ::treegrid::model::ReflectValue>::from_value(value).map_err(
                            |value| {
                                ::treegrid::model::ReflectError::type_mismatch(
                                    #name,
                                    ::std::string::ToString::to_string(&#type_desc),
                                    value.type_name(),
                                )
                            },
                        )?;
                    ::std::result::Result::Ok(())
                }
            }
        })
        .collect()
}
