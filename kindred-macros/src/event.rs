//! `#[derive(Event)]`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{ToTokens, quote};
use syn::{
    Attribute, Data, DeriveInput, Fields, Index, LitStr, Meta, Token, Type, parenthesized,
    parse_macro_input, punctuated::Punctuated,
};

/// Options from the container's `#[event(...)]` attributes.
#[derive(Default)]
struct EventArgs {
    parents: Vec<Type>,
    coerce: Vec<Type>,
    name: Option<LitStr>,
}

impl EventArgs {
    fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut args = EventArgs::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("event")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("parents") {
                    args.parents.extend(parse_type_list(meta.input)?);
                    Ok(())
                } else if meta.path.is_ident("coerce") {
                    args.coerce.extend(parse_type_list(meta.input)?);
                    Ok(())
                } else if meta.path.is_ident("name") {
                    args.name = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `parents(..)`, `coerce(..)` or `name = \"..\"`"))
                }
            })?;
        }
        Ok(args)
    }
}

fn parse_type_list(input: syn::parse::ParseStream) -> syn::Result<Punctuated<Type, Token![,]>> {
    let content;
    parenthesized!(content in input);
    Punctuated::parse_terminated(&content)
}

/// One `#[extends]` field: how to reach it and which kinds it provides.
struct Projection {
    access: TokenStream2,
    field_ty: Type,
    kinds: Option<Vec<Type>>,
}

fn projections(data: &Data) -> syn::Result<Vec<Projection>> {
    let fields = match data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) | Data::Union(_) => return Ok(Vec::new()),
    };
    let iter: Box<dyn Iterator<Item = _>> = match fields {
        Fields::Named(named) => Box::new(named.named.iter().enumerate()),
        Fields::Unnamed(unnamed) => Box::new(unnamed.unnamed.iter().enumerate()),
        Fields::Unit => Box::new(std::iter::empty()),
    };

    let mut out = Vec::new();
    for (index, field) in iter {
        let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("extends")) else {
            continue;
        };
        let access = match &field.ident {
            Some(ident) => ident.to_token_stream(),
            None => Index::from(index).to_token_stream(),
        };
        let kinds = match &attr.meta {
            Meta::Path(_) => None,
            Meta::List(_) => Some(
                attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?
                    .into_iter()
                    .collect(),
            ),
            Meta::NameValue(_) => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "expected `#[extends]` or `#[extends(Kind, ..)]`",
                ));
            }
        };
        out.push(Projection {
            access,
            field_ty: field.ty.clone(),
            kinds,
        });
    }
    Ok(out)
}

/// Implementation of `#[derive(Event)]`.
pub fn derive_event_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let args = EventArgs::from_attrs(&input.attrs)?;
    let fields = projections(&input.data)?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let display = args
        .name
        .unwrap_or_else(|| LitStr::new(&name.to_string(), name.span()));
    let parents = &args.parents;

    let mut impls = vec![quote! {
        impl #impl_generics ::kindred::Kind for #name #ty_generics #where_clause {
            type View = Self;
            type Parents = (#(#parents,)*);

            fn name() -> &'static str {
                #display
            }
        }
    }];

    for field in &fields {
        let access = &field.access;
        let field_ty = &field.field_ty;
        match &field.kinds {
            None => impls.push(quote! {
                impl #impl_generics ::kindred::Extends<#field_ty> for #name #ty_generics #where_clause {
                    fn view(&self) -> &<#field_ty as ::kindred::Kind>::View {
                        &self.#access
                    }

                    fn view_mut(&mut self) -> &mut <#field_ty as ::kindred::Kind>::View {
                        &mut self.#access
                    }
                }
            }),
            Some(kinds) => {
                for kind in kinds {
                    impls.push(quote! {
                        impl #impl_generics ::kindred::Extends<#kind> for #name #ty_generics #where_clause {
                            fn view(&self) -> &<#kind as ::kindred::Kind>::View {
                                <#field_ty as ::kindred::Extends<#kind>>::view(&self.#access)
                            }

                            fn view_mut(&mut self) -> &mut <#kind as ::kindred::Kind>::View {
                                <#field_ty as ::kindred::Extends<#kind>>::view_mut(&mut self.#access)
                            }
                        }
                    });
                }
            }
        }
    }

    for kind in &args.coerce {
        impls.push(quote! {
            impl #impl_generics ::kindred::Extends<#kind> for #name #ty_generics #where_clause {
                fn view(&self) -> &<#kind as ::kindred::Kind>::View {
                    self
                }

                fn view_mut(&mut self) -> &mut <#kind as ::kindred::Kind>::View {
                    self
                }
            }
        });
    }

    Ok(quote! { #(#impls)* })
}
