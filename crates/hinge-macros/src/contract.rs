use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    GenericArgument, GenericParam, Ident, ItemTrait, LitStr, Path, PathArguments, Token, Type,
    TypeParamBound,
    parse::{Parse, ParseStream, Result},
    parse_quote,
};

// ─── Input AST types ─────────────────────────────────────────────────────────

/// Arguments of `#[plugin_contract(…)]`.
#[derive(Default)]
pub struct ContractArgs {
    qualifier: Option<LitStr>,
    name: Option<LitStr>,
    extends: Option<Path>,
    delimiter: Option<Type>,
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

impl Parse for ContractArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = ContractArgs::default();
        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "qualifier" => args.qualifier = Some(input.parse()?),
                "name" => args.name = Some(input.parse()?),
                "extends" => args.extends = Some(input.parse()?),
                "delimiter" => args.delimiter = Some(input.parse()?),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!(
                            "unknown argument `{other}`; expected qualifier, name, extends, or delimiter"
                        ),
                    ));
                }
            }
            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }
        Ok(args)
    }
}

/// Finds `D` in a `Plugin<D>` supertrait bound.
fn plugin_delimiter(item: &ItemTrait) -> Option<Type> {
    item.supertraits.iter().find_map(|bound| {
        let TypeParamBound::Trait(bound) = bound else {
            return None;
        };
        let segment = bound.path.segments.last()?;
        if segment.ident != "Plugin" {
            return None;
        }
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            return None;
        };
        args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty.clone()),
            _ => None,
        })
    })
}

// ─── Code generation ─────────────────────────────────────────────────────────

/// Implementation of `#[plugin_contract(…)]`.
///
/// Leaves the trait unchanged and implements `::hinge_core::PluginContract`
/// for its trait object. The delimiter comes from, in order: an explicit
/// `delimiter = T`, the trait's own `Plugin<T>` supertrait, or the contract
/// named by `extends = Parent`.
pub fn plugin_contract(args: ContractArgs, item: ItemTrait) -> Result<TokenStream> {
    let trait_ident = &item.ident;

    if let Some(lifetime) = item.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "plugin contracts cannot have lifetime parameters",
        ));
    }

    let delimiter = match (&args.delimiter, plugin_delimiter(&item), &args.extends) {
        (Some(explicit), _, _) => quote!(#explicit),
        (None, Some(bound), _) => quote!(#bound),
        (None, None, Some(parent)) => {
            quote!(<dyn #parent as ::hinge_core::PluginContract>::Delimiter)
        }
        (None, None, None) => {
            return Err(syn::Error::new(
                trait_ident.span(),
                format!(
                    "cannot resolve the delimiter type of `{trait_ident}`: \
                     add a `Plugin<D>` supertrait, or pass `delimiter = D` or `extends = Parent`"
                ),
            ));
        }
    };

    let simple_name = args
        .name
        .clone()
        .unwrap_or_else(|| LitStr::new(&trait_ident.to_string(), trait_ident.span()));

    let qualifier = args.qualifier.as_ref().map(|qualifier| {
        quote! {
            const QUALIFIER: ::std::option::Option<&'static str> =
                ::std::option::Option::Some(#qualifier);
        }
    });

    let supertype = args.extends.as_ref().map(|parent| {
        quote! {
            fn supertype() -> ::std::option::Option<::hinge_core::ContractType> {
                ::std::option::Option::Some(::hinge_core::ContractType::of::<dyn #parent>())
            }
        }
    });

    // Every type parameter must outlive the trait object.
    let mut generics = item.generics.clone();
    for param in &mut generics.params {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(parse_quote!('static));
        }
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let (_, ty_generics, _) = item.generics.split_for_impl();

    Ok(quote! {
        #item

        impl #impl_generics ::hinge_core::PluginContract for dyn #trait_ident #ty_generics
        #where_clause
        {
            type Delimiter = #delimiter;
            const SIMPLE_NAME: &'static str = #simple_name;
            #qualifier
            #supertype
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(args: TokenStream, item: TokenStream) -> Result<String> {
        let args: ContractArgs = syn::parse2(args)?;
        let item: ItemTrait = syn::parse2(item)?;
        plugin_contract(args, item).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_delimiter_from_supertrait() {
        let out = expand(
            quote!(),
            quote!(pub trait Formatter: hinge::Plugin<String> + Send {}),
        )
        .unwrap();
        assert!(out.contains("type Delimiter = String"));
        assert!(out.contains("const SIMPLE_NAME : & 'static str = \"Formatter\""));
        assert!(!out.contains("QUALIFIER"));
    }

    #[test]
    fn test_qualifier_and_name() {
        let out = expand(
            quote!(qualifier = "csvFormatters", name = "Csv"),
            quote!(trait Formatter: Plugin<String> {}),
        )
        .unwrap();
        assert!(out.contains("Some (\"csvFormatters\")"));
        assert!(out.contains("\"Csv\""));
    }

    #[test]
    fn test_extends_inherits_delimiter() {
        let out = expand(quote!(extends = Formatter), quote!(trait Pretty: Formatter {})).unwrap();
        assert!(out.contains("< dyn Formatter as :: hinge_core :: PluginContract > :: Delimiter"));
        assert!(out.contains("fn supertype"));
    }

    #[test]
    fn test_generic_contract() {
        let out = expand(quote!(), quote!(trait Sink<T>: Plugin<T> {})).unwrap();
        assert!(out.contains("impl < T : 'static >"));
        assert!(out.contains("for dyn Sink < T >"));
    }

    #[test]
    fn test_missing_delimiter_is_rejected() {
        let err = expand(quote!(), quote!(trait Orphan: Send {})).unwrap_err();
        assert!(err.to_string().contains("cannot resolve the delimiter type of `Orphan`"));
    }

    #[test]
    fn test_lifetimes_are_rejected() {
        let err = expand(quote!(), quote!(trait Borrowing<'a>: Plugin<&'a str> {})).unwrap_err();
        assert!(err.to_string().contains("lifetime"));
    }

    #[test]
    fn test_unknown_argument() {
        let err = expand(quote!(order = 1), quote!(trait F: Plugin<u8> {})).unwrap_err();
        assert!(err.to_string().contains("unknown argument `order`"));
    }
}
