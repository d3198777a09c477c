use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    Expr, Ident, ItemFn, LitStr, Path, ReturnType, Token,
    parse::{Parse, ParseStream, Result},
};

/// Arguments of `#[register_plugin(Contract, order = N, name = "…")]`.
pub struct RegisterArgs {
    contract: Path,
    order: Option<Expr>,
    name: Option<LitStr>,
}

impl Parse for RegisterArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let contract: Path = input.parse()?;
        let mut args = RegisterArgs {
            contract,
            order: None,
            name: None,
        };
        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "order" => args.order = Some(input.parse()?),
                "name" => args.name = Some(input.parse()?),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown argument `{other}`; expected order or name"),
                    ));
                }
            }
        }
        Ok(args)
    }
}

/// Implementation of `#[register_plugin(…)]`.
///
/// Leaves the constructor unchanged and appends a
/// `#[::hinge_core::linkme::distributed_slice]` static that contributes the
/// constructed plugin to every registry wired for the contract.
pub fn register_plugin(args: RegisterArgs, func: ItemFn) -> Result<TokenStream> {
    let sig = &func.sig;
    if sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig.asyncness,
            "plugin constructors must be synchronous",
        ));
    }
    if !sig.inputs.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.inputs,
            "plugin constructors cannot take arguments",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "plugin constructors cannot be generic",
        ));
    }
    if matches!(sig.output, ReturnType::Default) {
        return Err(syn::Error::new_spanned(
            sig,
            "plugin constructors must return the plugin",
        ));
    }

    let fn_name = &sig.ident;
    let static_name = Ident::new(
        &format!("_HINGE_PLUGIN_{}", fn_name.to_string().to_uppercase()),
        Span::call_site(),
    );
    let name = args
        .name
        .unwrap_or_else(|| LitStr::new(&fn_name.to_string(), fn_name.span()));

    let contract = &args.contract;
    let contract_name = quote!(#contract).to_string().replace(' ', "");
    let order = match &args.order {
        Some(order) => quote!(::std::option::Option::Some(#order)),
        None => quote!(::std::option::Option::None),
    };

    Ok(quote! {
        #func

        #[::hinge_core::linkme::distributed_slice(::hinge_core::PLUGIN_CONTRIBUTIONS)]
        #[linkme(crate = ::hinge_core::linkme)]
        static #static_name: ::hinge_core::PluginContribution = ::hinge_core::PluginContribution {
            name: #name,
            contract_name: #contract_name,
            contract_id: || ::std::any::TypeId::of::<dyn #contract>(),
            order: #order,
            install: |directory| {
                directory.install::<dyn #contract>(::std::sync::Arc::new(#fn_name()), #order)
            },
        };
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(args: TokenStream, item: TokenStream) -> Result<String> {
        let args: RegisterArgs = syn::parse2(args)?;
        let func: ItemFn = syn::parse2(item)?;
        register_plugin(args, func).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_contribution_static() {
        let out = expand(
            quote!(formats::Formatter, order = -10),
            quote!(fn csv_formatter() -> Csv { Csv }),
        )
        .unwrap();
        assert!(out.contains("static _HINGE_PLUGIN_CSV_FORMATTER"));
        assert!(out.contains("contract_name : \"formats::Formatter\""));
        assert!(out.contains("name : \"csv_formatter\""));
        assert!(out.contains("Some (- 10)"));
        assert!(out.contains("install :: < dyn formats :: Formatter >"));
    }

    #[test]
    fn test_name_override_and_default_order() {
        let out = expand(
            quote!(Formatter, name = "csv"),
            quote!(fn make() -> Csv { Csv }),
        )
        .unwrap();
        assert!(out.contains("name : \"csv\""));
        assert!(out.contains("order : :: std :: option :: Option :: None"));
    }

    #[test]
    fn test_rejects_arguments() {
        let err = expand(quote!(Formatter), quote!(fn make(x: u8) -> Csv { Csv })).unwrap_err();
        assert!(err.to_string().contains("cannot take arguments"));
    }

    #[test]
    fn test_rejects_async() {
        let err = expand(quote!(Formatter), quote!(async fn make() -> Csv { Csv })).unwrap_err();
        assert!(err.to_string().contains("synchronous"));
    }

    #[test]
    fn test_rejects_unit_return() {
        let err = expand(quote!(Formatter), quote!(fn make() {})).unwrap_err();
        assert!(err.to_string().contains("must return"));
    }
}
