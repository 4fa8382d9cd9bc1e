//! Procedural macros used by `air-canvas`.
//!
//! Do not use this crate directly, use `air-canvas` instead.

use proc_macro::{Span, TokenStream};
use quote::quote;
use syn::{parse::Error, ItemFn};

/// Turns `main` into an application entry point that runs next to the GUI event loop.
///
/// The annotated function is moved to a background thread, since the main thread has to drive the
/// window system. Logging is initialized before the function is invoked.
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    match expand_main(args, item.clone()) {
        Ok(tokens) => tokens,
        Err(err) => {
            // Emit the `compile_error!` invocation, alongside the original item, in an attempt to
            // improve IDE support.
            let mut error = item.clone();
            error.extend(TokenStream::from(err.to_compile_error()));
            error
        }
    }
}

fn expand_main(args: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    if !args.is_empty() {
        return Err(Error::new(
            Span::call_site().into(),
            "`#[air_canvas::main]` does not accept arguments",
        ));
    }

    let item = syn::parse::<ItemFn>(item)?;

    if item.sig.ident != "main" {
        return Err(Error::new(
            item.sig.ident.span(),
            "`#[air_canvas::main]` must be applied to a function called `main`",
        ));
    }

    if item.sig.asyncness.is_some() {
        return Err(Error::new(
            item.sig.ident.span(),
            "`#[air_canvas::main]` cannot be applied to an `async fn`",
        ));
    }

    Ok(quote! {
        fn main() {
            #item

            ::air_canvas::init_logger!();

            ::air_canvas::run(main);
        }
    }
    .into())
}
