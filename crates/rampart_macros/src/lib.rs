use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Time a system when the `perf_stats` feature is enabled.
///
/// Wraps the function body with a drop guard that logs the elapsed time
/// through Bevy's `info!` on exit. Without the `perf_stats` feature the
/// attribute expands to the untouched function.
///
/// If the function takes a `tick: Res<SimTick>` parameter the guard also
/// logs every 100th tick regardless of duration, matching `profile_log!`.
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn integrate_motion(
///     query: Query<&SimPosition>,
///     tick: Res<SimTick>,
/// ) {
///     // ... work ...
/// }
/// ```
///
/// An optional argument overrides the log threshold in milliseconds:
/// `#[profile(2)]`.
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    // A parameter literally named `tick` with a SimTick type opts into
    // tick-gated logging.
    let has_tick_param = sig.inputs.iter().any(|arg| {
        if let FnArg::Typed(pat_type) = arg {
            if let Pat::Ident(pat_ident) = &*pat_type.pat {
                if pat_ident.ident == "tick" {
                    let type_str = quote!(#pat_type.ty).to_string();
                    return type_str.contains("SimTick");
                }
            }
        }
        false
    });

    let guard_def = if has_tick_param {
        quote! {
            struct SystemTimer {
                name: &'static str,
                start: std::time::Instant,
                tick_value: u64,
            }
            impl Drop for SystemTimer {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms || (self.tick_value % 100 == 0) {
                        bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                    }
                }
            }
            SystemTimer {
                name: #fn_name_str,
                start: std::time::Instant::now(),
                tick_value: tick.0,
            }
        }
    } else {
        quote! {
            struct SystemTimer {
                name: &'static str,
                start: std::time::Instant,
            }
            impl Drop for SystemTimer {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms {
                        bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                    }
                }
            }
            SystemTimer {
                name: #fn_name_str,
                start: std::time::Instant::now(),
            }
        }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _system_timer = {
                #guard_def
            };

            #block
        }
    };

    output.into()
}
