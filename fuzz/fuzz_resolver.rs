//! Fuzz target for the resolver.
//!
//! Run with: cargo +nightly fuzz run fuzz_resolver
//!
//! Pattern evaluation must stay linear in the input — the rule patterns
//! permit no catastrophic backtracking — so arbitrary input either
//! resolves or classifies as unrecognized, and never panics or hangs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlance_core::{Catalog, Resolver};
use std::sync::OnceLock;

fn resolver() -> &'static Resolver {
    static RESOLVER: OnceLock<Resolver> = OnceLock::new();
    RESOLVER.get_or_init(|| {
        Resolver::new(Catalog::builtin().expect("built-in catalog compiles"))
    })
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // We don't care about the outcome — just that it returns
        let _ = resolver().resolve(s);
    }
});
