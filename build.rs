//! Stamps `KITBASH_BANNER`, the line the CLI prints on start.
//!
//! `KITBASH_BUILD_STAMP` pins the date part for reproducible builds.

use time::macros::format_description;
use time::OffsetDateTime;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=KITBASH_BUILD_STAMP");

    let version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let stamp = std::env::var("KITBASH_BUILD_STAMP").unwrap_or_else(|_| {
        OffsetDateTime::now_utc()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap_or_else(|_| "unknown date".into())
    });
    println!("cargo:rustc-env=KITBASH_BANNER=KITBASH {version} (built {stamp})");
}
