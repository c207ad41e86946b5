//! Build script so that `sqlx::migrate!` picks up new migration files.
//!
//! The macro embeds `migrations/` at compile time, and cargo does not
//! otherwise notice files added to that directory.

fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
