//! # Voxel World Application Entry Point
//!
//! Calls into the library's `run()` function and exits non-zero on failure.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    if let Err(err) = voxel_world::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
