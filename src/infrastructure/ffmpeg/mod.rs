pub mod toolchain;

pub use toolchain::{Tool, Toolchain};
