pub mod fs_atomic;
pub mod ids;
pub mod paths;
pub mod serde_ext;
