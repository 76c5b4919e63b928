//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod version;

pub(crate) use render::RenderArgs;
pub(crate) use version::VersionArgs;
