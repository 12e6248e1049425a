//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod engines;

pub(crate) use build::BuildArgs;
pub(crate) use engines::EnginesArgs;
