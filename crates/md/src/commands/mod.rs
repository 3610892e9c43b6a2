//! CLI command implementations.

pub(crate) mod guidelines;
pub(crate) mod parsers;
pub(crate) mod render;

pub(crate) use guidelines::GuidelinesArgs;
pub(crate) use parsers::ParsersArgs;
pub(crate) use render::RenderArgs;
