pub(crate) mod loader;
pub(crate) mod resolve;
