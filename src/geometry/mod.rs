pub(crate) mod blob;
pub(crate) mod region;
