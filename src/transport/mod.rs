pub(crate) mod display;
pub(crate) mod memory;
pub(crate) mod pack;
pub(crate) mod preview;
