pub(crate) mod circles;
pub(crate) mod images;
