pub(crate) mod container;
pub(crate) mod raster;
pub(crate) mod record;
