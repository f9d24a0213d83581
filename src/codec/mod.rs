pub(crate) mod atom;
pub(crate) mod decoder;
pub(crate) mod encoder;
pub(crate) mod params;
pub(crate) mod pool;
