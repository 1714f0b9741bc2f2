pub(crate) mod frame;
pub(crate) mod sequence;
pub(crate) mod transform;
