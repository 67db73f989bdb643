pub(crate) mod background;
pub(crate) mod batch;
pub(crate) mod pipeline;
pub(crate) mod surface;
pub(crate) mod trim;
