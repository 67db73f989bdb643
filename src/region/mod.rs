pub(crate) mod mark;
pub(crate) mod model;
pub(crate) mod template;
