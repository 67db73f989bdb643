pub(crate) mod transform;
