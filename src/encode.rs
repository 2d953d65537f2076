pub(crate) mod gif;
pub(crate) mod settings;
pub(crate) mod sink;
