pub(crate) mod workspace;
