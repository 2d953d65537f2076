pub(crate) mod composite;
pub(crate) mod normalize;
pub(crate) mod transitions;
