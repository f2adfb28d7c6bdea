mod map;
mod set;
pub(crate) mod tree;
