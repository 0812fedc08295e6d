pub(crate) mod color;
pub(crate) mod core;
pub(crate) mod error;
pub(crate) mod fallback;
pub(crate) mod math;
pub(crate) mod pool;
pub(crate) mod process;
