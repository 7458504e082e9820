mod backend;
mod metadata;

pub use backend::NativeBackend;
