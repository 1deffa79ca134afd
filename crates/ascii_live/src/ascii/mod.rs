pub mod frame;
pub mod mapping;
pub mod palette;
