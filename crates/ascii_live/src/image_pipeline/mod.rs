pub mod clip;
pub mod loader;
pub mod noise;
pub mod raster;
pub mod resize;
pub mod sampler;
