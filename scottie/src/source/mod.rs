pub mod raster;
pub mod sine;
