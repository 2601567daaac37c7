pub mod consts;
pub mod error;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod quality;
pub mod raster;
