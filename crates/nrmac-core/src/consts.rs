/// Row shifts used by the multiscale autocorrelation, in evaluation order.
pub const MAC_SCALES: [usize; 3] = [2, 3, 5];

/// Largest entry of [`MAC_SCALES`]. Images need strictly more rows than this.
pub const MAX_MAC_SCALE: usize = 5;

/// Luma weight for the red channel used by the greyscale reduction.
pub const GREY_WEIGHT_R: f64 = 0.2989;

/// Luma weight for the green channel used by the greyscale reduction.
pub const GREY_WEIGHT_G: f64 = 0.5870;

/// Luma weight for the blue channel used by the greyscale reduction.
pub const GREY_WEIGHT_B: f64 = 0.1140;

/// File suffix selecting candidate images when none is configured.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".tif";

/// Suffix appended to the source file stem for the quality raster.
pub const QUALITY_FILE_SUFFIX: &str = "_mac.tif";

/// Type key reported for every quality raster in the result envelope.
pub const QUALITY_FILE_KEY: &str = "tif";

/// Side length of the square quality raster.
pub const QUALITY_RASTER_SIZE: u32 = 2;

/// Status reported when the batch ran.
pub const STATUS_OK: i32 = 0;

/// Status reported when no candidate files were supplied.
pub const STATUS_NO_INPUT: i32 = -1;

/// EPSG code of the geographic CRS written into quality rasters (WGS84).
pub const QUALITY_RASTER_EPSG: u16 = 4326;
