pub mod descriptor;
pub mod gdal_warp;
pub mod land_cover;

pub use descriptor::DescriptorAlgorithm;
pub use gdal_warp::{warp_to_epsg, warped_file_name, GDAL_WARP_CONFIG};
pub use land_cover::LandCoverClassification;
