pub mod cache;
pub mod constants;
pub mod coverage;
pub mod footprint;
pub mod projection;
pub mod selection;
pub mod skycover;
pub mod skycover_errors;
pub mod skymap;
