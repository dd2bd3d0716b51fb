pub mod conversation;
pub mod landing;

pub use landing::LandingBanner;
