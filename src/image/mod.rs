pub mod interface;
pub mod client;

pub use interface::ImageFetcher;
pub use client::HttpImageFetcher;
