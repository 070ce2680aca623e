pub mod link_extractor;

pub use link_extractor::{parse_image_url, LinkExtraction, LinkExtractor};
