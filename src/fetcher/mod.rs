pub mod destination;
pub mod image_fetcher;

pub use destination::{image_file_name, sanitize_filename, target_folder_for};
pub use image_fetcher::{FetchOutcome, FetchSettings, ImageFetcher};
