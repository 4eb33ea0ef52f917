pub mod services;

pub use services::{decode_base64_image, UploadItem};
