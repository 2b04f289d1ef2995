//! Google Drive upload integration

mod uploader;

pub use uploader::DriveUploader;
