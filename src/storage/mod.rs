//! Storage module
//!
//! Remote media host client (upload/delete of binary assets).

mod media;

pub use media::{AssetKind, MediaHost, UploadedAsset, asset_id_from_url};
