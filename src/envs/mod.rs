pub mod aging_asset;
