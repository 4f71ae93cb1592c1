mod sku_store;

pub use sku_store::SkuStore;
