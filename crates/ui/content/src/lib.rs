//! Data-driven window catalogs and layout settings.
//!
//! Window kinds, their resource paths, categories and sub-windows are declared
//! in RON catalog files; sorting-order layout is tuned from a TOML file. Several
//! catalog files may be joined into one [`ui_core::WindowCatalog`], in which
//! case the first file declaring a kind wins.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, ContentFactory, LayoutLoader, LoadResult};
