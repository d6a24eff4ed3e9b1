//! Spatial indexing for Potash.
//!
//! Geometries (points, line strings and polygons) are stored in documents as
//! embedded documents and queried with the `intersects`, `within` and `near`
//! filters. A `spatial` index on the field answers those filters from an
//! R-tree over the geometries' bounding boxes; each candidate is then checked
//! against its exact geometry.
//!
//! ```rust
//! use potash::collection::PotashCollectionProvider;
//! use potash::common::PersistentCollection;
//! use potash::doc;
//! use potash::potash::Potash;
//! use potash_spatial::{spatial_field, spatial_index, Geometry, SpatialModule};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Potash::builder()
//!     .load_module(SpatialModule::new())
//!     .open_or_create(None, None)?;
//!
//! let shops = db.collection("shops")?;
//! shops.create_index(vec!["location"], &spatial_index())?;
//!
//! let mut shop = doc! { "name": "corner" };
//! shop.put("location", Geometry::point(2.0, 3.0)?)?;
//! shops.insert(shop)?;
//!
//! let filter = spatial_field("location").within_envelope(0.0, 0.0, 5.0, 5.0)?;
//! assert_eq!(shops.find(filter)?.count(), 1);
//! db.close()?;
//! # Ok(())
//! # }
//! ```

mod bounding_box;
mod error;
mod filter;
mod fluent;
mod geometry;
mod indexer;
mod spatial_module;

pub use bounding_box::BoundingBox;
pub use error::{SpatialError, SpatialResult};
pub use filter::{is_spatial_filter, IntersectsFilter, NearFilter, WithinFilter};
pub use fluent::*;
pub use geometry::{Geometry, Point, GEOMETRY_COORDINATES, GEOMETRY_TYPE};
pub use indexer::SpatialIndexer;
pub use spatial_module::*;
