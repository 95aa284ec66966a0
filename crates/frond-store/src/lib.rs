//! Content model and build store.
//!
//! Normalizers turn CMS or local data into [`RenderItem`] trees and fill a
//! store with the lookups link resolution needs:
//!
//! - **parents**: content type → item id → immediate parent (`[id, slug, title]`)
//! - **archiveMeta**: content type or taxonomy → listing metadata
//! - **navigations**, **formMeta**, **imageMeta**
//!
//! The [`Store`] trait abstracts lookups so link helpers can be tested against
//! [`MemoryStore`] without loading files.

mod item;
mod memory;
mod store;

pub use item::{Content, RenderItem};
pub use memory::MemoryStore;
pub use store::{
    ArchiveMeta, Navigation, NavigationItem, ParentEntry, Store, StoreData, StoreError,
};
