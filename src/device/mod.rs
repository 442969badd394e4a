//! Smart-home devices and the collection that owns them

pub mod collection;
pub mod model;

pub use collection::DeviceCollection;
pub use model::{Device, DeviceType, PartialUpdate};
