pub mod amount;
pub mod bill;
pub mod item;
pub mod store;
pub mod video;

pub use bill::Bill;
pub use item::{Detection, LineItem};
pub use store::{StoreItem, StoreModel, StoreRecord};
pub use video::{AgeRestriction, VideoList, VideoUpload};
