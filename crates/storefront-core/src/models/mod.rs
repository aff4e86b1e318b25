mod architecture;
mod attribute;
mod checklist;
mod search;

pub use architecture::ArchitectureNode;
pub use attribute::{
    ActiveStatus, AttributeSyncItem, AttributeType, CodeEntry, ROOT_CODE, SyncBatch, SyncReport,
};
pub use checklist::ChecklistQuestion;
pub use search::{ComponentSearchView, ComponentTag, SearchResultAttribute};
