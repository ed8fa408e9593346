use serde::Serialize;

pub mod category;
pub mod nav_item;
pub mod quick_link;
pub mod user;

/// Owner reference embedded in nav-item and quick-link payloads.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRef {
    pub username: String,
}
