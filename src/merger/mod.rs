//! Item/canvas state owned by the host, with change notifications.

pub mod events;
pub mod gif_merger;
pub mod item;
