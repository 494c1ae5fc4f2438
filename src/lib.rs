//! mergif composites independently timed animated GIFs into one output GIF.
//!
//! Each source becomes an item with its own placement (offset, scale, rotation),
//! timing (start, duration, end-of-life policy) and paint order. An export walks
//! a shared output clock in fixed ticks and, for every tick:
//!
//! 1. **Resolve**: pick each item's source frame for the tick (`TimelineCursor`).
//! 2. **Composite**: replay GIF disposal per item (`DisposalCache`), bake its
//!    transform (`PendingFrame::apply`) and draw it onto a transparent canvas
//!    in ascending z order (`Frame::merge`).
//! 3. **Index**: map the canvas onto one shared ≤256-color table (`PaletteBuilder`).
//!
//! Ticks whose resolved frames match the previous tick only extend its delay.
//! The finished frame list is written with the `gif` encoder.
//!
//! Exports are cooperative: [`ExportSession::step`] does one unit of work and
//! returns where it stopped, so a host can interleave an export with its own work.
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Binary transparency**: compositing never blends; a pixel is either
//!   overwritten or kept, as GIF frames are.
#![forbid(unsafe_code)]

mod export;
mod foundation;
mod frame;
mod merger;
mod project;
mod source;
mod timeline;

/// Affine helpers used when baking frame transforms.
pub mod transform;

pub use export::disposal::DisposalCache;
pub use export::encode::{GifWriter, OutputFrame, Repeat};
pub use export::palette::{PALETTE_LIMIT, Palette, PaletteBuilder};
pub use export::session::{CancelToken, ExportOpts, ExportSession, ExportStats, YieldPoint};
pub use foundation::core::{
    Affine, Canvas, DEFAULT_TICK, EndOfLife, ItemId, MAX_FRAME_PIXELS, MAX_GIF_DIMENSION, Point,
    Rect, Rgba, Vec2,
};
pub use foundation::error::{MergeError, MergeResult};
pub use frame::buffer::{Frame, MergeAt, PendingFrame, alpha_is_zero};
pub use merger::events::{MergerEvent, Subscription, SubscriptionId};
pub use merger::gif_merger::{FirstFrame, GifMerger, ZMove};
pub use merger::item::{GIF_MIME, ItemPatch, ItemProps, ItemSnapshot, ItemSource, MergeItem};
pub use project::config::{Project, ProjectItem};
pub use source::decode::{
    DisposalCode, FrameSource, GifSource, SourceFrameInfo, ZERO_DELAY_FALLBACK,
};
pub use source::memory::MemorySource;
pub use timeline::resolver::{ItemTiming, TimelineCursor, effective_frame_count};
