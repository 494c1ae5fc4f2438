use std::fmt;

use crate::foundation::core::{EndOfLife, ItemId};
use crate::source::decode::FrameSource;
use crate::timeline::resolver::ItemTiming;

/// MIME type accepted by [`GifMerger::append`](crate::GifMerger::append).
pub const GIF_MIME: &str = "image/gif";

/// Placement, timing and presentation of one item.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ItemProps {
    pub label: String,
    /// Paint order, low to high. Values need not be contiguous.
    pub z_index: i32,
    /// Invisible items are skipped by export but kept in state.
    pub visible: bool,
    /// Canvas offset of the transformed item's top-left corner.
    pub left: f64,
    pub top: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees, clockwise, about the item's center.
    pub angle: f64,
    /// 10 ms units.
    pub start: u32,
    /// 10 ms units.
    pub duration: u32,
    pub end_of_life: EndOfLife,
}

impl ItemProps {
    pub(crate) fn defaults(label: String, z_index: i32, source: &dyn FrameSource) -> Self {
        Self {
            label,
            z_index,
            visible: true,
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            start: 0,
            duration: source.total_delay(),
            end_of_life: EndOfLife::default(),
        }
    }

    /// Restore placement and timing; label, paint order and visibility stay.
    pub(crate) fn reset_placement(&mut self, source: &dyn FrameSource) {
        let defaults = Self::defaults(String::new(), self.z_index, source);
        *self = Self {
            label: std::mem::take(&mut self.label),
            visible: self.visible,
            ..defaults
        };
    }

    pub fn timing(&self) -> ItemTiming {
        ItemTiming {
            start: self.start,
            duration: self.duration,
            end_of_life: self.end_of_life,
        }
    }
}

/// Partial update of [`ItemProps`]; `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    pub label: Option<String>,
    pub z_index: Option<i32>,
    pub visible: Option<bool>,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub angle: Option<f64>,
    pub start: Option<u32>,
    pub duration: Option<u32>,
    pub end_of_life: Option<EndOfLife>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, props: &mut ItemProps) {
        if let Some(v) = &self.label {
            props.label.clone_from(v);
        }
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field {
                    props.$field = v;
                })*
            };
        }
        set!(
            z_index,
            visible,
            left,
            top,
            scale_x,
            scale_y,
            angle,
            start,
            duration,
            end_of_life
        );
    }
}

/// Source binary handed to [`GifMerger::append`](crate::GifMerger::append).
#[derive(Clone, Debug)]
pub struct ItemSource {
    pub mime: String,
    pub binary: Vec<u8>,
    pub patch: ItemPatch,
}

impl ItemSource {
    pub fn gif(binary: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: GIF_MIME.to_string(),
            binary: binary.into(),
            patch: ItemPatch::default(),
        }
    }

    pub fn with_patch(mut self, patch: ItemPatch) -> Self {
        self.patch = patch;
        self
    }
}

/// One placed source animation. The decoder is fixed for the item's lifetime.
pub struct MergeItem {
    pub(crate) id: ItemId,
    pub(crate) props: ItemProps,
    pub(crate) source: Box<dyn FrameSource>,
}

impl MergeItem {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn props(&self) -> &ItemProps {
        &self.props
    }

    pub fn source(&self) -> &dyn FrameSource {
        self.source.as_ref()
    }

    pub fn width(&self) -> u32 {
        self.source.width()
    }

    pub fn height(&self) -> u32 {
        self.source.height()
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            width: self.width(),
            height: self.height(),
            frame_count: self.source.frame_count(),
            props: self.props.clone(),
        }
    }
}

impl fmt::Debug for MergeItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeItem")
            .field("id", &self.id)
            .field("props", &self.props)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("frames", &self.source.frame_count())
            .finish()
    }
}

/// Plain-data view of an item, carried by change events.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub props: ItemProps,
}

#[cfg(test)]
#[path = "../../tests/unit/merger/item.rs"]
mod tests;
