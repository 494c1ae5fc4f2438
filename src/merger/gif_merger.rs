use crate::export::session::{ExportOpts, ExportSession, YieldPoint};
use crate::foundation::core::{Canvas, ItemId, MAX_GIF_DIMENSION};
use crate::foundation::error::{MergeError, MergeResult};
use crate::frame::buffer::Frame;
use crate::merger::events::{EventBus, MergerEvent, Subscription, SubscriptionId};
use crate::merger::item::{GIF_MIME, ItemPatch, ItemProps, ItemSnapshot, ItemSource, MergeItem};
use crate::source::decode::{FrameSource, GifSource, SourceFrameInfo};

/// Relative or absolute change of an item's paint position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZMove {
    /// Move up (positive) or down (negative) by this many places.
    By(i32),
    Top,
    Bottom,
}

/// First decoded frame of an item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirstFrame {
    pub width: u32,
    pub height: u32,
    pub info: SourceFrameInfo,
    pub rgba: Vec<u8>,
}

/// Item set, canvas and export entry point.
///
/// Ids index an arena of slots; a removed item leaves an empty slot so ids
/// are never reused. Every mutation sends its events to subscribers before
/// returning. Unknown ids make mutations no-ops.
#[derive(Debug, Default)]
pub struct GifMerger {
    slots: Vec<Option<MergeItem>>,
    canvas: Option<Canvas>,
    events: EventBus,
}

impl GifMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sources(sources: impl IntoIterator<Item = ItemSource>) -> MergeResult<Self> {
        let mut merger = Self::new();
        merger.append(sources)?;
        Ok(merger)
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.events.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Live subscriptions; dropped receivers are counted until the next event.
    pub fn subscriber_count(&self) -> usize {
        self.events.len()
    }

    /// Live items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &MergeItem> {
        self.slots.iter().flatten()
    }

    pub fn item(&self, id: ItemId) -> Option<&MergeItem> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn snapshots(&self) -> Vec<ItemSnapshot> {
        self.items().map(MergeItem::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.items().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }

    pub fn canvas(&self) -> Option<Canvas> {
        self.canvas
    }

    /// Latest end time over visible items, in 10 ms units.
    pub fn duration(&self) -> u32 {
        self.items()
            .filter(|item| item.props.visible)
            .map(|item| item.props.timing().end())
            .max()
            .map_or(0, |end| u32::try_from(end).unwrap_or(u32::MAX))
    }

    /// Decode and add GIF sources. Nothing is added unless every source decodes.
    #[tracing::instrument(skip_all)]
    pub fn append(
        &mut self,
        sources: impl IntoIterator<Item = ItemSource>,
    ) -> MergeResult<Vec<ItemId>> {
        let mut decoded: Vec<(Box<dyn FrameSource>, ItemPatch)> = Vec::new();
        for source in sources {
            if source.mime != GIF_MIME {
                return Err(MergeError::unsupported(format!(
                    "source type {:?}, expected {GIF_MIME}",
                    source.mime
                )));
            }
            let gif = GifSource::decode(&source.binary)?;
            decoded.push((Box::new(gif), source.patch));
        }
        Ok(self.insert(decoded))
    }

    /// Add an already decoded source.
    pub fn append_source(
        &mut self,
        source: Box<dyn FrameSource>,
        patch: ItemPatch,
    ) -> MergeResult<ItemId> {
        if source.frame_count() == 0 || source.width() == 0 || source.height() == 0 {
            return Err(MergeError::validation("source has no frames or no pixels"));
        }
        if source.width() > MAX_GIF_DIMENSION || source.height() > MAX_GIF_DIMENSION {
            return Err(MergeError::validation(format!(
                "source {}x{} exceeds the GIF limit of {MAX_GIF_DIMENSION}",
                source.width(),
                source.height()
            )));
        }
        let id = ItemId(self.slots.len() as u64);
        self.insert(vec![(source, patch)]);
        Ok(id)
    }

    fn insert(&mut self, batch: Vec<(Box<dyn FrameSource>, ItemPatch)>) -> Vec<ItemId> {
        if batch.is_empty() {
            return Vec::new();
        }
        let before = self.duration();
        let base = self
            .items()
            .map(|item| item.props.z_index)
            .max()
            .unwrap_or(0)
            .max(0);

        let mut ids = Vec::with_capacity(batch.len());
        for (offset, (source, patch)) in batch.into_iter().enumerate() {
            let id = ItemId(self.slots.len() as u64);
            let z_index = base
                .saturating_add(1)
                .saturating_add(i32::try_from(offset).unwrap_or(i32::MAX));
            let mut props = ItemProps::defaults(format!("item-{}", id.0), z_index, source.as_ref());
            patch.apply_to(&mut props);
            tracing::debug!(%id, z_index = props.z_index, frames = source.frame_count(), "item added");
            self.slots.push(Some(MergeItem { id, props, source }));
            ids.push(id);
        }

        self.events.emit(MergerEvent::ItemsCreated(ids.clone()));
        self.emit_items_changed();
        if self.canvas.is_none() {
            let canvas = self.bounding_canvas();
            self.canvas = Some(canvas);
            self.events.emit(MergerEvent::CanvasCreated(canvas));
        }
        self.emit_duration_if_changed(before);
        ids
    }

    pub fn remove(&mut self, id: ItemId) {
        let before = self.duration();
        let Some(slot) = self.slots.get_mut(id.0 as usize) else {
            return;
        };
        if slot.take().is_none() {
            return;
        }
        self.emit_items_changed();
        self.emit_duration_if_changed(before);
    }

    pub fn modify(&mut self, id: ItemId, patch: &ItemPatch) {
        if patch.is_empty() {
            return;
        }
        let before = self.duration();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        patch.apply_to(&mut item.props);
        self.emit_items_changed();
        self.emit_duration_if_changed(before);
    }

    /// Restore placement and timing defaults of one item.
    pub fn reset_item(&mut self, id: ItemId) {
        let before = self.duration();
        let Some(item) = self.item_mut(id) else {
            return;
        };
        item.props.reset_placement(item.source.as_ref());
        self.emit_items_changed();
        self.emit_duration_if_changed(before);
    }

    /// Drop every item and the canvas. Ids keep counting up.
    pub fn reset_all(&mut self) {
        let before = self.duration();
        for slot in &mut self.slots {
            *slot = None;
        }
        self.canvas = None;
        self.emit_items_changed();
        self.emit_duration_if_changed(before);
    }

    /// Move `id` within the paint order by permuting the existing z values.
    pub fn change_z_index(&mut self, id: ItemId, to: ZMove) {
        let mut order: Vec<(i32, ItemId)> = self
            .items()
            .map(|item| (item.props.z_index, item.id))
            .collect();
        order.sort_unstable();
        let Some(from) = order.iter().position(|&(_, other)| other == id) else {
            return;
        };

        let last = order.len() - 1;
        let target = match to {
            ZMove::Top => last,
            ZMove::Bottom => 0,
            ZMove::By(n) => {
                let moved = i64::try_from(from).unwrap_or(i64::MAX) + i64::from(n);
                usize::try_from(moved.clamp(0, last as i64)).unwrap_or(last)
            }
        };
        if target == from {
            return;
        }

        let z_values: Vec<i32> = order.iter().map(|&(z, _)| z).collect();
        let moved = order.remove(from);
        order.insert(target, moved);
        for (&z, &(_, item_id)) in z_values.iter().zip(&order) {
            if let Some(item) = self.item_mut(item_id) {
                item.props.z_index = z;
            }
        }
        self.emit_items_changed();
    }

    pub fn set_canvas(&mut self, width: u32, height: u32) -> MergeResult<()> {
        let canvas = Canvas::new(width, height)?;
        let created = self.canvas.is_none();
        self.canvas = Some(canvas);
        self.events.emit(if created {
            MergerEvent::CanvasCreated(canvas)
        } else {
            MergerEvent::CanvasUpdated(canvas)
        });
        Ok(())
    }

    pub fn first_frame(&self, id: ItemId) -> MergeResult<Option<FirstFrame>> {
        let Some(item) = self.item(id) else {
            return Ok(None);
        };
        let source = item.source();
        let info = source
            .frame_info(0)
            .ok_or_else(|| MergeError::decode(format!("item {id} has no frames")))?;
        let rgba = source.decode_frame_rgba(0)?.into_owned();
        Ok(Some(FirstFrame {
            width: source.width(),
            height: source.height(),
            info,
            rgba,
        }))
    }

    /// First frame, shrunk so its longer edge is at most `max_edge`.
    pub fn thumbnail(&self, id: ItemId, max_edge: Option<u32>) -> MergeResult<Option<Frame>> {
        let Some(first) = self.first_frame(id)? else {
            return Ok(None);
        };
        let frame = Frame::from_frame_rgba(first.rgba, first.width, Some(first.height))?;
        let longest = first.width.max(first.height);
        match max_edge {
            Some(edge) if edge > 0 && longest > edge => {
                let ratio = f64::from(edge) / f64::from(longest);
                let w = ((f64::from(first.width) * ratio).round() as u32).max(1);
                let h = ((f64::from(first.height) * ratio).round() as u32).max(1);
                Ok(Some(frame.resize(w, h)))
            }
            _ => Ok(Some(frame)),
        }
    }

    /// Prepare a resumable export, or `None` when there is no canvas yet.
    pub fn export_session(&self, opts: ExportOpts) -> MergeResult<Option<ExportSession<'_>>> {
        let Some(canvas) = self.canvas else {
            tracing::debug!("no canvas, nothing to export");
            return Ok(None);
        };
        ExportSession::new(canvas, self.items(), self.duration(), opts).map(Some)
    }

    pub fn generate_gif(&self, opts: ExportOpts) -> MergeResult<Option<Vec<u8>>> {
        self.generate_gif_with(opts, |_| {})
    }

    /// Export, handing every suspension point to `on_yield`.
    #[tracing::instrument(skip_all, fields(items = self.len(), duration = self.duration()))]
    pub fn generate_gif_with(
        &self,
        opts: ExportOpts,
        mut on_yield: impl FnMut(YieldPoint),
    ) -> MergeResult<Option<Vec<u8>>> {
        let Some(mut session) = self.export_session(opts)? else {
            return Ok(None);
        };
        loop {
            let point = session.step()?;
            on_yield(point);
            if point == YieldPoint::Finished {
                break;
            }
        }
        session.finish().map(Some)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut MergeItem> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    fn bounding_canvas(&self) -> Canvas {
        let width = self.items().map(MergeItem::width).max().unwrap_or(1);
        let height = self.items().map(MergeItem::height).max().unwrap_or(1);
        Canvas {
            width: width.clamp(1, MAX_GIF_DIMENSION),
            height: height.clamp(1, MAX_GIF_DIMENSION),
        }
    }

    fn emit_items_changed(&mut self) {
        let snapshots = self.snapshots();
        self.events.emit(MergerEvent::ItemsChanged(snapshots));
    }

    fn emit_duration_if_changed(&mut self, before: u32) {
        let after = self.duration();
        if after != before {
            self.events.emit(MergerEvent::DurationChanged(after));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/merger/gif_merger.rs"]
mod tests;
