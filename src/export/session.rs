use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::export::disposal::DisposalCache;
use crate::export::encode::{GifWriter, OutputFrame, Repeat};
use crate::export::palette::PaletteBuilder;
use crate::foundation::core::{Canvas, DEFAULT_TICK, ItemId};
use crate::foundation::error::{MergeError, MergeResult};
use crate::frame::buffer::{Frame, MergeAt, alpha_is_zero};
use crate::merger::item::MergeItem;
use crate::source::decode::DisposalCode;
use crate::timeline::resolver::TimelineCursor;

/// Options for one export.
#[derive(Clone, Debug)]
pub struct ExportOpts {
    /// Output quantum in 10 ms units.
    pub tick: u32,
    pub repeat: Repeat,
    /// Checked before every unit of work.
    pub cancel: Option<CancelToken>,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            repeat: Repeat::Infinite,
            cancel: None,
        }
    }
}

/// Shared flag that aborts a running export at its next suspension point.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Where an export hands control back to its host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YieldPoint {
    /// One item was drawn onto the tick's canvas.
    ItemComposited { tick: u32, item: ItemId },
    /// A tick was completed; `emitted` is false when it extended the previous frame.
    TickFinished { tick: u32, emitted: bool },
    Finished,
}

/// Counters of a finished or running export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub ticks: u64,
    pub frames_emitted: u64,
    pub frames_deduplicated: u64,
    pub palette_len: usize,
}

struct Layer<'a> {
    item: &'a MergeItem,
    cursor: TimelineCursor,
}

struct TickInProgress {
    tick: u32,
    delay: u32,
    indices: Vec<Option<usize>>,
    canvas: Frame,
    next_layer: usize,
}

/// A resumable export.
///
/// Each [`step`](Self::step) performs one unit of work (one item drawn, or
/// one tick closed) and returns the suspension point it reached, so a host
/// can interleave an export with its own work. Ticks are processed strictly
/// in order.
pub struct ExportSession<'a> {
    canvas: Canvas,
    duration: u32,
    opts: ExportOpts,
    layers: Vec<Layer<'a>>,
    cache: DisposalCache,
    palette: PaletteBuilder,
    frames: Vec<OutputFrame>,
    last_indices: Option<Vec<Option<usize>>>,
    t: u32,
    pending: Option<TickInProgress>,
    stats: ExportStats,
    done: bool,
}

impl<'a> ExportSession<'a> {
    /// `items` may come in any order; invisible ones are skipped.
    pub fn new(
        canvas: Canvas,
        items: impl IntoIterator<Item = &'a MergeItem>,
        duration: u32,
        opts: ExportOpts,
    ) -> MergeResult<Self> {
        canvas.validate()?;
        if opts.tick == 0 {
            return Err(MergeError::validation("export tick must be non-zero"));
        }

        let mut visible: Vec<&MergeItem> = items
            .into_iter()
            .filter(|item| item.props().visible && item.source().frame_count() > 0)
            .collect();
        visible.sort_by_key(|item| (item.props().z_index, item.id()));

        let layers = visible
            .into_iter()
            .map(|item| {
                let src = item.source();
                let delays = (0..src.frame_count())
                    .map(|i| src.frame_info(i).map(|info| info.delay).unwrap_or(1))
                    .collect();
                Layer {
                    item,
                    cursor: TimelineCursor::new(item.props().timing(), delays),
                }
            })
            .collect();

        Ok(Self {
            canvas,
            duration,
            opts,
            layers,
            cache: DisposalCache::new(),
            palette: PaletteBuilder::new(),
            frames: Vec::new(),
            last_indices: None,
            t: 0,
            pending: None,
            stats: ExportStats::default(),
            done: false,
        })
    }

    pub fn stats(&self) -> ExportStats {
        ExportStats {
            palette_len: self.palette.len(),
            ..self.stats
        }
    }

    /// Frames emitted so far. Transparent indices are filled in by [`finish`](Self::finish).
    pub fn frames(&self) -> &[OutputFrame] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.done
    }

    /// Advance to the next suspension point.
    pub fn step(&mut self) -> MergeResult<YieldPoint> {
        loop {
            if self.done {
                return Ok(YieldPoint::Finished);
            }
            if self
                .opts
                .cancel
                .as_ref()
                .is_some_and(CancelToken::is_cancelled)
            {
                return Err(MergeError::Cancelled);
            }

            if let Some(mut tick) = self.pending.take() {
                while tick.next_layer < self.layers.len() && tick.indices[tick.next_layer].is_none()
                {
                    tick.next_layer += 1;
                }

                if tick.next_layer < self.layers.len() {
                    let item = self.composite_layer(&mut tick)?;
                    let at = tick.tick;
                    self.pending = Some(tick);
                    return Ok(YieldPoint::ItemComposited { tick: at, item });
                }

                return self.close_tick(tick);
            }

            if !self.has_more_ticks() {
                self.done = true;
                tracing::info!(
                    frames = self.frames.len(),
                    ticks = self.stats.ticks,
                    colors = self.palette.len(),
                    "export finished"
                );
                return Ok(YieldPoint::Finished);
            }

            let tick = self.t;
            let delay = self.tick_delay();
            let indices: Vec<Option<usize>> = self
                .layers
                .iter_mut()
                .map(|layer| layer.cursor.resolve(tick))
                .collect();
            self.stats.ticks += 1;

            if self.last_indices.as_ref() == Some(&indices)
                && let Some(last) = self.frames.last_mut()
            {
                last.delay += delay;
                self.t += delay;
                self.stats.frames_deduplicated += 1;
                tracing::debug!(tick, delay = last.delay, "tick repeats previous frame");
                return Ok(YieldPoint::TickFinished {
                    tick,
                    emitted: false,
                });
            }

            self.last_indices = Some(indices.clone());
            self.pending = Some(TickInProgress {
                tick,
                delay,
                indices,
                canvas: Frame::from_rectangle(self.canvas.width, self.canvas.height, [0, 0, 0, 0]),
                next_layer: 0,
            });
        }
    }

    /// Run any remaining steps, then encode the frames with the final palette.
    pub fn finish(mut self) -> MergeResult<Vec<u8>> {
        while self.step()? != YieldPoint::Finished {}

        let palette = self.palette.finish();
        let mut writer = GifWriter::new(self.canvas, &palette, self.opts.repeat)?;
        for frame in &mut self.frames {
            frame.transparent_index = palette.transparent_index;
            writer.add_frame(frame)?;
        }
        writer.finish()
    }

    fn has_more_ticks(&self) -> bool {
        self.t < self.duration || (self.duration == 0 && self.frames.is_empty())
    }

    /// The last tick is shortened so output delays sum to the duration.
    fn tick_delay(&self) -> u32 {
        self.opts.tick.min(self.duration.saturating_sub(self.t))
    }

    fn composite_layer(&mut self, tick: &mut TickInProgress) -> MergeResult<ItemId> {
        let layer = &self.layers[tick.next_layer];
        let index = tick.indices[tick.next_layer].unwrap_or_default();
        tick.next_layer += 1;

        let item = layer.item;
        let src = item.source();
        let info = src.frame_info(index).ok_or_else(|| {
            MergeError::validation(format!("item {} has no frame {index}", item.id()))
        })?;
        let rgba = src.decode_frame_rgba(index)?;
        let decoded = Frame::from_frame_rgba(rgba.into_owned(), src.width(), Some(src.height()))?;

        let drawn = self.cache.combine(item.id(), decoded);
        self.cache.update(item.id(), info.disposal, &drawn);

        let props = item.props();
        let placed = drawn
            .scale(props.scale_x, props.scale_y)
            .rotate_deg(props.angle)
            .apply()?;
        tick.canvas = tick.canvas.merge_with(
            &placed,
            MergeAt::new(props.left, props.top),
            alpha_is_zero,
        );

        Ok(item.id())
    }

    fn close_tick(&mut self, tick: TickInProgress) -> MergeResult<YieldPoint> {
        let indexed_pixels = self.palette.index_frame(&tick.canvas)?;
        self.frames.push(OutputFrame {
            x: 0,
            y: 0,
            width: self.canvas.width as u16,
            height: self.canvas.height as u16,
            indexed_pixels,
            delay: tick.delay,
            transparent_index: None,
            disposal: DisposalCode::RESTORE_BACKGROUND,
        });
        self.t += tick.delay;
        self.stats.frames_emitted += 1;
        tracing::debug!(
            tick = tick.tick,
            colors = self.palette.len(),
            "emitted frame"
        );
        Ok(YieldPoint::TickFinished {
            tick: tick.tick,
            emitted: true,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/session.rs"]
mod tests;
