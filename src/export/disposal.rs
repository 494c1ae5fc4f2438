use std::collections::HashMap;

use crate::foundation::core::ItemId;
use crate::frame::buffer::{Frame, MergeAt, alpha_is_zero};
use crate::source::decode::DisposalCode;

/// Last drawn frame per item, kept while the item's frames say "combine".
///
/// Lives for a single export.
#[derive(Debug, Default)]
pub struct DisposalCache {
    frames: HashMap<ItemId, Frame>,
}

impl DisposalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ItemId) -> Option<&Frame> {
        self.frames.get(&id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Draw `frame` over the item's retained frame, if there is one.
    pub fn combine(&self, id: ItemId, frame: Frame) -> Frame {
        match self.frames.get(&id) {
            Some(prev) => prev.merge_with(&frame, MergeAt::default(), alpha_is_zero),
            None => frame,
        }
    }

    /// Record what the item just drew, according to its disposal code.
    pub fn update(&mut self, id: ItemId, code: DisposalCode, drawn: &Frame) {
        match code {
            DisposalCode::KEEP => {
                self.frames.insert(id, drawn.clone());
            }
            DisposalCode::RESTORE_BACKGROUND => {
                self.frames.remove(&id);
            }
            _ => {}
        }
    }
}
