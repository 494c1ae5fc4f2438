use super::*;
use crate::foundation::core::EndOfLife;
use crate::merger::item::{ItemPatch, ItemProps};
use crate::source::decode::{FrameSource, GifSource, SourceFrameInfo};
use crate::source::memory::MemorySource;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn item(id: u64, z: i32, source: MemorySource, patch: ItemPatch) -> MergeItem {
    let mut props = ItemProps::defaults(format!("item-{id}"), z, &source);
    patch.apply_to(&mut props);
    MergeItem {
        id: ItemId(id),
        props,
        source: Box::new(source),
    }
}

fn red_blue_loop() -> MergeItem {
    let src = MemorySource::solid(
        1,
        1,
        &[(RED, 10), (BLUE, 10)],
        DisposalCode::RESTORE_BACKGROUND,
    );
    item(
        1,
        1,
        src,
        ItemPatch {
            end_of_life: Some(EndOfLife::Loop),
            ..ItemPatch::default()
        },
    )
}

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn decoded_pixels(bytes: &[u8]) -> Vec<Vec<u8>> {
    let gif = GifSource::decode(bytes).unwrap();
    (0..gif.frame_count())
        .map(|i| gif.decode_frame_rgba(i).unwrap().into_owned())
        .collect()
}

#[test]
fn two_frame_loop_emits_two_frames_covering_the_duration() {
    let items = [red_blue_loop()];
    let mut session =
        ExportSession::new(canvas(1, 1), &items, 20, ExportOpts::default()).unwrap();
    while session.step().unwrap() != YieldPoint::Finished {}

    let delays: Vec<u32> = session.frames().iter().map(|f| f.delay).collect();
    assert_eq!(delays, vec![12, 8]);
    assert_eq!(
        session.stats(),
        ExportStats {
            ticks: 5,
            frames_emitted: 2,
            frames_deduplicated: 3,
            palette_len: 2,
        }
    );

    let bytes = session.finish().unwrap();
    let frames = decoded_pixels(&bytes);
    assert_eq!(frames, vec![RED.to_vec(), BLUE.to_vec()]);
}

#[test]
fn steps_yield_after_each_item_and_each_tick() {
    let items = [red_blue_loop()];
    let mut session =
        ExportSession::new(canvas(1, 1), &items, 8, ExportOpts::default()).unwrap();

    assert_eq!(
        session.step().unwrap(),
        YieldPoint::ItemComposited {
            tick: 0,
            item: ItemId(1)
        }
    );
    assert_eq!(
        session.step().unwrap(),
        YieldPoint::TickFinished {
            tick: 0,
            emitted: true
        }
    );
    assert_eq!(
        session.step().unwrap(),
        YieldPoint::TickFinished {
            tick: 4,
            emitted: false
        }
    );
    assert_eq!(session.step().unwrap(), YieldPoint::Finished);
    assert!(session.is_finished());
    assert_eq!(session.step().unwrap(), YieldPoint::Finished);
}

#[test]
fn higher_z_index_paints_last_regardless_of_input_order() {
    let top = item(
        1,
        5,
        MemorySource::solid(1, 1, &[(BLUE, 4)], DisposalCode::UNSPECIFIED),
        ItemPatch::default(),
    );
    let bottom = item(
        2,
        1,
        MemorySource::solid(1, 1, &[(RED, 4)], DisposalCode::UNSPECIFIED),
        ItemPatch::default(),
    );
    let items = [top, bottom];
    let bytes = ExportSession::new(canvas(1, 1), &items, 4, ExportOpts::default())
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(decoded_pixels(&bytes), vec![BLUE.to_vec()]);
}

#[test]
fn invisible_items_are_skipped() {
    let hidden = item(
        1,
        1,
        MemorySource::solid(1, 1, &[(RED, 4)], DisposalCode::UNSPECIFIED),
        ItemPatch {
            visible: Some(false),
            ..ItemPatch::default()
        },
    );
    let items = [hidden];
    let mut session =
        ExportSession::new(canvas(1, 1), &items, 4, ExportOpts::default()).unwrap();
    assert_eq!(
        session.step().unwrap(),
        YieldPoint::TickFinished {
            tick: 0,
            emitted: true
        }
    );
    let bytes = session.finish().unwrap();
    assert_eq!(decoded_pixels(&bytes), vec![CLEAR.to_vec()]);
}

#[test]
fn placement_offsets_items_on_the_canvas() {
    let placed = item(
        1,
        1,
        MemorySource::solid(1, 1, &[(RED, 4)], DisposalCode::UNSPECIFIED),
        ItemPatch {
            left: Some(1.0),
            ..ItemPatch::default()
        },
    );
    let items = [placed];
    let bytes = ExportSession::new(canvas(2, 1), &items, 4, ExportOpts::default())
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(decoded_pixels(&bytes), vec![[CLEAR, RED].concat()]);
}

#[test]
fn hidden_end_of_life_clears_the_item_after_its_window() {
    let short = item(
        1,
        1,
        MemorySource::solid(1, 1, &[(RED, 8)], DisposalCode::UNSPECIFIED),
        ItemPatch {
            end_of_life: Some(EndOfLife::Hidden),
            ..ItemPatch::default()
        },
    );
    let items = [short];
    let mut session =
        ExportSession::new(canvas(1, 1), &items, 16, ExportOpts::default()).unwrap();
    while session.step().unwrap() != YieldPoint::Finished {}
    let delays: Vec<u32> = session.frames().iter().map(|f| f.delay).collect();
    assert_eq!(delays, vec![8, 8]);

    let bytes = session.finish().unwrap();
    assert_eq!(decoded_pixels(&bytes), vec![RED.to_vec(), CLEAR.to_vec()]);
}

#[test]
fn keep_disposal_composites_over_the_previous_frame() {
    let info = |disposal| SourceFrameInfo {
        delay: 3,
        disposal,
        transparent_index: None,
    };
    let src = MemorySource::new(2, 1)
        .with_frame(info(DisposalCode::KEEP), [RED, RED].concat())
        .unwrap()
        .with_frame(info(DisposalCode::KEEP), [CLEAR, BLUE].concat())
        .unwrap();
    let items = [item(1, 1, src, ItemPatch::default())];

    let bytes = ExportSession::new(canvas(2, 1), &items, 8, ExportOpts::default())
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(
        decoded_pixels(&bytes),
        vec![[RED, RED].concat(), [RED, BLUE].concat()]
    );
}

#[test]
fn zero_duration_emits_a_single_empty_frame() {
    let mut session =
        ExportSession::new(canvas(1, 1), std::iter::empty(), 0, ExportOpts::default()).unwrap();
    while session.step().unwrap() != YieldPoint::Finished {}
    assert_eq!(session.frames().len(), 1);
    assert_eq!(session.frames()[0].delay, 0);
}

#[test]
fn cancelled_token_aborts_the_next_step() {
    let token = CancelToken::new();
    let opts = ExportOpts {
        cancel: Some(token.clone()),
        ..ExportOpts::default()
    };
    let items = [red_blue_loop()];
    let mut session = ExportSession::new(canvas(1, 1), &items, 20, opts).unwrap();
    assert!(session.step().is_ok());

    token.cancel();
    assert!(matches!(session.step(), Err(MergeError::Cancelled)));
    assert!(matches!(session.finish(), Err(MergeError::Cancelled)));
}

#[test]
fn too_many_colors_overflow_the_palette() {
    let mut rgba = Vec::new();
    for i in 0..300u32 {
        rgba.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let src = MemorySource::new(300, 1)
        .with_frame(
            SourceFrameInfo {
                delay: 4,
                disposal: DisposalCode::UNSPECIFIED,
                transparent_index: None,
            },
            rgba,
        )
        .unwrap();
    let items = [item(1, 1, src, ItemPatch::default())];
    let err = ExportSession::new(canvas(300, 1), &items, 4, ExportOpts::default())
        .unwrap()
        .finish()
        .unwrap_err();
    assert!(matches!(err, MergeError::PaletteOverflow { limit: 256 }));
}

#[test]
fn rejects_zero_tick() {
    let opts = ExportOpts {
        tick: 0,
        ..ExportOpts::default()
    };
    let err = ExportSession::new(canvas(1, 1), std::iter::empty(), 4, opts)
        .err()
        .unwrap();
    assert!(matches!(err, MergeError::Validation(_)));
}
