use super::*;

fn timing(start: u32, duration: u32, end_of_life: EndOfLife) -> ItemTiming {
    ItemTiming {
        start,
        duration,
        end_of_life,
    }
}

fn resolve_all(cursor: &mut TimelineCursor, ticks: &[u32]) -> Vec<Option<usize>> {
    ticks.iter().map(|&t| cursor.resolve(t)).collect()
}

#[test]
fn nothing_before_start() {
    let mut c = TimelineCursor::new(timing(8, 20, EndOfLife::Forwards), vec![10, 10]);
    assert_eq!(
        resolve_all(&mut c, &[0, 4, 8, 12, 19]),
        vec![None, None, Some(0), Some(0), Some(1)]
    );
}

#[test]
fn two_frame_loop_cycles_past_duration() {
    let mut c = TimelineCursor::new(timing(0, 20, EndOfLife::Loop), vec![10, 10]);
    assert_eq!(
        resolve_all(&mut c, &[0, 4, 8, 12, 16, 20, 24, 32]),
        vec![
            Some(0),
            Some(0),
            Some(0),
            Some(1),
            Some(1),
            Some(1),
            Some(0),
            Some(1)
        ]
    );
}

#[test]
fn forwards_freezes_on_last_resolved_frame() {
    let mut c = TimelineCursor::new(timing(0, 15, EndOfLife::Forwards), vec![10, 10, 10]);
    assert_eq!(
        resolve_all(&mut c, &[0, 12, 16, 28, 400]),
        vec![Some(0), Some(1), Some(1), Some(1), Some(1)]
    );
}

#[test]
fn forwards_saturates_when_source_is_shorter_than_window() {
    let mut c = TimelineCursor::new(timing(0, 50, EndOfLife::Forwards), vec![10, 10]);
    assert_eq!(
        resolve_all(&mut c, &[0, 15, 25, 45]),
        vec![Some(0), Some(1), Some(1), Some(1)]
    );
}

#[test]
fn hidden_stops_contributing_once_duration_elapses() {
    let mut c = TimelineCursor::new(timing(0, 15, EndOfLife::Hidden), vec![10, 10]);
    assert_eq!(
        resolve_all(&mut c, &[0, 14, 15, 100]),
        vec![Some(0), Some(1), None, None]
    );
}

#[test]
fn loop_cycles_over_frames_covering_the_window() {
    let t = timing(0, 15, EndOfLife::Loop);
    assert_eq!(effective_frame_count(&[10, 10, 10, 10], t), 2);
    assert_eq!(
        effective_frame_count(&[10, 10], timing(0, 90, EndOfLife::Loop)),
        2
    );
    assert_eq!(
        effective_frame_count(&[10, 10, 10], timing(0, 5, EndOfLife::Forwards)),
        3
    );

    let mut c = TimelineCursor::new(t, vec![10, 10, 10, 10]);
    assert_eq!(c.effective_count(), 2);
    assert_eq!(
        resolve_all(&mut c, &[0, 12, 22, 32]),
        vec![Some(0), Some(1), Some(0), Some(1)]
    );
}

#[test]
fn indices_are_monotonic_in_window_and_constant_after_under_forwards() {
    let delays = vec![3, 7, 5, 9, 4];
    for eol in [EndOfLife::Forwards, EndOfLife::Loop] {
        let t = timing(6, 28, eol);
        let mut c = TimelineCursor::new(t, delays.clone());
        let mut last = 0usize;
        for tick in (0..=34).step_by(2) {
            if let Some(idx) = c.resolve(tick) {
                assert!(idx >= last, "{eol:?}: index went back at tick {tick}");
                last = idx;
            }
        }
    }

    let mut c = TimelineCursor::new(timing(6, 28, EndOfLife::Forwards), delays);
    let frozen = c.resolve(34);
    for tick in (36..200).step_by(4) {
        assert_eq!(c.resolve(tick), frozen);
    }
}

#[test]
fn empty_source_never_contributes() {
    let mut c = TimelineCursor::new(timing(0, 10, EndOfLife::Loop), vec![]);
    assert_eq!(c.resolve(0), None);
    assert_eq!(timing(5, 10, EndOfLife::Loop).end(), 15);
}
