use place_replay_core::{SimTime, TileIndex, TileOrigin};
use place_replay_system_tile_log::{testing::tile_bytes, HeaderField, ParseError, TileLog};

fn three_event_log() -> TileLog {
    let bytes = tile_bytes(
        (32, 32),
        (0, 0),
        &[
            (1, 1, 1, 10, 100),
            (2, 2, 2, 20, 200),
            (3, 3, 3, 30, 200),
        ],
    );
    TileLog::load(&bytes).expect("valid tile buffer")
}

#[test]
fn load_reads_header_and_columns() {
    let bytes = tile_bytes((32, 32), (5, 7), &[(31, 0, 12, 99, 1_000)]);
    let log = TileLog::load(&bytes).expect("valid tile buffer");

    assert_eq!(log.tile(), TileIndex::new(5, 7));
    assert_eq!(log.tile_width(), 32);
    assert_eq!(log.tile_height(), 32);
    assert_eq!(log.origin(), TileOrigin::new(160, 224));
    assert_eq!(log.len(), 1);
    assert_eq!(log.cursor(), 0);
}

#[test]
fn load_rejects_buffer_shorter_than_header() {
    let error = TileLog::load(&[0u8; 12]).expect_err("header needs 20 bytes");
    assert_eq!(
        error,
        ParseError::Truncated {
            expected: 20,
            actual: 12
        }
    );
}

#[test]
fn load_rejects_buffer_shorter_than_declared_layout() {
    let mut bytes = tile_bytes((32, 32), (0, 0), &[(0, 0, 0, 0, 0), (1, 1, 1, 1, 1)]);
    let declared = bytes.len();
    let _ = bytes.split_off(declared - 3);

    let error = TileLog::load(&bytes).expect_err("buffer shorter than layout");
    assert_eq!(
        error,
        ParseError::Truncated {
            expected: declared,
            actual: declared - 3
        }
    );
}

#[test]
fn load_rejects_implausible_event_count() {
    let mut bytes = tile_bytes((32, 32), (0, 0), &[]);
    bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());

    let error = TileLog::load(&bytes).expect_err("corrupt event count");
    assert_eq!(
        error,
        ParseError::Malformed {
            field: HeaderField::EventCount,
            value: u32::MAX
        }
    );
}

#[test]
fn load_rejects_zero_tile_resolution() {
    let bytes = tile_bytes((0, 32), (0, 0), &[]);
    let error = TileLog::load(&bytes).expect_err("zero tile width");
    assert_eq!(
        error,
        ParseError::Malformed {
            field: HeaderField::TileWidth,
            value: 0
        }
    );
}

#[test]
fn load_rejects_out_of_range_tile_coordinates() {
    let error = TileLog::load(&tile_bytes((32, 32), (0x1000_0000, 0), &[]))
        .expect_err("tile x beyond the grid ceiling");
    assert_eq!(
        error,
        ParseError::Malformed {
            field: HeaderField::TileX,
            value: 0x1000_0000
        }
    );

    let error = TileLog::load(&tile_bytes((32, 32), (0, u32::MAX), &[]))
        .expect_err("tile y beyond the grid ceiling");
    assert_eq!(
        error,
        ParseError::Malformed {
            field: HeaderField::TileY,
            value: u32::MAX
        }
    );
}

#[test]
fn origin_of_the_largest_accepted_tile_stays_in_range() {
    // Maximum tile index times maximum tile edge must not overflow u32.
    let bytes = tile_bytes((4096, 4096), (1 << 16, 1 << 16), &[]);
    let log = TileLog::load(&bytes).expect("coordinates at the ceiling are valid");
    assert_eq!(log.origin(), TileOrigin::new(1 << 28, 1 << 28));
}

#[test]
fn empty_tile_is_valid_and_inert() {
    let bytes = tile_bytes((32, 32), (3, 3), &[]);
    let mut log = TileLog::load(&bytes).expect("empty tile is valid");

    assert!(log.is_empty());
    assert_eq!(log.peek_timestamp(), None);
    log.seek(SimTime::from_millis(1_000_000));
    assert_eq!(log.cursor(), 0);
    assert_eq!(log.drain_until(SimTime::from_millis(u32::MAX)).count(), 0);
}

#[test]
fn round_trip_reproduces_the_original_buffer_exactly() {
    let bytes = tile_bytes(
        (32, 32),
        (17, 23),
        &[(0, 0, 6, 1, 5), (31, 31, 63, 2, 6), (4, 9, 27, 3, 6)],
    );
    let log = TileLog::load(&bytes).expect("valid tile buffer");
    assert_eq!(log.to_bytes(), bytes);
}

#[test]
fn drain_scenario_from_three_events_with_duplicate_timestamps() {
    // Timestamps [100, 200, 200]: drain to 150 yields one event, a later
    // drain to 250 yields the two remaining, cursor ends at 3.
    let mut log = three_event_log();

    let first: Vec<_> = log.drain_until(SimTime::from_millis(150)).collect();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].timestamp, SimTime::from_millis(100));
    assert_eq!(log.cursor(), 1);

    let second: Vec<_> = log.drain_until(SimTime::from_millis(250)).collect();
    assert_eq!(second.len(), 2);
    assert!(second
        .iter()
        .all(|event| event.timestamp == SimTime::from_millis(200)));
    assert_eq!(log.cursor(), 3);
}

#[test]
fn drain_is_idempotent_when_the_clock_does_not_advance() {
    let mut log = three_event_log();

    assert_eq!(log.drain_until(SimTime::from_millis(150)).count(), 1);
    assert_eq!(log.drain_until(SimTime::from_millis(150)).count(), 0);
    assert_eq!(log.drain_until(SimTime::from_millis(100)).count(), 0);
    assert_eq!(log.cursor(), 1);
}

#[test]
fn incremental_drain_yields_every_event_exactly_once_in_order() {
    let mut log = three_event_log();
    let mut drained = Vec::new();

    for target in [50, 150, 150, 201, 500] {
        drained.extend(log.drain_until(SimTime::from_millis(target)));
    }

    let timestamps: Vec<_> = drained
        .iter()
        .map(|event| event.timestamp.as_millis())
        .collect();
    assert_eq!(timestamps, vec![100, 200, 200]);
    assert_eq!(log.cursor(), log.len());
}

#[test]
fn drain_decodes_packed_fields_and_user_ids() {
    let bytes = tile_bytes((32, 32), (0, 0), &[(7, 13, 31, 424_242, 50)]);
    let mut log = TileLog::load(&bytes).expect("valid tile buffer");

    let events: Vec<_> = log.drain_until(SimTime::from_millis(100)).collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].local_x, 7);
    assert_eq!(events[0].local_y, 13);
    assert_eq!(events[0].color_index, 31);
    assert_eq!(events[0].user_id, 424_242);
}

#[test]
fn seek_then_drain_yields_the_half_open_window() {
    let mut log = three_event_log();

    log.seek(SimTime::from_millis(150));
    assert_eq!(log.cursor(), 1);
    assert_eq!(log.peek_timestamp(), Some(SimTime::from_millis(200)));

    let window: Vec<_> = log.drain_until(SimTime::from_millis(250)).collect();
    assert_eq!(window.len(), 2);
    assert!(window
        .iter()
        .all(|event| event.timestamp >= SimTime::from_millis(150)
            && event.timestamp < SimTime::from_millis(250)));
}

#[test]
fn seek_lands_on_the_first_of_equal_timestamps() {
    let mut log = three_event_log();
    log.seek(SimTime::from_millis(200));
    assert_eq!(log.cursor(), 1);
}

#[test]
fn seek_can_rewind_a_drained_log() {
    let mut log = three_event_log();
    assert_eq!(log.drain_until(SimTime::from_millis(u32::MAX)).count(), 3);

    log.seek(SimTime::from_millis(0));
    assert_eq!(log.cursor(), 0);
    assert_eq!(log.drain_until(SimTime::from_millis(150)).count(), 1);
}

#[test]
fn abandoned_drain_commits_only_yielded_events() {
    let mut log = three_event_log();

    let mut drain = log.drain_until(SimTime::from_millis(250));
    let first = drain.next().expect("first event available");
    assert_eq!(first.timestamp, SimTime::from_millis(100));
    drop(drain);

    // Resuming continues from the last yielded event, not the target.
    assert_eq!(log.cursor(), 1);
    assert_eq!(log.drain_until(SimTime::from_millis(250)).count(), 2);
}
