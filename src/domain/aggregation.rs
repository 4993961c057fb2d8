//! Tick to OHLCV bar aggregation.
//!
//! Buckets are fixed width, left-closed and left-labelled, anchored at
//! midnight of the first tick's day. Empty buckets are dropped.

use crate::domain::ohlcv::Bar;
use crate::domain::session::{Interval, Session};
use crate::domain::tick::Tick;
use chrono::{Duration, NaiveDateTime};

/// Seconds a tick stamped exactly at session close is moved back.
pub const CLOSE_SHIFT_SECS: i64 = 1;

/// Aggregate raw ticks into bars.
///
/// 1. sort ascending by time (stable, duplicates kept)
/// 2. keep ticks inside the inclusive session window
/// 3. move ticks at exactly `session.close` back by [`CLOSE_SHIFT_SECS`]
/// 4. fold each non-empty bucket into one bar
/// 5. relabel a final bucket labelled after session close to the close
pub fn aggregate_ticks(mut ticks: Vec<Tick>, session: &Session, interval: Interval) -> Vec<Bar> {
    ticks.sort_by_key(|t| t.timestamp);

    let mut in_session: Vec<Tick> = ticks
        .into_iter()
        .filter(|t| session.contains(t.timestamp))
        .map(|mut t| {
            if session.is_close(t.timestamp) {
                t.timestamp -= Duration::seconds(CLOSE_SHIFT_SECS);
            }
            t
        })
        .collect();

    let Some(first) = in_session.first() else {
        return Vec::new();
    };
    let origin = first.timestamp.date().and_time(chrono::NaiveTime::MIN);
    let width = interval.duration();

    in_session.sort_by_key(|t| bucket_start(t.timestamp, origin, width));

    let mut bars: Vec<Bar> = Vec::new();
    for tick in &in_session {
        let label = bucket_start(tick.timestamp, origin, width);
        match bars.last_mut() {
            Some(bar) if bar.open_time == label => bar.absorb(tick.price, tick.volume),
            _ => bars.push(Bar::open_at(label, tick.price, tick.volume)),
        }
    }

    relabel_overflow(&mut bars, session);
    bars
}

/// Left edge of the bucket containing `ts`.
pub fn bucket_start(ts: NaiveDateTime, origin: NaiveDateTime, width: Duration) -> NaiveDateTime {
    let width_ms = width.num_milliseconds();
    let offset_ms = (ts - origin).num_milliseconds();
    origin + Duration::milliseconds(offset_ms.div_euclid(width_ms) * width_ms)
}

fn relabel_overflow(bars: &mut [Bar], session: &Session) {
    if let Some(last) = bars.last_mut() {
        let close = session.close_on(last.open_time);
        if last.open_time > close {
            last.open_time = close;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::IntervalUnit;
    use chrono::{NaiveDate, NaiveTime};

    fn ts(d: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn tick(d: u32, h: u32, m: u32, s: u32, price: f64, volume: f64) -> Tick {
        Tick::new(ts(d, h, m, s), price, volume)
    }

    fn minutes(w: u32) -> Interval {
        Interval::new(w, IntervalUnit::Minute).unwrap()
    }

    #[test]
    fn single_bucket_ohlcv() {
        let ticks = vec![
            tick(1, 9, 0, 1, 100.0, 1.0),
            tick(1, 9, 1, 0, 103.0, 2.0),
            tick(1, 9, 2, 0, 99.0, 3.0),
            tick(1, 9, 4, 59, 101.0, 4.0),
        ];
        let bars = aggregate_ticks(ticks, &Session::default(), minutes(5));

        assert_eq!(bars.len(), 1);
        let bar = &bars[0];
        assert_eq!(bar.open_time, ts(1, 9, 0, 0));
        assert_eq!(bar.open, 100.0);
        assert_eq!(bar.high, 103.0);
        assert_eq!(bar.low, 99.0);
        assert_eq!(bar.close, 101.0);
        assert_eq!(bar.volume, 10.0);
    }

    #[test]
    fn unsorted_partitions_are_ordered_before_folding() {
        let ticks = vec![
            tick(1, 9, 3, 0, 105.0, 1.0),
            tick(1, 9, 0, 0, 100.0, 1.0),
        ];
        let bars = aggregate_ticks(ticks, &Session::default(), minutes(5));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 105.0);
    }

    #[test]
    fn empty_buckets_are_dropped() {
        let ticks = vec![
            tick(1, 9, 0, 0, 100.0, 1.0),
            tick(1, 9, 20, 0, 101.0, 1.0),
        ];
        let bars = aggregate_ticks(ticks, &Session::default(), minutes(5));
        let labels: Vec<_> = bars.iter().map(|b| b.open_time).collect();
        assert_eq!(labels, vec![ts(1, 9, 0, 0), ts(1, 9, 20, 0)]);
    }

    #[test]
    fn ticks_outside_session_are_discarded() {
        let ticks = vec![
            tick(1, 8, 59, 59, 1.0, 100.0),
            tick(1, 9, 0, 0, 100.0, 1.0),
            tick(1, 13, 30, 1, 2.0, 100.0),
        ];
        let bars = aggregate_ticks(ticks, &Session::default(), minutes(5));
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 1.0);
    }

    #[test]
    fn close_tick_joins_final_in_session_bucket() {
        let ticks = vec![
            tick(1, 13, 25, 10, 100.0, 1.0),
            tick(1, 13, 30, 0, 102.0, 5.0),
        ];
        let bars = aggregate_ticks(ticks, &Session::default(), minutes(5));

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open_time, ts(1, 13, 25, 0));
        assert_eq!(bars[0].close, 102.0);
        assert_eq!(bars[0].volume, 6.0);
    }

    #[test]
    fn no_bucket_labelled_after_close() {
        let ticks = vec![
            tick(1, 13, 29, 0, 100.0, 1.0),
            tick(1, 13, 30, 0, 101.0, 1.0),
            tick(1, 13, 30, 0, 102.0, 1.0),
        ];
        let session = Session::default();
        let interval = Interval::new(1, IntervalUnit::Second).unwrap();
        let bars = aggregate_ticks(ticks, &session, interval);
        let close = session.close_on(ts(1, 0, 0, 0));
        assert!(bars.iter().all(|b| b.open_time <= close));
    }

    #[test]
    fn overflow_bucket_is_relabelled_to_close() {
        let session = Session {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            close: NaiveTime::from_hms_opt(13, 30, 0).unwrap(),
        };
        let mut bars = vec![
            Bar::open_at(ts(1, 13, 25, 0), 1.0, 1.0),
            Bar::open_at(ts(1, 13, 35, 0), 2.0, 1.0),
        ];
        relabel_overflow(&mut bars, &session);
        assert_eq!(bars[0].open_time, ts(1, 13, 25, 0));
        assert_eq!(bars[1].open_time, ts(1, 13, 30, 0));
    }

    #[test]
    fn daily_bars_span_multiple_days() {
        let ticks = vec![
            tick(1, 9, 0, 0, 10.0, 1.0),
            tick(1, 13, 30, 0, 12.0, 1.0),
            tick(4, 9, 1, 0, 11.0, 2.0),
            tick(4, 10, 0, 0, 9.0, 2.0),
        ];
        let bars = aggregate_ticks(
            ticks,
            &Session::default(),
            Interval::new(1, IntervalUnit::Day).unwrap(),
        );

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].open_time, ts(1, 0, 0, 0));
        assert_eq!(bars[0].close, 12.0);
        assert_eq!(bars[1].open_time, ts(4, 0, 0, 0));
        assert_eq!(bars[1].low, 9.0);
        assert_eq!(bars[1].volume, 4.0);
    }

    #[test]
    fn duplicates_are_kept() {
        let ticks = vec![
            tick(1, 9, 0, 0, 100.0, 1.0),
            tick(1, 9, 0, 0, 100.0, 1.0),
        ];
        let bars = aggregate_ticks(ticks, &Session::default(), minutes(1));
        assert_eq!(bars[0].volume, 2.0);
    }

    #[test]
    fn empty_input_gives_no_bars() {
        assert!(aggregate_ticks(vec![], &Session::default(), minutes(1)).is_empty());
    }

    #[test]
    fn bucket_start_floors_to_width() {
        let origin = ts(1, 0, 0, 0);
        let width = Duration::minutes(5);
        assert_eq!(bucket_start(ts(1, 9, 4, 59), origin, width), ts(1, 9, 0, 0));
        assert_eq!(bucket_start(ts(1, 9, 5, 0), origin, width), ts(1, 9, 5, 0));
        assert_eq!(bucket_start(ts(2, 9, 7, 0), origin, width), ts(2, 9, 5, 0));
    }
}
