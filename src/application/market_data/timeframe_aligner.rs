use crate::domain::market::candle::Candle;
use crate::domain::market::timeframe::Timeframe;

/// Finds the candle on `timeframe` that was open at `target_ms`.
///
/// Scans oldest-first and returns the first candle whose
/// `[open, open + duration)` interval contains the target, together with its
/// index in `candles`. Returns `None` when the target lies outside the
/// fetched window.
///
/// # Arguments
/// * `candles` - Oldest-first series fetched on `timeframe`
/// * `target_ms` - Timestamp observed on another timeframe (ms)
/// * `timeframe` - Granularity of `candles`
pub fn find_enclosing_candle(
    candles: &[Candle],
    target_ms: i64,
    timeframe: Timeframe,
) -> Option<(usize, &Candle)> {
    let duration_ms = timeframe.duration_ms();

    candles
        .iter()
        .enumerate()
        .find(|(_, candle)| candle.contains(target_ms, duration_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-01 00:00:00 UTC
    const BASE: i64 = 1704067200000;
    const HOUR: i64 = 3_600_000;

    fn series(start: i64, timeframe: Timeframe, count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| Candle {
                timestamp: start + i as i64 * timeframe.duration_ms(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_finds_exact_open() {
        let candles = series(BASE, Timeframe::FiveMin, 100);
        let target = BASE + 50 * Timeframe::FiveMin.duration_ms();
        let (index, candle) = find_enclosing_candle(&candles, target, Timeframe::FiveMin).unwrap();
        assert_eq!(index, 50);
        assert_eq!(candle.timestamp, target);
    }

    #[test]
    fn test_finds_candle_open_at_target() {
        // A 4H open at 08:00 falls inside the 1D candle opened at midnight
        let candles = series(BASE - 10 * 24 * HOUR, Timeframe::OneDay, 11);
        let (index, candle) =
            find_enclosing_candle(&candles, BASE + 8 * HOUR, Timeframe::OneDay).unwrap();
        assert_eq!(index, 10);
        assert_eq!(candle.timestamp, BASE);
    }

    #[test]
    fn test_end_is_exclusive() {
        let candles = series(BASE, Timeframe::OneHour, 2);
        let (index, _) = find_enclosing_candle(&candles, BASE + HOUR, Timeframe::OneHour).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn test_outside_window() {
        let candles = series(BASE, Timeframe::FifteenMin, 10);
        assert!(find_enclosing_candle(&candles, BASE - 1, Timeframe::FifteenMin).is_none());
        assert!(
            find_enclosing_candle(&candles, BASE + 10 * 15 * 60_000, Timeframe::FifteenMin)
                .is_none()
        );
        assert!(find_enclosing_candle(&[], BASE, Timeframe::FifteenMin).is_none());
    }

    #[test]
    fn test_gap_in_series() {
        let mut candles = series(BASE, Timeframe::OneHour, 3);
        candles.remove(1);
        assert!(find_enclosing_candle(&candles, BASE + HOUR + 1, Timeframe::OneHour).is_none());
    }
}
