use crate::xiv_model::{ItemId, ItemRecord, TransactionRecord, NO_RECENT_SALES};
use chrono::{DateTime, TimeDelta, Utc};
use itertools::Itertools;

pub const DEFAULT_RECENCY_WINDOW_HOURS: u32 = 24;
pub const DEFAULT_FLOOR_SAMPLE_SIZE: usize = 10;

/// Reduces a transaction history to a price floor estimate per quality tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceAggregator {
    recency_window: TimeDelta,
    floor_sample_size: usize,
}

impl Default for PriceAggregator {
    fn default() -> Self {
        Self::new(TimeDelta::hours(DEFAULT_RECENCY_WINDOW_HOURS as i64), DEFAULT_FLOOR_SAMPLE_SIZE)
    }
}

impl PriceAggregator {
    pub fn new(recency_window: TimeDelta, floor_sample_size: usize) -> Self {
        Self {
            recency_window,
            floor_sample_size,
        }
    }

    pub fn aggregate(&self, id: ItemId, name: &str, history: &[TransactionRecord], now: DateTime<Utc>) -> ItemRecord {
        let (hq_prices, nq_prices): (Vec<u64>, Vec<u64>) = history
            .iter()
            .filter(|tx| self.is_recent(tx, now))
            .partition_map(|tx| {
                if tx.is_high_quality {
                    itertools::Either::Left(tx.price_per_unit)
                } else {
                    itertools::Either::Right(tx.price_per_unit)
                }
            });

        ItemRecord {
            id,
            name: name.to_string(),
            nq_price: self.floor_estimate(nq_prices),
            hq_price: self.floor_estimate(hq_prices),
        }
    }

    // purchases stamped in the future count as recent
    fn is_recent(&self, tx: &TransactionRecord, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(tx.purchase_timestamp) < self.recency_window
    }

    fn floor_estimate(&self, prices: Vec<u64>) -> i64 {
        let cheapest = prices.into_iter().sorted_unstable().take(self.floor_sample_size).collect_vec();
        if cheapest.is_empty() {
            return NO_RECENT_SALES;
        }
        let sum: u128 = cheapest.iter().map(|p| *p as u128).sum();
        // in-game prices are capped far below i64::MAX, saturating only guards malformed feeds
        i64::try_from(round_half_to_even(sum, cheapest.len() as u128)).unwrap_or(i64::MAX)
    }
}

/// `numerator / denominator` rounded to the nearest integer, ties to even.
pub fn round_half_to_even(numerator: u128, denominator: u128) -> u128 {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn tx(price: u64, hq: bool, age: TimeDelta) -> TransactionRecord {
        TransactionRecord {
            price_per_unit: price,
            is_high_quality: hq,
            purchase_timestamp: now() - age,
        }
    }

    fn recent_nq(prices: &[u64]) -> Vec<TransactionRecord> {
        prices.iter().map(|p| tx(*p, false, TimeDelta::hours(1))).collect()
    }

    #[test]
    fn averages_the_ten_cheapest_recent_listings() {
        let history = recent_nq(&[10, 12, 12, 15, 9, 9, 9, 9, 9, 9, 20]);

        let record = PriceAggregator::default().aggregate(ItemId(5), "Iron Ore", &history, now());

        // 9*6 + 10 + 12 + 12 + 15 = 103 over 10 listings
        assert_eq!(record.nq_price, 10);
        assert_eq!(record.hq_price, NO_RECENT_SALES);
        assert_eq!(record.id, ItemId(5));
        assert_eq!(record.name, "Iron Ore");
    }

    #[test]
    fn fewer_listings_than_the_sample_size_uses_all_of_them() {
        let history = recent_nq(&[100, 200, 301]);
        let record = PriceAggregator::default().aggregate(ItemId(1), "Copper Ore", &history, now());
        assert_eq!(record.nq_price, 200);
    }

    #[test]
    fn quality_tiers_are_estimated_independently() {
        let history = vec![
            tx(100, false, TimeDelta::minutes(5)),
            tx(120, false, TimeDelta::minutes(10)),
            tx(900, true, TimeDelta::minutes(15)),
            tx(1100, true, TimeDelta::minutes(20)),
        ];

        let record = PriceAggregator::default().aggregate(ItemId(1), "Iron Ingot", &history, now());

        assert_eq!(record.nq_price, 110);
        assert_eq!(record.hq_price, 1000);
    }

    #[test]
    fn listings_outside_the_window_are_ignored() {
        let history = vec![
            tx(50, false, TimeDelta::hours(23)),
            tx(1, false, TimeDelta::hours(24)),
            tx(2, false, TimeDelta::hours(30)),
            tx(70, false, TimeDelta::minutes(-5)),
        ];

        let daily = PriceAggregator::default().aggregate(ItemId(1), "Iron Ore", &history, now());
        let widened = PriceAggregator::new(TimeDelta::hours(32), DEFAULT_FLOOR_SAMPLE_SIZE).aggregate(ItemId(1), "Iron Ore", &history, now());

        assert_eq!(daily.nq_price, 60);
        // (50 + 1 + 2 + 70) / 4 = 30.75
        assert_eq!(widened.nq_price, 31);
    }

    #[test]
    fn no_recent_listings_yields_the_sentinel_for_both_tiers() {
        let history = vec![tx(10, false, TimeDelta::days(3)), tx(20, true, TimeDelta::days(3))];

        let record = PriceAggregator::default().aggregate(ItemId(1), "Iron Ore", &history, now());

        assert_eq!(record.nq_price, NO_RECENT_SALES);
        assert_eq!(record.hq_price, NO_RECENT_SALES);
    }

    #[test]
    fn free_listings_average_to_zero_not_the_sentinel() {
        let record = PriceAggregator::default().aggregate(ItemId(1), "Gil", &recent_nq(&[0, 0]), now());
        assert_eq!(record.nq_price, 0);
    }

    #[test]
    fn sample_size_is_configurable() {
        let history = recent_nq(&[1, 2, 3, 100]);
        let record = PriceAggregator::new(TimeDelta::hours(24), 2).aggregate(ItemId(1), "Iron Ore", &history, now());
        // (1 + 2) / 2 = 1.5 rounds to even
        assert_eq!(record.nq_price, 2);
    }

    #[test]
    fn averages_beyond_i64_saturate() {
        let record = PriceAggregator::default().aggregate(ItemId(1), "Broken Feed", &recent_nq(&[u64::MAX, u64::MAX]), now());
        assert_eq!(record.nq_price, i64::MAX);
    }

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round_half_to_even(5, 2), 2);
        assert_eq!(round_half_to_even(7, 2), 4);
        assert_eq!(round_half_to_even(103, 10), 10);
        assert_eq!(round_half_to_even(106, 10), 11);
        assert_eq!(round_half_to_even(0, 3), 0);
    }
}
