/// Incremental VWAP accumulation
///
/// One bucket per locate id holding cumulative volume and cumulative
/// price-weighted volume as exact integer sums; the only division happens
/// at report time. Buckets cover the whole session and are never reset
/// between report emissions.

use std::collections::HashMap;

use tracing::debug;

use crate::directory::SymbolDirectory;
use crate::protocol::PRICE_SCALE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VwapBucket {
    /// Cumulative contributed shares.
    pub volume: u64,
    /// Cumulative price x shares, price in its integer fixed-point form.
    pub notional: u64,
}

#[derive(Debug, Clone)]
pub struct VwapAccumulator {
    buckets: HashMap<u16, VwapBucket>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VwapRow {
    pub locate: u16,
    pub symbol: String,
    pub vwap: f64,
}

/// One emission: rows plus the event time the snapshot was taken at.
#[derive(Debug, Clone, PartialEq)]
pub struct VwapReport {
    pub timestamp: u64,
    pub rows: Vec<VwapRow>,
}

impl VwapAccumulator {
    pub fn new() -> Self {
        VwapAccumulator {
            buckets: HashMap::new(),
        }
    }

    pub fn contribute(&mut self, locate: u16, price: u32, qty: u32) {
        let bucket = self.buckets.entry(locate).or_default();
        bucket.volume += u64::from(qty);
        bucket.notional += u64::from(price) * u64::from(qty);
    }

    pub fn bucket(&self, locate: u16) -> Option<VwapBucket> {
        self.buckets.get(&locate).copied()
    }

    /// Snapshot rows in ascending locate order, restricted to instruments
    /// with non-zero volume and a directory entry.
    pub fn report(&self, directory: &SymbolDirectory, timestamp: u64) -> VwapReport {
        let mut locates: Vec<u16> = self.buckets.keys().copied().collect();
        locates.sort_unstable();

        let mut rows = Vec::with_capacity(locates.len());
        for locate in locates {
            let bucket = self.buckets[&locate];
            if bucket.volume == 0 {
                continue;
            }
            let symbol = match directory.get(locate) {
                Some(symbol) => symbol,
                None => {
                    debug!(locate, "no directory entry for locate id; row withheld");
                    continue;
                }
            };
            let vwap = bucket.notional as f64 / (bucket.volume as f64 * f64::from(PRICE_SCALE));
            rows.push(VwapRow {
                locate,
                symbol: symbol.to_owned(),
                vwap,
            });
        }

        VwapReport { timestamp, rows }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl Default for VwapAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
