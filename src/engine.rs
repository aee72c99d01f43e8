/// Single-pass stream driver
///
/// Owns the aggregate state for one run: symbol directory, order reference
/// table, VWAP accumulator, session clock and statistics. Nothing is
/// process-global, so several engines can run independently, which is how
/// the tests use them.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::SessionClock;
use crate::decoder::{DecodeError, Decoder};
use crate::directory::SymbolDirectory;
use crate::order_table::{OrderRecord, OrderTable, TableError};
use crate::protocol::{event_code, Message, Side, FRAME_PREFIX_SIZE};
use crate::stats::FeedStats;
use crate::vwap::{VwapAccumulator, VwapReport};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Framing-level corruption. A truncated feed cannot be resynchronized,
    /// so the whole run fails, reporting where it stopped.
    #[error("fatal feed corruption at byte offset {offset} after {messages} messages: {source}")]
    Truncated {
        offset: usize,
        messages: u64,
        source: DecodeError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub messages: u64,
    pub bytes: u64,
    pub reports: u64,
}

#[derive(Debug, Default)]
pub struct Engine {
    directory: SymbolDirectory,
    orders: OrderTable,
    vwap: VwapAccumulator,
    clock: SessionClock,
    stats: FeedStats,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            directory: SymbolDirectory::new(),
            orders: OrderTable::new(),
            vwap: VwapAccumulator::new(),
            clock: SessionClock::new(),
            stats: FeedStats::new(),
        }
    }

    /// Run the single pass over `feed`, invoking `emit` for each report.
    /// The pass stops at the end of the input or, early, when the session
    /// end event has been seen and its final report emitted.
    pub fn process<F>(&mut self, feed: &[u8], mut emit: F) -> Result<RunSummary, EngineError>
    where
        F: FnMut(&VwapReport),
    {
        let mut offset = 0usize;

        while offset < feed.len() {
            let remaining = feed.len() - offset;
            if remaining < FRAME_PREFIX_SIZE {
                return Err(self.fatal(
                    offset,
                    DecodeError::TruncatedMessage {
                        declared: FRAME_PREFIX_SIZE,
                        remaining,
                    },
                ));
            }

            let declared =
                BigEndian::read_u16(&feed[offset..offset + FRAME_PREFIX_SIZE]) as usize;
            let frame_end = offset + FRAME_PREFIX_SIZE + declared;
            if frame_end > feed.len() {
                return Err(self.fatal(
                    offset,
                    DecodeError::TruncatedMessage {
                        declared,
                        remaining: remaining - FRAME_PREFIX_SIZE,
                    },
                ));
            }

            self.stats.record_message(FRAME_PREFIX_SIZE + declared);

            match Decoder::decode_message(&feed[offset + FRAME_PREFIX_SIZE..frame_end]) {
                Ok(msg) => self.apply(&msg),
                Err(err) => {
                    // Frame boundaries are intact; skip the bad payload.
                    self.stats.record_malformed_payload();
                    warn!(offset, error = %err, "skipping malformed message payload");
                }
            }

            if self.clock.should_emit() {
                let report = self.vwap.report(&self.directory, self.clock.current_time());
                emit(&report);
                self.stats.record_report();
                self.clock.mark_emitted();
                info!(
                    timestamp = report.timestamp,
                    rows = report.rows.len(),
                    messages = self.stats.total_messages(),
                    "report emitted"
                );
                if self.clock.ended() {
                    break;
                }
            }

            offset = frame_end;
        }

        Ok(self.summary())
    }

    fn apply(&mut self, msg: &Message) {
        if let Some(ts) = msg.timestamp() {
            self.clock.advance(ts);
        }

        match msg {
            Message::SystemEvent(ev) => {
                if ev.event_code == event_code::END_OF_MARKET_HOURS
                    || ev.event_code == event_code::END_OF_MESSAGES
                {
                    self.clock.mark_ended();
                }
            }
            Message::StockDirectory(dir) => {
                self.directory.insert(dir.locate, dir.symbol.clone());
            }
            Message::AddOrder(add) => {
                // Contribution population: buy-side adds, recorded whether
                // or not the table accepts the reference.
                if add.side == Side::Buy {
                    self.vwap.contribute(add.locate, add.price, add.shares);
                }
                let record = OrderRecord {
                    locate: add.locate,
                    side: add.side,
                    price: add.price,
                    remaining: add.shares,
                };
                if let Err(TableError::DuplicateOrderRef(order_ref)) =
                    self.orders.insert(add.order_ref, record)
                {
                    self.stats.record_duplicate_ref();
                    warn!(order_ref, "add reuses a live order reference; keeping the original");
                }
            }
            Message::OrderExecuted(exec) => self.reduce(exec.order_ref, exec.executed),
            Message::OrderExecutedWithPrice(exec) => self.reduce(exec.order_ref, exec.executed),
            Message::OrderCancel(cancel) => self.reduce(cancel.order_ref, cancel.cancelled),
            Message::OrderDelete(del) => {
                if self.orders.remove(del.order_ref).is_err() {
                    self.skip_unknown(del.order_ref);
                }
            }
            Message::OrderReplace(rep) => {
                if self
                    .orders
                    .replace(rep.old_ref, rep.new_ref, rep.shares, rep.price)
                    .is_err()
                {
                    self.skip_unknown(rep.old_ref);
                }
            }
            // Trade prints and broken trades advance the clock only; the
            // contribution population is buy-side adds.
            Message::Trade(_) | Message::CrossTrade(_) | Message::BrokenTrade(_) => {}
            Message::Unsupported { .. } => self.stats.record_unsupported(),
        }
    }

    fn reduce(&mut self, order_ref: u64, qty: u32) {
        if self.orders.reduce(order_ref, qty).is_err() {
            self.skip_unknown(order_ref);
        }
    }

    fn skip_unknown(&mut self, order_ref: u64) {
        self.stats.record_unknown_ref();
        debug!(order_ref, "event references an untracked order; skipped");
    }

    fn fatal(&self, offset: usize, source: DecodeError) -> EngineError {
        EngineError::Truncated {
            offset,
            messages: self.stats.total_messages(),
            source,
        }
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            messages: self.stats.total_messages(),
            bytes: self.stats.total_bytes(),
            reports: self.stats.reports_emitted(),
        }
    }

    pub fn directory(&self) -> &SymbolDirectory {
        &self.directory
    }

    pub fn orders(&self) -> &OrderTable {
        &self.orders
    }

    pub fn vwap(&self) -> &VwapAccumulator {
        &self.vwap
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }
}
