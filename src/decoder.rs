/// Message decoders
///
/// Turns one length-prefixed frame into a typed `Message`. Decoding borrows
/// the frame span and copies out only the fields it keeps; the mapped input
/// region is never copied wholesale.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::protocol::*;
use crate::reader::FieldReader;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A field read ran past the end of its message span.
    #[error("out of bounds read: need {need} bytes, have {have}")]
    OutOfBounds { need: usize, have: usize },

    /// The declared frame length runs past the end of the input.
    #[error("truncated message: {declared} byte(s) declared, {remaining} remaining")]
    TruncatedMessage { declared: usize, remaining: usize },

    #[error("text field is not valid ASCII")]
    InvalidText,

    #[error("invalid side marker: {0:#04x}")]
    InvalidSide(u8),
}

pub type DecodeResult<T> = Result<T, DecodeError>;

pub struct Decoder;

impl Decoder {
    /// Decode one frame: length prefix, tag, payload.
    /// Returns the message and the total bytes consumed, prefix included.
    pub fn decode_frame(buf: &[u8]) -> DecodeResult<(Message, usize)> {
        if buf.len() < FRAME_PREFIX_SIZE {
            return Err(DecodeError::TruncatedMessage {
                declared: FRAME_PREFIX_SIZE,
                remaining: buf.len(),
            });
        }
        let declared = BigEndian::read_u16(&buf[..FRAME_PREFIX_SIZE]) as usize;
        let end = FRAME_PREFIX_SIZE + declared;
        if buf.len() < end {
            return Err(DecodeError::TruncatedMessage {
                declared,
                remaining: buf.len() - FRAME_PREFIX_SIZE,
            });
        }
        let msg = Self::decode_message(&buf[FRAME_PREFIX_SIZE..end])?;
        Ok((msg, end))
    }

    /// Decode a tag + payload span of exactly the declared frame length.
    /// Trailing payload bytes a message type does not extract are ignored.
    pub fn decode_message(frame: &[u8]) -> DecodeResult<Message> {
        let mut r = FieldReader::new(frame);
        let tag = r.u8()?;

        let msg = match MessageType::from_u8(tag) {
            None => Message::Unsupported { tag },
            Some(MessageType::SystemEvent) => {
                r.skip(4)?; // locate + tracking
                let timestamp = r.u48()?;
                let event_code = r.u8()?;
                Message::SystemEvent(SystemEvent {
                    timestamp,
                    event_code,
                })
            }
            Some(MessageType::StockDirectory) => {
                let locate = r.u16()?;
                r.skip(2)?;
                let timestamp = r.u48()?;
                let symbol = r.text(8)?.to_owned();
                // trailing issue-classification fields are not extracted
                Message::StockDirectory(StockDirectory {
                    locate,
                    timestamp,
                    symbol,
                })
            }
            Some(MessageType::AddOrder) => Self::decode_add(&mut r, false)?,
            Some(MessageType::AddOrderAttributed) => Self::decode_add(&mut r, true)?,
            Some(MessageType::OrderExecuted) => {
                r.skip(4)?;
                let timestamp = r.u48()?;
                let order_ref = r.u64()?;
                let executed = r.u32()?;
                Message::OrderExecuted(OrderExecuted {
                    timestamp,
                    order_ref,
                    executed,
                })
            }
            Some(MessageType::OrderExecutedWithPrice) => {
                r.skip(4)?;
                let timestamp = r.u48()?;
                let order_ref = r.u64()?;
                let executed = r.u32()?;
                r.skip(8)?; // match number
                let printable = r.u8()? == b'Y';
                let price = r.u32()?;
                Message::OrderExecutedWithPrice(OrderExecutedWithPrice {
                    timestamp,
                    order_ref,
                    executed,
                    printable,
                    price,
                })
            }
            Some(MessageType::OrderCancel) => {
                r.skip(4)?;
                let timestamp = r.u48()?;
                let order_ref = r.u64()?;
                let cancelled = r.u32()?;
                Message::OrderCancel(OrderCancel {
                    timestamp,
                    order_ref,
                    cancelled,
                })
            }
            Some(MessageType::OrderDelete) => {
                r.skip(4)?;
                let timestamp = r.u48()?;
                let order_ref = r.u64()?;
                Message::OrderDelete(OrderDelete {
                    timestamp,
                    order_ref,
                })
            }
            Some(MessageType::OrderReplace) => {
                r.skip(4)?;
                let timestamp = r.u48()?;
                let old_ref = r.u64()?;
                let new_ref = r.u64()?;
                let shares = r.u32()?;
                let price = r.u32()?;
                Message::OrderReplace(OrderReplace {
                    timestamp,
                    old_ref,
                    new_ref,
                    shares,
                    price,
                })
            }
            Some(MessageType::Trade) => {
                let locate = r.u16()?;
                r.skip(2)?;
                let timestamp = r.u48()?;
                let order_ref = r.u64()?;
                let side = Self::decode_side(&mut r)?;
                let shares = r.u32()?;
                r.skip(8)?; // stock symbol
                let price = r.u32()?;
                Message::Trade(Trade {
                    locate,
                    timestamp,
                    order_ref,
                    side,
                    shares,
                    price,
                })
            }
            Some(MessageType::CrossTrade) => {
                let locate = r.u16()?;
                r.skip(2)?;
                let timestamp = r.u48()?;
                let shares = r.u64()?;
                r.skip(8)?; // stock symbol
                let cross_price = r.u32()?;
                Message::CrossTrade(CrossTrade {
                    locate,
                    timestamp,
                    shares,
                    cross_price,
                })
            }
            Some(MessageType::BrokenTrade) => {
                r.skip(4)?;
                let timestamp = r.u48()?;
                let match_number = r.u64()?;
                Message::BrokenTrade(BrokenTrade {
                    timestamp,
                    match_number,
                })
            }
        };

        Ok(msg)
    }

    fn decode_add(r: &mut FieldReader, attributed: bool) -> DecodeResult<Message> {
        let locate = r.u16()?;
        r.skip(2)?;
        let timestamp = r.u48()?;
        let order_ref = r.u64()?;
        let side = Self::decode_side(r)?;
        let shares = r.u32()?;
        r.skip(8)?; // stock symbol; the directory message is authoritative
        let price = r.u32()?;
        // 'F' carries a 4-byte attribution after the price; not extracted
        Ok(Message::AddOrder(AddOrder {
            locate,
            timestamp,
            order_ref,
            side,
            shares,
            price,
            attributed,
        }))
    }

    fn decode_side(r: &mut FieldReader) -> DecodeResult<Side> {
        let marker = r.u8()?;
        Side::from_u8(marker).ok_or(DecodeError::InvalidSide(marker))
    }
}
