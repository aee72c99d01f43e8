/// Wire format conformance and decoder tests

use byteorder::{BigEndian, WriteBytesExt};
use itch_vwap::{DecodeError, Decoder, Message, MessageType, Side};

fn frame(payload: Vec<u8>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(2 + payload.len());
    buf.write_u16::<BigEndian>(payload.len() as u16).unwrap();
    buf.extend_from_slice(&payload);
    buf
}

fn header(tag: u8, locate: u16, timestamp: u64) -> Vec<u8> {
    let mut p = Vec::new();
    p.push(tag);
    p.write_u16::<BigEndian>(locate).unwrap();
    p.write_u16::<BigEndian>(0).unwrap(); // tracking
    p.write_uint::<BigEndian>(timestamp, 6).unwrap();
    p
}

fn system_event(timestamp: u64, code: u8) -> Vec<u8> {
    let mut p = header(b'S', 0, timestamp);
    p.push(code);
    frame(p)
}

fn stock_directory(locate: u16, timestamp: u64, symbol: &str) -> Vec<u8> {
    let mut p = header(b'R', locate, timestamp);
    p.extend_from_slice(format!("{:<8}", symbol).as_bytes());
    p.extend_from_slice(&[0u8; 20]); // issue classification fields
    frame(p)
}

fn add_order(
    tag: u8,
    locate: u16,
    timestamp: u64,
    order_ref: u64,
    side: u8,
    shares: u32,
    price: u32,
) -> Vec<u8> {
    let mut p = header(tag, locate, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.push(side);
    p.write_u32::<BigEndian>(shares).unwrap();
    p.extend_from_slice(b"TEST    ");
    p.write_u32::<BigEndian>(price).unwrap();
    if tag == b'F' {
        p.extend_from_slice(b"MPID");
    }
    frame(p)
}

fn order_executed(timestamp: u64, order_ref: u64, executed: u32) -> Vec<u8> {
    let mut p = header(b'E', 0, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.write_u32::<BigEndian>(executed).unwrap();
    p.write_u64::<BigEndian>(9_001).unwrap(); // match number
    frame(p)
}

fn executed_with_price(
    timestamp: u64,
    order_ref: u64,
    executed: u32,
    printable: u8,
    price: u32,
) -> Vec<u8> {
    let mut p = header(b'C', 0, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.write_u32::<BigEndian>(executed).unwrap();
    p.write_u64::<BigEndian>(9_002).unwrap();
    p.push(printable);
    p.write_u32::<BigEndian>(price).unwrap();
    frame(p)
}

fn order_cancel(timestamp: u64, order_ref: u64, cancelled: u32) -> Vec<u8> {
    let mut p = header(b'X', 0, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.write_u32::<BigEndian>(cancelled).unwrap();
    frame(p)
}

fn order_delete(timestamp: u64, order_ref: u64) -> Vec<u8> {
    let mut p = header(b'D', 0, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    frame(p)
}

fn order_replace(timestamp: u64, old_ref: u64, new_ref: u64, shares: u32, price: u32) -> Vec<u8> {
    let mut p = header(b'U', 0, timestamp);
    p.write_u64::<BigEndian>(old_ref).unwrap();
    p.write_u64::<BigEndian>(new_ref).unwrap();
    p.write_u32::<BigEndian>(shares).unwrap();
    p.write_u32::<BigEndian>(price).unwrap();
    frame(p)
}

fn trade(locate: u16, timestamp: u64, order_ref: u64, side: u8, shares: u32, price: u32) -> Vec<u8> {
    let mut p = header(b'P', locate, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.push(side);
    p.write_u32::<BigEndian>(shares).unwrap();
    p.extend_from_slice(b"TEST    ");
    p.write_u32::<BigEndian>(price).unwrap();
    p.write_u64::<BigEndian>(9_003).unwrap();
    frame(p)
}

fn cross_trade(locate: u16, timestamp: u64, shares: u64, cross_price: u32) -> Vec<u8> {
    let mut p = header(b'Q', locate, timestamp);
    p.write_u64::<BigEndian>(shares).unwrap();
    p.extend_from_slice(b"TEST    ");
    p.write_u32::<BigEndian>(cross_price).unwrap();
    p.write_u64::<BigEndian>(9_004).unwrap();
    p.push(b'O'); // cross type
    frame(p)
}

fn broken_trade(timestamp: u64, match_number: u64) -> Vec<u8> {
    let mut p = header(b'B', 0, timestamp);
    p.write_u64::<BigEndian>(match_number).unwrap();
    frame(p)
}

#[test]
fn test_decode_system_event() {
    let buf = system_event(42_000, b'Q');
    let (msg, consumed) = Decoder::decode_frame(&buf).unwrap();
    assert_eq!(consumed, buf.len());
    match msg {
        Message::SystemEvent(ev) => {
            assert_eq!(ev.timestamp, 42_000);
            assert_eq!(ev.event_code, b'Q');
        }
        other => panic!("expected SystemEvent, got {:?}", other),
    }
}

#[test]
fn test_decode_stock_directory_trims_symbol() {
    let buf = stock_directory(7, 1_000, "AAPL");
    let (msg, _) = Decoder::decode_frame(&buf).unwrap();
    match msg {
        Message::StockDirectory(dir) => {
            assert_eq!(dir.locate, 7);
            assert_eq!(dir.symbol, "AAPL");
        }
        other => panic!("expected StockDirectory, got {:?}", other),
    }
}

#[test]
fn test_decode_add_order() {
    let buf = add_order(b'A', 7, 1_000, 100, b'B', 10, 1_235_000);
    let (msg, consumed) = Decoder::decode_frame(&buf).unwrap();
    assert_eq!(consumed, buf.len());
    match msg {
        Message::AddOrder(add) => {
            assert_eq!(add.locate, 7);
            assert_eq!(add.order_ref, 100);
            assert_eq!(add.side, Side::Buy);
            assert_eq!(add.shares, 10);
            assert_eq!(add.price, 1_235_000);
            assert!(!add.attributed);
        }
        other => panic!("expected AddOrder, got {:?}", other),
    }
}

#[test]
fn test_decode_attributed_add_routes_through_add() {
    let buf = add_order(b'F', 7, 1_000, 101, b'S', 20, 1_000_000);
    let (msg, consumed) = Decoder::decode_frame(&buf).unwrap();
    assert_eq!(consumed, buf.len());
    assert_eq!(msg_type(&msg), MessageType::AddOrderAttributed);
    match msg {
        Message::AddOrder(add) => {
            assert_eq!(add.side, Side::Sell);
            assert!(add.attributed);
        }
        other => panic!("expected AddOrder, got {:?}", other),
    }
}

fn msg_type(msg: &Message) -> MessageType {
    msg.message_type().expect("supported message")
}

#[test]
fn test_decode_order_executed() {
    let buf = order_executed(2_000, 100, 4);
    let (msg, _) = Decoder::decode_frame(&buf).unwrap();
    match msg {
        Message::OrderExecuted(exec) => {
            assert_eq!(exec.timestamp, 2_000);
            assert_eq!(exec.order_ref, 100);
            assert_eq!(exec.executed, 4);
        }
        other => panic!("expected OrderExecuted, got {:?}", other),
    }
}

#[test]
fn test_decode_executed_with_price() {
    let buf = executed_with_price(2_000, 100, 4, b'Y', 1_240_000);
    let (msg, _) = Decoder::decode_frame(&buf).unwrap();
    match msg {
        Message::OrderExecutedWithPrice(exec) => {
            assert_eq!(exec.executed, 4);
            assert!(exec.printable);
            assert_eq!(exec.price, 1_240_000);
        }
        other => panic!("expected OrderExecutedWithPrice, got {:?}", other),
    }
}

#[test]
fn test_decode_cancel_delete_replace() {
    let (msg, _) = Decoder::decode_frame(&order_cancel(3_000, 100, 5)).unwrap();
    assert!(matches!(msg, Message::OrderCancel(c) if c.cancelled == 5));

    let (msg, _) = Decoder::decode_frame(&order_delete(3_100, 100)).unwrap();
    assert!(matches!(msg, Message::OrderDelete(d) if d.order_ref == 100));

    let (msg, _) = Decoder::decode_frame(&order_replace(3_200, 100, 200, 25, 1_500_000)).unwrap();
    match msg {
        Message::OrderReplace(rep) => {
            assert_eq!(rep.old_ref, 100);
            assert_eq!(rep.new_ref, 200);
            assert_eq!(rep.shares, 25);
            assert_eq!(rep.price, 1_500_000);
        }
        other => panic!("expected OrderReplace, got {:?}", other),
    }
}

#[test]
fn test_decode_trade_messages() {
    let (msg, _) = Decoder::decode_frame(&trade(7, 4_000, 0, b'B', 50, 1_230_000)).unwrap();
    match msg {
        Message::Trade(t) => {
            assert_eq!(t.locate, 7);
            assert_eq!(t.shares, 50);
            assert_eq!(t.price, 1_230_000);
        }
        other => panic!("expected Trade, got {:?}", other),
    }

    let (msg, _) = Decoder::decode_frame(&cross_trade(7, 4_100, 10_000, 1_231_000)).unwrap();
    match msg {
        Message::CrossTrade(q) => {
            assert_eq!(q.shares, 10_000);
            assert_eq!(q.cross_price, 1_231_000);
        }
        other => panic!("expected CrossTrade, got {:?}", other),
    }

    let (msg, _) = Decoder::decode_frame(&broken_trade(4_200, 9_004)).unwrap();
    assert!(matches!(msg, Message::BrokenTrade(b) if b.match_number == 9_004));
}

#[test]
fn test_unknown_tag_is_skipped_not_rejected() {
    let buf = frame(vec![b'I', 0, 0, 0, 0, 0, 0]);
    let (msg, consumed) = Decoder::decode_frame(&buf).unwrap();
    assert_eq!(msg, Message::Unsupported { tag: b'I' });
    assert_eq!(consumed, buf.len());
    assert_eq!(msg.timestamp(), None);
}

#[test]
fn test_truncated_declared_length() {
    let mut buf = add_order(b'A', 7, 1_000, 100, b'B', 10, 1_235_000);
    buf.truncate(buf.len() - 4);
    let result = Decoder::decode_frame(&buf);
    assert!(matches!(result, Err(DecodeError::TruncatedMessage { .. })));
}

#[test]
fn test_short_length_prefix() {
    assert!(matches!(
        Decoder::decode_frame(&[]),
        Err(DecodeError::TruncatedMessage { .. })
    ));
    assert!(matches!(
        Decoder::decode_frame(&[0x00]),
        Err(DecodeError::TruncatedMessage { .. })
    ));
}

#[test]
fn test_payload_shorter_than_layout() {
    // framing is intact, but the payload stops mid-field
    let buf = frame(vec![b'E', 0, 0, 0, 0]);
    let result = Decoder::decode_frame(&buf);
    assert!(matches!(result, Err(DecodeError::OutOfBounds { .. })));
}

#[test]
fn test_invalid_side_marker() {
    let buf = add_order(b'A', 7, 1_000, 100, b'?', 10, 1_235_000);
    let result = Decoder::decode_frame(&buf);
    assert_eq!(result, Err(DecodeError::InvalidSide(b'?')));
}

#[test]
fn test_consecutive_frames() {
    let mut buf = add_order(b'A', 7, 1_000, 100, b'B', 10, 1_235_000);
    let second = order_executed(2_000, 100, 4);
    buf.extend_from_slice(&second);

    let (first_msg, consumed) = Decoder::decode_frame(&buf).unwrap();
    assert_eq!(msg_type(&first_msg), MessageType::AddOrder);
    let (second_msg, _) = Decoder::decode_frame(&buf[consumed..]).unwrap();
    assert_eq!(msg_type(&second_msg), MessageType::OrderExecuted);
}
