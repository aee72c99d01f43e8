/// Synthetic ITCH feed generator
///
/// Creates realistic order flow and writes a binary length-prefixed feed to
/// a file. Useful for testing and benchmarking the engine end to end.

use std::env;
use std::fs::File;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use itch_vwap::HOUR_NS;
use rand::Rng;

const SYMBOLS: &[&str] = &["AAPL", "MSFT", "GOOG", "AMZN", "NVDA", "META", "TSLA", "NFLX"];

fn frame(out: &mut Vec<u8>, payload: &[u8]) {
    out.write_u16::<BigEndian>(payload.len() as u16).unwrap();
    out.extend_from_slice(payload);
}

fn header(tag: u8, locate: u16, timestamp: u64) -> Vec<u8> {
    let mut p = Vec::new();
    p.push(tag);
    p.write_u16::<BigEndian>(locate).unwrap();
    p.write_u16::<BigEndian>(0).unwrap();
    p.write_uint::<BigEndian>(timestamp, 6).unwrap();
    p
}

fn system_event(out: &mut Vec<u8>, timestamp: u64, code: u8) {
    let mut p = header(b'S', 0, timestamp);
    p.push(code);
    frame(out, &p);
}

fn stock_directory(out: &mut Vec<u8>, locate: u16, timestamp: u64, symbol: &str) {
    let mut p = header(b'R', locate, timestamp);
    p.extend_from_slice(format!("{:<8}", symbol).as_bytes());
    p.extend_from_slice(&[0u8; 20]);
    frame(out, &p);
}

fn add_order(
    out: &mut Vec<u8>,
    locate: u16,
    timestamp: u64,
    order_ref: u64,
    side: u8,
    shares: u32,
    price: u32,
) {
    let mut p = header(b'A', locate, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.push(side);
    p.write_u32::<BigEndian>(shares).unwrap();
    p.extend_from_slice(format!("{:<8}", SYMBOLS[(locate as usize - 1) % SYMBOLS.len()]).as_bytes());
    p.write_u32::<BigEndian>(price).unwrap();
    frame(out, &p);
}

fn order_executed(out: &mut Vec<u8>, timestamp: u64, order_ref: u64, executed: u32) {
    let mut p = header(b'E', 0, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.write_u32::<BigEndian>(executed).unwrap();
    p.write_u64::<BigEndian>(0).unwrap();
    frame(out, &p);
}

fn order_cancel(out: &mut Vec<u8>, timestamp: u64, order_ref: u64, cancelled: u32) {
    let mut p = header(b'X', 0, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    p.write_u32::<BigEndian>(cancelled).unwrap();
    frame(out, &p);
}

fn order_delete(out: &mut Vec<u8>, timestamp: u64, order_ref: u64) {
    let mut p = header(b'D', 0, timestamp);
    p.write_u64::<BigEndian>(order_ref).unwrap();
    frame(out, &p);
}

fn order_replace(
    out: &mut Vec<u8>,
    timestamp: u64,
    old_ref: u64,
    new_ref: u64,
    shares: u32,
    price: u32,
) {
    let mut p = header(b'U', 0, timestamp);
    p.write_u64::<BigEndian>(old_ref).unwrap();
    p.write_u64::<BigEndian>(new_ref).unwrap();
    p.write_u32::<BigEndian>(shares).unwrap();
    p.write_u32::<BigEndian>(price).unwrap();
    frame(out, &p);
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = if args.len() > 1 {
        args[1].clone()
    } else {
        "/tmp/itch_feed.bin".to_string()
    };

    let message_count: usize = if args.len() > 2 {
        args[2].parse().unwrap_or(10_000)
    } else {
        10_000
    };

    let mut rng = rand::thread_rng();
    let mut buf: Vec<u8> = Vec::new();

    // session opens at 09:30, order flow spread until 16:00
    let open = 9 * HOUR_NS + HOUR_NS / 2;
    let close = 16 * HOUR_NS;
    let step = (close - open) / message_count as u64;

    system_event(&mut buf, open, b'Q');
    for (i, symbol) in SYMBOLS.iter().enumerate() {
        stock_directory(&mut buf, (i + 1) as u16, open, symbol);
    }

    let mut next_ref = 1_000u64;
    let mut live: Vec<u64> = Vec::new();
    let mut timestamp = open;

    println!("Generating {} messages to {}", message_count, output_path);

    for i in 0..message_count {
        timestamp += step;
        let locate = rng.gen_range(1u16..=SYMBOLS.len() as u16);
        let price = rng.gen_range(500_000u32..5_000_000);
        let shares = rng.gen_range(1u32..1_000);

        match rng.gen_range(0u8..10) {
            // adds dominate so the rest of the flow has orders to reference
            0..=4 => {
                let side = if rng.gen_bool(0.6) { b'B' } else { b'S' };
                add_order(&mut buf, locate, timestamp, next_ref, side, shares, price);
                live.push(next_ref);
                next_ref += 1;
            }
            5..=6 => {
                let order_ref = pick(&mut rng, &live);
                order_executed(&mut buf, timestamp, order_ref, shares.min(100));
            }
            7 => {
                let order_ref = pick(&mut rng, &live);
                order_cancel(&mut buf, timestamp, order_ref, shares.min(50));
            }
            8 => {
                let order_ref = pick(&mut rng, &live);
                order_delete(&mut buf, timestamp, order_ref);
                live.retain(|&r| r != order_ref);
            }
            _ => {
                let old_ref = pick(&mut rng, &live);
                order_replace(&mut buf, timestamp, old_ref, next_ref, shares, price);
                live.retain(|&r| r != old_ref);
                live.push(next_ref);
                next_ref += 1;
            }
        }

        if i % 100_000 == 0 && i > 0 {
            println!("Generated {} messages", i);
        }
    }

    system_event(&mut buf, close, b'M');

    let mut output = File::create(&output_path)?;
    output.write_all(&buf)?;

    println!("Feed generation complete: {} messages", message_count);
    println!("File size: {} bytes", buf.len());

    Ok(())
}

/// Mostly live references, occasionally a bogus one to exercise the
/// unknown-reference tolerance path.
fn pick(rng: &mut impl Rng, live: &[u64]) -> u64 {
    if live.is_empty() || rng.gen_bool(0.02) {
        u64::MAX
    } else {
        live[rng.gen_range(0..live.len())]
    }
}
