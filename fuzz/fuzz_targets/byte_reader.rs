#![no_main]

use buffer::{latin1, ByteReader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Input bytes drive a bounded sequence of reads.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 7;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read::<u16>();
            }
            2 => {
                let _ = reader.read::<i32>();
            }
            3 => {
                let _ = reader.read::<f64>();
            }
            4 => {
                let len = usize::from(data[idx.saturating_sub(1)]);
                if let Ok(bytes) = reader.read_bytes(len) {
                    let text = latin1::decode(bytes);
                    assert_eq!(latin1::encoded_len(&text), bytes.len());
                }
            }
            5 => {
                let _ = reader.peek_u8();
            }
            _ => {
                let start = usize::from(data[idx.saturating_sub(1)]);
                let _ = ByteReader::with_bounds(data, start, data.len() / 2);
            }
        }
        assert!(reader.position() <= data.len());
    }
});
