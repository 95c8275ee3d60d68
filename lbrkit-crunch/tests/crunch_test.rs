//! Integration tests for the crunch codec.

use lbrkit_crunch::{CRUNCH_SIG, crunch, is_crunched, uncrunch};

#[test]
fn test_roundtrip_simple() {
    let data = b"Hello, crunched world!".to_vec();
    let packed = crunch("hello.txt", &data).expect("encode failed");
    let out = uncrunch(&packed).expect("decode failed");

    assert_eq!(out.data, data);
    assert_eq!(out.original_name, "hello.txt");
    assert_eq!(out.checksum_mismatch, Some(false));
}

#[test]
fn test_signature_and_header_layout() {
    let packed = crunch("REPORT.DOC", b"quarterly").expect("encode failed");
    assert!(is_crunched(&packed));
    assert_eq!(&packed[..2], &CRUNCH_SIG);
    // Name is recorded lowercase and NUL-terminated.
    assert_eq!(&packed[2..13], b"report.doc\0");
}

#[test]
fn test_cpm_text_compresses() {
    let mut data = Vec::new();
    for i in 0..40 {
        data.extend_from_slice(format!("100 PRINT \"LINE {i:02}\"\r\n").as_bytes());
    }
    // CP/M text files pad the final sector with CTRL-Z.
    data.extend_from_slice(&[0x1a; 64]);

    let packed = crunch("prog.bas", &data).expect("encode failed");
    let out = uncrunch(&packed).expect("decode failed");
    assert_eq!(out.data, data);
    assert!(packed.len() < data.len());
    println!(
        "text: {} -> {} bytes ({:.1}%)",
        data.len(),
        packed.len(),
        100.0 * packed.len() as f64 / data.len() as f64
    );
}

#[test]
fn test_binary_pattern_roundtrip() {
    let data: Vec<u8> = (0..4096u32).map(|i| ((i * 37 + 11) % 256) as u8).collect();
    let packed = crunch("blob.bin", &data).expect("encode failed");
    let out = uncrunch(&packed).expect("decode failed");
    assert_eq!(out.data, data);
    assert_eq!(out.checksum_mismatch, Some(false));
}

#[test]
fn test_long_runs_collapse_well() {
    let mut data = Vec::new();
    for byte in [0x00u8, 0xE5, 0x20, 0xFF] {
        data.extend(std::iter::repeat_n(byte, 700));
    }
    let packed = crunch("runs.bin", &data).expect("encode failed");
    let out = uncrunch(&packed).expect("decode failed");
    assert_eq!(out.data, data);
    assert!(packed.len() < data.len() / 5);
}

#[test]
fn test_marker_byte_runs_roundtrip() {
    // 513 copies of the run-length marker, which the collapse layer
    // must escape pair by pair.
    let data = vec![0x90u8; 513];
    let packed = crunch("dle.bin", &data).expect("encode failed");
    let out = uncrunch(&packed).expect("decode failed");
    assert_eq!(out.data, data);
}

#[test]
fn test_multiple_sizes() {
    for size in [0usize, 1, 2, 3, 127, 128, 129, 255, 256, 257, 1000, 4096] {
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        let packed = crunch("size.bin", &data).expect("encode failed");
        let out = uncrunch(&packed).expect("decode failed");
        assert_eq!(out.data, data, "size {size} failed");
    }
}

#[test]
fn test_random_data_survives_table_resets() {
    // Incompressible input defines a pair on almost every byte, so
    // 32 KiB is enough to fill the table and force mid-stream resets.
    let mut state = 0x0DDB_A11C_0FFE_E000u64;
    let data: Vec<u8> = (0..32 * 1024)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 33) as u8
        })
        .collect();

    let packed = crunch("noise.bin", &data).expect("encode failed");
    let out = uncrunch(&packed).expect("decode failed");
    assert_eq!(out.data, data);
    assert_eq!(out.checksum_mismatch, Some(false));
}

#[test]
fn test_compression_effectiveness() {
    let cases: [(&str, Vec<u8>); 3] = [
        ("uniform", vec![b'A'; 2048]),
        (
            "sentences",
            b"The same words repeat. The same words repeat. ".repeat(40),
        ),
        ("counter", (0..2048u32).map(|i| (i % 256) as u8).collect()),
    ];

    for (name, data) in cases {
        let packed = crunch("bench.dat", &data).expect("encode failed");
        let out = uncrunch(&packed).expect("decode failed");
        assert_eq!(out.data, data);
        println!(
            "{name}: {} -> {} bytes ({:.1}%)",
            data.len(),
            packed.len(),
            100.0 * packed.len() as f64 / data.len() as f64
        );
    }
}
