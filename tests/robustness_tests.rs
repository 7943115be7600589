use linestream::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

mod harness {
    pub mod collector;
}
use harness::collector::Collector;

fn seeded() -> StdRng {
    StdRng::seed_from_u64(0x005E_ED42)
}

fn random_line(rng: &mut StdRng, max_len: usize) -> Vec<u8> {
    let len = rng.gen_range(0..=max_len);
    (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect()
}

#[test]
fn random_chunking_delivers_every_line() {
    // Purpose: Lines that always fit survive any chunking, wrap position and
    // delimiter split without loss or reordering.
    let mut rng = seeded();
    let lines: Vec<Vec<u8>> = (0..500).map(|_| random_line(&mut rng, 40)).collect();
    let mut stream = Vec::new();
    for line in &lines {
        stream.extend_from_slice(line);
        stream.extend_from_slice(b"\r\n");
    }

    let mut framer = LineFramer::new(64, b"\r\n").unwrap();
    let mut out = Collector::new();
    let mut rest = &stream[..];
    while !rest.is_empty() {
        let n = rng.gen_range(1..=17).min(rest.len());
        let (chunk, tail) = rest.split_at(n);
        framer.feed_bytes(chunk, &mut out).unwrap();
        rest = tail;
    }

    let expected: Vec<Vec<u8>> = lines.iter().filter(|l| !l.is_empty()).cloned().collect();
    let empty = lines.len() - expected.len();
    assert_eq!(out.frames, expected);
    assert!(out.overflows.is_empty());

    let stats = framer.statistics();
    assert_eq!(stats.empty_lines_skipped, empty as u64);
    assert_eq!(stats.bytes_received, stream.len() as u64);
    assert!(framer.is_empty());
}

#[test]
fn delimiter_free_noise_stays_bounded() {
    // Purpose: A stream that never completes a frame keeps only the newest bytes
    // and accounts for every byte it dropped.
    let mut rng = seeded();
    let mut framer = LineFramer::new(128, b"\n").unwrap();
    let mut out = Collector::new();
    let mut last = Vec::new();

    for _ in 0..200 {
        let len = rng.gen_range(1..=300);
        let chunk: Vec<u8> = (0..len).map(|_| rng.gen_range(0x20u8..=0x7e)).collect();
        framer.feed_bytes(&chunk, &mut out).unwrap();
        last = chunk;
        assert!(framer.buffered() <= framer.capacity());
    }

    let stats = framer.statistics();
    assert!(out.frames.is_empty());
    assert_eq!(stats.current_buffer_usage, 128);
    assert_eq!(
        stats.bytes_received - stats.bytes_discarded_by_overflow,
        stats.current_buffer_usage as u64
    );
    assert_eq!(
        out.overflows.iter().sum::<usize>() as u64,
        stats.bytes_discarded_by_overflow
    );

    // The freshest input is what survives: append a delimiter and compare.
    framer.feed_bytes(b"\n", &mut out).unwrap();
    assert_eq!(out.frames.len(), 1);
    let frame = &out.frames[0];
    let kept = frame.len().min(last.len());
    assert_eq!(frame[frame.len() - kept..], last[last.len() - kept..]);
}

#[test]
fn burst_recovery_after_overflow() {
    // Purpose: After a burst overruns the ring, ordinary traffic frames normally again.
    let mut framer = LineFramer::new(32, b"\n").unwrap();
    let mut out = Collector::new();

    framer.feed_bytes(&[b'#'; 200], &mut out).unwrap();
    framer.discard_buffer();
    for i in 0..50 {
        framer
            .feed_bytes(format!("reading {i}\n").as_bytes(), &mut out)
            .unwrap();
    }

    assert_eq!(out.frames.len(), 50);
    assert_eq!(out.strings()[49], "reading 49");
    let stats = framer.statistics();
    assert_eq!(stats.overflow_count, 1);
    assert_eq!(stats.manual_discard_count, 1);
    assert_eq!(stats.peak_buffer_usage, 32);
    assert!((0.0..=1.0).contains(&stats.usage_rate()));
    assert_eq!(stats.peak_usage_rate(), 1.0);
}

#[test]
fn sparse_delimiters_through_memory_source() {
    // Purpose: Short driver reads and long gaps between delimiters still frame
    // correctly when driven from `ready_count`.
    let mut rng = seeded();
    let mut source = MemorySource::new().with_max_read(7);
    let mut framer = LineFramer::new(256, b"\n").unwrap();
    let mut out = Collector::new();
    let mut expected = Vec::new();

    for _ in 0..100 {
        let line = random_line(&mut rng, 120);
        source.push(&line);
        source.push(b"\n");
        if !line.is_empty() {
            expected.push(line);
        }
        while !source.is_empty() {
            framer
                .feed(source.ready_count(), &mut source, &mut out)
                .unwrap();
        }
    }

    assert_eq!(out.frames, expected);
    assert_eq!(framer.statistics().overflow_count, 0);
}
