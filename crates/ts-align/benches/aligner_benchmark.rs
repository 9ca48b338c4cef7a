use std::hint::black_box;

use bytes::Bytes;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ts_align::{PACKET_SIZE, PacketAligner, SYNC_BYTE, TsPacket, packet_windows};

/// Deliberately not a multiple of the packet size.
const SEGMENT_BYTES: usize = 1024;
const STREAM_PACKETS: usize = 32 * 1024;

fn create_ts_data(packet_count: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(packet_count * PACKET_SIZE);
    for i in 0..packet_count {
        let pid = 0x100 + (i % 4) as u16;
        let cc = (i & 0x0F) as u8;
        let mut packet = [0xFFu8; PACKET_SIZE];
        packet[0] = SYNC_BYTE;
        packet[1] = (pid >> 8) as u8 & 0x1F;
        packet[2] = pid as u8;
        if i % 16 == 0 {
            // Adaptation field with PCR
            packet[3] = 0x30 | cc;
            packet[4] = 7;
            packet[5] = 0x10;
            packet[6..12].copy_from_slice(&[0x00, 0x00, 0xAF, 0xC8, 0x7E, 0x00]);
        } else {
            packet[3] = 0x10 | cc;
        }
        data.extend_from_slice(&packet);
    }
    data
}

/// Drop the first byte so the aligner has to find the initial alignment.
fn create_shifted_data() -> Bytes {
    Bytes::from(create_ts_data(STREAM_PACKETS)).slice(1..)
}

fn create_noisy_data() -> Bytes {
    let clean = create_ts_data(STREAM_PACKETS);
    let mut data = Vec::with_capacity(clean.len() + STREAM_PACKETS);
    for (i, packet) in clean.chunks(PACKET_SIZE).enumerate() {
        if i % 64 == 63 {
            data.extend_from_slice(&[SYNC_BYTE, 0x00, 0x11, 0x22, 0x33]);
        }
        data.extend_from_slice(packet);
    }
    Bytes::from(data)
}

fn align_segments(aligner: &mut PacketAligner, data: &Bytes, segment: usize) -> usize {
    let mut emitted = 0;
    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + segment).min(data.len());
        for buffer in aligner.process(data.slice(offset..end)) {
            emitted += buffer.len();
        }
        offset = end;
    }
    aligner.flush();
    emitted
}

fn benchmark_aligner(c: &mut Criterion) {
    let shifted = create_shifted_data();
    let noisy = create_noisy_data();

    // Everything but the first (shifted) and last (unconfirmed) packet survives
    let emitted = align_segments(&mut PacketAligner::new(), &shifted, SEGMENT_BYTES);
    assert_eq!(emitted, (STREAM_PACKETS - 2) * PACKET_SIZE);

    let mut group = c.benchmark_group("Packet Aligner");
    group.throughput(Throughput::Bytes(shifted.len() as u64));

    group.bench_function("1024-byte segments", |b| {
        let mut aligner = PacketAligner::new();
        b.iter(|| align_segments(&mut aligner, black_box(&shifted), SEGMENT_BYTES))
    });

    group.bench_function("single chunk", |b| {
        let mut aligner = PacketAligner::new();
        b.iter(|| align_segments(&mut aligner, black_box(&shifted), usize::MAX))
    });

    group.bench_function("188-byte segments", |b| {
        let mut aligner = PacketAligner::new();
        b.iter(|| align_segments(&mut aligner, black_box(&shifted), PACKET_SIZE))
    });

    group.bench_function("noisy resync", |b| {
        let mut aligner = PacketAligner::new();
        b.iter(|| align_segments(&mut aligner, black_box(&noisy), SEGMENT_BYTES))
    });

    group.finish();
}

fn benchmark_decoder(c: &mut Criterion) {
    let data = Bytes::from(create_ts_data(STREAM_PACKETS));

    let mut group = c.benchmark_group("Packet Decoder");
    group.throughput(Throughput::Elements(STREAM_PACKETS as u64));

    group.bench_function("header and PCR fields", |b| {
        b.iter(|| {
            let mut pcr_sum = 0u64;
            let mut pid_sum = 0u64;
            for window in packet_windows(black_box(&data)) {
                let packet = TsPacket::parse(window).unwrap();
                pid_sum += packet.pid() as u64;
                if let Some(pcr) = packet.adaptation_field().and_then(|af| af.pcr()) {
                    pcr_sum += pcr.as_27mhz();
                }
            }
            (pid_sum, pcr_sum)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_aligner, benchmark_decoder);
criterion_main!(benches);
