use criterion::{criterion_group, criterion_main, Criterion as Bencher, Throughput};

use collector_protocol::CriterionRegistry;

fn address_blob(items: usize) -> Vec<u8> {
    let mut blob = Vec::with_capacity(items * 17);
    for i in 0..items {
        if i % 2 == 0 {
            blob.push(0x04);
            blob.extend_from_slice(&[10, 0, (i >> 8) as u8, i as u8]);
            blob.extend_from_slice(&[0u8; 12]);
        } else {
            blob.push(0x06);
            let mut octets = [0u8; 16];
            octets[0] = 0x20;
            octets[1] = 0x01;
            octets[14] = (i >> 8) as u8;
            octets[15] = i as u8;
            blob.extend_from_slice(&octets);
        }
    }
    blob
}

fn compound_blob(items: usize) -> Vec<u8> {
    let addresses = address_blob(items);
    let mut blob = Vec::with_capacity(items * 19);
    for (i, item) in addresses.chunks_exact(17).enumerate() {
        blob.extend_from_slice(&(i as u16).to_be_bytes());
        blob.extend_from_slice(item);
    }
    blob
}

#[allow(clippy::unwrap_used)]
fn bench_decode(c: &mut Bencher) {
    let registry = CriterionRegistry::new();
    let mut group = c.benchmark_group("criterion_decode");

    for &items in &[16usize, 256, 4096] {
        let ports: Vec<u8> = (0..items).flat_map(|i| (i as u16).to_be_bytes()).collect();
        group.throughput(Throughput::Bytes(ports.len() as u64));
        group.bench_function(format!("port_{items}"), |b| {
            b.iter(|| registry.decode('P', &ports).unwrap())
        });

        let addresses = address_blob(items);
        group.throughput(Throughput::Bytes(addresses.len() as u64));
        group.bench_function(format!("address_{items}"), |b| {
            b.iter(|| registry.decode('I', &addresses).unwrap())
        });

        let compounds = compound_blob(items);
        group.throughput(Throughput::Bytes(compounds.len() as u64));
        group.bench_function(format!("address_and_port_{items}"), |b| {
            b.iter(|| registry.decode('B', &compounds).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
