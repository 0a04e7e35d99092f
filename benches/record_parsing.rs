use criterion::{Criterion, criterion_group, criterion_main};
use dnssec_chain::dnssec::{DnskeyRecord, DsRecord, RrsigRecord, key_tag_from_base64};
use std::hint::black_box;

const ROOT_KSK_2024: &str = "AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3+/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kvArMtNROxVQuCaSnIDdD5LKyWbRd2n9WGe2R8PzgCmr3EgVLrjyBxWezF0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+eoZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfdRUfhHdY6+cn8HFRm+2hM8AnXGXws9555KrUB5qihylGa8subX2Nn6UwNR1AkUTV74bU=";

fn bench_record_parsing(c: &mut Criterion) {
    let dnskey = format!("257 3 8 {}", ROOT_KSK_2024);
    let dnskey_multi = format!(
        "257 3 8 (\n {}\n {}\n ) ; KSK; alg = RSASHA256 ; key id = 20326",
        &ROOT_KSK_2024[..172],
        &ROOT_KSK_2024[172..]
    );
    let ds = "20326 8 2 E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D";
    let rrsig = "DNSKEY 8 0 172800 20250201000000 20250111000000 20326 . c2lnbmF0dXJlLWJ5dGVz";

    c.bench_function("parse dnskey", |b| {
        b.iter(|| DnskeyRecord::parse(black_box(&dnskey), 172800))
    });

    c.bench_function("parse dnskey with key id comment", |b| {
        b.iter(|| DnskeyRecord::parse(black_box(&dnskey_multi), 172800))
    });

    c.bench_function("parse ds", |b| {
        b.iter(|| DsRecord::parse(black_box(ds), 86400))
    });

    c.bench_function("parse rrsig", |b| {
        b.iter(|| RrsigRecord::parse(black_box(rrsig), 172800))
    });

    c.bench_function("key tag from base64", |b| {
        b.iter(|| key_tag_from_base64(257, 3, 8, black_box(ROOT_KSK_2024)))
    });
}

criterion_group!(benches, bench_record_parsing);
criterion_main!(benches);
