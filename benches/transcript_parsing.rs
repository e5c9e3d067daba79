use std::fmt::Write;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ctxsave::capture::{TranscriptFormat, parse_transcript};
use serde_json::json;

/// Free-form transcript with N user/assistant/tool rounds
fn generate_free_form(rounds: usize) -> String {
    let mut text = String::new();
    for i in 0..rounds {
        write!(
            text,
            "user:\n<user_query>Why does job {i} retry forever?</user_query>\n\
             assistant:\n[Thinking] The root cause is that job {i} never records its attempt \
             count, so the scheduler keeps re-queueing it after every failure.\n\
             [Tool call] StrReplace\n  path: /srv/app/src/jobs/job_{i}.rs\n\
             [Tool result]\nerror: test jobs::job_{i} failed\n"
        )
        .unwrap();
    }
    text
}

/// Structured transcript with N user/assistant/tool records
fn generate_structured(rounds: usize) -> String {
    let mut text = String::new();
    for i in 0..rounds {
        for (role, body) in [
            ("user", format!("Why does job {i} retry forever?")),
            ("assistant", format!("The fix is to persist the attempt count for job {i}.")),
            ("tool", format!("Exception in job {i}")),
        ] {
            let content = json!([{"type": "text", "text": body}]);
            let record = json!({"role": role, "message": {"content": content}});
            writeln!(text, "{}", record).unwrap();
        }
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_transcript");

    for rounds in [10, 100, 1_000].iter() {
        let free_form = generate_free_form(*rounds);
        let structured = generate_structured(*rounds);

        group.throughput(Throughput::Bytes(free_form.len() as u64));
        group.bench_with_input(BenchmarkId::new("free_form", rounds), &free_form, |b, text| {
            b.iter(|| parse_transcript(black_box(text), TranscriptFormat::FreeForm));
        });

        group.throughput(Throughput::Bytes(structured.len() as u64));
        group.bench_with_input(BenchmarkId::new("structured", rounds), &structured, |b, text| {
            b.iter(|| parse_transcript(black_box(text), TranscriptFormat::Structured));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
