//! End-to-end request coordinator benchmarks.
//!
//! Covers the full request path: store round trips, generated document
//! reuse and mapping. Targets:
//! - Language query: < 50μs
//! - Map 100 ranges: < 200μs

use criterion::{Criterion, criterion_group, criterion_main};
use razor_core::{
    ClassifiedSpan, EdgeOwnership, GeneratedOutput, LanguageKind, SourceMapping, SpanKind,
    TextSpan,
};
use razor_lsp::protocol::{
    LanguageQueryParams, MapToDocumentRangesParams, UpdateGeneratedOutputParams,
};
use razor_lsp::server::Backend;
use std::hint::black_box;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tower_lsp_server::LanguageServer;
use tower_lsp_server::ls_types::{
    DidOpenTextDocumentParams, Position, Range, TextDocumentItem, Uri,
};

/// Lines of `<p>@value</p>`, each with one mapped expression.
fn fixture(lines: usize) -> (String, GeneratedOutput) {
    let line = "<p>@value</p>\n";
    let host = line.repeat(lines);

    let mut csharp = String::new();
    let mut spans = Vec::new();
    let mut mappings = Vec::new();
    for i in 0..lines {
        let base = i * line.len();
        spans.push(ClassifiedSpan::new(base, 3, SpanKind::Markup, EdgeOwnership::DoesNotOwn));
        spans.push(ClassifiedSpan::new(base + 3, 1, SpanKind::Transition, EdgeOwnership::DoesNotOwn));
        spans.push(ClassifiedSpan::new(base + 4, 5, SpanKind::Code, EdgeOwnership::Owns));
        spans.push(ClassifiedSpan::new(base + 9, 5, SpanKind::Markup, EdgeOwnership::DoesNotOwn));

        let projected = csharp.len() + 6;
        csharp.push_str("__o = value;\n");
        mappings.push(SourceMapping::new(
            TextSpan::new(base + 4, 5),
            TextSpan::new(projected, 5),
        ));
    }

    let output = GeneratedOutput {
        csharp_text: csharp,
        classified_spans: spans,
        tag_helper_spans: vec![],
        source_mappings: mappings,
    };
    (host, output)
}

fn bench_requests(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (service, _socket) = rt.block_on(async { Backend::service() });
    let backend = service.inner();
    let uri = Uri::from_file_path("/bench/Index.razor").unwrap();

    let (host, output) = fixture(500);
    rt.block_on(async {
        backend
            .did_open(DidOpenTextDocumentParams {
                text_document: TextDocumentItem::new(uri.clone(), "razor".into(), 1, host),
            })
            .await;
        backend
            .update_generated_output(UpdateGeneratedOutputParams {
                uri: uri.clone(),
                host_document_version: 1,
                output,
            })
            .await;
    });

    let mut group = c.benchmark_group("coordinator");
    let token = CancellationToken::new();

    group.bench_function("language_query", |b| {
        b.iter(|| {
            rt.block_on(backend.coordinator().language_query(
                LanguageQueryParams {
                    uri: uri.clone(),
                    position: black_box(Position::new(250, 6)),
                },
                &token,
            ))
        })
    });

    let ranges: Vec<Range> = (0..100u32)
        .map(|line| Range::new(Position::new(line, 6), Position::new(line, 11)))
        .collect();

    group.bench_function("map_100_ranges", |b| {
        b.iter(|| {
            rt.block_on(backend.coordinator().map_to_document_ranges(
                MapToDocumentRangesParams {
                    razor_document_uri: uri.clone(),
                    kind: LanguageKind::CSharp,
                    projected_ranges: black_box(ranges.clone()),
                },
                &token,
            ))
        })
    });

    group.finish();
}

criterion_group!(benches, bench_requests);
criterion_main!(benches);
