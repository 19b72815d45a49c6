//! Conversion benchmarks on generated table-heavy PDFs.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use docling_converter::render::{to_markdown, RenderOptions};
use docling_converter::{ParseOptions, PdfParser, TableMode};

fn text_ops(ops: &mut Vec<Operation>, text: &str, x: i64, y: i64) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
    ops.push(Operation::new("ET", vec![]));
}

/// Each page: a paragraph and a 4-column table of 20 rows.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in 0..page_count {
        let mut ops = Vec::new();
        text_ops(
            &mut ops,
            &format!("Page {} lists the quarterly figures per region.", page + 1),
            72,
            720,
        );
        for row in 0..20i64 {
            let y = 680 - row * 14;
            text_ops(&mut ops, &format!("Region {}", row), 72, y);
            text_ops(&mut ops, &format!("{}", row * 17 % 97), 220, y);
            text_ops(&mut ops, &format!("{}.{:02}", row * 3, row), 320, y);
            text_ops(&mut ops, "on track", 420, y);
        }

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);
    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| docling_converter::detect_format_from_bytes(black_box(&pdf_data)).unwrap());
    });
}

fn bench_table_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for pages in [1usize, 10] {
        let data = create_test_pdf(pages);
        for mode in [TableMode::Fast, TableMode::Accurate] {
            group.bench_with_input(BenchmarkId::new(mode.as_str(), pages), &data, |b, data| {
                b.iter(|| {
                    let options = ParseOptions::new().with_table_mode(mode);
                    PdfParser::from_bytes_with_options(black_box(data), options)
                        .unwrap()
                        .parse()
                        .unwrap()
                });
            });
        }
    }
    group.finish();
}

fn bench_parallel_vs_sequential(c: &mut Criterion) {
    let data = create_test_pdf(20);
    let mut group = c.benchmark_group("analysis");
    for parallel in [true, false] {
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_function(label, |b| {
            b.iter(|| {
                let options = ParseOptions::new().accurate().with_parallel(parallel);
                PdfParser::from_bytes_with_options(black_box(&data), options)
                    .unwrap()
                    .parse()
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_markdown_render(c: &mut Criterion) {
    let data = create_test_pdf(10);
    let doc = PdfParser::from_bytes(&data).unwrap().parse().unwrap();
    let options = RenderOptions::default();
    c.bench_function("render_markdown_10_pages", |b| {
        b.iter(|| to_markdown(black_box(&doc), &options).unwrap());
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_table_modes,
    bench_parallel_vs_sequential,
    bench_markdown_render
);
criterion_main!(benches);
