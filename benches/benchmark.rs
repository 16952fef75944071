//! パフォーマンスベンチマーク
//!
//! 方眼紙レイアウトを模した合成シートで、構造抽出とワークブック変換の速度を測定します。
//!
//! - 構造抽出: シートモデルからMarkdownまで（デコードなし）
//! - ワークブック変換: rust_xlsxwriterで生成したXLSXの変換（並列/逐次）

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use houganshi_md::{BorderKind, Borders, Cell, ConverterBuilder, MergeRange, Sheet, Style};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, XlsxError};
use std::io::Cursor;

/// 表ブロックの行数（ヘッダー行を含む）
const TABLE_ROWS: u32 = 8;
/// 表ブロックの列数
const TABLE_COLS: u32 = 6;

/// 見出し、本文、罫線表を繰り返す合成シートを生成
///
/// `blocks`個のブロックを縦に並べます。各ブロックは結合された見出し、本文1行、表1つです。
fn synthetic_sheet(blocks: u32) -> Sheet {
    let bordered = Style::new().with_borders(Borders::all(BorderKind::Thin));
    let header = bordered.clone().with_bold(true);
    let title = Style::new().with_font_size(16.0).with_bold(true);

    let mut cells = Vec::new();
    let mut merges = Vec::new();
    let block_height = TABLE_ROWS + 3;

    for block in 0..blocks {
        let top = block * block_height + 1;

        cells.push(Cell::new(top, 1, format!("第{}章", block + 1)).with_style(title.clone()));
        merges.push(MergeRange::new(top, 1, top, 20).unwrap());
        cells.push(Cell::new(top + 1, 2, "本文の説明がここに入ります。"));

        for row in 0..TABLE_ROWS {
            for col in 0..TABLE_COLS {
                let style = if row == 0 { header.clone() } else { bordered.clone() };
                cells.push(
                    Cell::new(top + 2 + row, col + 1, format!("{}-{}", row, col)).with_style(style),
                );
            }
        }
    }

    Sheet::new("bench", cells, merges)
}

/// 合成ワークブックを生成
fn synthetic_workbook(sheets: usize, blocks: u32) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bordered = Format::new().set_border(FormatBorder::Thin);
    let header = bordered.clone().set_bold();
    let title = Format::new().set_font_size(16).set_bold();

    for index in 0..sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(format!("Sheet{}", index + 1))?;

        for block in 0..blocks {
            let top = block * (TABLE_ROWS + 3);
            worksheet.merge_range(top, 0, top, 19, &format!("第{}章", block + 1), &title)?;
            worksheet.write_string(top + 1, 1, "本文の説明がここに入ります。")?;

            for row in 0..TABLE_ROWS {
                for col in 0..TABLE_COLS {
                    let format = if row == 0 { &header } else { &bordered };
                    worksheet.write_string_with_format(
                        top + 2 + row,
                        col as u16,
                        format!("{}-{}", row, col),
                        format,
                    )?;
                }
            }
        }
    }

    workbook.save_to_buffer()
}

fn benchmark_structure_analysis(c: &mut Criterion) {
    let converter = ConverterBuilder::new().build().unwrap();

    let mut group = c.benchmark_group("structure_analysis");
    for blocks in [10u32, 100, 500] {
        let sheet = synthetic_sheet(blocks);
        group.throughput(Throughput::Elements(sheet.cells().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &sheet, |b, sheet| {
            b.iter(|| black_box(converter.render_sheet(black_box(sheet))));
        });
    }
    group.finish();
}

fn benchmark_workbook_conversion(c: &mut Criterion) {
    let data = match synthetic_workbook(8, 50) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Warning: Failed to generate workbook: {}. Skipping benchmark.", e);
            return;
        }
    };

    let mut group = c.benchmark_group("workbook_conversion");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    for parallel in [true, false] {
        let converter = ConverterBuilder::new()
            .with_parallel(parallel)
            .build()
            .unwrap();
        let name = if parallel { "parallel" } else { "sequential" };

        group.bench_function(name, |b| {
            b.iter(|| {
                let mut output = Vec::new();
                converter
                    .convert(Cursor::new(black_box(&data)), black_box(&mut output))
                    .unwrap();
                black_box(output)
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(std::time::Duration::from_secs(10))
        .warm_up_time(std::time::Duration::from_secs(3));
    targets = benchmark_structure_analysis, benchmark_workbook_conversion
}

criterion_main!(benches);
