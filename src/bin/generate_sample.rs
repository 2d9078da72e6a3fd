use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

use digiscope::data::schema::{
    TechDimension, COMPANY_NAME, INDUSTRY_NAME, STOCK_CODE, STOCK_CODE_FULL, TOTAL_WORD_FREQ,
    YEAR, YEAR_NUMBER,
};

/// Write a synthetic word-frequency file and industry file for the dashboard.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", about)]
struct Cli {
    /// Output directory (created when missing)
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Xlsx)]
    format: Format,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 2008)]
    first_year: i32,

    #[arg(long, default_value_t = 2023)]
    last_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Xlsx,
    Csv,
    Parquet,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Xlsx => "xlsx",
            Format::Csv => "csv",
            Format::Parquet => "parquet",
        }
    }
}

/// (numeric code, name, classification-file label, base keyword count)
/// An empty label means the company is absent from the industry file.
const COMPANIES: &[(i64, &str, &str, f64)] = &[
    (1, "平安银行", "货币金融服务", 60.0),
    (2, "万科A", "房地产业", 25.0),
    (7, "全新好", "", 8.0),
    (858, "五粮液", "酒、饮料和精制茶制造业", 12.0),
    (2594, "比亚迪", "汽车制造业", 45.0),
    (300750, "宁德时代", "电气机械和器材制造业", 55.0),
    (600000, "浦发银行", "", 40.0),
    (600036, "招商银行", "货币金融服务", 70.0),
    (600519, "贵州茅台", "酒、饮料和精制茶制造业", 10.0),
    (600887, "伊利股份", "食品制造业", 18.0),
    (601318, "中国平安", "保险业", 80.0),
    (688981, "中芯国际", "计算机、通信和其他电子设备制造业", 65.0),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct PrimaryRow {
    code: i64,
    name: &'static str,
    year: i32,
    total: i64,
    dimensions: Vec<f64>,
}

struct IndustryRow {
    code: String,
    year: i32,
    industry: &'static str,
}

/// Keyword counts grow over the years; each dimension takes a noisy share.
fn generate_primary(cli: &Cli, rng: &mut SimpleRng) -> Vec<PrimaryRow> {
    let mut rows = Vec::new();
    for &(code, name, _, base) in COMPANIES {
        let weights: Vec<f64> = TechDimension::ALL
            .iter()
            .map(|_| 0.2 + rng.next_f64())
            .collect();
        let weight_sum: f64 = weights.iter().sum();

        for year in cli.first_year..=cli.last_year {
            let growth = 1.0 + 0.15 * f64::from(year - cli.first_year);
            let level = (base * growth + rng.gauss(0.0, base * 0.2)).max(0.0);
            let dimensions: Vec<f64> = weights
                .iter()
                .map(|w| (level * w / weight_sum + rng.gauss(0.0, 0.5)).max(0.0).round())
                .collect();
            let total = dimensions.iter().sum::<f64>() as i64;
            rows.push(PrimaryRow {
                code,
                name,
                year,
                total,
                dimensions,
            });
        }
    }
    rows
}

fn generate_industry(cli: &Cli) -> Vec<IndustryRow> {
    let mut rows = Vec::new();
    for &(code, _, industry, _) in COMPANIES {
        if industry.is_empty() {
            continue;
        }
        for year in cli.first_year..=cli.last_year.min(2021) {
            rows.push(IndustryRow {
                code: format!("{code:06}"),
                year,
                industry,
            });
        }
    }
    rows
}

fn primary_headers() -> Vec<&'static str> {
    let mut headers = vec![STOCK_CODE.name, YEAR.name, COMPANY_NAME.name, TOTAL_WORD_FREQ.name];
    headers.extend(TechDimension::ALL.iter().map(|d| d.column().name));
    headers
}

fn industry_headers() -> [&'static str; 3] {
    [STOCK_CODE_FULL.name, YEAR_NUMBER.name, INDUSTRY_NAME.name]
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn write_xlsx(dir: &Path, primary: &[PrimaryRow], industry: &[IndustryRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in primary_headers().into_iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (i, row) in primary.iter().enumerate() {
        let r = (i + 1) as u32;
        // numeric, so leading zeros are lost the way spreadsheet exports lose them
        sheet.write_number(r, 0, row.code as f64)?;
        sheet.write_number(r, 1, f64::from(row.year))?;
        sheet.write_string(r, 2, row.name)?;
        sheet.write_number(r, 3, row.total as f64)?;
        for (offset, value) in row.dimensions.iter().enumerate() {
            sheet.write_number(r, (4 + offset) as u16, *value)?;
        }
    }
    workbook.save(dir.join("word_frequency.xlsx"))?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in industry_headers().into_iter().enumerate() {
        sheet.write_string(0, col as u16, header)?;
    }
    for (i, row) in industry.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, row.code.as_str())?;
        sheet.write_number(r, 1, f64::from(row.year))?;
        sheet.write_string(r, 2, row.industry)?;
    }
    workbook.save(dir.join("industry_codes.xlsx"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn write_csv(dir: &Path, primary: &[PrimaryRow], industry: &[IndustryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(dir.join("word_frequency.csv"))?;
    writer.write_record(primary_headers())?;
    for row in primary {
        let mut record = vec![
            row.code.to_string(),
            row.year.to_string(),
            row.name.to_string(),
            row.total.to_string(),
        ];
        record.extend(row.dimensions.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(dir.join("industry_codes.csv"))?;
    writer.write_record(industry_headers())?;
    for row in industry {
        let year = row.year.to_string();
        writer.write_record([row.code.as_str(), year.as_str(), row.industry])?;
    }
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

fn write_batch(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_parquet(dir: &Path, primary: &[PrimaryRow], industry: &[IndustryRow]) -> Result<()> {
    let mut fields = vec![
        Field::new(STOCK_CODE.name, DataType::Int64, false),
        Field::new(YEAR.name, DataType::Int64, false),
        Field::new(COMPANY_NAME.name, DataType::Utf8, true),
        Field::new(TOTAL_WORD_FREQ.name, DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(primary.iter().map(|r| r.code))),
        Arc::new(Int64Array::from_iter_values(primary.iter().map(|r| i64::from(r.year)))),
        Arc::new(StringArray::from_iter_values(primary.iter().map(|r| r.name))),
        Arc::new(Int64Array::from_iter_values(primary.iter().map(|r| r.total))),
    ];
    for dim in TechDimension::ALL {
        fields.push(Field::new(dim.column().name, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from_iter_values(
            primary.iter().map(|r| r.dimensions[dim.index()]),
        )));
    }
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
    write_batch(&dir.join("word_frequency.parquet"), &batch)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new(STOCK_CODE_FULL.name, DataType::Utf8, false),
        Field::new(YEAR_NUMBER.name, DataType::Int64, false),
        Field::new(INDUSTRY_NAME.name, DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from_iter_values(industry.iter().map(|r| r.code.as_str()))),
            Arc::new(Int64Array::from_iter_values(industry.iter().map(|r| i64::from(r.year)))),
            Arc::new(StringArray::from_iter_values(industry.iter().map(|r| r.industry))),
        ],
    )?;
    write_batch(&dir.join("industry_codes.parquet"), &batch)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let mut rng = SimpleRng::new(cli.seed);
    let primary = generate_primary(&cli, &mut rng);
    let industry = generate_industry(&cli);

    match cli.format {
        Format::Xlsx => write_xlsx(&cli.out_dir, &primary, &industry)?,
        Format::Csv => write_csv(&cli.out_dir, &primary, &industry)?,
        Format::Parquet => write_parquet(&cli.out_dir, &primary, &industry)?,
    }

    let ext = cli.format.extension();
    println!(
        "Wrote {} word-frequency rows ({} companies, {}-{}) and {} industry rows to {}",
        primary.len(),
        COMPANIES.len(),
        cli.first_year,
        cli.last_year,
        industry.len(),
        cli.out_dir.display()
    );
    if cli.format != Format::Xlsx {
        println!(
            "Point primary_file and secondary_file in the config at the .{ext} files"
        );
    }
    Ok(())
}
