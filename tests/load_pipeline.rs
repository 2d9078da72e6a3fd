use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rust_xlsxwriter::Workbook;

use arrow::array::{
    Array, ArrayRef, DictionaryArray, Float64Array, Int16Array, Int64Array, ListArray, StringArray,
    UInt32Array,
};
use arrow::datatypes::{DataType, Field, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use digiscope::data::schema::TechDimension;
use digiscope::{load, select, DashboardConfig, DatasetCache, UnifiedTable};

/// `(code, year, name, total, value of every dimension)`; codes are written
/// as numbers, the way spreadsheet exports store them.
type PrimaryFixture<'a> = (f64, Option<f64>, &'a str, f64, f64);

fn write_primary_xlsx(path: &Path, rows: &[PrimaryFixture]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let mut headers = vec!["股票代码", "年份", "企业名称", "总词频"];
    headers.extend(TechDimension::ALL.iter().map(|d| d.column().name));
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (i, &(code, year, name, total, dim)) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_number(row, 0, code).unwrap();
        if let Some(year) = year {
            sheet.write_number(row, 1, year).unwrap();
        }
        sheet.write_string(row, 2, name).unwrap();
        sheet.write_number(row, 3, total).unwrap();
        for col in 0..TechDimension::ALL.len() {
            sheet.write_number(row, (4 + col) as u16, dim).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

fn write_industry_xlsx(path: &Path, rows: &[(&str, f64, &str)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in ["股票代码全称", "年度", "行业名称"].iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (i, &(code, year, label)) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, code).unwrap();
        sheet.write_number(row, 1, year).unwrap();
        sheet.write_string(row, 2, label).unwrap();
    }
    workbook.save(path).unwrap();
}

fn write_parquet(path: &Path, fields: Vec<Field>, columns: Vec<ArrayRef>) {
    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
    let file = std::fs::File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

fn loaded_table(config: &DashboardConfig) -> Arc<UnifiedTable> {
    let outcome = load(config, &config.resolver());
    outcome
        .table
        .unwrap_or_else(|| panic!("load failed: {}", outcome.status))
}

#[test]
fn unpadded_code_is_padded_before_the_industry_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DashboardConfig::with_data_dir(dir.path());
    config
        .code_industry
        .insert("000001".to_string(), "Finance".to_string());
    write_primary_xlsx(&config.primary_path(), &[(1.0, Some(2021.0), "X", 10.0, 1.0)]);
    write_industry_xlsx(&config.secondary_path(), &[("000001", 2021.0, "银行业")]);

    let outcome = load(&config, &config.resolver());
    assert!(outcome.warnings.is_empty());
    assert!(outcome.status.contains("Data loaded: 1 records"));
    assert!(outcome.status.contains("industry match rate: 100.00%"));

    let table = outcome.table.unwrap();
    let record = &table.records()[0];
    assert_eq!(record.stock_code, "000001");
    assert_eq!(record.industry_label, "Finance");
    assert_eq!(record.entity_key, "000001 | X");
    assert!((record.transformation_index - 1.0).abs() < 1e-12);
}

#[test]
fn two_years_of_an_unpadded_code_select_in_year_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DashboardConfig::with_data_dir(dir.path());
    config
        .code_industry
        .insert("000001".to_string(), "Finance".to_string());
    // later year first, so ordering comes from select
    write_primary_xlsx(
        &config.primary_path(),
        &[
            (1.0, Some(2021.0), "平安银行", 24.0, 0.2),
            (1.0, Some(2020.0), "平安银行", 12.0, 0.1),
        ],
    );

    let table = loaded_table(&config);
    let rows = select(&table, "000001", 2020, 2021);
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2020, 2021]);
    assert!((rows[0].transformation_index - 0.10).abs() < 1e-9);
    assert!((rows[1].transformation_index - 0.20).abs() < 1e-9);
    assert!(rows.iter().all(|r| r.stock_code == "000001"));
    assert!(rows.iter().all(|r| r.industry_label == "Finance"));
}

#[test]
fn prior_label_applies_when_no_table_matches() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig::with_data_dir(dir.path());
    write_primary_xlsx(
        &config.primary_path(),
        &[
            (300750.0, Some(2021.0), "宁德时代", 30.0, 2.0),
            (600000.0, Some(2021.0), "浦发银行", 12.0, 1.0),
        ],
    );
    write_industry_xlsx(
        &config.secondary_path(),
        &[("300750", 2021.0, "电气机械和器材制造业")],
    );

    let outcome = load(&config, &config.resolver());
    assert!(outcome.status.contains("industry match rate: 50.00%"));
    let table = outcome.table.unwrap();
    let labels: Vec<&str> = table
        .iter()
        .map(|r| r.industry_label.as_str())
        .collect();
    assert_eq!(labels, vec!["电气机械和器材制造业", "其他行业"]);
}

#[test]
fn repeated_company_year_in_industry_file_yields_one_row_each() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig::with_data_dir(dir.path());
    write_primary_xlsx(
        &config.primary_path(),
        &[(300750.0, Some(2021.0), "宁德时代", 30.0, 2.0)],
    );
    write_industry_xlsx(
        &config.secondary_path(),
        &[
            ("300750", 2021.0, "电气机械和器材制造业"),
            ("300750", 2021.0, "电池制造"),
        ],
    );

    let table = loaded_table(&config);
    assert_eq!(table.len(), 2);
}

#[test]
fn missing_industry_file_is_a_warning_not_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig::with_data_dir(dir.path());
    write_primary_xlsx(
        &config.primary_path(),
        &[
            (600519.0, Some(2021.0), "贵州茅台", 8.0, 0.5),
            (300750.0, Some(2021.0), "宁德时代", 30.0, 2.0),
        ],
    );

    let outcome = load(&config, &config.resolver());
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("Industry file not found"));
    assert!(!outcome.status.contains("match rate"));

    let table = outcome.table.unwrap();
    let labels: Vec<&str> = table
        .iter()
        .map(|r| r.industry_label.as_str())
        .collect();
    assert_eq!(labels, vec!["酒类", "其他行业"]);
    assert!(table.iter().all(|r| !r.industry_label.is_empty()));
}

#[test]
fn rows_below_the_cutoff_and_blank_years_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DashboardConfig::with_data_dir(dir.path());
    config.year_cutoff = 2010;
    write_primary_xlsx(
        &config.primary_path(),
        &[
            (1.0, Some(2005.0), "平安银行", 3.0, 0.0),
            (1.0, None, "平安银行", 4.0, 0.0),
            (1.0, Some(2010.0), "平安银行", 5.0, 0.0),
            (1.0, Some(2012.0), "平安银行", 6.0, 0.0),
        ],
    );

    let table = loaded_table(&config);
    let years: Vec<i32> = table.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2010, 2012]);
    assert!(table.iter().all(|r| r.year >= config.year_cutoff));
}

#[test]
fn missing_data_directory_is_created_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let config = DashboardConfig::with_data_dir(&data_dir);

    let outcome = load(&config, &config.resolver());
    assert!(outcome.table.is_none());
    assert_eq!(outcome.error_category, Some("DataDirMissing"));
    assert!(outcome.status.contains("data directory not found"));
    assert!(data_dir.is_dir());

    let outcome = load(&config, &config.resolver());
    assert_eq!(outcome.error_category, Some("PrimaryMissing"));
    assert!(outcome.status.contains("word-frequency file not found"));
}

#[test]
fn malformed_count_fails_with_its_category() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        primary_file: "words.csv".into(),
        ..DashboardConfig::with_data_dir(dir.path())
    };
    let mut header = String::from("stock_code,year,company_name,total_word_freq");
    let mut row = String::from("1,2021,平安银行,many");
    for dim in TechDimension::ALL {
        header.push(',');
        header.push_str(dim.column().name);
        row.push_str(",0");
    }
    std::fs::write(config.primary_path(), format!("{header}\n{row}\n")).unwrap();

    let outcome = load(&config, &config.resolver());
    assert!(outcome.table.is_none());
    assert_eq!(outcome.error_category, Some("InvalidCell"));
    assert!(outcome.status.starts_with("Data load failed:"));
    assert!(outcome.status.ends_with("Error category: InvalidCell"));
    assert!(outcome.status.contains("row 2"));
}

#[test]
fn csv_input_with_chinese_headers_matches_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        primary_file: "words.csv".into(),
        secondary_file: "industry.csv".into(),
        ..DashboardConfig::with_data_dir(dir.path())
    };
    let mut header = String::from("\u{feff}股票代码,年份,企业名称,总词频");
    let mut row = String::from("2594,2021,比亚迪,24");
    for dim in TechDimension::ALL {
        header.push(',');
        header.push_str(dim.column().alias);
        row.push_str(",2");
    }
    std::fs::write(config.primary_path(), format!("{header}\n{row}\n")).unwrap();
    std::fs::write(
        config.secondary_path(),
        "股票代码全称,年度,行业名称\n002594,2021,汽车\n",
    )
    .unwrap();

    let table = loaded_table(&config);
    let record = &table.records()[0];
    assert_eq!(record.stock_code, "002594");
    // code table wins over the classification file
    assert_eq!(record.industry_label, "汽车制造业");
    assert_eq!(record.total_word_freq, 24);
    assert!((record.transformation_index - 2.0).abs() < 1e-12);
}

#[test]
fn cache_serves_the_same_table_until_invalidated() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig::with_data_dir(dir.path());
    write_primary_xlsx(&config.primary_path(), &[(1.0, Some(2021.0), "平安银行", 10.0, 1.0)]);
    let resolver = config.resolver();

    let mut cache = DatasetCache::new(Duration::from_secs(3600));
    let first = cache.get_or_load(&config, &resolver).table.unwrap();
    let second = cache.get_or_load(&config, &resolver).table.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    cache.invalidate();
    let third = cache.get_or_load(&config, &resolver).table.unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.records(), third.records());
}

#[test]
fn parquet_input_with_integer_codes() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        primary_file: "words.parquet".into(),
        ..DashboardConfig::with_data_dir(dir.path())
    };

    let mut fields = vec![
        Field::new("stock_code", DataType::Int64, false),
        Field::new("year", DataType::Int64, false),
        Field::new("company_name", DataType::Utf8, true),
        Field::new("total_word_freq", DataType::Int64, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(vec![858, 858])),
        Arc::new(Int64Array::from(vec![2020, 2021])),
        Arc::new(StringArray::from(vec![Some("五粮液"), None])),
        Arc::new(Int64Array::from(vec![6, 9])),
    ];
    for dim in TechDimension::ALL {
        fields.push(Field::new(dim.column().name, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(vec![Some(0.6), None])));
    }
    write_parquet(&config.primary_path(), fields, columns);

    let table = loaded_table(&config);
    assert_eq!(table.len(), 2);
    let first = &table.records()[0];
    assert_eq!(first.stock_code, "000858");
    assert_eq!(first.industry_label, "酒类");
    assert!((first.transformation_index - 0.6).abs() < 1e-12);

    let second = &table.records()[1];
    assert_eq!(second.company_name, "未知企业");
    assert_eq!(second.transformation_index, 0.0);
}

#[test]
fn parquet_narrow_integers_and_dictionary_codes_are_read_as_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        primary_file: "words.parquet".into(),
        ..DashboardConfig::with_data_dir(dir.path())
    };

    let dictionary = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
    let mut fields = vec![
        Field::new("stock_code", dictionary, false),
        Field::new("year", DataType::Int16, false),
        Field::new("company_name", DataType::Utf8, true),
        Field::new("total_word_freq", DataType::UInt32, false),
    ];
    let codes: DictionaryArray<Int32Type> = vec!["600519"].into_iter().collect();
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(codes),
        Arc::new(Int16Array::from(vec![2021i16])),
        Arc::new(StringArray::from(vec!["贵州茅台"])),
        Arc::new(UInt32Array::from(vec![36u32])),
    ];
    for dim in TechDimension::ALL {
        fields.push(Field::new(dim.column().name, DataType::UInt32, false));
        columns.push(Arc::new(UInt32Array::from(vec![3u32])));
    }
    write_parquet(&config.primary_path(), fields, columns);

    let table = loaded_table(&config);
    let record = &table.records()[0];
    assert_eq!(record.stock_code, "600519");
    assert_eq!(record.year, 2021);
    assert_eq!(record.total_word_freq, 36);
    assert!(record.dimensions.iter().all(|(_, v)| v == 3.0));
    assert!((record.transformation_index - 3.0).abs() < 1e-12);
    assert_eq!(record.industry_label, "酒类");
}

#[test]
fn parquet_nested_column_is_rejected_by_type() {
    let dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        primary_file: "words.parquet".into(),
        ..DashboardConfig::with_data_dir(dir.path())
    };
    let tags = ListArray::from_iter_primitive::<Int32Type, _, _>(vec![Some(vec![Some(1)])]);
    write_parquet(
        &config.primary_path(),
        vec![
            Field::new("stock_code", DataType::Utf8, false),
            Field::new("tags", tags.data_type().clone(), true),
        ],
        vec![Arc::new(StringArray::from(vec!["600519"])), Arc::new(tags)],
    );

    let outcome = load(&config, &config.resolver());
    assert!(outcome.table.is_none());
    assert_eq!(outcome.error_category, Some("UnsupportedColumnType"));
    assert!(outcome.status.contains("tags"));
}
