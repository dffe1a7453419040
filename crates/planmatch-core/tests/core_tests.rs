use figment::Jail;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use planmatch_core::config::{Config, EmbeddingBackend};
use planmatch_core::ingest::{ingest_batch, FileStatus, UploadedFile};
use planmatch_core::loader::load_table;
use planmatch_core::types::{Cell, NOT_AVAILABLE};
use planmatch_core::validator::ExpectedFileSet;

const NAME_2020: &str = "Consultation du planning des af 2020.xlsx";
const NAME_2021: &str = "Consultation du planning des af 2021.xlsx";

fn workbook(header: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (c, h) in header.iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            if !v.is_empty() {
                ws.write_string(r as u32 + 1, c as u16, *v).unwrap();
            }
        }
    }
    wb.save_to_buffer().unwrap()
}

#[test]
fn load_table_drops_header_and_keeps_positions() {
    let bytes = workbook(
        &["N°", "Intitulé affaire", "Client", "Site"],
        &[&["1", "Build server", "ACME", "Lyon"], &["2", "Paint wall", "Foo", "Paris"]],
    );
    let table = load_table(NAME_2020, &bytes).expect("parse");
    assert_eq!(table.len(), 2, "header row is not data");
    assert_eq!(table.headers()[1], "Intitulé affaire");
    assert_eq!(table.cell(0, 1), Some(&Cell::Text("Build server".into())));
    assert_eq!(table.site(1), "Paris");
}

#[test]
fn numeric_cells_are_read_as_numbers() {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "id").unwrap();
    ws.write_string(0, 1, "title").unwrap();
    ws.write_number(1, 0, 42.0).unwrap();
    ws.write_string(1, 1, "Audit").unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let table = load_table(NAME_2020, &bytes).expect("parse");
    assert_eq!(table.cell(0, 0), Some(&Cell::Number(42.0)));
}

#[test]
fn empty_leading_column_keeps_absolute_positions() {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 1, "title").unwrap();
    ws.write_string(1, 1, "Réfection toiture").unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let table = load_table(NAME_2020, &bytes).expect("parse");
    assert_eq!(table.width(), 2);
    assert_eq!(table.titles(), vec![(0, "Réfection toiture".to_string())]);
}

#[test]
fn empty_worksheet_is_an_empty_table() {
    let mut wb = Workbook::new();
    wb.add_worksheet();
    let bytes = wb.save_to_buffer().unwrap();

    let table = load_table(NAME_2020, &bytes).expect("empty sheet is not an error");
    assert_eq!((table.len(), table.width()), (0, 0));
    assert!(table.is_empty());
    assert!(table.titles().is_empty());
}

#[test]
fn date_cells_are_rendered_as_timestamps() {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (c, h) in ["id", "title", "client", "start"].iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    ws.write_string(1, 1, "Build server").unwrap();
    let date = ExcelDateTime::from_ymd(2021, 3, 15).unwrap();
    ws.write_datetime_with_format(1, 3, &date, &Format::new().set_num_format("yyyy-mm-dd")).unwrap();
    let bytes = wb.save_to_buffer().unwrap();

    let table = load_table(NAME_2020, &bytes).expect("parse");
    assert_eq!(table.cell(0, 3), Some(&Cell::Text("2021-03-15 00:00:00".into())));
    assert_eq!(table.site(0), "2021-03-15 00:00:00");
}

#[test]
fn two_column_table_has_no_site() {
    let bytes = workbook(&["id", "title"], &[&["1", "Build server"]]);
    let table = load_table(NAME_2020, &bytes).expect("parse");
    assert_eq!(table.layout().site, None);
    assert_eq!(table.site(0), NOT_AVAILABLE);
}

#[test]
fn single_column_table_loads_without_title() {
    let bytes = workbook(&["id"], &[&["1"], &["2"]]);
    let table = load_table(NAME_2020, &bytes).expect("parse");
    assert_eq!(table.layout().title, None);
    assert!(table.titles().is_empty());
}

#[test]
fn rejected_name_leaves_collection_empty() {
    let expected = ExpectedFileSet::default();
    let bytes = workbook(&["id", "title"], &[&["1", "Build server"]]);
    let report = ingest_batch([UploadedFile::new("foo.xlsx", bytes)], &expected);
    assert!(report.tables.is_empty());
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].status, FileStatus::Rejected);
}

#[test]
fn bad_file_does_not_block_the_batch() {
    let expected = ExpectedFileSet::default();
    let good = workbook(&["id", "title"], &[&["1", "Build server"], &["2", "Paint wall"]]);
    let report = ingest_batch(
        [
            UploadedFile::new(NAME_2020, b"definitely not xlsx".to_vec()),
            UploadedFile::new("notes.txt", b"hello".to_vec()),
            UploadedFile::new(NAME_2021, good),
        ],
        &expected,
    );

    assert_eq!((report.accepted(), report.rejected(), report.failed()), (1, 1, 1));
    assert_eq!(report.tables.names().collect::<Vec<_>>(), vec![NAME_2021]);
    match &report.outcomes[0].status {
        FileStatus::ParseFailed(err) => assert_eq!(err.filename, NAME_2020),
        other => panic!("expected parse failure, got {other:?}"),
    }
    assert_eq!(report.outcomes[2].status, FileStatus::Accepted { rows: 2 });
}

#[test]
fn config_defaults_without_files() {
    Jail::expect_with(|_jail| {
        let config = Config::load_for_env("test").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.files.first_year, 2015);
        assert_eq!(settings.files.end_year, 2025);
        assert_eq!(settings.schema.title_column, 1);
        assert_eq!(settings.schema.site_column, Some(3));
        assert_eq!(settings.embedding.backend, EmbeddingBackend::MiniLm);
        Ok(())
    });
}

#[test]
fn config_files_and_env_are_layered() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [files]
            first_year = 2018

            [embedding]
            batch_size = 8
            "#,
        )?;
        jail.create_file("config.test.toml", "[embedding]\nbatch_size = 4\n")?;
        jail.set_env("APP_EMBEDDING__BACKEND", "fake");

        let config = Config::load_for_env("test").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.files.first_year, 2018);
        assert_eq!(settings.embedding.batch_size, 4);
        assert_eq!(settings.embedding.backend, EmbeddingBackend::Fake);
        assert_eq!(config.get::<usize>("embedding.max_len").map_err(|e| e.to_string())?, 256);
        Ok(())
    });
}

#[test]
fn inverted_year_range_is_invalid() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[files]\nfirst_year = 2030\n")?;
        assert!(Config::load_for_env("test").is_err());
        Ok(())
    });
}
