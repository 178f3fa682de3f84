use std::{collections::HashMap, fs};

use chrono::NaiveDate;

use engine::{Engine, EngineError, JOURNAL_FILE, PriceSeries, Profile, include_path};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine_with_seed(seed: u64) -> Engine {
    Engine::builder()
        .profile(Profile {
            start_date: date(2022, 1, 1),
            end_date: date(2022, 3, 31),
            seed,
            ..Profile::default()
        })
        .build()
        .unwrap()
}

#[test]
fn writes_journal_creating_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("demo");

    let ledger = engine_with_seed(42).ledger("prices.beancount").unwrap();
    let path = ledger.write(&out).unwrap();

    assert_eq!(path, out.join(JOURNAL_FILE));
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, ledger.to_string());
    assert!(text.starts_with("option \"title\" \"Demo Financials\"\n"));
    assert!(text.ends_with("\n\ninclude \"prices.beancount\"\n"));

    let leftovers: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from(JOURNAL_FILE)]);
}

#[test]
fn overwrites_existing_journal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(JOURNAL_FILE), "stale content that is longer than nothing").unwrap();

    let ledger = engine_with_seed(3).ledger("prices.beancount").unwrap();
    ledger.write(dir.path()).unwrap();

    let text = fs::read_to_string(dir.path().join(JOURNAL_FILE)).unwrap();
    assert!(!text.contains("stale content"));
    assert_eq!(text, ledger.to_string());
}

#[test]
fn identical_runs_write_identical_bytes() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    engine_with_seed(42).ledger("prices.beancount").unwrap().write(first.path()).unwrap();
    engine_with_seed(42).ledger("prices.beancount").unwrap().write(second.path()).unwrap();

    assert_eq!(
        fs::read(first.path().join(JOURNAL_FILE)).unwrap(),
        fs::read(second.path().join(JOURNAL_FILE)).unwrap()
    );
}

#[test]
fn every_posted_account_is_opened_first() {
    let text = engine_with_seed(42).ledger("prices.beancount").unwrap().to_string();

    let mut opened: HashMap<String, NaiveDate> = HashMap::new();
    let mut current_date: Option<NaiveDate> = None;
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        let first = tokens.next().unwrap_or_default();
        if let Ok(day) = NaiveDate::parse_from_str(first, "%Y-%m-%d") {
            current_date = None;
            match tokens.next() {
                Some("open") => {
                    opened.insert(tokens.next().unwrap().to_string(), day);
                }
                Some("*") | Some("!") => current_date = Some(day),
                _ => {}
            }
        } else if line.trim().is_empty() {
            current_date = None;
        } else if let Some(posted_on) = current_date {
            let open_date = opened
                .get(first)
                .unwrap_or_else(|| panic!("{first} posted without open directive"));
            assert!(*open_date <= posted_on, "{first} used before it opens");
        }
    }
}

#[test]
fn body_blocks_are_separated_by_blank_lines() {
    let ledger = engine_with_seed(42).ledger("prices.beancount").unwrap();
    let text = ledger.to_string();
    let blocks: Vec<&str> = text.split("\n\n").collect();
    let body: Vec<&&str> = blocks
        .iter()
        .filter(|block| block.starts_with("2022-"))
        .collect();
    assert_eq!(body.len(), ledger.transactions.len());
    assert!(body.iter().all(|block| block.lines().count() == 3));
}

#[test]
fn loads_price_file_and_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.beancount");
    fs::write(
        &path,
        "; header\n2022-01-03 price VWRL 84.12 GBP\nnot a price\n2022-01-04 price VWRL 84.60 GBP\n",
    )
    .unwrap();

    let series = PriceSeries::load(&path).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(include_path(&path, dir.path()), "prices.beancount");

    let missing = PriceSeries::load(&dir.path().join("missing.beancount")).unwrap_err();
    assert!(matches!(missing, EngineError::Io { .. }));
}

#[test]
fn unwritable_output_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "").unwrap();

    let err = engine_with_seed(42)
        .ledger("prices.beancount")
        .unwrap()
        .write(&blocker.join("demo"))
        .unwrap_err();
    assert!(matches!(err, EngineError::Io { .. }));
}

#[test]
fn failed_rename_leaves_no_temporary_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(JOURNAL_FILE)).unwrap();

    let err = engine_with_seed(42)
        .ledger("prices.beancount")
        .unwrap()
        .write(dir.path())
        .unwrap_err();
    assert!(matches!(err, EngineError::Io { .. }));

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    names.sort();
    assert_eq!(names, vec![std::ffi::OsString::from(JOURNAL_FILE)]);
}
