use clap::Parser;
use rust_decimal_macros::dec;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use bhavcopy_cli::cli::Cli;
use bhavcopy_cli::config::Config;
use bhavcopy_cli::run;

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn seed(dir: &Path) -> Vec<String> {
    write(
        dir,
        "EQ_MAP_CC_20250901.csv",
        "SC_CODE,SC_NAME,ISIN\n500325,RELIANCE,INE002A01018\n532540,TCS,INE467B01029\n",
    );
    vec![
        write(
            dir,
            "20250901_NSE.csv",
            "SYMBOL,SERIES,CLOSE,TOTTRDQTY,ISIN\nRELIANCE,EQ,100,10,INE002A01018\n",
        ),
        write(
            dir,
            "20250902_NSE.csv",
            "SYMBOL,SERIES,CLOSE,TOTTRDQTY,ISIN\nRELIANCE,EQ,102,10,INE002A01018\n",
        ),
        write(
            dir,
            "20250901_BSE.csv",
            "SC_CODE,SC_NAME,CLOSE,NO_OF_SHRS\n500325,RELIANCE,99,5\n532540,TCS,50,5\n999901,SMALLCAP LTD,45.10,5\n",
        ),
        write(
            dir,
            "20250902_BSE.csv",
            "SC_CODE,SC_NAME,CLOSE,NO_OF_SHRS\n500325,RELIANCE,103,5\n532540,TCS,55,5\n",
        ),
    ]
}

fn config(args: Vec<String>) -> Config {
    let mut argv = vec!["bhavcopy".to_string(), "--no-table".to_string()];
    argv.extend(args);
    Config::from_cli(Cli::parse_from(argv)).unwrap()
}

#[test]
fn test_run_discovers_mapping_and_writes_csv() {
    let dir = tempdir().unwrap();
    let mut args = seed(dir.path());
    let out = dir.path().join("returns.csv");
    args.extend([
        "--mapping-dir".to_string(),
        dir.path().to_str().unwrap().to_string(),
        "--output".to_string(),
        out.to_str().unwrap().to_string(),
    ]);

    let output = run(&config(args)).unwrap();

    assert_eq!(output.rows.len(), 2);
    assert_eq!(output.unmatched_rows.len(), 1);
    assert_eq!(output.rows[0].total_change, Some(dec!(2)));
    assert_eq!(output.diagnostics.superseded, 2);

    let text = fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "isin,name,2025-09-01,2025-09-02,total_change\n\
         INE002A01018,RELIANCE,0,2,2\n\
         INE467B01029,TCS,0,5,5\n\
         ,SMALLCAP LTD,0,,0\n"
    );
}

#[test]
fn test_run_percent_long_layout_drop_unmatched() {
    let dir = tempdir().unwrap();
    let mut args = seed(dir.path());
    let out = dir.path().join("returns_long.csv");
    args.extend(
        [
            "--mapping-dir",
            dir.path().to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--layout",
            "long",
            "--mode",
            "percent",
            "--unmatched",
            "drop",
        ]
        .map(str::to_string),
    );

    let output = run(&config(args)).unwrap();

    assert!(output.unmatched_rows.is_empty());
    assert_eq!(output.diagnostics.unmatched_dropped, 1);

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[2], "INE002A01018,RELIANCE,2025-09-02,NSE,102,10,2,2");
    assert_eq!(lines[4], "INE467B01029,TCS,2025-09-02,BSE,55,5,10,10");
}

#[test]
fn test_run_without_mapping_fails() {
    let dir = tempdir().unwrap();
    let nse = write(
        dir.path(),
        "20250901_NSE.csv",
        "SYMBOL,SERIES,CLOSE,TOTTRDQTY,ISIN\nRELIANCE,EQ,100,10,INE002A01018\n",
    );

    let args = vec![nse, "--mapping-dir".to_string(), dir.path().to_str().unwrap().to_string()];
    let err = run(&config(args)).unwrap_err();

    assert!(err.to_string().contains("Mapping table not found"));
}
