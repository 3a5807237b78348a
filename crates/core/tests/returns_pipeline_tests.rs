//! End-to-end tests over the public API: CSV text in, returns table out.

use rust_decimal_macros::dec;

use bhavcopy_core::csv_parser::{parse_csv, ParseConfig};
use bhavcopy_core::identity::MappingColumns;
use bhavcopy_core::returns::{read_wide, write_long, write_wide};
use bhavcopy_core::{
    ChangeMode, Day, Exchange, IdentityMapper, Isin, PipelineConfig, RawBatch, ReturnsPipeline,
};

const MAPPING: &str = "SC_CODE,SC_NAME,ISIN\n\
                       500325,X LTD,INE002A01018\n\
                       532540,Y LTD,INE467B01029\n";

fn day(d: u32) -> Day {
    Day::from_ymd(2025, 9, d).unwrap()
}

fn mapper() -> IdentityMapper {
    let table = parse_csv(MAPPING.as_bytes(), &ParseConfig::default()).unwrap();
    IdentityMapper::from_table(&table, Exchange::Bse, &MappingColumns::default()).unwrap()
}

fn batch(exchange: Exchange, d: u32, content: &str) -> RawBatch {
    let table = parse_csv(content.as_bytes(), &ParseConfig::default()).unwrap();
    RawBatch::new(exchange, day(d), table)
}

fn batches() -> Vec<RawBatch> {
    let nse_header = "SYMBOL,SERIES,OPEN,HIGH,LOW,CLOSE,LAST,PREVCLOSE,TOTTRDQTY,TOTTRDVAL,TIMESTAMP,TOTALTRADES,ISIN";
    let bse_header = "SC_CODE,SC_NAME,SC_GROUP,SC_TYPE,OPEN,HIGH,LOW,CLOSE,LAST,PREVCLOSE,NO_TRADES,NO_OF_SHRS,NET_TURNOV";
    vec![
        batch(
            Exchange::Nse,
            1,
            &format!("{}\nX,EQ,0,0,0,100,0,0,500,0,01-SEP-2025,1,INE002A01018\n", nse_header),
        ),
        batch(
            Exchange::Nse,
            2,
            &format!("{}\nX,EQ,0,0,0,102,0,0,600,0,02-SEP-2025,1,INE002A01018\n", nse_header),
        ),
        batch(
            Exchange::Nse,
            3,
            &format!("{}\nX,EQ,0,0,0,101,0,0,700,0,03-SEP-2025,1,INE002A01018\n", nse_header),
        ),
        batch(
            Exchange::Bse,
            1,
            &format!(
                "{}\n500325,X LTD     ,A ,Q,0,0,0,99,0,0,1,10,0\n\
                 532540,Y LTD     ,A ,Q,0,0,0,50,0,0,1,20,0\n\
                 999901,SMALLCAP LTD,X ,Q,0,0,0,45.10,0,0,1,5,0\n",
                bse_header
            ),
        ),
        batch(
            Exchange::Bse,
            2,
            &format!(
                "{}\n500325,X LTD     ,A ,Q,0,0,0,103,0,0,1,11,0\n\
                 532540,Y LTD     ,A ,Q,0,0,0,55,0,0,1,21,0\n",
                bse_header
            ),
        ),
        batch(
            Exchange::Bse,
            3,
            &format!("{}\n500325,X LTD     ,A ,Q,0,0,0,104,0,0,1,12,0\n", bse_header),
        ),
    ]
}

#[test]
fn test_absolute_returns_table() {
    let mapper = mapper();
    let output = ReturnsPipeline::new(PipelineConfig::default(), &mapper)
        .run(batches())
        .unwrap();

    let mut buf = Vec::new();
    write_wide(&output.rows, &mut buf, b',').unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert_eq!(
        text,
        "isin,name,2025-09-01,2025-09-02,2025-09-03,total_change\n\
         INE002A01018,X,0,2,-1,1\n\
         INE467B01029,Y LTD,0,5,,5\n"
    );
}

#[test]
fn test_percent_returns_table_reads_back() {
    let mapper = mapper();
    let config = PipelineConfig {
        change_mode: ChangeMode::Percent,
        ..Default::default()
    };
    let output = ReturnsPipeline::new(config, &mapper).run(batches()).unwrap();

    let mut buf = Vec::new();
    write_wide(&output.rows, &mut buf, b',').unwrap();
    let read = read_wide(&buf, &ParseConfig::default()).unwrap();

    let x = &read[0];
    assert_eq!(x.canonical_id, Isin::parse("INE002A01018"));
    assert_eq!(x.changes.get(&day(2)), Some(&Some(dec!(2))));
    assert_eq!(x.total_change, Some(dec!(1)));

    let y = &read[1];
    assert_eq!(y.changes.get(&day(2)), Some(&Some(dec!(10))));
    assert_eq!(y.changes.get(&day(3)), None);
    assert_eq!(y.total_change, Some(dec!(10)));
}

#[test]
fn test_unmatched_table_and_long_export() {
    let mapper = mapper();
    let output = ReturnsPipeline::new(PipelineConfig::default(), &mapper)
        .run(batches())
        .unwrap();

    assert_eq!(output.unmatched_rows.len(), 1);
    assert_eq!(output.unmatched_rows[0].display_name, "SMALLCAP LTD");
    assert!(output.unmatched_rows[0].canonical_id.is_none());

    let mut buf = Vec::new();
    write_long(&output.unmatched_rows, &mut buf, b',').unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "isin,name,date,exchange,close,volume,daily_change,total_change\n\
         ,SMALLCAP LTD,2025-09-01,BSE,45.10,5,0,0\n"
    );
}
