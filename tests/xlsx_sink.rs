use hitter_proj::sink::{Cell, Sink, XlsxSink};

#[test]
fn workbook_is_written_on_finish() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("hitters_S21.xlsx");

    let mut sink = XlsxSink::new(&path, "All Hitters").expect("sink");
    sink.write_block(
        "A4",
        &[
            vec![
                Cell::Text("p1".to_string()),
                Cell::Integer(40),
                Cell::Number(0.2),
            ],
            vec![Cell::Blank, Cell::Blank, Cell::Blank],
        ],
    )
    .expect("block");
    sink.write_cell("B1", &Cell::Integer(42)).expect("day");

    let saved = sink.finish().expect("save");
    assert_eq!(saved, path);
    let meta = std::fs::metadata(&path).expect("workbook exists");
    assert!(meta.len() > 0);
}

#[test]
fn bad_anchor_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut sink = XlsxSink::new(&dir.path().join("x.xlsx"), "All Hitters").expect("sink");
    assert!(sink.write_cell("11", &Cell::Integer(1)).is_err());
}
