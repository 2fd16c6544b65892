use std::fs::File;
use std::io::Write;

use gaze_config::{load_layout_csv, load_trace_csv, load_validation_csv};
use rstest::rstest;
use tempfile::tempdir;

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

#[rstest]
fn trace_loads_rows_in_order() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "trace.csv",
        "timestamp_ms,x,y\n0,100,100\n50,102,101\n100,NaN,99\n",
    );
    let rows = load_trace_csv(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].x, 102.0);
    assert!(rows[2].x.is_nan());
}

#[rstest]
fn trace_rejects_time_going_backwards() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "trace.csv", "timestamp_ms,x,y\n100,1,1\n50,1,1\n");
    let err = load_trace_csv(&path).expect_err("non-monotonic");
    assert!(format!("{err}").contains("non-decreasing"));
}

#[rstest]
fn trace_rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "trace.csv", "t,x,y\n0,1,1\n");
    let err = load_trace_csv(&path).expect_err("bad headers");
    assert!(format!("{err}").contains("must have headers 'timestamp_ms,x,y'"));
}

#[rstest]
fn layout_loads_rectangles() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "layout.csv",
        "id,page,x,y,width,height\npage-0-span-0,0,10,10,200,20\npage-0-span-1,0,10,40,200,20\n",
    );
    let rows = load_layout_csv(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].id, "page-0-span-1");
    assert_eq!(rows[1].y, 40.0);
}

#[rstest]
fn layout_rejects_duplicate_ids() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "layout.csv",
        "id,page,x,y,width,height\na,0,0,0,10,10\na,0,20,0,10,10\n",
    );
    let err = load_layout_csv(&path).expect_err("duplicate id");
    assert!(format!("{err}").contains("duplicated"));
}

#[rstest]
fn layout_rejects_negative_size() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "layout.csv", "id,page,x,y,width,height\na,0,0,0,-1,10\n");
    let err = load_layout_csv(&path).expect_err("negative width");
    assert!(format!("{err}").contains("negative size"));
}

#[rstest]
fn validation_requires_rows() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "val.csv", "target_x,target_y,gaze_x,gaze_y\n");
    let err = load_validation_csv(&path).expect_err("empty");
    assert!(format!("{err}").contains("no samples"));
}

#[rstest]
fn validation_reports_bad_row_number() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "val.csv",
        "target_x,target_y,gaze_x,gaze_y\n10,10,12,12\n10,10,oops,12\n",
    );
    let err = load_validation_csv(&path).expect_err("bad float");
    assert!(format!("{err}").contains("row 3"));
}
