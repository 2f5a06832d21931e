use assert_cmd::Command;
use predicates::str::contains;
use std::fs::{self, File};
use std::io::Write;
use transfer_window_planner::export::porkchop::HEADER;

const DAY: f64 = 21_600.0;

fn write_csv(path: &std::path::Path, all_invalid: bool) {
    let mut file = File::create(path).expect("csv create");
    writeln!(file, "{HEADER}").unwrap();
    for y in 0..2 {
        for x in 0..3 {
            let departure = x as f64 * 10.0 * DAY;
            let travel = (80.0 - y as f64 * 20.0) * DAY;
            let valid = !all_invalid && (x, y) != (2, 1);
            let (dv, color) = if valid {
                let dv = 1500.0 + 100.0 * (x + y) as f64;
                (format!("{dv:.6}"), ((x + y) * 60).to_string())
            } else {
                (String::new(), String::new())
            };
            writeln!(
                file,
                "{x},{y},{departure:.3},{travel:.3},{:.3},{dv},{color},{valid},Kerbin,Duna",
                departure + travel
            )
            .unwrap();
        }
    }
}

#[test]
fn porkchop_plot_renders_png() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("pork.csv");
    let png_path = dir.path().join("plots").join("pork.png");
    write_csv(&csv_path, false);

    Command::cargo_bin("porkchop_plot")
        .expect("porkchop_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            png_path.to_str().unwrap(),
            "--width",
            "400",
            "--height",
            "300",
        ])
        .assert()
        .success();

    let metadata = fs::metadata(png_path).expect("png metadata");
    assert!(metadata.len() > 0, "PNG output should not be empty");
}

#[test]
fn porkchop_plot_rejects_grids_without_transfers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("empty.csv");
    write_csv(&csv_path, true);

    Command::cargo_bin("porkchop_plot")
        .expect("porkchop_plot bin")
        .args([
            "--input",
            csv_path.to_str().unwrap(),
            "--output",
            dir.path().join("never.png").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("no transfer found in the selected window"));
}
