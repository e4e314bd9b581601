use std::path::PathBuf;
use std::process::Command;

use tess_monitor::{GeoPoint, Monitor, Polygon, Trace, TraceRecorder};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_tess-monitor")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "tess-monitor.exe"
            } else {
                "tess-monitor"
            });
            p
        })
}

#[test]
fn cli_renders_trace_runs() {
    let dir = PathBuf::from("target").join("cli_smoke");
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let poly =
        Polygon::from_lon_lat(&[(0.0, 0.0), (6.0, 0.0), (6.0, 4.0), (0.0, 4.0)]).unwrap();
    let mut rec = TraceRecorder::new();
    rec.current_state(Some("EARCUT"), Some(&[GeoPoint::new(1.0, 1.0)]), None)
        .unwrap();
    let trace = Trace {
        runs: vec![rec.into_run("cli-run", poly)],
    };
    let trace_path = dir.join("trace.json");
    std::fs::write(&trace_path, trace.to_json_string().unwrap()).unwrap();

    let out_dir = dir.join("frames");
    let status = Command::new(exe())
        .arg("--dir")
        .arg(&out_dir)
        .args(["-W", "96", "-H", "64", "-M", "8", "--labels"])
        .arg(&trace_path)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out_dir.join("cli-run").join("cli-run-00000.png").exists());
    assert!(out_dir.join("cli-run").join("cli-run-00001.png").exists());
}

#[test]
fn cli_fails_on_missing_trace() {
    let dir = PathBuf::from("target").join("cli_smoke_missing");
    let status = Command::new(exe())
        .arg("--dir")
        .arg(&dir)
        .arg(dir.join("nope.json"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_rejects_margin_without_drawing_area() {
    let dir = PathBuf::from("target").join("cli_smoke_margin");
    let status = Command::new(exe())
        .arg("--dir")
        .arg(&dir)
        .args(["-W", "100", "-H", "100", "-M", "50"])
        .arg(dir.join("unused.json"))
        .status()
        .unwrap();
    assert!(!status.success());
}
