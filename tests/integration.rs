use std::fs;
use std::process::{Command, Output};

fn newtonsim(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_newtonsim"))
        .args(args)
        .output()
        .expect("Failed to execute newtonsim")
}

#[test]
fn generates_word_problem_page() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("site");

    let out = newtonsim(&[
        "generate",
        "--problem",
        "sled",
        "--fps",
        "4",
        "--output",
        output_dir.to_str().unwrap(),
        "--format",
        "html,json,csv",
    ]);
    assert!(out.status.success(), "newtonsim exited with error");

    for file in [
        "index.html",
        "velocity.svg",
        "position.svg",
        "animation.gif",
        "summary.json",
        "samples.csv",
    ] {
        assert!(output_dir.join(file).exists(), "{file} was not generated");
    }

    let html = fs::read_to_string(output_dir.join("index.html")).unwrap();
    assert!(html.contains("Sled on ice"), "Missing problem title");
    assert!(html.contains("62.50 m"), "Missing answer");
    assert!(html.contains("5.00 m/s"), "Missing acceleration");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Distance after 5 s: 62.50 m"));
}

#[test]
fn explore_page_has_no_position_chart() {
    let dir = tempfile::tempdir().unwrap();

    let out = newtonsim(&[
        "generate",
        "--mass",
        "2",
        "--force",
        "4",
        "--no-animation",
        "--output",
        dir.path().to_str().unwrap(),
    ]);
    assert!(out.status.success());

    assert!(dir.path().join("velocity.svg").exists());
    assert!(!dir.path().join("position.svg").exists());
    assert!(!dir.path().join("animation.gif").exists());
}

#[test]
fn compute_prints_acceleration() {
    let out = newtonsim(&["compute", "--mass", "10", "--force", "50"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Acceleration: 5.00 m/s²"), "{stdout}");
}

#[test]
fn compute_json_is_parseable() {
    let out = newtonsim(&["compute", "--problem", "car", "--json"]);
    assert!(out.status.success());

    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["problem"], "car");
    assert_eq!(value["acceleration"], 3.0);
}

#[test]
fn problems_lists_catalogue() {
    let out = newtonsim(&["problems"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    for id in ["sled", "cart", "car", "rocket-sled"] {
        assert!(stdout.contains(id), "missing problem {id}");
    }
}

#[test]
fn rejects_invalid_mass() {
    let out = newtonsim(&["compute", "--mass", "0"]);
    assert!(!out.status.success());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("mass must be at least 0.1"), "{stderr}");
}

#[test]
fn rejects_unknown_problem() {
    let out = newtonsim(&["compute", "--problem", "spaceship"]);
    assert!(!out.status.success());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("unknown word problem: spaceship"), "{stderr}");
}

#[test]
fn unavailable_encoder_degrades_to_warning() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.yaml");
    fs::write(&config, "animation:\n  format: apng\n  fps: 4\n").unwrap();
    let output_dir = dir.path().join("site");

    let out = newtonsim(&[
        "generate",
        "--config",
        config.to_str().unwrap(),
        "--output",
        output_dir.to_str().unwrap(),
    ]);
    assert!(out.status.success(), "page still renders without animation");

    let html = fs::read_to_string(output_dir.join("index.html")).unwrap();
    assert!(html.contains("class=\"warning\""));
    assert!(html.contains("Could not generate the animation"));
    assert!(!output_dir.join("animation.gif").exists());
}

#[test]
fn rejects_unbounded_resource_settings() {
    let out = newtonsim(&["compute", "--samples", "10000000000"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("sample_count must be between 2 and 10000"), "{stderr}");

    let out = newtonsim(&["generate", "--fps", "1000000", "--output", "unused"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("animation.fps must be between 1 and 60"), "{stderr}");
}
