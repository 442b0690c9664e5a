//! Tests for the `improb` binary: JSON payloads and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INTERVALS: &str = r#"{
    "space": ["a", "b", "c"],
    "kind": "fraction",
    "assessments": [
        { "event": ["a"], "lower": "1/4", "upper": "1/2" },
        { "event": ["b"], "lower": "1/3" }
    ]
}"#;

const SURE_LOSS: &str = r#"{
    "space": ["a", "b"],
    "kind": "fraction",
    "assessments": [
        { "event": ["a"], "lower": "3/5" },
        { "event": ["b"], "lower": "3/5" }
    ]
}"#;

const WEATHER: &str = r#"{
    "space": ["rain", "shine"],
    "kind": "fraction",
    "assessments": [{ "event": ["rain"], "lower": "7/25", "upper": "7/10" }]
}"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    /// Command isolated from any user configuration.
    fn improb(&self) -> Command {
        let mut cmd = Command::cargo_bin("improb").expect("improb binary should exist");
        cmd.env_remove("IMPROB_CONFIG")
            .env_remove("IMPROB_CONFIG_DIR")
            .env_remove("RUST_LOG")
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("IMPROB_LOG", "off");
        cmd
    }
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should be one JSON document")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

mod help {
    use super::*;

    #[test]
    fn lists_subcommands() {
        Fixture::new()
            .improb()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("lower"))
            .stdout(predicate::str::contains("credal-set"))
            .stdout(predicate::str::contains("maximal"));
    }

    #[test]
    fn unknown_command_fails() {
        Fixture::new()
            .improb()
            .arg("posterior")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}

mod queries {
    use super::*;

    #[test]
    fn lower_and_upper() {
        let fx = Fixture::new();
        let model = fx.write("model.json", INTERVALS);

        let out = fx
            .improb()
            .args(["lower", path_arg(&model), "--gamble", "1,0,0"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = stdout_json(&out);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["result"]["value"], "1/4");

        let out = fx
            .improb()
            .args(["upper", path_arg(&model), "--gamble", "0,0,1"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&out)["result"]["value"], "5/12");
    }

    #[test]
    fn negative_gamble_values() {
        let fx = Fixture::new();
        let model = fx.write("weather.json", WEATHER);
        let out = fx
            .improb()
            .args(["lower", path_arg(&model), "--gamble", "-2,-1"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&out)["result"]["value"], "-17/10");
    }

    #[test]
    fn float_kind_override() {
        let fx = Fixture::new();
        let model = fx.write("model.json", INTERVALS);
        let out = fx
            .improb()
            .args(["lower", path_arg(&model), "--gamble", "1,0,0", "--kind", "float"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let approx = stdout_json(&out)["result"]["approx"].as_f64().unwrap();
        assert!((approx - 0.25).abs() < 1e-9);
    }

    #[test]
    fn zero_probability_conditioning_exit_code() {
        let fx = Fixture::new();
        let model = fx.write("model.json", INTERVALS);
        fx.improb()
            .args(["lower", path_arg(&model), "--gamble", "1,2,3", "--event", "c"])
            .assert()
            .code(21)
            .stderr(predicate::str::contains("ERR_ZERO_PROBABILITY"));
    }

    #[test]
    fn sure_loss_exit_code() {
        let fx = Fixture::new();
        let model = fx.write("loss.json", SURE_LOSS);
        fx.improb()
            .args(["lower", path_arg(&model), "--gamble", "1,0"])
            .assert()
            .code(20)
            .stderr(predicate::str::contains("ERR_SURE_LOSS"));
    }

    #[test]
    fn unknown_outcome_is_input_error() {
        let fx = Fixture::new();
        let model = fx.write("model.json", INTERVALS);
        fx.improb()
            .args(["lower", path_arg(&model), "--gamble", "1,0,0", "--event", "z"])
            .assert()
            .code(11);
    }
}

mod reports {
    use super::*;

    #[test]
    fn check_coherent_model() {
        let fx = Fixture::new();
        let model = fx.write("model.json", INTERVALS);
        let out = fx
            .improb()
            .args(["check", path_arg(&model)])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = stdout_json(&out);
        assert_eq!(json["avoids_sure_loss"], true);
        assert_eq!(json["coherent"], true);
        assert_eq!(json["linear"], false);
        assert_eq!(json["assessments"], 2);
    }

    #[test]
    fn check_reports_sure_loss_without_failing() {
        let fx = Fixture::new();
        let model = fx.write("loss.json", SURE_LOSS);
        let out = fx
            .improb()
            .args(["check", path_arg(&model)])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = stdout_json(&out);
        assert_eq!(json["avoids_sure_loss"], false);
        assert!(json["coherent"].is_null());
    }

    #[test]
    fn credal_set_of_interval() {
        let fx = Fixture::new();
        let model = fx.write("weather.json", WEATHER);
        let out = fx
            .improb()
            .args(["credal-set", path_arg(&model)])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = stdout_json(&out);
        assert_eq!(json["count"], 2);
        let vertices = json["vertices"].as_array().unwrap();
        assert!(vertices.contains(&serde_json::json!(["7/25", "18/25"])));
        assert!(vertices.contains(&serde_json::json!(["7/10", "3/10"])));
    }

    #[test]
    fn extreme_completely_monotone() {
        let fx = Fixture::new();
        let out = fx
            .improb()
            .args(["extreme", "--size", "3", "--monotonicity", "3"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&out)["count"], 7);
    }

    #[test]
    fn extreme_rejects_level_zero() {
        Fixture::new()
            .improb()
            .args(["extreme", "--size", "3", "--monotonicity", "0"])
            .assert()
            .code(11);
    }
}

mod decisions {
    use super::*;

    #[test]
    fn maximality_and_maximin() {
        let fx = Fixture::new();
        let model = fx.write("weather.json", WEATHER);
        let acts = ["-2,-1", "-10,5", "-4,-4"];
        let run = |criterion: &str| {
            let mut cmd = fx.improb();
            cmd.args(["maximal", path_arg(&model), "--criterion", criterion]);
            for act in acts {
                cmd.args(["--gamble", act]);
            }
            let out = cmd.assert().success().get_output().stdout.clone();
            stdout_json(&out)["indices"].clone()
        };
        assert_eq!(run("maximality"), serde_json::json!([0, 1]));
        assert_eq!(run("gamma-maximin"), serde_json::json!([0]));
        assert_eq!(run("maximax"), serde_json::json!([1]));
    }

    #[test]
    fn hurwicz_needs_alpha() {
        let fx = Fixture::new();
        let model = fx.write("weather.json", WEATHER);
        fx.improb()
            .args(["maximal", path_arg(&model), "--criterion", "hurwicz", "--gamble", "1,0"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("--alpha"));

        let out = fx
            .improb()
            .args(["maximal", path_arg(&model), "--criterion", "hurwicz", "--alpha", "1/2"])
            .args(["--gamble", "-2,-1", "--gamble", "-10,5"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&out)["indices"], serde_json::json!([0]));
    }
}

mod configuration {
    use super::*;

    #[test]
    fn missing_model_is_input_error() {
        let fx = Fixture::new();
        let missing = fx.dir.path().join("absent.json");
        fx.improb()
            .args(["check", path_arg(&missing)])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("ERR_INPUT"));
    }

    #[test]
    fn malformed_model_is_input_error() {
        let fx = Fixture::new();
        let model = fx.write("broken.json", "{ \"space\": [\"a\"], ");
        fx.improb().args(["check", path_arg(&model)]).assert().code(11);
    }

    #[test]
    fn missing_config_is_config_error() {
        let fx = Fixture::new();
        let model = fx.write("model.json", INTERVALS);
        let missing = fx.dir.path().join("nope.json");
        fx.improb()
            .args(["check", path_arg(&model), "--config", path_arg(&missing)])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("ERR_CONFIG"));
    }

    #[test]
    fn invalid_config_is_config_error() {
        let fx = Fixture::new();
        let model = fx.write("model.json", INTERVALS);
        let config = fx.write("engine.json", r#"{ "float_tolerance": -1.0 }"#);
        fx.improb()
            .args(["check", path_arg(&model), "--config", path_arg(&config)])
            .assert()
            .code(10);
    }

    #[test]
    fn config_from_environment() {
        let fx = Fixture::new();
        let model = fx.write(
            "model.json",
            r#"{ "space": ["a", "b"], "assessments": [{ "event": ["a"], "lower": "1/3" }] }"#,
        );
        let config = fx.write("engine.json", r#"{ "number_kind": "fraction" }"#);
        let out = fx
            .improb()
            .env("IMPROB_CONFIG", &config)
            .args(["lower", path_arg(&model), "--gamble", "1,0"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&out)["result"]["value"], "1/3");
    }

    #[test]
    fn preset_selects_number_kind() {
        let fx = Fixture::new();
        let model = fx.write(
            "model.json",
            r#"{ "space": ["a", "b"], "assessments": [{ "event": ["a"], "lower": "1/3" }] }"#,
        );
        let out = fx
            .improb()
            .args(["lower", path_arg(&model), "--gamble", "1,0", "--preset", "exact"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&out)["result"]["value"], "1/3");
    }
}
