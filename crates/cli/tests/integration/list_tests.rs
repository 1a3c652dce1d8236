//! `wright list` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

const BUILD: &str = r#"
  local wright = require("wright")

  VERSION = "0.1.0"

  function test() end

  build = wright.task(function(ctx) end)
"#;

#[test]
fn list_prints_sorted_task_names() {
  let env = TestEnv::with_build(BUILD);

  env
    .wright_cmd("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("Tasks in"))
    .stdout(predicate::str::is_match("(?s)build.*test").unwrap())
    .stdout(predicate::str::contains("VERSION").not());
}

#[test]
fn list_json_output() {
  let env = TestEnv::with_build(BUILD);

  let output = env.wright_cmd("list").arg("--json").output().unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["tasks"], serde_json::json!(["build", "test"]));
  assert!(json["path"].as_str().unwrap().ends_with("BUILD.lua"));
}

#[test]
fn list_uses_returned_table_as_exports() {
  let env = TestEnv::with_build(
    r#"
      function hidden() end
      return { release = function() end }
    "#,
  );

  env
    .wright_cmd("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("release"))
    .stdout(predicate::str::contains("hidden").not());
}

#[test]
fn list_empty_build_file() {
  let env = TestEnv::with_build("-- nothing here\n");

  env
    .wright_cmd("list")
    .assert()
    .success()
    .stdout(predicate::str::contains("No tasks"));
}
