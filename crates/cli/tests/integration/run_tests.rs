//! `wright run` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn run_plain_function_task() {
  let env = TestEnv::with_build(
    r#"
      function hello()
        print("hello from lua")
      end
    "#,
  );

  env
    .wright_cmd("run")
    .arg("hello")
    .assert()
    .success()
    .stdout(predicate::str::contains("hello from lua"))
    .stdout(predicate::str::contains("hello finished"));
}

#[test]
fn run_task_receives_context_anchored_at_build_file() {
  let env = TestEnv::with_build(
    r#"
      local wright = require("wright")

      build = wright.task(function(ctx)
        local out = io.open(wright.path.join(ctx.working_dir, "out.txt"), "w")
        out:write("built")
        out:close()
      end)
    "#,
  );

  env.wright_cmd("run").assert().success();
  assert_eq!(env.read_file("out.txt"), "built");
}

#[test]
fn run_executes_dependencies_first() {
  let env = TestEnv::with_build(
    r#"
      local wright = require("wright")

      generate = wright.task(function(ctx) print("step:generate") end)

      build = wright.depends(generate, wright.task(function(ctx)
        print("step:compile")
      end))
    "#,
  );

  env
    .wright_cmd("run")
    .assert()
    .success()
    .stdout(predicate::str::is_match("(?s)step:generate.*step:compile").unwrap());
}

#[test]
fn run_skips_up_to_date_target() {
  let env = TestEnv::with_build(
    r#"
      local wright = require("wright")

      build = wright.sources("src/*.txt", wright.target("out.bin", wright.task(function(ctx)
        if ctx:should_run() then print("compiling") else print("up to date") end
      end)))
    "#,
  );
  env.write_file("src/input.txt", "input");

  env
    .wright_cmd("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("compiling"));

  env.write_file("out.bin", "binary");
  env.make_newest("out.bin");

  env
    .wright_cmd("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("up to date"));
}

#[test]
fn run_includes_sibling_build_file() {
  let env = TestEnv::with_build(
    r#"
      local wright = require("wright")

      build = wright.include("lib", wright.task(function(ctx)
        ctx.lib.greet()
      end))
    "#,
  );
  env.write_file(
    "lib/BUILD.lua",
    r#"
      function greet() print("greetings from lib") end
    "#,
  );

  env
    .wright_cmd("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("greetings from lib"));
}

#[test]
fn run_missing_task_warns_and_succeeds() {
  let env = TestEnv::with_build(
    r#"
      function build() end
      function test() end
    "#,
  );

  env
    .wright_cmd("run")
    .arg("deploy")
    .assert()
    .success()
    .stderr(predicate::str::contains("no task named 'deploy'"))
    .stderr(predicate::str::contains("available: build, test"));
}

#[test]
fn run_failing_task_reports_error() {
  let env = TestEnv::with_build(
    r#"
      function build() error("compiler exploded") end
    "#,
  );

  env
    .wright_cmd("run")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Task 'build' failed"))
    .stderr(predicate::str::contains("compiler exploded"));
}
