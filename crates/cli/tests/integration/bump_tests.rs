//! `wright bump` integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn bump_defaults_to_patch() {
  let env = TestEnv::with_build("VERSION = \"1.2.3\"\n\nfunction build() end\n");

  env
    .wright_cmd("bump")
    .assert()
    .success()
    .stdout(predicate::str::contains("Bumped patch version to 1.2.4"));

  assert_eq!(env.read_file("BUILD.lua"), "VERSION = \"1.2.4\"\n\nfunction build() end\n");
}

#[test]
fn bump_minor_keeps_patch() {
  let env = TestEnv::with_build("local VERSION = '0.9.7'\n");

  env.wright_cmd("bump").arg("minor").assert().success();

  assert_eq!(env.read_file("BUILD.lua"), "local VERSION = '0.10.7'\n");
}

#[test]
fn bump_without_version_fails() {
  let env = TestEnv::with_build("function build() end\n");

  env
    .wright_cmd("bump")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no VERSION declared"));
}

#[test]
fn bump_rejects_unknown_part() {
  let env = TestEnv::with_build("VERSION = \"1.0.0\"\n");

  env
    .wright_cmd("bump")
    .arg("huge")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unknown version part"));

  assert_eq!(env.read_file("BUILD.lua"), "VERSION = \"1.0.0\"\n");
}
