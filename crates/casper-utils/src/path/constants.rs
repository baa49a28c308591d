/*!
    Constants describing the layout of a casper installation.
*/

pub const MODULES_DIR_NAME: &str = "modules";
pub const MODULE_EXTENSION: &str = "js";

pub const TESTS_DIR_NAME: &str = "tests";
pub const TEST_RUNNER_FILE_NAME: &str = "run.js";
pub const SELFTEST_FILE_NAME: &str = "selftest.js";
pub const SELFTEST_SUITES_DIR_NAME: &str = "suites";

pub const BIN_DIR_NAME: &str = "bin";

pub const STDIN_SCRIPT_PATH: &str = "/dev/stdin";
