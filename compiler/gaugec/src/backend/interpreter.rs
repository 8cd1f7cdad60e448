//! Directive-level test interpreter.
//!
//! A test body is evaluated as the sequence of calls it makes on its
//! `*testing.T` parameter at the top level of the body. Calls nested in a
//! block (`if`, `for`, `switch`, a func literal) are never reached, so a
//! guarded assertion passes:
//!
//! | call                       | effect                          |
//! |----------------------------|---------------------------------|
//! | `Error`, `Errorf`, `Fail`  | mark failed, continue           |
//! | `Fatal`, `Fatalf`, `FailNow` | mark failed, stop             |
//! | `Skip`, `Skipf`, `SkipNow` | mark skipped, stop              |
//! | `Log`, `Logf`              | record output                   |
//!
//! Other methods (`Helper`, `Parallel`, ...) have no effect.

use std::time::Instant;

use gauge_syntax::TestCall;

use super::{find_test, CompileError, CompiledTest, LinkSet, TestBinary, Toolchain};
use crate::harness::{Driver, DRIVER_FILE_NAME};
use crate::identity::is_reserved;
use crate::load::{SourceFile, SourceUnit};
use crate::test::TestResult;

/// The bundled toolchain.
#[derive(Clone, Copy, Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Interpreter
    }
}

/// Effect of one testing call.
enum Effect<'a> {
    Fail(Option<&'a str>),
    FailNow(Option<&'a str>),
    SkipNow(Option<&'a str>),
    Log(Option<&'a str>),
    None,
}

fn classify(call: &TestCall) -> Effect<'_> {
    let message = call.message.as_deref();
    match call.method.as_str() {
        "Error" | "Errorf" | "Fail" => Effect::Fail(message),
        "Fatal" | "Fatalf" | "FailNow" => Effect::FailNow(message),
        "Skip" | "Skipf" | "SkipNow" => Effect::SkipNow(message),
        "Log" | "Logf" => Effect::Log(message),
        _ => Effect::None,
    }
}

/// Reject any file importing the reserved path.
fn check_imports<'a>(files: impl IntoIterator<Item = &'a SourceFile>) -> Result<(), CompileError> {
    for file in files {
        if let Some(import) = file.summary.imports.iter().find(|i| is_reserved(&i.path)) {
            return Err(CompileError::CannotImportMain {
                importer: file.path.display().to_string(),
                import_path: import.path.clone(),
            });
        }
    }
    Ok(())
}

impl Toolchain for Interpreter {
    #[tracing::instrument(level = "debug", skip(self, driver, link))]
    fn compile_driver(
        &self,
        name: &str,
        driver: &Driver,
        link: &LinkSet<'_>,
    ) -> Result<TestBinary, CompileError> {
        for import in &driver.imports {
            if is_reserved(&import.import_path) {
                return Err(CompileError::CannotImportMain {
                    importer: DRIVER_FILE_NAME.to_string(),
                    import_path: import.import_path.clone(),
                });
            }
            if link.get(&import.import_path).is_none() {
                return Err(CompileError::UnresolvedImport {
                    importer: DRIVER_FILE_NAME.to_string(),
                    import_path: import.import_path.clone(),
                });
            }
        }
        check_imports(link.files())?;

        let mut tests = Vec::with_capacity(driver.tests.len());
        for registered in &driver.tests {
            let files = link.get(&registered.import_path).ok_or_else(|| {
                CompileError::UnresolvedImport {
                    importer: DRIVER_FILE_NAME.to_string(),
                    import_path: registered.import_path.clone(),
                }
            })?;
            let func = find_test(files, &registered.name).ok_or_else(|| {
                CompileError::UndefinedTest {
                    import_path: registered.import_path.clone(),
                    name: registered.name.clone(),
                }
            })?;
            tests.push(CompiledTest::from_func(func));
        }

        Ok(TestBinary {
            name: name.to_string(),
            tests,
        })
    }

    #[tracing::instrument(level = "debug", skip(self, unit))]
    fn compile_files(&self, name: &str, unit: &SourceUnit) -> Result<TestBinary, CompileError> {
        check_imports(unit.all_files())?;
        let tests = unit
            .all_files()
            .filter(|f| f.is_test)
            .flat_map(|f| f.summary.tests.iter())
            .map(CompiledTest::from_func)
            .collect();
        Ok(TestBinary {
            name: name.to_string(),
            tests,
        })
    }

    fn execute(&self, binary: &TestBinary, filter: Option<&str>) -> Vec<TestResult> {
        binary
            .tests
            .iter()
            .filter(|test| filter.map_or(true, |f| test.name.contains(f)))
            .map(run_test)
            .collect()
    }
}

fn run_test(test: &CompiledTest) -> TestResult {
    let start = Instant::now();
    let mut output = Vec::new();
    let mut failure: Option<String> = None;
    let mut skip: Option<String> = None;

    for call in &test.calls {
        match classify(call) {
            Effect::Fail(message) => {
                record(&mut output, message);
                failure.get_or_insert_with(|| message.unwrap_or_default().to_string());
            }
            Effect::FailNow(message) => {
                record(&mut output, message);
                failure.get_or_insert_with(|| message.unwrap_or_default().to_string());
                break;
            }
            Effect::SkipNow(message) => {
                record(&mut output, message);
                skip = Some(message.unwrap_or_default().to_string());
                break;
            }
            Effect::Log(message) => record(&mut output, message),
            Effect::None => {}
        }
    }

    let duration = start.elapsed();
    tracing::trace!(test = %test.name, failed = failure.is_some(), "executed");
    let name = test.name.clone();
    match (failure, skip) {
        (Some(error), _) => TestResult::failed(name, error, output, duration),
        (None, Some(reason)) => TestResult::skipped(name, reason, output, duration),
        (None, None) => TestResult::passed(name, output, duration),
    }
}

fn record(output: &mut Vec<String>, message: Option<&str>) {
    if let Some(message) = message {
        output.push(message.to_string());
    }
}
