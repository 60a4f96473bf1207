#![allow(dead_code)]

use apex_testplus::model::{
    CodeCoverageResult, CodeCoverageWarning, CodeLocation, RunTestFailure, RunTestSuccess,
    RunTestsResult,
};
use serde_json::json;

pub fn success(class: &str, method: &str, time: f64) -> RunTestSuccess {
    RunTestSuccess {
        name: class.to_string(),
        method_name: method.to_string(),
        namespace: None,
        time,
    }
}

pub fn failure(class: &str, method: &str, message: &str) -> RunTestFailure {
    RunTestFailure {
        name: class.to_string(),
        method_name: method.to_string(),
        namespace: None,
        time: 100.0,
        message: message.to_string(),
        stack_trace: format!("Class.{class}.{method}: line 12, column 1"),
    }
}

/// Coverage record whose uncovered lines are `first_uncovered..first_uncovered + not_covered`.
pub fn coverage(
    name: &str,
    kind: &str,
    locations: u32,
    not_covered: u32,
    first_uncovered: u32,
) -> CodeCoverageResult {
    CodeCoverageResult {
        name: name.to_string(),
        namespace: None,
        kind: kind.to_string(),
        num_locations: locations,
        num_locations_not_covered: not_covered,
        locations_not_covered: (first_uncovered..first_uncovered + not_covered)
            .map(|line| CodeLocation {
                line,
                column: 0,
                num_executions: 0,
                time: -1.0,
            })
            .collect(),
    }
}

pub fn warning(name: Option<&str>, message: &str) -> CodeCoverageWarning {
    CodeCoverageWarning {
        name: name.map(str::to_string),
        namespace: None,
        message: message.to_string(),
    }
}

/// Two passing tests, one failing, one class at 80/100.
pub fn standard_result() -> RunTestsResult {
    RunTestsResult {
        total_time: 2500.0,
        num_tests_run: 3,
        num_failures: 1,
        successes: vec![
            success("InvoiceTest", "testTotal", 250.0),
            success("InvoiceTest", "testTax", 1250.0),
        ],
        failures: vec![failure(
            "InvoiceTest",
            "testDiscount",
            "System.AssertException: Assertion Failed: Expected: 10, Actual: <null>",
        )],
        code_coverage: vec![coverage("Invoice", "Class", 100, 20, 30)],
        code_coverage_warnings: vec![],
    }
}

/// Apex class body with `lines` numbered statements.
pub fn apex_class(name: &str, lines: usize) -> String {
    let mut src = format!("public class {name} {{\n");
    for i in 2..lines {
        src.push_str(&format!("    Integer v{i} = {i} << 1;\n"));
    }
    src.push_str("}\n");
    src
}

pub fn debug_block(class: &str, method: &str) -> String {
    format!(
        "12:00:00.001 (1)|EXECUTION_STARTED\n\
         12:00:00.002 (2)|CODE_UNIT_STARTED|[EXTERNAL]|01pXXXXXXXXXXXX|{class}.{method}\n\
         12:00:00.003 (3)|USER_DEBUG|[4]|DEBUG|inside {method}\n\
         12:00:00.004 (4)|CODE_UNIT_FINISHED|{class}.{method}\n\
         12:00:00.005 (5)|EXECUTION_FINISHED\n"
    )
}

/// Recorded response document as written by CI.
pub fn recorded_response(result: &RunTestsResult, debug_log: Option<&str>) -> String {
    let mut doc = json!({ "result": result });
    if let Some(log) = debug_log {
        doc["debugLog"] = json!(log);
    }
    serde_json::to_string_pretty(&doc).expect("serialize response")
}
