/*!
 * nestkit Self-Test Program
 *
 * Runs self-contained checks against the deep structure toolkit and, when a
 * URL is given as the first argument, a live fetch through the wrapper.
 * Prints a colored summary followed by a JSON report, and exits non-zero
 * when any check fails.
 *
 * Environment:
 * - RUST_LOG: tracing filter (default "warn")
 * - NESTKIT_RESULTS: optional path to also write the JSON report to
 */

#![forbid(unsafe_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use nestkit::deep::{
    clone_obj, deep_copy, deep_find_set, deep_get_key, filter_data, filter_data_fast, flatten_obj,
    sanitize_obj, Filter,
};
use nestkit::http::{FetchClient, FetchOptions};

#[derive(Debug, serde::Serialize)]
struct CheckResult {
    name: String,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct FetchCheckResult {
    url: String,
    passed: bool,
    #[serde(rename = "elapsedMs")]
    elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

#[derive(Debug, serde::Serialize)]
struct TestResults {
    crate_name: String,
    version: String,
    timestamp: String,
    checks: Vec<CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetch: Option<FetchCheckResult>,
    #[serde(rename = "allPassed")]
    all_passed: bool,
}

struct Logger;

impl Logger {
    fn banner(title: &str) {
        println!("{}", "═══════════════════════════════════════════".blue());
        println!("{}", title.blue());
        println!("{}", "═══════════════════════════════════════════".blue());
    }

    fn test(test_name: &str, passed: bool, error_detail: Option<&str>) {
        if passed {
            println!("  {}: {}", "✅ PASS".green(), test_name);
        } else {
            println!("  {}: {}", "❌ FAIL".red(), test_name);
            if let Some(error) = error_detail {
                println!("    {}", error.red());
            }
        }
    }
}

/// Compare an actual value with the expected one, describing any mismatch
fn expect_eq(actual: &Value, expected: &Value) -> std::result::Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("expected {}, got {}", expected, actual))
    }
}

struct SelfTestRunner {
    results: TestResults,
}

impl SelfTestRunner {
    fn new() -> Self {
        SelfTestRunner {
            results: TestResults {
                crate_name: "nestkit".to_string(),
                version: nestkit::VERSION.to_string(),
                timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S.%3fZ").to_string(),
                checks: Vec::new(),
                fetch: None,
                all_passed: true,
            },
        }
    }

    fn record(&mut self, name: &str, outcome: std::result::Result<(), String>) {
        let passed = outcome.is_ok();
        let error = outcome.err();
        Logger::test(name, passed, error.as_deref());
        self.results.all_passed &= passed;
        self.results.checks.push(CheckResult {
            name: name.to_string(),
            passed,
            error,
        });
    }

    fn run_toolkit_checks(&mut self) {
        println!("\n{}", "1. Deep Structure Toolkit".blue());

        let nested = json!({
            "id": 1,
            "customer": {"name": "Ada", "address": {"city": "Oslo", "zip": null}},
            "items": [{"sku": "A1", "qty": 2}, {"sku": "B7", "qty": 1}]
        });

        self.record(
            "deep_get_key finds nested keys",
            expect_eq(&deep_get_key(&nested, "city").cloned().unwrap_or(Value::Null), &json!("Oslo")),
        );

        let updated = deep_find_set(&nested, "sku", json!("Z9"));
        self.record(
            "deep_find_set leaves the input untouched",
            expect_eq(&json!([updated["items"][0]["sku"], nested["items"][0]["sku"]]), &json!(["Z9", "A1"])),
        );

        self.record(
            "flatten_obj joins key paths",
            expect_eq(
                &flatten_obj(&json!({"a": {"b": 1, "c": {"d": 2}}, "e": null})),
                &json!({"a_b": 1, "a_c_d": 2, "e": "-"}),
            ),
        );

        let mut dirty = json!({"name": "", "nested": {"v": " "}});
        sanitize_obj(&mut dirty);
        self.record(
            "sanitize_obj replaces invalid scalars",
            expect_eq(&dirty, &json!({"name": "-", "nested": {"v": "-"}})),
        );

        let copies_match = clone_obj(&nested) == nested && deep_copy(&nested) == nested;
        self.record(
            "clone_obj and deep_copy agree",
            if copies_match { Ok(()) } else { Err("copies differ from source".to_string()) },
        );

        let rows = vec![json!({"name": "Alice"}), json!({"name": "Bob"}), json!({})];
        let filters = [Filter::new("name", "ALI")];
        self.record(
            "filter_data keeps matches and records without the key",
            expect_eq(&json!(filter_data(&rows, &filters)), &json!([{"name": "Alice"}, {}])),
        );
        self.record(
            "filter_data_fast drops records without the key",
            expect_eq(&json!(filter_data_fast(&rows, &filters)), &json!([{"name": "Alice"}])),
        );
    }

    async fn run_fetch_check(&mut self, url: &str) -> Result<()> {
        println!("\n{}", "2. Fetch Wrapper".blue());

        let client = FetchClient::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build fetch client")?;

        let started = std::time::Instant::now();
        let outcome = client
            .handle_fetch(url, "self-test", vec![json!(url)], FetchOptions::default())
            .await;
        let elapsed_ms = started.elapsed().as_millis();

        let result = match outcome {
            Ok(body) => {
                println!("  Received {} bytes of JSON", body.to_string().len());
                FetchCheckResult {
                    url: url.to_string(),
                    passed: true,
                    elapsed_ms,
                    status: None,
                    error: None,
                }
            }
            Err(error) => FetchCheckResult {
                url: url.to_string(),
                passed: false,
                elapsed_ms,
                status: Some(error.status),
                error: Some(serde_json::to_value(&error).context("Failed to serialize fetch error")?),
            },
        };

        let detail = result.error.as_ref().map(|e| e["message"].to_string());
        Logger::test(&format!("handle_fetch {}", url), result.passed, detail.as_deref());
        self.results.all_passed &= result.passed;
        self.results.fetch = Some(result);
        Ok(())
    }

    fn save_results(&self) -> Result<String> {
        let json_output = serde_json::to_string_pretty(&self.results).context("Failed to serialize results")?;

        if let Ok(path) = std::env::var("NESTKIT_RESULTS") {
            std::fs::write(&path, &json_output).with_context(|| format!("Cannot create results file: {}", path))?;
            println!("\n{} {}", "📁 Results saved to:".blue(), path);
        }
        Ok(json_output)
    }

    fn display_summary(&self) {
        println!();
        Logger::banner("            TEST SUMMARY REPORT");
        println!("nestkit v{}", self.results.version);
        println!("Timestamp: {}", self.results.timestamp);

        let total = self.results.checks.len() + usize::from(self.results.fetch.is_some());
        let passed = self.results.checks.iter().filter(|c| c.passed).count()
            + usize::from(self.results.fetch.as_ref().is_some_and(|f| f.passed));
        let line = format!("Checks Passed: {}/{}", passed, total);
        if passed == total {
            println!("\n{}", line.as_str().green());
        } else {
            println!("\n{}", line.as_str().red());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    Logger::banner("    nestkit Self-Test");

    let mut runner = SelfTestRunner::new();
    runner.run_toolkit_checks();

    if let Some(url) = std::env::args().nth(1) {
        runner.run_fetch_check(&url).await.context("Fetch check failed to run")?;
    }

    runner.display_summary();
    let report = runner.save_results()?;
    println!("{}", report);

    if !runner.results.all_passed {
        std::process::exit(1);
    }
    Ok(())
}
