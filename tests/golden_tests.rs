//! Golden Tests for Command Trees
//!
//! Compiles the fixture schemas end to end and checks the rendered JSON
//! against committed output, plus the structural properties every tree
//! and binding must satisfy.

use cmdtree::codegen::{generate, BindingPlan};
use cmdtree::{
    check_drift, render_json, CommandTree, CompileError, Compiler, DriftStatus, Language,
    OutputFormat, OutputPaths, RenderProfile, RequiredPolicy,
};

const COUNTER: &str = include_str!("fixtures/counter.txt");
const COUNTER_JSON: &str = include_str!("fixtures/counter.json");
const COUNTER_MARKED_JSON: &str = include_str!("fixtures/counter_marked.json");
const INVALID: &str = include_str!("fixtures/invalid.txt");
const METER: &str = include_str!("fixtures/meter.txt");
const METER_RS: &str = include_str!("fixtures/meter.rs.golden");
const METER_TS: &str = include_str!("fixtures/meter.ts.golden");
const METER_PY: &str = include_str!("fixtures/meter.py.golden");

fn profiles() -> Vec<RenderProfile> {
    vec![RenderProfile::rust(), RenderProfile::typescript(), RenderProfile::python()]
}

// =============================================================================
// JSON Golden Output
// =============================================================================

#[test]
fn test_counter_json_matches_golden() {
    let tree = CommandTree::parse(COUNTER).unwrap();
    assert_eq!(render_json(&tree, OutputFormat::Pretty).unwrap(), COUNTER_JSON);
}

#[test]
fn test_counter_marked_json_matches_golden() {
    let tree = CommandTree::parse_with(COUNTER, RequiredPolicy::Marked).unwrap();
    assert_eq!(render_json(&tree, OutputFormat::Pretty).unwrap(), COUNTER_MARKED_JSON);
}

#[test]
fn test_golden_json_imports_to_same_tree() {
    for (policy, golden) in [
        (RequiredPolicy::Always, COUNTER_JSON),
        (RequiredPolicy::Marked, COUNTER_MARKED_JSON),
    ] {
        let tree = CommandTree::parse_with(COUNTER, policy).unwrap();
        let imported = CommandTree::from_json(golden).unwrap();
        assert_eq!(imported.commands(), tree.commands());
        assert_eq!(render_json(&imported, OutputFormat::Pretty).unwrap(), golden);
    }
}

// =============================================================================
// Tree Properties
// =============================================================================

#[test]
fn test_every_schema_line_is_a_command() {
    let tree = CommandTree::parse(COUNTER).unwrap();
    let topics: Vec<String> = tree.commands().iter().map(|c| c.topic()).collect();

    for line in COUNTER.lines().filter(|l| !l.trim().is_empty()) {
        let spec = line.split_whitespace().next().unwrap().trim_end_matches('?');
        assert!(topics.iter().any(|t| t == spec), "missing command {}", spec);
        assert!(tree.get_topic(spec).unwrap().is_command());
    }
    assert_eq!(tree.command_count(), 11);
}

#[test]
fn test_intermediate_nodes_are_not_commands() {
    let tree = CommandTree::parse(COUNTER).unwrap();
    for topic in ["trig", "freq", "freq:gate", "syst", "conf"] {
        let node = tree.get_topic(topic).unwrap();
        assert!(!node.is_command(), "{} should be a namespace", topic);
        assert!(!node.is_required());
    }
}

#[test]
fn test_required_only_on_commands() {
    for policy in [RequiredPolicy::Always, RequiredPolicy::Marked] {
        let tree = CommandTree::parse_with(COUNTER, policy).unwrap();
        for entry in tree.commands() {
            let node = tree.get(&entry.path).unwrap();
            assert_eq!(entry.required, node.is_required());
            if policy == RequiredPolicy::Always {
                assert!(entry.required, "{} should be required", entry.topic());
            }
        }
    }
}

#[test]
fn test_line_order_does_not_matter() {
    let mut lines: Vec<&str> = COUNTER.lines().collect();
    lines.reverse();
    let reversed = lines.join("\n");

    let a = CommandTree::parse(COUNTER).unwrap();
    let b = CommandTree::parse(&reversed).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        render_json(&a, OutputFormat::Compact).unwrap(),
        render_json(&b, OutputFormat::Compact).unwrap()
    );
}

#[test]
fn test_duplicate_lines_are_idempotent() {
    let doubled = format!("{}\n{}", COUNTER, COUNTER);
    assert_eq!(
        CommandTree::parse(&doubled).unwrap(),
        CommandTree::parse(COUNTER).unwrap()
    );
}

#[test]
fn test_invalid_fixture_reports_line() {
    match CommandTree::parse(INVALID) {
        Err(CompileError::SchemaSyntax { line, text, .. }) => {
            assert_eq!(line, 3);
            assert_eq!(text, "freq::gate");
        }
        other => panic!("Expected SchemaSyntax, got {:?}", other),
    }
}

// =============================================================================
// Binding Properties
// =============================================================================

#[test]
fn test_one_type_per_namespace() {
    let tree = CommandTree::parse(COUNTER).unwrap();
    let plan = BindingPlan::build(&tree, "Counter", &RenderProfile::rust()).unwrap();

    let names: Vec<&str> = plan.types.iter().map(|t| t.type_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "CounterConf",
            "CounterFreqGate",
            "CounterFreq",
            "CounterSyst",
            "CounterTrig",
            "Counter",
        ]
    );
    assert_eq!(plan.accessor_count(), tree.command_count());
}

#[test]
fn test_types_declared_before_use() {
    let tree = CommandTree::parse(COUNTER).unwrap();
    let plan = BindingPlan::build(&tree, "Counter", &RenderProfile::rust()).unwrap();

    for (i, type_plan) in plan.types.iter().enumerate() {
        for field in &type_plan.fields {
            let declared = plan.types[..i].iter().any(|t| t.type_name == field.type_name);
            assert!(declared, "{} used before declaration", field.type_name);
        }
    }
}

#[test]
fn test_every_command_has_accessors_in_every_language() {
    let tree = CommandTree::parse(COUNTER).unwrap();

    for profile in profiles() {
        let output = generate(&tree, "Counter", &profile).unwrap();
        assert_eq!(output.accessor_count, 11);
        for entry in tree.commands() {
            let literal = format!("\"{}\"", entry.topic());
            assert_eq!(
                output.code.matches(&literal).count(),
                2,
                "{:?}: expected one get and one set for {}",
                profile.language,
                entry.topic()
            );
        }
    }
}

#[test]
fn test_rust_binding_shape() {
    let tree = CommandTree::parse(COUNTER).unwrap();
    let code = generate(&tree, "Counter", &RenderProfile::rust()).unwrap().code;

    assert!(code.contains("pub struct Counter<H: Handle> {"));
    assert!(code.contains("    pub freq: CounterFreq<H>,\n"));
    assert!(code.contains("    pub gate: CounterFreqGate<H>,\n"));
    assert!(code.contains("pub fn freq_gate_time_get(&self) -> Result<String, H::Error>"));
    assert!(code.contains("    /// `trig:coun`\n    ///\n    /// Number of triggers to accept\n"));
}

#[test]
fn test_bindings_are_deterministic() {
    let tree = CommandTree::parse(COUNTER).unwrap();
    for profile in profiles() {
        let first = generate(&tree, "Counter", &profile).unwrap().code;
        let second = generate(&tree, "Counter", &profile).unwrap().code;
        assert_eq!(first, second, "{:?} output differs", profile.language);
    }
}

#[test]
fn test_bindings_from_json_match_schema() {
    let from_schema = CommandTree::parse(COUNTER).unwrap();
    let from_json = CommandTree::from_json(COUNTER_JSON).unwrap();
    let profile = RenderProfile::typescript();

    // Docs only live in the schema, so compare the doc-free parts
    let a = generate(&from_schema, "Counter", &profile).unwrap().code;
    let b = generate(&from_json, "Counter", &profile).unwrap().code;
    let strip = |code: &str| -> String {
        code.lines()
            .filter(|l| !l.trim_start().starts_with("/**"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip(&a), strip(&b));
}

// =============================================================================
// Binding Golden Output
// =============================================================================

fn assert_golden(profile: RenderProfile, golden: &str) {
    let tree = CommandTree::parse(METER).unwrap();
    let code = generate(&tree, "Meter", &profile).unwrap().code;
    if code != golden {
        let diff = similar::TextDiff::from_lines(golden, code.as_str())
            .unified_diff()
            .header("golden", "generated")
            .to_string();
        panic!("{:?} binding differs from golden:\n{}", profile.language, diff);
    }
}

#[test]
fn test_meter_rust_matches_golden() {
    assert_golden(RenderProfile::rust(), METER_RS);
}

#[test]
fn test_meter_typescript_matches_golden() {
    assert_golden(RenderProfile::typescript(), METER_TS);
}

#[test]
fn test_meter_python_matches_golden() {
    assert_golden(RenderProfile::python(), METER_PY);
}

/// Needs `python3` on PATH: `cargo test -- --ignored`
#[test]
#[ignore]
fn test_python_bindings_parse() {
    let dir = tempfile::tempdir().unwrap();
    let counter = CommandTree::parse(COUNTER).unwrap();
    let meter = CommandTree::parse(METER).unwrap();

    for (name, tree) in [("counter.py", &counter), ("meter.py", &meter)] {
        let code = generate(tree, "Api", &RenderProfile::python()).unwrap().code;
        let path = dir.path().join(name);
        std::fs::write(&path, code).unwrap();

        let status = std::process::Command::new("python3")
            .arg("-c")
            .arg("import ast, sys; ast.parse(open(sys.argv[1]).read())")
            .arg(&path)
            .status()
            .unwrap();
        assert!(status.success(), "{} is not valid Python", name);
    }
}

#[test]
fn test_invalid_identifier_is_unrenderable() {
    let tree = CommandTree::parse("1volt:dc\n").unwrap();
    for profile in profiles() {
        assert!(matches!(
            generate(&tree, "Meter", &profile),
            Err(CompileError::UnrenderableName { .. })
        ));
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_compile_write_then_check() {
    let dir = tempfile::tempdir().unwrap();
    let paths = OutputPaths {
        json: Some(dir.path().join("counter.json")),
        bindings: Some(dir.path().join("counter.ts")),
    };

    let compiler = Compiler::new("Counter", RenderProfile::typescript());
    let artifacts = compiler.compile(COUNTER).unwrap();
    assert_eq!(artifacts.json, COUNTER_JSON);
    assert_eq!(artifacts.language, Language::TypeScript);
    artifacts.write(&paths).unwrap();

    let fresh = compiler.compile(COUNTER).unwrap();
    let json_path = paths.json.as_ref().unwrap();
    assert_eq!(check_drift(&fresh.json, json_path).unwrap().status, DriftStatus::UpToDate);

    let changed = compiler.compile(&format!("{}\nsyst:vers\n", COUNTER)).unwrap();
    let report = check_drift(&changed.binding, paths.bindings.as_ref().unwrap()).unwrap();
    assert_eq!(report.status, DriftStatus::Stale);
    assert!(report.diff.unwrap().contains("systVersGet"));
}
