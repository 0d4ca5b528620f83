//! End-to-end tests: drive the model through the declare/mark-used protocol,
//! build the report tree, and check the serialized document.

use bindcov::config::ReportConfig;
use bindcov::model::{CoverageModel, Scope, SourceLocation};
use bindcov::report::build_report_at;
use bindcov::xml;

use quick_xml::events::Event;
use quick_xml::Reader;

fn loc(file: &str, line: u32) -> SourceLocation {
    SourceLocation {
        file: file.to_string(),
        line,
    }
}

/// The shared-sourcefile scenario: ns::A { foo, bar } and ns::B { baz } all
/// declared in a.cpp, with foo and baz used.
fn shared_file_model() -> CoverageModel {
    let mut m = CoverageModel::new(ReportConfig::new("pymod").with_source_root("/proj/src"));
    let a = Scope::Type("ns::A".to_string());
    let b = Scope::Type("ns::B".to_string());
    m.add_declaration(&a, "foo", "()void", &loc("/proj/src/a.cpp", 10));
    m.add_declaration(&a, "bar", "()void", &loc("/proj/src/a.cpp", 20));
    m.add_declaration(&b, "baz", "()void", &loc("/proj/src/a.cpp", 30));
    m.mark_used(&a, "foo");
    m.mark_used(&b, "baz");
    m
}

#[test]
fn shared_sourcefile_counters_in_document() {
    let report = build_report_at(&shared_file_model(), 1700000000);
    let doc = xml::to_xml_string(&report).unwrap();

    // One sourcefile element despite two classes.
    assert_eq!(doc.matches("<sourcefile ").count(), 1);
    assert!(doc.contains(r#"<sourcefile name="a.cpp">"#));

    // Sourcefile counters: 2 classes attributed, 2 of 3 methods covered.
    assert!(doc.contains(r#"<counter type="CLASS" covered="2" missed="0"/>"#));
    assert!(doc.contains(r#"<counter type="METHOD" covered="2" missed="1"/>"#));
    assert!(doc.contains(r#"<counter type="LINE" covered="2" missed="1"/>"#));

    // One synthetic line row per method declaration.
    assert!(doc.contains(r#"<line ln="10" ci="1" mi="0"/>"#));
    assert!(doc.contains(r#"<line ln="20" ci="0" mi="1"/>"#));
    assert!(doc.contains(r#"<line ln="30" ci="1" mi="0"/>"#));
}

#[test]
fn unused_free_function_lands_in_unknown_package() {
    let mut m = CoverageModel::new(ReportConfig::new("pymod"));
    m.add_declaration(
        &Scope::Namespace(String::new()),
        "lonely",
        "()void",
        &loc("free.cpp", 7),
    );

    let report = build_report_at(&m, 0);
    let doc = xml::to_xml_string(&report).unwrap();

    assert!(doc.contains(r#"<package name="unknown">"#));
    assert!(doc.contains(r#"<method name="lonely" desc="()void" line="7">"#));
    assert!(doc.contains(r#"<counter type="METHOD" covered="0" missed="1"/>"#));
}

#[test]
fn empty_packages_never_reach_the_document() {
    let mut m = CoverageModel::new(ReportConfig::new("pymod").with_source_root("/proj/src"));
    // A package whose only class was declared entirely outside the root.
    m.add_declaration(
        &Scope::Type("vendored::X".to_string()),
        "ext",
        "()void",
        &loc("/usr/include/x.hpp", 1),
    );
    let a = Scope::Type("ns::A".to_string());
    m.add_declaration(&a, "foo", "()void", &loc("/proj/src/a.cpp", 10));

    let report = build_report_at(&m, 0);
    let doc = xml::to_xml_string(&report).unwrap();

    assert!(!doc.contains("vendored"));
    assert!(doc.contains(r#"<package name="ns">"#));
}

#[test]
fn report_rollup_matches_package_sum() {
    let mut m = CoverageModel::new(ReportConfig::new("pymod").with_source_root("/proj/src"));
    let a = Scope::Type("ns::A".to_string());
    m.add_declaration(&a, "foo", "()void", &loc("/proj/src/a.cpp", 10));
    m.mark_used(&a, "foo");
    m.add_declaration(
        &Scope::Namespace("util".to_string()),
        "helper",
        "()int",
        &loc("/proj/src/util.cpp", 3),
    );

    let report = build_report_at(&m, 0);
    let covered: u32 = report
        .group
        .packages
        .iter()
        .map(|p| p.method_counter.covered)
        .sum();
    let missed: u32 = report
        .group
        .packages
        .iter()
        .map(|p| p.method_counter.missed)
        .sum();
    assert_eq!(report.counter.covered, covered);
    assert_eq!(report.counter.missed, missed);
    assert_eq!((covered, missed), (1, 1));
}

#[test]
fn document_is_well_formed() {
    let report = build_report_at(&shared_file_model(), 1700000000);
    let doc = xml::to_xml_string(&report).unwrap();

    let mut reader = Reader::from_str(&doc);
    let mut depth = 0usize;
    let mut elements = 0usize;
    loop {
        match reader.read_event().unwrap() {
            Event::Eof => break,
            Event::Start(_) => {
                depth += 1;
                elements += 1;
            }
            Event::End(_) => depth -= 1,
            Event::Empty(_) => elements += 1,
            _ => {}
        }
    }
    assert_eq!(depth, 0);
    // report, group, package, 2 classes, 3 methods, sourcefile (Start) plus
    // sessioninfo, 3 lines, and counters (Empty).
    assert!(elements > 10);
}

#[test]
fn document_written_exactly_once() -> anyhow::Result<()> {
    let report = build_report_at(&shared_file_model(), 1700000000);
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("coverage.xml");

    xml::write_to_file(&report, &path)?;

    let written = std::fs::read_to_string(&path)?;
    // A double write would repeat the prolog or the root element.
    assert_eq!(written.matches("<?xml").count(), 1);
    assert_eq!(written.matches("<report ").count(), 1);
    assert_eq!(written.matches("</report>").count(), 1);
    Ok(())
}
