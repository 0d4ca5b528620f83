//! Report building: walks the read-only [`CoverageModel`] once and produces
//! the hierarchical report tree (report → group → package → {class,
//! sourcefile} → {method, line} → counter) that the XML serializer renders.

use std::collections::HashMap;

use chrono::Utc;

use crate::counter::{self, Counter, CounterSet};
use crate::model::{Class, CoverageModel, Method, Package};

/// Root node of the report tree.
#[derive(Debug)]
pub struct Report {
    pub name: String,
    pub session: SessionInfo,
    pub group: Group,
    /// Report-level METHOD rollup: sum over all emitted packages.
    pub counter: Counter,
}

#[derive(Debug)]
pub struct SessionInfo {
    pub id: String,
    /// Unix timestamp taken when the report was built.
    pub start: i64,
}

#[derive(Debug)]
pub struct Group {
    pub name: String,
    pub packages: Vec<PackageNode>,
    pub counter: Counter,
}

#[derive(Debug)]
pub struct PackageNode {
    pub name: String,
    pub classes: Vec<ClassNode>,
    /// Free functions rendered directly on the package.
    pub methods: Vec<MethodNode>,
    pub sourcefiles: Vec<SourceFileNode>,
    pub method_counter: Counter,
    pub class_counter: Counter,
}

#[derive(Debug)]
pub struct ClassNode {
    pub name: String,
    pub sourcefilename: String,
    pub methods: Vec<MethodNode>,
    pub method_counter: Counter,
}

#[derive(Debug)]
pub struct MethodNode {
    pub name: String,
    pub desc: String,
    pub line: u32,
    pub method_counter: Counter,
    pub line_counter: Counter,
}

/// Aggregation unit keyed by relative file path; shared by every class that
/// resolved to the same file.
#[derive(Debug)]
pub struct SourceFileNode {
    pub name: String,
    pub lines: Vec<LineNode>,
    pub counters: CounterSet,
}

/// One synthetic line per method declaration; `ci`/`mi` are 1/0 flags for
/// covered/missed instructions.
#[derive(Debug)]
pub struct LineNode {
    pub ln: u32,
    pub ci: u32,
    pub mi: u32,
}

/// Build the report tree from a fully populated model, stamping the session
/// with the current time.
pub fn build_report(model: &CoverageModel) -> Report {
    build_report_at(model, Utc::now().timestamp())
}

/// Like [`build_report`] with an explicit session timestamp.
pub fn build_report_at(model: &CoverageModel, start: i64) -> Report {
    let root = &model.config().root_module;

    let mut packages = Vec::new();
    let mut total = Counter::default();
    for package in model.packages() {
        if let Some(node) = build_package(package) {
            total.add(node.method_counter);
            packages.push(node);
        }
    }

    Report {
        name: root.clone(),
        session: SessionInfo {
            id: root.clone(),
            start,
        },
        group: Group {
            name: root.clone(),
            packages,
            counter: total,
        },
        counter: total,
    }
}

/// Build one package node, or `None` when the package produced zero observed
/// methods (the emission guard: empty namespaces never reach the document).
fn build_package(package: &Package) -> Option<PackageNode> {
    let mut sourcefiles: Vec<SourceFileNode> = Vec::new();
    let mut sourcefile_index: HashMap<String, usize> = HashMap::new();
    let mut classes = Vec::new();
    let mut methods = Vec::new();
    let mut totals = Counter::default();

    let mut sourcefile_at = |sourcefiles: &mut Vec<SourceFileNode>, name: &str| -> usize {
        match sourcefile_index.get(name) {
            Some(&i) => i,
            None => {
                let i = sourcefiles.len();
                sourcefiles.push(SourceFileNode {
                    name: name.to_string(),
                    lines: Vec::new(),
                    counters: CounterSet::new(),
                });
                sourcefile_index.insert(name.to_string(), i);
                i
            }
        }
    };

    for class in &package.classes {
        // Classes with no attributed file carry no reportable methods
        // (out-of-root declarations were dropped at declare time).
        let Some(file_name) = &class.file_name else {
            continue;
        };
        if class.methods.is_empty() {
            continue;
        }

        let idx = sourcefile_at(&mut sourcefiles, file_name);
        let node = build_class(class, file_name, &mut sourcefiles[idx]);
        counter::apply_class(&mut sourcefiles[idx].counters, node.method_counter);
        totals.add(node.method_counter);
        classes.push(node);
    }

    if !package.methods.is_empty() {
        // Free functions attach to a synthetic sourcefile named after the
        // package itself; it carries line rows but no counter records.
        let idx = sourcefile_at(&mut sourcefiles, &package.name);
        for method in &package.methods {
            sourcefiles[idx].lines.push(line_row(method));
            totals.record(method.is_covered());
            methods.push(method_row(method));
        }
    }

    if totals.total() == 0 {
        return None;
    }

    let class_counter = Counter {
        covered: classes.len() as u32,
        missed: 0,
    };

    Some(PackageNode {
        name: package.name.clone(),
        classes,
        methods,
        sourcefiles,
        method_counter: totals,
        class_counter,
    })
}

fn build_class(class: &Class, file_name: &str, sourcefile: &mut SourceFileNode) -> ClassNode {
    let mut totals = Counter::default();
    let mut methods = Vec::new();
    for method in &class.methods {
        sourcefile.lines.push(line_row(method));
        totals.record(method.is_covered());
        methods.push(method_row(method));
    }

    ClassNode {
        name: class.name.clone(),
        sourcefilename: file_name.to_string(),
        methods,
        method_counter: totals,
    }
}

fn method_row(method: &Method) -> MethodNode {
    let unit = Counter::unit(method.is_covered());
    MethodNode {
        name: method.name.clone(),
        desc: method.desc.clone(),
        line: method.line,
        method_counter: unit,
        line_counter: unit,
    }
}

fn line_row(method: &Method) -> LineNode {
    let covered = method.is_covered();
    LineNode {
        ln: method.line,
        ci: u32::from(covered),
        mi: u32::from(!covered),
    }
}
