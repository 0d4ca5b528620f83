//! XML serialization of the report tree.
//!
//! Emitted document shape (attributes only, no text content):
//!   <report name="...">
//!     <sessioninfo id="..." start="..."/>
//!     <group name="...">
//!       <package name="...">
//!         <class name="..." sourcefilename="...">
//!           <method name="..." desc="..." line="...">
//!             <counter type="METHOD" covered="..." missed="..."/>
//!             <counter type="LINE" covered="..." missed="..."/>
//!           </method>
//!           <counter type="METHOD" .../>
//!         </class>
//!         <sourcefile name="...">
//!           <line ln="..." ci="..." mi="..."/>
//!           <counter type="CLASS" .../> ...
//!         </sourcefile>
//!         <counter type="METHOD" .../>
//!         <counter type="CLASS" .../>
//!       </package>
//!       <counter type="METHOD" .../>
//!     </group>
//!     <counter type="METHOD" .../>
//!   </report>

use std::io;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::counter::{Counter, CounterKind};
use crate::error::{BindcovError, Result};
use crate::report::{ClassNode, MethodNode, PackageNode, Report, SourceFileNode};

/// External DTD reference carried on every emitted document, matching what
/// JaCoCo report viewers expect.
const REPORT_DTD: &str =
    r#"report SYSTEM "http://www.eclemma.org/jacoco/trunk/coverage/report.dtd""#;

/// Render the report as a pretty-printed (two-space indented) XML document
/// with declaration and DOCTYPE lines.
pub fn to_xml_string(report: &Report) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(REPORT_DTD)))?;
    write_report(&mut writer, report)?;

    let bytes = writer.into_inner();
    // The writer only ever receives UTF-8 strings.
    Ok(String::from_utf8(bytes).expect("serialized report is valid UTF-8"))
}

/// Serialize the report and write it to `path` in a single pass. I/O
/// failures surface as [`BindcovError::WriteFailed`].
pub fn write_to_file(report: &Report, path: &Path) -> Result<()> {
    let document = to_xml_string(report)?;
    std::fs::write(path, document).map_err(|source| BindcovError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn write_report<W: io::Write>(w: &mut Writer<W>, report: &Report) -> quick_xml::Result<()> {
    let mut root = BytesStart::new("report");
    root.push_attribute(("name", report.name.as_str()));
    w.write_event(Event::Start(root))?;

    let mut session = BytesStart::new("sessioninfo");
    session.push_attribute(("id", report.session.id.as_str()));
    session.push_attribute(("start", report.session.start.to_string().as_str()));
    w.write_event(Event::Empty(session))?;

    let mut group = BytesStart::new("group");
    group.push_attribute(("name", report.group.name.as_str()));
    w.write_event(Event::Start(group))?;
    for package in &report.group.packages {
        write_package(w, package)?;
    }
    write_counter(w, CounterKind::Method, report.group.counter)?;
    w.write_event(Event::End(BytesEnd::new("group")))?;

    write_counter(w, CounterKind::Method, report.counter)?;
    w.write_event(Event::End(BytesEnd::new("report")))
}

fn write_package<W: io::Write>(w: &mut Writer<W>, package: &PackageNode) -> quick_xml::Result<()> {
    let mut elem = BytesStart::new("package");
    elem.push_attribute(("name", package.name.as_str()));
    w.write_event(Event::Start(elem))?;

    for class in &package.classes {
        write_class(w, class)?;
    }
    for method in &package.methods {
        write_method(w, method)?;
    }
    for sourcefile in &package.sourcefiles {
        write_sourcefile(w, sourcefile)?;
    }

    write_counter(w, CounterKind::Method, package.method_counter)?;
    write_counter(w, CounterKind::Class, package.class_counter)?;
    w.write_event(Event::End(BytesEnd::new("package")))
}

fn write_class<W: io::Write>(w: &mut Writer<W>, class: &ClassNode) -> quick_xml::Result<()> {
    let mut elem = BytesStart::new("class");
    elem.push_attribute(("name", class.name.as_str()));
    elem.push_attribute(("sourcefilename", class.sourcefilename.as_str()));
    w.write_event(Event::Start(elem))?;

    for method in &class.methods {
        write_method(w, method)?;
    }
    write_counter(w, CounterKind::Method, class.method_counter)?;
    w.write_event(Event::End(BytesEnd::new("class")))
}

fn write_method<W: io::Write>(w: &mut Writer<W>, method: &MethodNode) -> quick_xml::Result<()> {
    let mut elem = BytesStart::new("method");
    elem.push_attribute(("name", method.name.as_str()));
    elem.push_attribute(("desc", method.desc.as_str()));
    elem.push_attribute(("line", method.line.to_string().as_str()));
    w.write_event(Event::Start(elem))?;

    write_counter(w, CounterKind::Method, method.method_counter)?;
    write_counter(w, CounterKind::Line, method.line_counter)?;
    w.write_event(Event::End(BytesEnd::new("method")))
}

fn write_sourcefile<W: io::Write>(
    w: &mut Writer<W>,
    sourcefile: &SourceFileNode,
) -> quick_xml::Result<()> {
    let mut elem = BytesStart::new("sourcefile");
    elem.push_attribute(("name", sourcefile.name.as_str()));
    w.write_event(Event::Start(elem))?;

    for line in &sourcefile.lines {
        let mut row = BytesStart::new("line");
        row.push_attribute(("ln", line.ln.to_string().as_str()));
        row.push_attribute(("ci", line.ci.to_string().as_str()));
        row.push_attribute(("mi", line.mi.to_string().as_str()));
        w.write_event(Event::Empty(row))?;
    }
    for (kind, counter) in sourcefile.counters.iter() {
        write_counter(w, kind, *counter)?;
    }
    w.write_event(Event::End(BytesEnd::new("sourcefile")))
}

fn write_counter<W: io::Write>(
    w: &mut Writer<W>,
    kind: CounterKind,
    counter: Counter,
) -> quick_xml::Result<()> {
    let mut elem = BytesStart::new("counter");
    elem.push_attribute(("type", kind.as_str()));
    elem.push_attribute(("covered", counter.covered.to_string().as_str()));
    elem.push_attribute(("missed", counter.missed.to_string().as_str()));
    w.write_event(Event::Empty(elem))
}
