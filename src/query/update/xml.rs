//! XML update format.

use quick_xml::escape::escape;

use crate::document::{Document, FieldValue, Modifier};
use crate::query::helper::filter_control_characters;
use crate::query::update::{AddCommand, Command, CommitCommand, DeleteCommand, OptimizeCommand};

/// Render commands as an `<update>` document.
pub fn build(commands: &[&Command]) -> String {
    let mut xml = String::from("<update>");
    for command in commands {
        match command {
            Command::Add(add) => build_add(&mut xml, add),
            Command::Delete(delete) => build_delete(&mut xml, delete),
            Command::Commit(commit) => build_commit(&mut xml, commit),
            Command::Optimize(optimize) => build_optimize(&mut xml, optimize),
            Command::Rollback => xml.push_str("<rollback/>"),
            Command::RawXml(raw) => xml.push_str(strip_update_wrapper(raw)),
        }
    }
    xml.push_str("</update>");
    xml
}

fn text(value: &str) -> String {
    escape(filter_control_characters(value).as_str()).into_owned()
}

fn attribute(xml: &mut String, name: &str, value: Option<String>) {
    if let Some(value) = value {
        xml.push_str(&format!(" {name}=\"{}\"", text(&value)));
    }
}

fn build_add(xml: &mut String, add: &AddCommand) {
    xml.push_str("<add");
    attribute(xml, "overwrite", add.overwrite.map(|v| v.to_string()));
    attribute(xml, "commitWithin", add.commit_within.map(|v| v.to_string()));
    xml.push('>');
    for document in &add.documents {
        build_document(xml, document);
    }
    xml.push_str("</add>");
}

fn build_document(xml: &mut String, document: &Document) {
    xml.push_str("<doc>");
    for (name, value) in document.fields() {
        build_field(xml, name, value, document.field_modifier(name));
    }
    if let Some(version) = document.version() {
        build_field(xml, "_version_", &FieldValue::Int(version), None);
    }
    for child in document.children() {
        build_document(xml, child);
    }
    xml.push_str("</doc>");
}

fn build_field(xml: &mut String, name: &str, value: &FieldValue, modifier: Option<Modifier>) {
    match value {
        FieldValue::Multi(values) if values.is_empty() => {
            // An empty list only makes sense as an atomic "remove all".
            if let Some(modifier) = modifier {
                open_field(xml, name, Some(modifier));
                xml.push_str(" null=\"true\"/>");
            }
        }
        FieldValue::Multi(values) => {
            for value in values {
                build_field(xml, name, value, modifier);
            }
        }
        FieldValue::Null => {
            open_field(xml, name, modifier);
            xml.push_str(" null=\"true\"/>");
        }
        FieldValue::Doc(child) => {
            open_field(xml, name, modifier);
            xml.push('>');
            build_document(xml, child);
            xml.push_str("</field>");
        }
        scalar => {
            open_field(xml, name, modifier);
            xml.push('>');
            xml.push_str(&text(&scalar.to_solr_string()));
            xml.push_str("</field>");
        }
    }
}

fn open_field(xml: &mut String, name: &str, modifier: Option<Modifier>) {
    xml.push_str("<field");
    attribute(xml, "name", Some(name.to_string()));
    attribute(xml, "update", modifier.map(|m| m.as_str().to_string()));
}

fn build_delete(xml: &mut String, delete: &DeleteCommand) {
    xml.push_str("<delete>");
    for id in &delete.ids {
        xml.push_str(&format!("<id>{}</id>", text(id)));
    }
    for query in &delete.queries {
        xml.push_str(&format!("<query>{}</query>", text(query)));
    }
    xml.push_str("</delete>");
}

fn build_commit(xml: &mut String, commit: &CommitCommand) {
    xml.push_str("<commit");
    attribute(xml, "softCommit", commit.soft_commit.map(|v| v.to_string()));
    attribute(xml, "waitSearcher", commit.wait_searcher.map(|v| v.to_string()));
    attribute(xml, "expungeDeletes", commit.expunge_deletes.map(|v| v.to_string()));
    xml.push_str("/>");
}

fn build_optimize(xml: &mut String, optimize: &OptimizeCommand) {
    xml.push_str("<optimize");
    attribute(xml, "softCommit", optimize.soft_commit.map(|v| v.to_string()));
    attribute(xml, "waitSearcher", optimize.wait_searcher.map(|v| v.to_string()));
    attribute(xml, "maxSegments", optimize.max_segments.map(|v| v.to_string()));
    xml.push_str("/>");
}

fn strip_update_wrapper(raw: &str) -> &str {
    let trimmed = raw.trim();
    match (trimmed.strip_prefix("<update>"), trimmed.ends_with("</update>")) {
        (Some(inner), true) => inner.strip_suffix("</update>").unwrap_or(inner),
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn render(command: Command) -> String {
        build(&[&command])
    }

    #[test]
    fn test_add_with_multi_values_and_escaping() {
        let document = Document::builder()
            .field("id", "1")
            .add("cat", "a&b")
            .add("cat", "<c>")
            .field("published", Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
            .build();
        let xml = render(Command::Add(AddCommand {
            documents: vec![document],
            overwrite: Some(true),
            commit_within: Some(1000),
        }));
        assert_eq!(
            xml,
            "<update><add overwrite=\"true\" commitWithin=\"1000\"><doc>\
             <field name=\"id\">1</field>\
             <field name=\"cat\">a&amp;b</field>\
             <field name=\"cat\">&lt;c&gt;</field>\
             <field name=\"published\">2024-01-02T03:04:05Z</field>\
             </doc></add></update>"
        );
    }

    #[test]
    fn test_atomic_update_and_version() {
        let document = Document::builder()
            .field("id", "1")
            .update("stock", Modifier::Inc, 10)
            .update("tags", Modifier::Set, FieldValue::Null)
            .version(42)
            .build();
        let xml = render(Command::Add(AddCommand {
            documents: vec![document],
            ..Default::default()
        }));
        assert!(xml.contains("<field name=\"stock\" update=\"inc\">10</field>"));
        assert!(xml.contains("<field name=\"tags\" update=\"set\" null=\"true\"/>"));
        assert!(xml.contains("<field name=\"_version_\">42</field>"));
    }

    #[test]
    fn test_child_documents() {
        let child = Document::builder().field("id", "1-1").build();
        let labelled = Document::builder().field("id", "1-2").build();
        let document = Document::builder()
            .field("id", "1")
            .child(child)
            .field("skus", labelled)
            .build();
        let xml = render(Command::Add(AddCommand {
            documents: vec![document],
            ..Default::default()
        }));
        assert!(xml.contains("<field name=\"skus\"><doc><field name=\"id\">1-2</field></doc></field>"));
        assert!(xml.ends_with("<doc><field name=\"id\">1-1</field></doc></doc></add></update>"));
    }

    #[test]
    fn test_control_characters_are_filtered() {
        let document = Document::builder().field("text", "a\u{0001}b").build();
        let xml = render(Command::Add(AddCommand {
            documents: vec![document],
            ..Default::default()
        }));
        assert!(xml.contains(">a b</field>"));
    }

    #[test]
    fn test_other_commands() {
        let commit = CommitCommand {
            soft_commit: Some(true),
            wait_searcher: Some(false),
            expunge_deletes: None,
        };
        assert_eq!(
            render(Command::Commit(commit)),
            "<update><commit softCommit=\"true\" waitSearcher=\"false\"/></update>"
        );
        let optimize = OptimizeCommand {
            max_segments: Some(1),
            ..Default::default()
        };
        assert_eq!(
            render(Command::Optimize(optimize)),
            "<update><optimize maxSegments=\"1\"/></update>"
        );
        assert_eq!(render(Command::Rollback), "<update><rollback/></update>");
        assert_eq!(
            render(Command::RawXml("<update><delete><query>*:*</query></delete></update>".into())),
            "<update><delete><query>*:*</query></delete></update>"
        );
        let delete = DeleteCommand {
            ids: vec!["1".into()],
            queries: vec!["price:[* TO 1]".into()],
        };
        assert_eq!(
            render(Command::Delete(delete)),
            "<update><delete><id>1</id><query>price:[* TO 1]</query></delete></update>"
        );
    }
}
