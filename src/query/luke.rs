//! Luke query: index, schema and field statistics from `admin/luke`.

use serde_json::Value;

use crate::document::Document;
use crate::error::Result;
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::util::named_list;

/// What the luke handler reports (`show`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LukeShow {
    Index,
    Schema,
    Doc,
    All,
}

impl LukeShow {
    pub fn as_str(&self) -> &'static str {
        match self {
            LukeShow::Index => "index",
            LukeShow::Schema => "schema",
            LukeShow::Doc => "doc",
            LukeShow::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LukeQuery {
    options: QueryOptions,
    show: Option<LukeShow>,
    id: Option<String>,
    doc_id: Option<u64>,
    fields: Vec<String>,
    num_terms: Option<u32>,
    include_index_field_flags: Option<bool>,
}

impl_query!(LukeQuery, QueryType::Luke);

impl Default for LukeQuery {
    fn default() -> Self {
        LukeQuery {
            options: QueryOptions::new("admin/luke"),
            show: None,
            id: None,
            doc_id: None,
            fields: Vec::new(),
            num_terms: None,
            include_index_field_flags: None,
        }
    }
}

impl LukeQuery {
    pub fn new() -> Self {
        LukeQuery::default()
    }

    pub fn set_show(&mut self, show: LukeShow) -> &mut Self {
        self.show = Some(show);
        self
    }

    /// Inspect the document with this unique key.
    pub fn set_id<S: Into<String>>(&mut self, id: S) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    /// Inspect the document with this Lucene document id.
    pub fn set_doc_id(&mut self, doc_id: u64) -> &mut Self {
        self.doc_id = Some(doc_id);
        self
    }

    pub fn set_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Number of top terms per field.
    pub fn set_num_terms(&mut self, num_terms: u32) -> &mut Self {
        self.num_terms = Some(num_terms);
        self
    }

    pub fn set_include_index_field_flags(&mut self, include: bool) -> &mut Self {
        self.include_index_field_flags = Some(include);
        self
    }
}

/// The `index` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LukeIndex {
    pub num_docs: u64,
    pub max_doc: u64,
    pub deleted_docs: u64,
    pub version: Option<i64>,
    pub segment_count: Option<u64>,
    pub current: Option<bool>,
    pub has_deletions: Option<bool>,
    pub directory: Option<String>,
    pub last_modified: Option<String>,
}

impl LukeIndex {
    fn parse(value: &Value) -> LukeIndex {
        LukeIndex {
            num_docs: named_list::get_u64(value, "numDocs").unwrap_or(0),
            max_doc: named_list::get_u64(value, "maxDoc").unwrap_or(0),
            deleted_docs: named_list::get_u64(value, "deletedDocs").unwrap_or(0),
            version: named_list::get_i64(value, "version"),
            segment_count: named_list::get_u64(value, "segmentCount"),
            current: named_list::get_bool(value, "current"),
            has_deletions: named_list::get_bool(value, "hasDeletions"),
            directory: named_list::get_string(value, "directory"),
            last_modified: named_list::get_string(value, "lastModified"),
        }
    }
}

/// A field or dynamic field declared in the schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LukeSchemaField {
    pub name: String,
    pub field_type: Option<String>,
    /// Schema flags, e.g. `I-S-M---OF-----l`.
    pub flags: Option<String>,
    pub required: bool,
    pub default: Option<String>,
    pub unique_key: bool,
    pub copy_dests: Vec<String>,
    pub copy_sources: Vec<String>,
}

impl LukeSchemaField {
    fn parse(name: String, value: &Value) -> LukeSchemaField {
        LukeSchemaField {
            name,
            field_type: named_list::get_string(value, "type"),
            flags: named_list::get_string(value, "flags"),
            required: named_list::get_bool(value, "required").unwrap_or(false),
            default: named_list::get_string(value, "default"),
            unique_key: named_list::get_bool(value, "uniqueKey").unwrap_or(false),
            copy_dests: named_list::get(value, "copyDests")
                .map(named_list::as_string_list)
                .unwrap_or_default(),
            copy_sources: named_list::get(value, "copySources")
                .map(named_list::as_string_list)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LukeFieldType {
    pub name: String,
    pub class_name: Option<String>,
    pub fields: Vec<String>,
    pub tokenized: Option<bool>,
}

/// The `schema` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LukeSchema {
    pub fields: Vec<LukeSchemaField>,
    pub dynamic_fields: Vec<LukeSchemaField>,
    pub unique_key_field: Option<String>,
    pub similarity: Option<String>,
    pub types: Vec<LukeFieldType>,
}

impl LukeSchema {
    fn parse(value: &Value) -> LukeSchema {
        let fields_of = |key: &str| -> Vec<LukeSchemaField> {
            named_list::get(value, key)
                .map(|fields| {
                    named_list::entries(fields)
                        .into_iter()
                        .map(|(name, field)| LukeSchemaField::parse(name, field))
                        .collect()
                })
                .unwrap_or_default()
        };
        let types = named_list::get(value, "types")
            .map(|types| {
                named_list::entries(types)
                    .into_iter()
                    .map(|(name, t)| LukeFieldType {
                        name,
                        class_name: named_list::get_string(t, "className"),
                        fields: named_list::get(t, "fields")
                            .map(named_list::as_string_list)
                            .unwrap_or_default(),
                        tokenized: named_list::get_bool(t, "tokenized"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        LukeSchema {
            fields: fields_of("fields"),
            dynamic_fields: fields_of("dynamicFields"),
            unique_key_field: named_list::get_string(value, "uniqueKeyField"),
            similarity: named_list::get(value, "similarity")
                .and_then(|s| named_list::get_string(s, "className")),
            types,
        }
    }

    pub fn field(&self, name: &str) -> Option<&LukeSchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Index statistics of one field (the `fields` section).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LukeFieldInfo {
    pub name: String,
    pub field_type: Option<String>,
    pub schema_flags: Option<String>,
    pub index_flags: Option<String>,
    pub dynamic_base: Option<String>,
    pub docs: Option<u64>,
    pub distinct: Option<u64>,
    pub top_terms: Vec<(String, u64)>,
    pub histogram: Vec<(String, u64)>,
}

impl LukeFieldInfo {
    fn parse(name: String, value: &Value) -> LukeFieldInfo {
        LukeFieldInfo {
            name,
            field_type: named_list::get_string(value, "type"),
            schema_flags: named_list::get_string(value, "schema"),
            index_flags: named_list::get_string(value, "index"),
            dynamic_base: named_list::get_string(value, "dynamicBase"),
            docs: named_list::get_u64(value, "docs"),
            distinct: named_list::get_u64(value, "distinct"),
            top_terms: named_list::get(value, "topTerms")
                .map(named_list::counts)
                .unwrap_or_default(),
            histogram: named_list::get(value, "histogram")
                .map(named_list::counts)
                .unwrap_or_default(),
        }
    }
}

/// The `doc` section of a document lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LukeDocInfo {
    pub doc_id: Option<u64>,
    /// Stored fields as Solr returns them.
    pub solr: Option<Document>,
    /// Per-field Lucene details.
    pub lucene: Vec<(String, Value)>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LukeResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub index: Option<LukeIndex>,
    pub schema: Option<LukeSchema>,
    pub fields: Vec<LukeFieldInfo>,
    pub doc: Option<LukeDocInfo>,
    /// Legend of the flag letters and other notes.
    pub info: Vec<(String, Value)>,
}

impl_query_result!(LukeResult);

impl LukeResult {
    pub fn field(&self, name: &str) -> Option<&LukeFieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LukeRequestBuilder;

impl RequestBuilder for LukeRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<LukeQuery>(query, QueryType::Luke)?;
        let mut request = create_request(query, Method::Get);
        request.add_param("show", query.show.map(|s| s.as_str()));
        request.add_param("id", query.id.as_deref());
        request.add_param("docId", query.doc_id);
        request.add_param("fl", query.fields.join(","));
        request.add_param("numTerms", query.num_terms);
        request.add_param("includeIndexFieldFlags", query.include_index_field_flags);
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LukeResponseParser;

impl ResponseParser for LukeResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<LukeQuery>(query, QueryType::Luke)?;
        let fields = named_list::get(&data, "fields")
            .map(|fields| {
                named_list::entries(fields)
                    .into_iter()
                    .map(|(name, info)| LukeFieldInfo::parse(name, info))
                    .collect()
            })
            .unwrap_or_default();
        let doc = named_list::get(&data, "doc").map(|doc| LukeDocInfo {
            doc_id: named_list::get_u64(doc, "docId"),
            solr: named_list::get(doc, "solr").map(Document::from_json),
            lucene: named_list::get(doc, "lucene")
                .map(|l| named_list::entries(l).into_iter().map(|(k, v)| (k, v.clone())).collect())
                .unwrap_or_default(),
        });
        let info = named_list::get(&data, "info")
            .map(|i| named_list::entries(i).into_iter().map(|(k, v)| (k, v.clone())).collect())
            .unwrap_or_default();
        Ok(SolrResult::Luke(LukeResult {
            header: ResponseHeader::from_data(&data),
            index: named_list::get(&data, "index").map(LukeIndex::parse),
            schema: named_list::get(&data, "schema").map(LukeSchema::parse),
            fields,
            doc,
            info,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request() {
        let mut query = LukeQuery::new();
        query.set_show(LukeShow::Schema).set_num_terms(5).set_fields(["id", "name"]);
        let request = LukeRequestBuilder.build(&query).unwrap();
        assert_eq!(request.handler(), "admin/luke");
        assert_eq!(request.param("show"), Some("schema"));
        assert_eq!(request.param("numTerms"), Some("5"));
        assert_eq!(request.param("fl"), Some("id,name"));
        assert!(request.param("docId").is_none());
    }

    #[test]
    fn test_parse_index_and_fields() {
        let data = json!({
            "index": {"numDocs": 32, "maxDoc": 34, "deletedDocs": 2, "segmentCount": 3, "current": true},
            "fields": {"cat": {
                "type": "string", "schema": "I-S-M---OF-----l", "docs": 30, "distinct": 12,
                "topTerms": ["electronics", 12, "memory", 3],
                "histogram": ["1", 9, "2", 2]
            }},
            "info": {"key": {"I": "Indexed"}}
        });
        let result = LukeResponseParser.parse(&LukeQuery::new(), &Response::ok(""), data).unwrap();
        let result = LukeResult::try_from(result).unwrap();
        let index = result.index.as_ref().unwrap();
        assert_eq!(index.num_docs, 32);
        assert_eq!(index.deleted_docs, 2);
        let cat = result.field("cat").unwrap();
        assert_eq!(cat.distinct, Some(12));
        assert_eq!(cat.top_terms[0], ("electronics".to_string(), 12));
        assert_eq!(cat.histogram.len(), 2);
        assert_eq!(result.info.len(), 1);
        assert!(result.schema.is_none());
    }

    #[test]
    fn test_parse_schema() {
        let data = json!({"schema": {
            "fields": {"id": {"type": "string", "flags": "I-S-----OF-----l", "required": true, "uniqueKey": true}},
            "dynamicFields": {"*_s": {"type": "string"}},
            "uniqueKeyField": "id",
            "types": {"string": {"className": "org.apache.solr.schema.StrField", "fields": ["id"], "tokenized": false}}
        }});
        let result = LukeResponseParser.parse(&LukeQuery::new(), &Response::ok(""), data).unwrap();
        let schema = LukeResult::try_from(result).unwrap().schema.unwrap();
        assert!(schema.field("id").unwrap().unique_key);
        assert_eq!(schema.dynamic_fields[0].name, "*_s");
        assert_eq!(schema.unique_key_field.as_deref(), Some("id"));
        assert_eq!(schema.types[0].fields, vec!["id".to_string()]);
    }
}
