//! Command implementations for the solrium CLI.
//!
//! Every command has a `run_*` function that talks to Solr through a
//! [`Client`] and returns a serializable output; [`execute_command`] builds
//! the client from the global arguments and prints the output.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::client::Client;
use crate::config::ClientConfig;
use crate::document::converter::convert_file;
use crate::endpoint::{Endpoint, EndpointConfig};
use crate::error::{Result, SolriumError};
use crate::plugin::{BufferedAdd, PrefetchIterator};
use crate::query::server::core_admin::CoreAdminQuery;
use crate::query::{LukeQuery, PingQuery, SelectQuery, UpdateQuery};

/// Key of the endpoint created from `--url`.
pub const URL_ENDPOINT: &str = "url";

/// Execute a CLI command.
pub fn execute_command(args: SolriumArgs) -> Result<()> {
    let client = build_client(&args)?;
    match &args.command {
        Command::Ping => output_result("Ping", &run_ping(&client)?, &args),
        Command::Select(select_args) => output_result("Search results", &run_select(&client, select_args)?, &args),
        Command::Add(add_args) => output_result("Documents added", &run_add(&client, add_args)?, &args),
        Command::Delete(delete_args) => output_result("Documents deleted", &run_delete(&client, delete_args)?, &args),
        Command::Commit(commit_args) => output_result("Commit", &run_commit(&client, commit_args)?, &args),
        Command::Luke(luke_args) => output_result("Index information", &run_luke(&client, luke_args)?, &args),
        Command::Cores(cores_args) => output_result("Core status", &run_cores(&client, cores_args)?, &args),
    }
}

/// Build the client from `--config`, `--url` and `--endpoint`.
///
/// Without a configuration file or URL the default endpoint configuration
/// (`http://127.0.0.1:8983/solr`) is used.
pub fn build_client(args: &SolriumArgs) -> Result<Arc<Client>> {
    let client = match &args.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading client configuration");
            let config = ClientConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            Client::from_config(&config)?
        }
        None => Client::http()?,
    };

    if let Some(url) = &args.url {
        client.add_endpoint(Endpoint::from_url(URL_ENDPOINT, url)?)?;
        client.set_default_endpoint(URL_ENDPOINT)?;
    }
    if let Some(key) = &args.endpoint {
        client.set_default_endpoint(key)?;
    }
    if client.endpoints().is_empty() {
        client.add_endpoint(Endpoint::from_config("localhost", &EndpointConfig::default()))?;
    }
    Ok(Arc::new(client))
}

pub fn run_ping(client: &Client) -> Result<PingOutput> {
    let endpoint = client.default_endpoint()?;
    let result = client.ping(&PingQuery::new())?;
    Ok(PingOutput {
        endpoint: endpoint.base_uri().unwrap_or_else(|_| endpoint.server_uri()),
        status: result.status.unwrap_or_else(|| "unknown".to_string()),
        q_time: result.header.q_time,
    })
}

fn select_query(args: &SelectArgs) -> Result<SelectQuery> {
    let mut query = SelectQuery::new();
    query.set_query(args.query.as_str()).set_rows(args.rows).set_start(args.start);
    if !args.fields.is_empty() {
        query.set_fields(args.fields.iter().map(String::as_str));
    }
    for (field, order) in &args.sort {
        query.add_sort(field.as_str(), *order);
    }
    for (i, fq) in args.filter_queries.iter().enumerate() {
        query.create_filter_query(format!("fq{i}"), fq.as_str())?;
    }
    for field in &args.facet_field {
        query.facet_set().create_facet_field(field.as_str())?.set_field(field.as_str());
    }
    Ok(query)
}

/// Search; with `--all` every matching document is fetched in pages of
/// `rows` documents and facets are not collected.
pub fn run_select(client: &Arc<Client>, args: &SelectArgs) -> Result<SelectOutput> {
    let start_time = Instant::now();
    let query = select_query(args)?;

    if args.all {
        let mut iterator = PrefetchIterator::new(Arc::clone(client), query).with_prefetch(args.rows.max(1))?;
        let num_found = iterator.num_found()?;
        let documents = iterator
            .map(|doc| doc.map(|d| d.to_json()))
            .collect::<Result<Vec<_>>>()?;
        info!(documents = documents.len(), "Fetched all matching documents");
        return Ok(SelectOutput {
            num_found,
            start: args.start,
            max_score: None,
            documents,
            facets: Vec::new(),
            duration_ms: start_time.elapsed().as_millis() as u64,
        });
    }

    let result = client.select(&query)?;
    let facets = args
        .facet_field
        .iter()
        .map(|field| FacetOutput {
            field: field.clone(),
            values: result
                .facet_set()
                .facet(field)
                .and_then(|f| f.as_field())
                .map(|f| f.values().to_vec())
                .unwrap_or_default(),
        })
        .collect();
    Ok(SelectOutput {
        num_found: result.num_found(),
        start: result.start(),
        max_score: result.max_score(),
        documents: result.iter().map(|d| d.to_json()).collect(),
        facets,
        duration_ms: start_time.elapsed().as_millis() as u64,
    })
}

/// Index a document file in batches of `batch_size` documents.
pub fn run_add(client: &Arc<Client>, args: &AddArgs) -> Result<AddOutput> {
    let start_time = Instant::now();
    let mut buffer = BufferedAdd::new(Arc::clone(client)).with_buffer_size(args.batch_size)?;
    buffer
        .set_commit_within(args.commit_within)
        .set_request_format(args.request_format.into());

    let mut documents_added = 0;
    let mut requests = 0;
    let path = args.document_file.display();
    let documents =
        convert_file(&args.document_file).with_context(|| format!("Failed to read documents from {path}"))?;
    for document in documents {
        let document = document.with_context(|| format!("Invalid document in {path}"))?;
        if buffer.add_document(document)?.is_some() {
            requests += 1;
            debug!(documents = documents_added + 1, "Sent batch");
        }
        documents_added += 1;
    }

    if args.should_commit() {
        buffer.commit()?;
        requests += 1;
    } else if buffer.flush()?.is_some() {
        requests += 1;
    }

    let duration = start_time.elapsed();
    let docs_per_second = if duration.as_secs_f64() > 0.0 {
        documents_added as f64 / duration.as_secs_f64()
    } else {
        0.0
    };
    info!(documents = documents_added, requests, "Indexed document file");
    Ok(AddOutput {
        documents_added,
        requests,
        committed: args.should_commit(),
        duration_ms: duration.as_millis() as u64,
        docs_per_second,
    })
}

pub fn run_delete(client: &Client, args: &DeleteArgs) -> Result<DeleteOutput> {
    if args.ids.is_empty() && args.queries.is_empty() {
        return Err(SolriumError::invalid_argument("Nothing to delete"));
    }
    let mut update = UpdateQuery::new();
    if !args.ids.is_empty() {
        update.add_delete_by_ids(args.ids.iter().map(String::as_str));
    }
    for query in &args.queries {
        update.add_delete_by_query(query.as_str());
    }
    if args.should_commit() {
        update.add_commit();
    }
    let result = client.update(&update)?;
    Ok(DeleteOutput {
        ids: args.ids.len(),
        queries: args.queries.len(),
        committed: args.should_commit(),
        q_time: result.header.q_time,
    })
}

pub fn run_commit(client: &Client, args: &CommitArgs) -> Result<CommitOutput> {
    let mut update = UpdateQuery::new();
    update.add_commit_with(
        args.soft.then_some(true),
        args.no_wait_searcher.then_some(false),
        args.expunge_deletes.then_some(true),
    );
    let result = client.update(&update)?;
    Ok(CommitOutput {
        soft: args.soft,
        q_time: result.header.q_time,
    })
}

pub fn run_luke(client: &Client, args: &LukeArgs) -> Result<LukeOutput> {
    let mut query = LukeQuery::new();
    query.set_show(args.show.into());
    if !args.fields.is_empty() {
        query.set_fields(args.fields.iter().map(String::as_str));
    }
    if let Some(num_terms) = args.num_terms {
        query.set_num_terms(num_terms);
    }
    let result = client.luke(&query)?;
    let index = result.index.as_ref();
    Ok(LukeOutput {
        num_docs: index.map(|i| i.num_docs),
        max_doc: index.map(|i| i.max_doc),
        deleted_docs: index.map(|i| i.deleted_docs),
        segment_count: index.and_then(|i| i.segment_count),
        fields: result
            .fields
            .iter()
            .map(|f| FieldOutput {
                name: f.name.clone(),
                field_type: f.field_type.clone(),
                docs: f.docs,
                distinct: f.distinct,
                top_terms: f.top_terms.clone(),
            })
            .collect(),
    })
}

pub fn run_cores(client: &Client, args: &CoresArgs) -> Result<CoresOutput> {
    let result = client.core_admin(&CoreAdminQuery::status(args.core.as_deref()))?;
    Ok(CoresOutput {
        cores: result
            .cores
            .into_iter()
            .map(|core| CoreOutput {
                name: core.name,
                instance_dir: core.instance_dir,
                num_docs: core.num_docs,
                max_doc: core.max_doc,
                size_in_bytes: core.size_in_bytes,
                uptime_ms: core.uptime,
            })
            .collect(),
    })
}
