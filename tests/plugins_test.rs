mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use solrium::client::{Client, LOAD_BALANCER_PLUGIN};
    use solrium::document::Document;
    use solrium::endpoint::Endpoint;
    use solrium::event::{Event, EventKind};
    use solrium::plugin::{
        BufferedAdd, Customization, CustomizeRequest, LoadBalancer, LoadBalancerConfig, ParallelExecution,
        PostBigRequest, PrefetchIterator,
    };
    use solrium::query::{PingQuery, SelectQuery, SelectResult};

    use crate::common::{self, FakeSolr};

    fn two_endpoints(fake: &Arc<FakeSolr>) -> Client {
        let client = common::client(fake, "a");
        client
            .add_endpoint(Endpoint::builder("b").host("b.local").core("books").build())
            .unwrap();
        client
    }

    #[test]
    fn test_failover_emits_one_failure_per_unreachable_attempt() {
        let fake = FakeSolr::new();
        fake.take_down("a");
        let client = two_endpoints(&fake);
        let balancer = client
            .register_plugin(
                LOAD_BALANCER_PLUGIN,
                LoadBalancer::from_config(
                    LoadBalancerConfig::default()
                        .with_endpoint("a", 1)
                        .with_endpoint("b", 1)
                        .with_failover(true),
                ),
            )
            .unwrap();

        let failed_endpoints = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&failed_endpoints);
        client.events().subscribe(EventKind::EndpointFailure, move |event| {
            if let Event::EndpointFailure { endpoint, .. } = event {
                sink.lock().push(endpoint.to_string());
            }
        });

        let mut hit_unreachable = 0;
        for _ in 0..20 {
            let sent_before = fake.sent().len();
            let failures_before = failed_endpoints.lock().len();

            assert!(client.ping(&PingQuery::new()).unwrap().is_ok());
            assert_eq!(balancer.last_endpoint().as_deref(), Some("b"));

            let attempts_on_a = fake.sent()[sent_before..].iter().filter(|s| s.endpoint == "a").count();
            let new_failures = failed_endpoints.lock().len() - failures_before;
            assert!(attempts_on_a <= 1);
            assert_eq!(new_failures, attempts_on_a);
            hit_unreachable += attempts_on_a;
        }
        assert!(hit_unreachable > 0);
        assert!(failed_endpoints.lock().iter().all(|e| e == "a"));
    }

    #[test]
    fn test_buffered_add_flush_count() {
        for (documents, size) in [(7usize, 3usize), (6, 3), (1, 100), (10, 1)] {
            let fake = FakeSolr::new();
            let client = Arc::new(common::client(&fake, "local"));
            let flushes = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&flushes);
            client.events().subscribe(EventKind::BufferedAddPostFlush, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

            let mut buffer = BufferedAdd::new(Arc::clone(&client)).with_buffer_size(size).unwrap();
            for i in 0..documents {
                buffer
                    .add_document(Document::builder().field("id", i.to_string()).build())
                    .unwrap();
            }
            buffer.flush().unwrap();

            let expected = documents.div_ceil(size);
            assert_eq!(flushes.load(Ordering::SeqCst), expected, "{documents} documents, size {size}");
            assert_eq!(fake.sent_to("update").len(), expected);

            // Committing an empty remainder adds exactly one request.
            buffer.commit().unwrap();
            assert_eq!(fake.sent_to("update").len(), expected + 1);
        }
    }

    #[test]
    fn test_parallel_results_by_label() {
        let fake = FakeSolr::with_docs(vec![
            json!({"id": "1", "cat": "scifi"}),
            json!({"id": "2", "cat": "classic"}),
            json!({"id": "3", "cat": "scifi"}),
        ]);
        fake.take_down("b");
        let client = Arc::new(two_endpoints(&fake));

        let mut scifi = SelectQuery::new();
        scifi.set_query("cat:scifi");
        let mut classic = SelectQuery::new();
        classic.set_query("cat:classic");

        let mut parallel = ParallelExecution::with_threads(client, 3).unwrap();
        parallel
            .add_query("scifi", scifi)
            .add_query_on("unreachable", SelectQuery::new(), "b")
            .add_query("classic", classic);

        let mut results = parallel.execute();
        assert_eq!(results.labels(), vec!["scifi", "unreachable", "classic"]);
        assert!(results.get("unreachable").unwrap().as_ref().unwrap_err().is_transport());

        let scifi = SelectResult::try_from(results.take("scifi").unwrap().unwrap()).unwrap();
        assert_eq!(scifi.num_found(), 2);
        let classic = SelectResult::try_from(results.take("classic").unwrap().unwrap()).unwrap();
        assert_eq!(classic.num_found(), 1);
    }

    #[test]
    fn test_post_big_request() {
        let fake = FakeSolr::new();
        let client = common::client(&fake, "local");
        client
            .register_plugin("postbigrequest", PostBigRequest::new().with_max_query_string_length(200))
            .unwrap();

        let mut short = SelectQuery::new();
        short.set_query("id:1");
        client.select(&short).unwrap();

        let mut long = SelectQuery::new();
        long.set_query(vec!["title:solr"; 20].join(" OR "));
        client.select(&long).unwrap();

        let sent = fake.sent_to("select");
        assert_eq!(sent[0].method, "GET");
        assert_eq!(sent[1].method, "POST");
        assert!(sent[1].query_string.is_empty());
        assert!(sent[1].body.contains("q=title%3Asolr"));
    }

    #[test]
    fn test_customized_param_applies_once() {
        let fake = FakeSolr::new();
        let client = common::client(&fake, "local");
        let customizer = client.register_plugin("customize", CustomizeRequest::new()).unwrap();
        customizer
            .add_customization(Customization::param("debug", "debugQuery", "true"))
            .unwrap()
            .add_customization(Customization::header("trace", "X-Trace-Id", "42").persistent(true))
            .unwrap();

        client.select(&SelectQuery::new()).unwrap();
        client.select(&SelectQuery::new()).unwrap();

        let sent = fake.sent_to("select");
        assert!(sent[0].query_string.contains("debugQuery=true"));
        assert!(!sent[1].query_string.contains("debugQuery"));
        assert_eq!(customizer.customizations().len(), 1);
    }

    #[test]
    fn test_prefetch_walks_all_pages() {
        let docs = (0..23).map(|i| json!({"id": i.to_string()})).collect();
        let fake = FakeSolr::with_docs(docs);
        let client = Arc::new(common::client(&fake, "local"));

        let iterator = PrefetchIterator::new(client, SelectQuery::new()).with_prefetch(10).unwrap();
        let ids: Vec<String> = iterator
            .map(|d| d.unwrap().get_str("id").unwrap().to_string())
            .collect();

        assert_eq!(ids.len(), 23);
        assert_eq!(ids[22], "22");
        assert_eq!(fake.sent_to("select").len(), 3);
    }
}
