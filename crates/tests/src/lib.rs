//! # Integration Tests
//!
//! End-to-end propagation against mock consumer services.
//!
//! Covers:
//! - Contract snapshot tests
//! - Lifecycle flows: add, update fan-out, remove, destroy, refresh
//! - Retry behaviour of the dispatcher against a flaky consumer

#[cfg(test)]
mod contract_tests {
    use contracts::{resource_path, ConsumerRegistry, JobKind, SignedPayload};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_wire_convention() {
        assert_eq!(
            resource_path("provider_models", &"u1".into()),
            "/backend/api/resources/provider_models/u1"
        );
        assert_eq!(JobKind::Create.method().as_str(), "POST");
        assert_eq!(JobKind::Refresh.method().as_str(), "PUT");
        assert_eq!(JobKind::Delete.method().as_str(), "DELETE");
    }

    #[test]
    fn test_registry_is_persisted_as_array() {
        let registry: ConsumerRegistry =
            serde_json::from_str(r#"[{"service_uuid":"c1","realm_uuid":"r1"}]"#).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            serde_json::to_string(&registry).unwrap(),
            r#"[{"service_uuid":"c1","realm_uuid":"r1"}]"#
        );
    }

    #[test]
    fn test_signed_payload_snapshot() {
        let payload = SignedPayload {
            realm: "r1".into(),
            resource: r#"{"name":"Marta","uuid":"u1"}"#.into(),
            service: "s1".into(),
        };
        assert_eq!(
            String::from_utf8(payload.canonical_bytes().unwrap()).unwrap(),
            r#"{"realm":"r1","resource":"{\"name\":\"Marta\",\"uuid\":\"u1\"}","service":"s1"}"#
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ConsumerKey, HttpMethod, ProviderConfig, Registration, ResourceUuid,
        Resourceable, Transmissible,
    };
    use dispatcher::{Dispatcher, DispatcherConfig, QueueSnapshot, QueueSubmitter};
    use propagation::{
        build_envelope, verify_request, HttpTransport, JobExecutor, Propagator, Provider,
        ResourceAction, ResourceRoute, Signer, StaticDirectory,
    };
    use registry::MemoryStore;

    const SENDER: &str = "7a0c1d2e3f4a5b6c7d8e9f0a1b2c3d4e";
    const REALM: &str = "e75234809111012d05ac478a8af8d2ea";
    const SECRET: &str = "shared-secret";
    const JENNY: &str = "84e8a690b6e1012e744a6c626d58b44c";
    const JENNY_PATH: &str = "/backend/api/resources/provider_models/84e8a690b6e1012e744a6c626d58b44c";

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct ProviderModel {
        uuid: String,
        name: String,
        #[serde(default)]
        notes: String,
    }

    impl ProviderModel {
        fn new(name: &str) -> Self {
            Self {
                uuid: JENNY.to_string(),
                name: name.to_string(),
                notes: "internal only".to_string(),
            }
        }
    }

    impl Resourceable for ProviderModel {
        const RESOURCE_TYPE: &'static str = "provider_models";
        const TRANSMISSIBLE_FIELDS: &'static [&'static str] = &["name", "uuid"];

        fn uuid(&self) -> ResourceUuid {
            self.uuid.as_str().into()
        }
    }

    type Executor = JobExecutor<MemoryStore, StaticDirectory, HttpTransport>;
    type Models =
        Provider<ProviderModel, MemoryStore, StaticDirectory, HttpTransport, QueueSubmitter>;

    /// Full provider stack wired from a TOML config
    struct Harness {
        models: Models,
        executor: Arc<Executor>,
        dispatcher: Dispatcher,
    }

    fn config(consumers: &[(&str, &MockServer)]) -> ProviderConfig {
        let mut toml = format!(
            "[service]\nuuid = \"{SENDER}\"\n\n[queue]\nworkers = 2\nmax_attempts = 3\nretry_base_ms = 1\nretry_max_ms = 5\n\n[http]\ntimeout_ms = 2000\n"
        );
        for (uuid, server) in consumers {
            toml.push_str(&format!(
                "\n[[consumers]]\nuuid = \"{uuid}\"\nurl = \"{}\"\nsecret = \"{SECRET}\"\n",
                server.uri()
            ));
        }
        ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap()
    }

    impl Harness {
        fn new(consumers: &[(&str, &MockServer)]) -> Self {
            let config = config(consumers);
            let executor = Arc::new(JobExecutor::new(
                Arc::new(MemoryStore::new()),
                Arc::new(StaticDirectory::from_config(&config.consumers)),
                Arc::new(HttpTransport::new(&config.http).unwrap()),
                config.service.uuid.clone(),
            ));
            let dispatcher = Dispatcher::new(DispatcherConfig::from(&config.queue));
            let propagator = Arc::new(Propagator::new(
                Arc::clone(&executor),
                dispatcher.submitter(),
            ));
            Self {
                models: Provider::new(propagator),
                executor,
                dispatcher,
            }
        }

        fn queued(&self) -> u64 {
            self.dispatcher.metrics().enqueued()
        }

        /// Run every queued job to a terminal state
        async fn drain(self) -> QueueSnapshot {
            self.dispatcher
                .spawn(self.executor)
                .unwrap()
                .shutdown()
                .await
        }
    }

    fn jenny_uuid() -> ResourceUuid {
        JENNY.into()
    }

    fn expected_body(name: &str) -> serde_json::Value {
        let mut fields = Transmissible::new();
        fields.insert("name".into(), json!(name));
        fields.insert("uuid".into(), json!(JENNY));
        let envelope = build_envelope(
            &Signer::new(SECRET).unwrap(),
            &fields,
            &REALM.into(),
            &SENDER.into(),
        )
        .unwrap();
        serde_json::to_value(envelope).unwrap()
    }

    async fn requests(server: &MockServer) -> Vec<Request> {
        server.received_requests().await.unwrap_or_default()
    }

    /// Jenny renamed to Marta reaches the consumer as one signed PUT
    #[tokio::test]
    async fn test_e2e_rename_is_pushed() {
        let consumer = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(JENNY_PATH))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&consumer)
            .await;
        Mock::given(method("PUT"))
            .and(path(JENNY_PATH))
            .and(body_json(expected_body("Marta")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&consumer)
            .await;

        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        let registration = harness
            .models
            .add_consumer(&jenny_uuid(), &ConsumerKey::new("c1", REALM))
            .await
            .unwrap();
        assert_eq!(registration, Registration::Created);

        let queued = harness
            .models
            .update(&ProviderModel::new("Marta"))
            .await
            .unwrap();
        assert_eq!(queued, 1);
        assert!(requests(&consumer).await.is_empty());

        let snapshot = harness.drain().await;
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.failed + snapshot.dead, 0);
        consumer.verify().await;
    }

    /// Bodies verify with the consumer-side helpers and hide private fields
    #[tokio::test]
    async fn test_e2e_consumer_can_verify() {
        let consumer = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&consumer)
            .await;

        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        harness
            .models
            .add_consumer(&jenny_uuid(), &ConsumerKey::new("c1", REALM))
            .await
            .unwrap();
        harness.drain().await;

        let received = requests(&consumer).await;
        assert_eq!(received.len(), 1);

        let route = ResourceRoute::parse(HttpMethod::Post, received[0].url.path()).unwrap();
        assert_eq!(route.action, ResourceAction::Create);
        assert_eq!(route.klass, "provider_models");
        assert_eq!(route.uuid, JENNY);

        let envelope = verify_request(SECRET, &received[0].body).unwrap().unwrap();
        assert_eq!(envelope.service, SENDER);
        assert!(!envelope.resource.contains("internal only"));
        assert!(verify_request("wrong-secret", &received[0].body).unwrap().is_none());
    }

    /// Removal tells the consumer before returning; nothing is queued
    #[tokio::test]
    async fn test_e2e_remove_is_synchronous() {
        let consumer = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(JENNY_PATH))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&consumer)
            .await;

        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        let c1 = ConsumerKey::new("c1", REALM);
        harness.models.add_consumer(&jenny_uuid(), &c1).await.unwrap();
        assert_eq!(harness.queued(), 1);

        let outcome = harness.models.remove_consumer(&jenny_uuid(), &c1).await.unwrap();

        assert!(outcome.is_delivered());
        assert_eq!(harness.queued(), 1);
        let received = requests(&consumer).await;
        assert_eq!(received.len(), 1);
        assert!(received[0].body.is_empty());
        assert!(harness
            .models
            .find_consumer(&jenny_uuid(), &c1)
            .await
            .unwrap()
            .is_none());
    }

    /// Destroy notifies every consumer and clears state even when one fails
    #[tokio::test]
    async fn test_e2e_destroy_with_two_consumers() {
        let healthy = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&healthy)
            .await;
        let broken = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&broken)
            .await;

        let harness = Harness::new(&[("c1", &healthy), ("c2", &broken)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        for service in ["c1", "c2"] {
            harness
                .models
                .add_consumer(&jenny_uuid(), &ConsumerKey::new(service, REALM))
                .await
                .unwrap();
        }

        let outcomes = harness.models.destroy(&jenny_uuid()).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].outcome.is_delivered());
        assert!(!outcomes[1].outcome.is_delivered());
        assert!(harness.models.find(&jenny_uuid()).await.unwrap().is_none());
        healthy.verify().await;
        broken.verify().await;
    }

    /// Queued create jobs for a destroyed resource complete without a call
    #[tokio::test]
    async fn test_e2e_destroy_before_delivery() {
        let consumer = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&consumer)
            .await;

        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        harness
            .models
            .add_consumer(&jenny_uuid(), &ConsumerKey::new("c1", REALM))
            .await
            .unwrap();
        harness.models.destroy(&jenny_uuid()).await.unwrap();

        let snapshot = harness.drain().await;

        assert_eq!(snapshot.completed, 1);
        let received = requests(&consumer).await;
        assert!(received.iter().all(|r| r.method.as_str() == "DELETE"));
    }

    #[tokio::test]
    async fn test_e2e_update_without_consumers() {
        let consumer = MockServer::start().await;
        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();

        let queued = harness
            .models
            .update(&ProviderModel::new("Marta"))
            .await
            .unwrap();

        assert_eq!(queued, 0);
        assert_eq!(harness.queued(), 0);
        let snapshot = harness.drain().await;
        assert_eq!(snapshot.enqueued, 0);
        assert!(requests(&consumer).await.is_empty());
    }

    /// A flaky consumer is retried by the dispatcher until it accepts
    #[tokio::test]
    async fn test_e2e_retry_until_accepted() {
        let consumer = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&consumer)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&consumer)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&consumer)
            .await;

        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        let c1 = ConsumerKey::new("c1", REALM);
        harness.models.add_consumer(&jenny_uuid(), &c1).await.unwrap();
        let again = harness.models.add_consumer(&jenny_uuid(), &c1).await.unwrap();
        assert_eq!(again, Registration::AlreadyRegistered);

        let snapshot = harness.drain().await;

        assert_eq!(snapshot.enqueued, 2);
        assert_eq!(snapshot.completed, 2);
        assert_eq!(snapshot.retried, 1);
        let puts = requests(&consumer)
            .await
            .iter()
            .filter(|r| r.method.as_str() == "PUT")
            .count();
        assert_eq!(puts, 2);
    }

    /// A consumer that never recovers ends up dead after the configured attempts
    #[tokio::test]
    async fn test_e2e_unreachable_consumer_goes_dead() {
        let consumer = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&consumer)
            .await;

        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        harness
            .models
            .add_consumer(&jenny_uuid(), &ConsumerKey::new("c1", REALM))
            .await
            .unwrap();

        let snapshot = harness.drain().await;

        assert_eq!(snapshot.dead, 1);
        assert_eq!(snapshot.retried, 2);
        consumer.verify().await;
    }

    /// Refresh re-pushes only to registered consumers
    #[tokio::test]
    async fn test_e2e_refresh() {
        let consumer = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(body_json(expected_body("Jenny")))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&consumer)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&consumer)
            .await;

        let harness = Harness::new(&[("c1", &consumer)]);
        harness.models.create(&ProviderModel::new("Jenny")).await.unwrap();
        let unknown = harness
            .models
            .refresh_consumer(&jenny_uuid(), &ConsumerKey::new("c1", REALM))
            .await
            .unwrap();
        assert!(unknown.is_none());
        assert!(harness.models.consumers(&jenny_uuid()).await.unwrap().is_empty());

        let c1 = ConsumerKey::new("c1", REALM);
        harness.models.add_consumer(&jenny_uuid(), &c1).await.unwrap();
        assert!(harness
            .models
            .refresh_consumer(&jenny_uuid(), &c1)
            .await
            .unwrap()
            .is_some());

        let snapshot = harness.drain().await;
        assert_eq!(snapshot.completed, 2);
        consumer.verify().await;
    }
}
