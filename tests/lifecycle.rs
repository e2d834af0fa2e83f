//! End-to-end lifecycle against an in-memory SWAPI server.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use swapi_provider::config::{ConfigParser, Manifest};
use swapi_provider::error::{ApiError, SwapiError};
use swapi_provider::planner::{ActionType, DiffEngine, Plan, PlanExecutor};
use swapi_provider::provider::{ProviderConfig, ProviderContext, SwapiProvider};
use swapi_provider::state::{LocalStateStore, Operation, ProviderState, StateStore};
use swapi_provider::swapi::Planet;
use tempfile::TempDir;
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Planets held by the fake server, keyed by id.
#[derive(Clone, Default)]
struct FakeSwapi {
    planets: Arc<Mutex<BTreeMap<String, Planet>>>,
    next_id: Arc<Mutex<u32>>,
}

impl FakeSwapi {
    fn insert(&self, planet: Planet) {
        self.planets
            .lock()
            .unwrap()
            .insert(planet.id.clone(), planet);
    }

    fn names(&self) -> Vec<String> {
        self.planets
            .lock()
            .unwrap()
            .values()
            .map(|p| p.name.clone())
            .collect()
    }
}

impl Respond for FakeSwapi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if request.headers.get("api-key").and_then(|v| v.to_str().ok()) != Some("secret") {
            return ResponseTemplate::new(401);
        }

        let id = request
            .url
            .path()
            .strip_prefix("/v1/planets/")
            .map(str::to_string);
        let mut planets = self.planets.lock().unwrap();

        match (request.method.as_str(), id) {
            ("GET", Some(id)) => planets
                .get(&id)
                .map_or_else(|| ResponseTemplate::new(404), |p| ResponseTemplate::new(200).set_body_json(p)),
            ("GET", None) => {
                let name = request
                    .url
                    .query_pairs()
                    .find(|(k, _)| k == "name")
                    .map(|(_, v)| v.into_owned())
                    .unwrap_or_default();
                let matches: Vec<&Planet> = planets.values().filter(|p| p.name == name).collect();
                ResponseTemplate::new(200).set_body_json(matches)
            }
            ("POST", None) => {
                let Ok(mut planet) = serde_json::from_slice::<Planet>(&request.body) else {
                    return ResponseTemplate::new(422);
                };
                if planet.name.is_empty() {
                    return ResponseTemplate::new(422);
                }
                if planet.id.is_empty() {
                    let mut next = self.next_id.lock().unwrap();
                    *next += 1;
                    planet.id = next.to_string();
                }
                planets.insert(planet.id.clone(), planet.clone());
                ResponseTemplate::new(200).set_body_json(planet)
            }
            ("DELETE", Some(id)) => {
                if planets.remove(&id).is_some() {
                    ResponseTemplate::new(204)
                } else {
                    ResponseTemplate::new(404)
                }
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

async fn start_fake() -> (MockServer, FakeSwapi) {
    let server = MockServer::start().await;
    let fake = FakeSwapi::default();
    *fake.next_id.lock().unwrap() = 100;

    Mock::given(path_regex("^/v1/planets(/.*)?$"))
        .respond_with(fake.clone())
        .mount(&server)
        .await;

    (server, fake)
}

fn configure(server: &MockServer) -> ProviderContext {
    let config = ProviderConfig {
        endpoint: Some(format!("{}/v1", server.uri())),
        api_key: None,
    };
    SwapiProvider::new("test")
        .configure_with(&config, |name: &str| {
            (name == "SWAPI_APIKEY").then(|| String::from("secret"))
        })
        .expect("provider should configure")
}

fn manifest(yaml: &str) -> Manifest {
    ConfigParser::new()
        .parse_yaml(yaml, None)
        .expect("manifest should parse")
}

fn plan(manifest: &Manifest, state: &ProviderState) -> Plan {
    let diff = DiffEngine::new().compute_diff(manifest, state);
    Plan::from_diff(&diff, manifest, state)
}

#[tokio::test]
async fn test_full_lifecycle() {
    let (server, fake) = start_fake().await;
    let context = configure(&server);
    let resource = context.planet_resource();
    let executor = PlanExecutor::new(&resource);

    let dir = TempDir::new().expect("temp dir");
    let store = LocalStateStore::beside(dir.path());

    // Create.
    let desired = manifest(
        "planets:\n  hoth:\n    name: Hoth\n    diameter: 7200\n    population: 0\n",
    );
    let mut state = store.load_or_default().await.expect("load");
    let created = plan(&desired, &state);
    assert_eq!(created.count(ActionType::Create), 1);

    let result = executor.execute(&created, &mut state).await;
    assert!(result.all_successful(), "{result}");
    tokio_test::assert_ok!(store.save(&state).await);

    let mut state = store.load().await.expect("load").expect("state saved");
    let hoth = &state.get("hoth").expect("hoth recorded").attributes;
    assert_eq!(hoth.known_id(), Some("101"));
    assert_eq!(hoth.diameter, Some(7200));
    assert!(plan(&desired, &state).is_empty());

    // Import a planet created elsewhere.
    fake.insert(Planet {
        id: String::from("7"),
        name: String::from("Tatooine"),
        diameter: Some(10465),
        population: Some(200_000),
    });
    let imported = executor
        .import("tatooine", "7", &mut state)
        .await
        .expect("import");
    assert_eq!(imported.name, "Tatooine");
    assert_eq!(state.history.last().map(|h| h.operation), Some(Operation::Import));

    // Look it up through the data source.
    let lookup = context
        .planet_data_source()
        .read(&manifest("data:\n  t:\n    name: Tatooine\n").data["t"].to_model())
        .await
        .expect("lookup");
    assert_eq!(lookup.id.as_deref(), Some("7"));

    // Renaming replaces; dropping tatooine from the manifest deletes it.
    let renamed = manifest("planets:\n  hoth:\n    name: Hoth II\n");
    let changes = plan(&renamed, &state);
    let order: Vec<ActionType> = changes.changes().map(|a| a.action_type).collect();
    assert_eq!(order, vec![ActionType::Delete, ActionType::Replace]);

    let result = executor.execute(&changes, &mut state).await;
    assert!(result.all_successful(), "{result}");
    assert_eq!(fake.names(), vec![String::from("Hoth II")]);
    assert_eq!(state.labels(), vec!["hoth"]);
    assert_eq!(
        state.get("hoth").and_then(|r| r.attributes.known_id()),
        Some("102")
    );

    // Destroy.
    let result = executor.execute(&Plan::destroy(&state), &mut state).await;
    assert!(result.all_successful(), "{result}");
    assert!(state.is_empty());
    assert!(fake.names().is_empty());

    // Deleted planets are gone from the server too.
    let err = context.api().read_planet_by_id("102").await.unwrap_err();
    assert!(matches!(
        err,
        SwapiError::Api(ApiError::Remote { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_failed_apply_keeps_completed_work() {
    let (server, fake) = start_fake().await;
    let context = configure(&server);
    let resource = context.planet_resource();

    let desired = manifest("planets:\n  a:\n    name: Alderaan\n  b:\n    name: ''\n");
    let mut state = ProviderState::new();
    let result = PlanExecutor::new(&resource)
        .with_continue_on_error(true)
        .execute(&plan(&desired, &state), &mut state)
        .await;

    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 1);
    assert!(result.results[1]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("422")));
    assert_eq!(state.labels(), vec!["a"]);
    assert_eq!(fake.names(), vec![String::from("Alderaan")]);
}

#[tokio::test]
async fn test_wrong_key_is_reported_by_status() {
    let (server, _fake) = start_fake().await;
    let config = ProviderConfig {
        endpoint: Some(format!("{}/v1", server.uri())),
        api_key: Some(String::from("wrong")),
    };
    let context = SwapiProvider::new("test")
        .configure_with(&config, |_: &str| None)
        .expect("provider should configure");

    let mut state = ProviderState::new();
    let err = PlanExecutor::new(&context.planet_resource())
        .import("hoth", "1", &mut state)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("401"));
    assert!(state.is_empty());
}
