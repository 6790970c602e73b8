//! End-to-end runs of the catalog workflow against a scripted model.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use uiforge_core::llm::{self, ContentBlock, MessageContent};
use uiforge_core::server::{self, AppState, GenerateCodeResponse};
use uiforge_core::tools::{
    GET_ALL_COMPONENTS_METADATA, GET_COMPONENTS_DOCS_BATCH, SELECT_COMPONENTS,
};
use uiforge_core::{
    ConversationEngine, EngineSettings, LlmError, LlmProvider, PricingModel, ToolRegistry,
};
use uiforge_test_utils::provider::{response, text_response, tool_response};
use uiforge_test_utils::tracing_setup::init_test_tracing;
use uiforge_test_utils::{CatalogFixture, ScriptedProvider, TestConfigBuilder};

const FINAL_ANSWER: &str = "Here is the screen.\n```jsx\nimport { VStack } from './vstack';\nimport { Button } from './button';\n\nexport default function Login() {\n  return (\n    <VStack className=\"p-4\">\n      <Button>Sign in</Button>\n    </VStack>\n  );\n}\n```";

fn workflow_script() -> ScriptedProvider {
    ScriptedProvider::new()
        .then_respond(tool_response("toolu_meta", GET_ALL_COMPONENTS_METADATA, json!({}), 900, 40))
        .then_respond(tool_response(
            "toolu_select",
            SELECT_COMPONENTS,
            json!({"selectedComponents": ["button", "vstack"]}),
            1300,
            60,
        ))
        .then_respond(tool_response(
            "toolu_docs",
            GET_COMPONENTS_DOCS_BATCH,
            json!({"componentNames": ["button", "vstack"]}),
            1500,
            50,
        ))
        .then_respond(text_response(FINAL_ANSWER, 2300, 400))
}

fn generate_request(query: &str) -> Request<Body> {
    Request::post("/api/generate-code")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn tool_result(content: &MessageContent) -> (&str, &str) {
    match content {
        MessageContent::Blocks(blocks) => match blocks.as_slice() {
            [ContentBlock::ToolResult {
                tool_use_id,
                content,
            }] => (tool_use_id.as_str(), content.as_str()),
            other => panic!("expected one tool result, got {other:?}"),
        },
        MessageContent::Text(text) => panic!("expected blocks, got text {text:?}"),
    }
}

#[tokio::test]
async fn test_three_tool_workflow() {
    init_test_tracing();
    let fixture = CatalogFixture::design_system();
    let provider = Arc::new(workflow_script());
    let engine = ConversationEngine::new(
        provider.clone(),
        Arc::new(ToolRegistry::for_catalog(fixture.catalog())),
        EngineSettings {
            max_turns: Some(8),
            ..Default::default()
        },
    );

    let outcome = engine.run("a login screen").await.unwrap();
    assert_eq!(outcome.final_text, FINAL_ANSWER);
    assert_eq!(outcome.state.api_call_count, 4);
    assert_eq!(outcome.state.total_input_tokens, 900 + 1300 + 1500 + 2300);
    assert_eq!(outcome.state.total_output_tokens, 40 + 60 + 50 + 400);
    assert_eq!(provider.remaining(), 0);

    // query + (assistant replay, tool result) per tool call
    let messages = &outcome.state.messages;
    assert_eq!(messages.len(), 7);

    let (id, metadata) = tool_result(&messages[2].content);
    assert_eq!(id, "toolu_meta");
    let metadata: serde_json::Value = serde_json::from_str(metadata).unwrap();
    assert_eq!(metadata["button"]["title"], "Button");
    assert_eq!(metadata["input"]["description"], "Single-line text field");
    assert_eq!(metadata.as_object().unwrap().len(), 3);

    let (id, selection) = tool_result(&messages[4].content);
    assert_eq!(id, "toolu_select");
    assert_eq!(
        selection,
        "You have selected: button, vstack. Now proceed to get full documentation for ALL these components at once using get_components_docs_batch."
    );

    let (id, docs) = tool_result(&messages[6].content);
    assert_eq!(id, "toolu_docs");
    let docs: serde_json::Value = serde_json::from_str(docs).unwrap();
    assert_eq!(docs["button"], fixture.read("button.md"));
    assert_eq!(docs["vstack"], fixture.read("vstack.md"));
    assert!(docs.get("input").is_none());

    // Every request offered all three tools and the system prompt
    for request in provider.requests() {
        assert_eq!(request.tools.len(), 3);
        assert!(request.system.is_some());
    }

    let usage = outcome.usage(&PricingModel::default());
    assert_eq!(usage.api_calls, 4);
    assert_eq!(usage.total_tokens, 6000 + 550);
}

#[tokio::test]
async fn test_docs_for_unknown_component_degrade() {
    let fixture = CatalogFixture::design_system();
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_respond(tool_response(
                "toolu_docs",
                GET_COMPONENTS_DOCS_BATCH,
                json!({"componentNames": ["button", "carousel"]}),
                10,
                10,
            ))
            .then_respond(text_response("```jsx\n<Button />\n```", 10, 10)),
    );
    let engine = ConversationEngine::new(
        provider,
        Arc::new(ToolRegistry::for_catalog(fixture.catalog())),
        EngineSettings::default(),
    );

    let outcome = engine.run("a carousel").await.unwrap();
    let (_, docs) = tool_result(&outcome.state.messages[2].content);
    let docs: serde_json::Value = serde_json::from_str(docs).unwrap();
    assert_eq!(docs["button"], fixture.read("button.md"));
    assert_eq!(docs["carousel"], "Documentation not found for component: carousel");
}

#[tokio::test]
async fn test_malformed_tool_input_fails_request() {
    let fixture = CatalogFixture::design_system();
    let config = TestConfigBuilder::new()
        .catalog_dir(fixture.path())
        .development()
        .build();
    let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::new().then_respond(response(
        vec![ContentBlock::tool_use(
            "toolu_select",
            SELECT_COMPONENTS,
            json!({"selected": "button"}),
        )],
        10,
        10,
    )));
    let app = server::router(Arc::new(AppState::from_config(&config, Some(provider)).unwrap()));

    let req = Request::post("/api/generate-code")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"query": "a login screen"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let err: server::ErrorResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(err.error, "Failed to generate code");
    assert!(err.detail.unwrap().contains("selectedComponents"));
}

#[tokio::test]
async fn test_generate_endpoint_runs_full_workflow() {
    init_test_tracing();
    let fixture = CatalogFixture::design_system();
    let config = TestConfigBuilder::new()
        .catalog_dir(fixture.path())
        .pricing(1.0, 2.0)
        .build();
    let provider = Arc::new(workflow_script());
    let state =
        AppState::from_config(&config, Some(provider.clone() as Arc<dyn LlmProvider>)).unwrap();
    let app = server::router(Arc::new(state));

    let req = Request::post("/api/generate-code")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"query": "a login screen"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let result: GenerateCodeResponse = serde_json::from_slice(&body).unwrap();
    assert!(result.success);
    assert!(result.code.starts_with("import { VStack } from './vstack';"));
    assert!(result.code.ends_with('}'));
    assert!(!result.code.contains("```"));

    let mut components = result.available_components.clone();
    components.sort();
    assert_eq!(components, vec!["button", "input", "vstack"]);

    assert_eq!(result.token_usage.api_calls, 4);
    assert_eq!(result.token_usage.input_tokens, 6000);
    assert_eq!(result.token_usage.output_tokens, 550);
    assert_eq!(result.token_usage.estimated_cost, 6.0 + 1.1);
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test]
async fn test_generate_endpoint_stops_at_turn_limit() {
    let fixture = CatalogFixture::design_system();
    let config = TestConfigBuilder::new()
        .catalog_dir(fixture.path())
        .max_turns(2)
        .development()
        .build();
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_respond(tool_response("toolu_1", GET_ALL_COMPONENTS_METADATA, json!({}), 10, 10))
            .then_respond(tool_response("toolu_2", GET_ALL_COMPONENTS_METADATA, json!({}), 10, 10))
            .then_respond(tool_response("toolu_3", GET_ALL_COMPONENTS_METADATA, json!({}), 10, 10)),
    );
    let state =
        AppState::from_config(&config, Some(provider.clone() as Arc<dyn LlmProvider>)).unwrap();
    let app = server::router(Arc::new(state));

    let resp = app.oneshot(generate_request("a login screen")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err: server::ErrorResponse = read_json(resp).await;
    assert_eq!(err.error, "Failed to generate code");
    assert!(err.detail.unwrap().contains("exceeded 2 model requests"));
    assert_eq!(provider.call_count(), 2);
    assert_eq!(provider.remaining(), 1);
}

#[tokio::test]
async fn test_provider_failure_mid_workflow_is_not_retried() {
    let fixture = CatalogFixture::design_system();
    let config = TestConfigBuilder::new()
        .catalog_dir(fixture.path())
        .development()
        .build();
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_respond(tool_response(
                "toolu_meta",
                GET_ALL_COMPONENTS_METADATA,
                json!({}),
                10,
                10,
            ))
            .then_fail(LlmError::RateLimited {
                retry_after_secs: 30,
            })
            .then_respond(text_response(FINAL_ANSWER, 10, 10)),
    );
    let state =
        AppState::from_config(&config, Some(provider.clone() as Arc<dyn LlmProvider>)).unwrap();
    let app = server::router(Arc::new(state));

    let resp = app.oneshot(generate_request("a login screen")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let err: server::ErrorResponse = read_json(resp).await;
    assert!(err.detail.unwrap().contains("retry after 30s"));
    assert_eq!(provider.call_count(), 2);
    assert_eq!(provider.remaining(), 1);
}

#[tokio::test]
async fn test_generate_honours_catalog_and_model_settings() {
    let fixture = CatalogFixture::new()
        .with_file("card.mdx", "---\ntitle: Card\ndescription: Surface container\n---\n# Card\n")
        .with_file("button.md", "---\ntitle: Button\n---\n");
    let config = TestConfigBuilder::new()
        .catalog_dir(fixture.path())
        .catalog_extension("mdx")
        .code_language("tsx")
        .model("claude-custom")
        .build();
    let provider = Arc::new(
        ScriptedProvider::new()
            .then_respond(tool_response(
                "toolu_docs",
                GET_COMPONENTS_DOCS_BATCH,
                json!({"componentNames": ["card"]}),
                10,
                10,
            ))
            .then_respond(text_response(
                "```jsx\n<div />\n```\n```tsx\n<Card className=\"p-4\" />\n```",
                10,
                10,
            )),
    );
    let state =
        AppState::from_config(&config, Some(provider.clone() as Arc<dyn LlmProvider>)).unwrap();

    let engine = state.engine.as_ref().unwrap();
    assert_eq!(engine.settings().model, "claude-custom");
    assert!(engine.settings().system_prompt.contains("```tsx fenced block"));
    assert_eq!(engine.tools().len(), 3);

    let app = server::router(Arc::new(state));
    let resp = app.oneshot(generate_request("a card")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let result: GenerateCodeResponse = read_json(resp).await;
    assert_eq!(result.code, "<Card className=\"p-4\" />");
    assert_eq!(result.available_components, vec!["card"]);

    let requests = provider.requests();
    assert!(requests.iter().all(|r| r.model == "claude-custom"));
    let (_, docs) = tool_result(&requests[1].messages[2].content);
    assert!(docs.contains("# Card"));
}

#[tokio::test]
async fn test_generate_requires_identity_when_configured() {
    let fixture = CatalogFixture::design_system();
    let config = TestConfigBuilder::new()
        .catalog_dir(fixture.path())
        .require_identity(true)
        .build();
    let provider =
        Arc::new(ScriptedProvider::new().then_respond(text_response(FINAL_ANSWER, 10, 10)));
    let state =
        AppState::from_config(&config, Some(provider.clone() as Arc<dyn LlmProvider>)).unwrap();
    let app = server::router(Arc::new(state));

    let resp = app
        .clone()
        .oneshot(generate_request("a login screen"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.call_count(), 0);

    let mut req = generate_request("a login screen");
    req.headers_mut()
        .insert("x-user-email", "ada@example.com".parse().unwrap());
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn test_provider_created_only_with_api_key() {
    let config = TestConfigBuilder::new()
        .api_key("sk-test")
        .model("claude-custom")
        .build();
    let provider = llm::create_provider(&config.llm).unwrap();
    assert_eq!(provider.name(), "Anthropic");

    assert!(llm::create_provider(&TestConfigBuilder::new().build().llm).is_none());
}
