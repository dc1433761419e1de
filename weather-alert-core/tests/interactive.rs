mod common;

use common::*;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use weather_alert_core::{
    InteractiveLoop, LineReader, LoopExit, Notifier, OpenMeteoClient, PlainConsole,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn run_script(server: &MockServer, inputs: &[&str]) -> (LoopExit, Arc<ScriptedConsole>) {
    let console = ScriptedConsole::with_inputs(inputs);
    let notifier = notifier(&settings(server), console.clone());

    let exit = tokio::time::timeout(
        Duration::from_secs(5),
        InteractiveLoop::new(notifier, CancellationToken::new()).run(),
    )
    .await
    .expect("loop should finish on exit");

    (exit, console)
}

async fn expect_no_requests(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn check_command_alerts_for_entered_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "10"))
        .and(query_param("longitude", "22.2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(hourly_body(next_hour(), 20.0)))
        .expect(1)
        .mount(&server)
        .await;

    let (exit, console) = run_script(&server, &["check", "10", "22.2", "exit"]).await;

    assert_eq!(exit, LoopExit::Terminate);
    assert_eq!(console.count("Grab an umbrella"), 1);
    assert_eq!(console.count("[CUSTOM UPDATE] Checking custom location precipitation..."), 1);
    assert_eq!(console.prompts(), vec!["> ", "> Enter Latitude: ", "> Enter Longitude: ", "> "]);
    assert_eq!(console.logs().last().map(String::as_str), Some("Exiting app..."));
}

#[tokio::test]
async fn check_command_without_rain_does_not_alert() {
    let server = MockServer::start().await;
    mount_forecast(&server, 200, hourly_body(next_hour(), 10.0)).await;

    let (_, console) = run_script(&server, &["check", "10", "22.2", "exit"]).await;

    assert_eq!(console.count("Grab an umbrella"), 0);
    assert_eq!(console.count("No precipitation warnings"), 1);
}

#[tokio::test]
async fn invalid_latitude_aborts_before_longitude_prompt() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let (exit, console) = run_script(&server, &["check", "north", "exit"]).await;

    assert_eq!(exit, LoopExit::Terminate);
    assert_eq!(console.count("Latitude should be a number"), 1);
    assert!(!console.prompts().iter().any(|p| p.contains("Longitude")));
    assert_eq!(console.count("[CUSTOM UPDATE]"), 0);
}

#[tokio::test]
async fn invalid_longitude_aborts_check() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let (_, console) = run_script(&server, &["check", "10", "22,2", "exit"]).await;

    assert_eq!(console.count("Longitude should be a number"), 1);
    assert_eq!(console.count("[CUSTOM UPDATE]"), 0);
}

#[tokio::test]
async fn help_is_printed_on_start_and_on_request() {
    let server = MockServer::start().await;

    let (_, console) = run_script(&server, &["help", "exit"]).await;

    assert_eq!(console.count("Type 'check'"), 2);
}

#[tokio::test]
async fn unknown_commands_are_ignored_silently() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;

    let (exit, console) = run_script(&server, &["weather", "", "CHECK", "exit"]).await;

    assert_eq!(exit, LoopExit::Terminate);
    assert_eq!(console.logs().len(), 2, "only help and the exit message: {:?}", console.logs());
    assert_eq!(console.prompts().len(), 4);
}

#[tokio::test]
async fn cancellation_while_waiting_for_command_ends_loop() {
    let server = MockServer::start().await;
    let console = ScriptedConsole::with_inputs(&[]);
    let token = CancellationToken::new();

    let task = tokio::spawn(
        InteractiveLoop::new(notifier(&settings(&server), console.clone()), token.clone()).run(),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();

    let exit =
        tokio::time::timeout(Duration::from_secs(5), task).await.expect("stops").expect("join");
    assert_eq!(exit, LoopExit::Cancelled);
}

#[tokio::test]
async fn cancellation_during_check_skips_the_fetch() {
    let server = MockServer::start().await;
    expect_no_requests(&server).await;
    let console = ScriptedConsole::with_inputs(&["check"]);
    let token = CancellationToken::new();

    let task = tokio::spawn(
        InteractiveLoop::new(notifier(&settings(&server), console.clone()), token.clone()).run(),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(console.prompts().last().map(String::as_str), Some("> Enter Latitude: "));
    token.cancel();

    let exit =
        tokio::time::timeout(Duration::from_secs(5), task).await.expect("stops").expect("join");
    assert_eq!(exit, LoopExit::Cancelled);
}

#[tokio::test]
async fn closed_input_waits_for_cancellation() {
    let server = MockServer::start().await;
    let settings = settings(&server);
    let console = Arc::new(PlainConsole::new(Vec::new(), LineReader::closed()));
    let client = OpenMeteoClient::from_settings(&settings).expect("client");
    let notifier = Arc::new(Notifier::new(Arc::new(client), console, settings.warning_policy()));
    let token = CancellationToken::new();

    let task = tokio::spawn(InteractiveLoop::new(notifier, token.clone()).run());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!task.is_finished(), "loop should idle instead of spinning out");

    token.cancel();
    let exit =
        tokio::time::timeout(Duration::from_secs(5), task).await.expect("stops").expect("join");
    assert_eq!(exit, LoopExit::Cancelled);
}
