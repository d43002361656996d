use super::*;
use shared::domain::PermissionLevel;

const FEED: &str = r#"
{"action":"PermissionUpdate","body":{"AIPermission":false,"Permission":"Granted"}}
{"action":"SendSimulationState","body":{"IsClient":false,"SimulationTime":"2024-05-01T08:00:00Z"}}

{"action":"UpdateTrainData","body":{"TrainID":7,"TrainSymbol":"ZLACWSP","BlockID":1501}}
{"action":"SetSignals","body":{}}
{"action":"UpdateTrainData","body":{"TrainID":8,"TrainSymbol":"MNYBA","BlockID":-1}}
"#;

#[test]
fn parse_keeps_non_empty_lines_in_order() {
    let script = Script::parse(FEED).expect("parse");
    assert_eq!(script.frames.len(), 5);
    assert!(script.frames[0].contains("PermissionUpdate"));
    assert!(script.frames[4].contains("MNYBA"));
    assert_eq!(script.count(MessageKind::UpdateTrainData), 2);
    assert_eq!(script.count(MessageKind::SetSignals), 1);
}

#[test]
fn parse_reports_the_bad_line() {
    let text = "{\"action\":\"SetSignals\",\"body\":{}}\n{\"action\":\"Teleport\",\"body\":{}}\n";
    let err = Script::parse(text).expect_err("unknown action");
    assert_eq!(err.to_string(), "line 2");
}

#[tokio::test]
async fn load_reads_a_file() {
    let file = tempfile::NamedTempFile::new().expect("tempfile");
    std::fs::write(file.path(), FEED).expect("write");
    let script = Script::load(file.path()).await.expect("load");
    assert_eq!(script.frames.len(), 5);
}

#[tokio::test]
async fn load_names_a_missing_file() {
    let err = Script::load(Path::new("/nonexistent/feed.jsonl"))
        .await
        .expect_err("missing");
    assert!(err.to_string().contains("/nonexistent/feed.jsonl"));
}

#[test]
fn permission_frame_decodes_back() {
    let frame = permission_frame(DispatcherPermission::rescinded()).expect("encode");
    match decode_frame(&frame).expect("decode") {
        InboundMessage::PermissionUpdate(update) => {
            assert_eq!(update.permission, PermissionLevel::Rescinded)
        }
        other => panic!("unexpected {other:?}"),
    }
}
