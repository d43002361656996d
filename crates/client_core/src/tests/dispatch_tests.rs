use super::*;
use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{BlockId, TrainId},
    protocol::{DispatcherPermission, InboundMessage, MessageKind, SimulationState, TrainData},
};
use url::Url;

use crate::{
    cancel::CancelSignal,
    columns::Column,
    filter::TerritoryFilter,
    gazetteer::Gazetteer,
    transport::{DuplexChannel, Frame},
    view::{NullObserver, SortDirection, SortKey},
};

struct Replay {
    frames: VecDeque<String>,
}

#[async_trait]
impl DuplexChannel for Replay {
    async fn send_text(&mut self, _text: String) -> Result<(), SessionError> {
        Ok(())
    }

    async fn recv_frame(&mut self) -> Result<Frame, SessionError> {
        self.frames
            .pop_front()
            .map(Frame::Text)
            .ok_or(SessionError::ChannelClosed)
    }

    async fn abort(&mut self) {}
}

struct ReplayConnector(Mutex<Option<Replay>>);

#[async_trait]
impl Connector for ReplayConnector {
    type Channel = Replay;

    async fn open(&self, _url: &Url) -> Result<Replay, SessionError> {
        self.0
            .lock()
            .expect("replay lock")
            .take()
            .ok_or(SessionError::ChannelClosed)
    }
}

fn session(messages: Vec<InboundMessage>) -> TransportSession<ReplayConnector> {
    let frames = messages
        .iter()
        .map(|message| message.encode().expect("encode"))
        .collect();
    TransportSession::with_connector(
        ReplayConnector(Mutex::new(Some(Replay { frames }))),
        CancelSignal::never(),
    )
}

fn train(id: u32) -> InboundMessage {
    train_at(id, 1501)
}

fn train_at(id: u32, block: i32) -> InboundMessage {
    let mut data = TrainData::new(TrainId(id));
    data.symbol = format!("S{id}");
    data.block = BlockId(block);
    InboundMessage::TrainData(data)
}

fn heartbeat() -> InboundMessage {
    InboundMessage::SimulationState(SimulationState {
        is_client: false,
        simulation_time: Utc::now(),
    })
}

fn train_list() -> TrainList {
    TrainList::new(
        Gazetteer::default(),
        TerritoryFilter::default(),
        SortKey::ascending(Column::Symbol),
    )
}

#[tokio::test]
async fn revoked_permission_stops_dispatch_after_three_trains() {
    let mut session = session(vec![
        InboundMessage::PermissionUpdate(DispatcherPermission::granted()),
        train(1),
        InboundMessage::Ignored(MessageKind::SetOccupiedBlocks),
        train(2),
        train(3),
        InboundMessage::PermissionUpdate(DispatcherPermission::rescinded()),
        train(4),
    ]);
    let mut list = train_list();

    let err = connect_and_run(
        &mut session,
        &ServiceEndpoint::for_host("localhost"),
        &mut list,
        &mut NullObserver,
    )
    .await;

    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(list.len(), 3);
    assert!(list.record(TrainId(4)).is_none());
}

#[tokio::test]
async fn heartbeats_reach_the_list() {
    let mut session = session(vec![
        InboundMessage::PermissionUpdate(DispatcherPermission::granted()),
        train(1),
        heartbeat(),
    ]);
    let mut list = train_list();

    let err = connect_and_run(
        &mut session,
        &ServiceEndpoint::for_host("localhost"),
        &mut list,
        &mut NullObserver,
    )
    .await;

    assert!(matches!(err, SessionError::ChannelClosed));
    assert!(list.simulation_time().is_some());
    assert_eq!(list.record(TrainId(1)).map(|r| r.age), Some(1));
}

#[tokio::test]
async fn failed_connect_dispatches_nothing() {
    let mut session = session(vec![train(1)]);
    let mut list = train_list();

    let err = connect_and_run(
        &mut session,
        &ServiceEndpoint::for_host("localhost"),
        &mut list,
        &mut NullObserver,
    )
    .await;

    assert!(matches!(err, SessionError::UnexpectedMessage { .. }));
    assert!(list.is_empty());
}

#[derive(Default)]
struct Refreshes {
    count: usize,
    filter_changes: usize,
}

impl ViewObserver for Refreshes {
    fn row_inserted(&mut self, _row: usize) {}

    fn row_removed(&mut self, _row: usize) {}

    fn cells_changed(&mut self, _row: usize, _columns: crate::columns::ColumnSet) {}

    fn reset(&mut self) {}

    fn clock_changed(&mut self, _time: DateTime<Utc>) {}

    fn filter_changed(&mut self) {
        self.filter_changes += 1;
    }

    fn refresh(&mut self, _list: &TrainList) {
        self.count += 1;
    }
}

#[tokio::test]
async fn queued_commands_apply_before_later_messages() {
    let mut session = session(vec![
        InboundMessage::PermissionUpdate(DispatcherPermission::granted()),
        train_at(1, 1501),
        train_at(2, 1104),
    ]);
    session
        .connect(&ServiceEndpoint::for_host("localhost"))
        .await
        .expect("connect");
    let mut list = train_list();
    let mut observer = Refreshes::default();
    let (tx, mut rx) = mpsc::channel(4);
    tx.send(ViewCommand::SortBy(Column::Symbol)).await.expect("send");
    tx.send(ViewCommand::ToggleTerritory(shared::domain::TerritoryId(150)))
        .await
        .expect("send");
    drop(tx);

    let err = run_with_commands(&mut session, &mut list, &mut observer, &mut rx).await;

    assert!(matches!(err, SessionError::ChannelClosed));
    assert_eq!(list.sort_key().direction, SortDirection::Descending);
    assert!(list.record(TrainId(1)).is_none());
    assert!(list.record(TrainId(2)).is_some());
    assert_eq!(observer.filter_changes, 1);
    assert_eq!(observer.count, 4);
}
