//! The dispatcher wire protocol.
//!
//! Every frame is a JSON envelope `{"action": "<name>", "body": {...}}`. The set of actions is
//! closed: anything outside [`MessageKind`] is a decode error, while the kinds that carry no
//! information for the train list are recognised and their bodies left unread.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{BlockId, EngineerType, PermissionLevel, TrainId},
    error::{DecodeError, EncodeError},
};

/// Fixed TCP port the simulator listens on for dispatcher clients.
pub const SERVICE_PORT: u16 = 15192;
/// Fixed path of the dispatcher service.
pub const SERVICE_PATH: &str = "/Run8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    DispatcherConnected,
    PermissionUpdate,
    SendSimulationState,
    UpdateTrainData,
    Dtmf,
    RadioText,
    SetInterlockErrorSwitches,
    SetOccupiedBlocks,
    SetOccupiedSwitches,
    SetReversedSwitches,
    SetSignals,
    SetUnlockedSwitches,
}

impl MessageKind {
    /// Every kind the simulator may push to a dispatcher client.
    pub const INBOUND: [MessageKind; 11] = [
        MessageKind::SendSimulationState,
        MessageKind::UpdateTrainData,
        MessageKind::PermissionUpdate,
        MessageKind::Dtmf,
        MessageKind::RadioText,
        MessageKind::SetInterlockErrorSwitches,
        MessageKind::SetOccupiedBlocks,
        MessageKind::SetOccupiedSwitches,
        MessageKind::SetReversedSwitches,
        MessageKind::SetSignals,
        MessageKind::SetUnlockedSwitches,
    ];

    pub fn action(self) -> &'static str {
        match self {
            MessageKind::DispatcherConnected => "DispatcherConnected",
            MessageKind::PermissionUpdate => "PermissionUpdate",
            MessageKind::SendSimulationState => "SendSimulationState",
            MessageKind::UpdateTrainData => "UpdateTrainData",
            MessageKind::Dtmf => "DTMF",
            MessageKind::RadioText => "RadioText",
            MessageKind::SetInterlockErrorSwitches => "SetInterlockErrorSwitches",
            MessageKind::SetOccupiedBlocks => "SetOccupiedBlocks",
            MessageKind::SetOccupiedSwitches => "SetOccupiedSwitches",
            MessageKind::SetReversedSwitches => "SetReversedSwitches",
            MessageKind::SetSignals => "SetSignals",
            MessageKind::SetUnlockedSwitches => "SetUnlockedSwitches",
        }
    }

    /// Looks up an inbound action name in the catalog.
    pub fn inbound_from_action(action: &str) -> Option<MessageKind> {
        Self::INBOUND
            .iter()
            .copied()
            .find(|kind| kind.action() == action)
    }

    /// Whether frames of this kind are recognised but carry nothing the client uses.
    pub fn is_discarded(self) -> bool {
        !matches!(
            self,
            MessageKind::DispatcherConnected
                | MessageKind::PermissionUpdate
                | MessageKind::SendSimulationState
                | MessageKind::UpdateTrainData
        )
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherPermission {
    /// Whether the player may control AI trains. Not used by the train list.
    #[serde(rename = "AIPermission", default)]
    pub ai_permission: bool,
    #[serde(rename = "Permission")]
    pub permission: PermissionLevel,
}

impl DispatcherPermission {
    pub fn granted() -> Self {
        Self {
            ai_permission: false,
            permission: PermissionLevel::Granted,
        }
    }

    pub fn rescinded() -> Self {
        Self {
            ai_permission: false,
            permission: PermissionLevel::Rescinded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Whether the simulator is itself a client of a multiplayer server.
    #[serde(rename = "IsClient", default)]
    pub is_client: bool,
    #[serde(rename = "SimulationTime")]
    pub simulation_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainData {
    #[serde(rename = "TrainID")]
    pub train_id: TrainId,
    /// Letter part of the lead locomotive's reporting mark, e.g. `BNSF` in `BNSF1234`.
    #[serde(rename = "RailroadInitials", default)]
    pub railroad_initials: String,
    /// Number part of the lead locomotive's reporting mark.
    #[serde(rename = "LocoNumber", default)]
    pub loco_number: u32,
    #[serde(rename = "TrainSymbol", default)]
    pub symbol: String,
    #[serde(rename = "AxleCount", default)]
    pub axle_count: u32,
    #[serde(rename = "HpPerTon", default)]
    pub horsepower_per_ton: f32,
    #[serde(rename = "TrainLengthFeet", default)]
    pub length_feet: u32,
    #[serde(rename = "TrainSpeedLimitMPH", default)]
    pub speed_limit_mph: u32,
    /// Weight of the consist excluding locomotives.
    #[serde(rename = "TrainWeightTons", default)]
    pub weight_tons: u32,
    #[serde(rename = "BlockID", default)]
    pub block: BlockId,
    /// Negative when the controlling locomotive is moving backwards.
    #[serde(rename = "TrainSpeedMph", default)]
    pub speed_mph: f32,
    #[serde(rename = "EngineerName", default)]
    pub engineer_name: String,
    #[serde(rename = "EngineerType", default)]
    pub engineer_type: EngineerType,
    #[serde(rename = "HoldingForDispatcher", default)]
    pub holding_for_dispatcher: bool,
    #[serde(rename = "RelinquishWhenStopped", default)]
    pub relinquish_when_stopped: bool,
}

impl TrainData {
    pub fn new(train_id: TrainId) -> Self {
        Self {
            train_id,
            railroad_initials: String::new(),
            loco_number: 0,
            symbol: String::new(),
            axle_count: 0,
            horsepower_per_ton: 0.0,
            length_feet: 0,
            speed_limit_mph: 0,
            weight_tons: 0,
            block: BlockId::UNSIGNALLED,
            speed_mph: 0.0,
            engineer_name: String::new(),
            engineer_type: EngineerType::None,
            holding_for_dispatcher: false,
            relinquish_when_stopped: false,
        }
    }

    /// Reporting mark of the lead unit, e.g. `BNSF1234`.
    pub fn lead_unit(&self) -> String {
        format!("{}{}", self.railroad_initials, self.loco_number)
    }
}

/// A frame received by a dispatcher client, decoded against the inbound catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    PermissionUpdate(DispatcherPermission),
    SimulationState(SimulationState),
    TrainData(TrainData),
    /// A catalogued kind whose body is intentionally discarded.
    Ignored(MessageKind),
}

impl InboundMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            InboundMessage::PermissionUpdate(_) => MessageKind::PermissionUpdate,
            InboundMessage::SimulationState(_) => MessageKind::SendSimulationState,
            InboundMessage::TrainData(_) => MessageKind::UpdateTrainData,
            InboundMessage::Ignored(kind) => *kind,
        }
    }

    /// Encodes the message as the simulator would send it. Discarded kinds get an empty body.
    pub fn encode(&self) -> Result<String, EncodeError> {
        match self {
            InboundMessage::PermissionUpdate(body) => encode_frame(self.kind(), Some(body)),
            InboundMessage::SimulationState(body) => encode_frame(self.kind(), Some(body)),
            InboundMessage::TrainData(body) => encode_frame(self.kind(), Some(body)),
            InboundMessage::Ignored(kind) => {
                encode_frame(*kind, Some(&serde_json::Map::<String, serde_json::Value>::new()))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    action: String,
    #[serde(default)]
    body: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct OutgoingFrame<'a, T: Serialize> {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a T>,
}

pub fn encode_frame<T: Serialize>(kind: MessageKind, body: Option<&T>) -> Result<String, EncodeError> {
    serde_json::to_string(&OutgoingFrame {
        action: kind.action(),
        body,
    })
    .map_err(|source| EncodeError { kind, source })
}

/// The handshake a dispatcher client sends right after the channel opens.
pub fn dispatcher_connected_frame() -> Result<String, EncodeError> {
    encode_frame::<()>(MessageKind::DispatcherConnected, None)
}

/// Decodes one text frame pushed by the simulator.
pub fn decode_frame(text: &str) -> Result<InboundMessage, DecodeError> {
    let raw: RawFrame = serde_json::from_str(text).map_err(DecodeError::Envelope)?;
    let kind = MessageKind::inbound_from_action(&raw.action)
        .ok_or_else(|| DecodeError::UnknownAction(raw.action.clone()))?;
    if kind.is_discarded() {
        return Ok(InboundMessage::Ignored(kind));
    }

    let body = raw.body.ok_or(DecodeError::MissingBody { kind })?;
    let decoded = match kind {
        MessageKind::PermissionUpdate => {
            serde_json::from_value(body).map(InboundMessage::PermissionUpdate)
        }
        MessageKind::SendSimulationState => {
            serde_json::from_value(body).map(InboundMessage::SimulationState)
        }
        MessageKind::UpdateTrainData => serde_json::from_value(body).map(InboundMessage::TrainData),
        _ => return Ok(InboundMessage::Ignored(kind)),
    };
    decoded.map_err(|source| DecodeError::Body { kind, source })
}

/// Decodes a binary frame, which carries the same envelope as UTF-8 bytes.
pub fn decode_binary_frame(bytes: &[u8]) -> Result<InboundMessage, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
    decode_frame(text)
}

/// Returns the action named by a frame sent from a client, if it is a catalogued kind.
pub fn client_frame_kind(text: &str) -> Result<MessageKind, DecodeError> {
    let raw: RawFrame = serde_json::from_str(text).map_err(DecodeError::Envelope)?;
    if raw.action == MessageKind::DispatcherConnected.action() {
        Ok(MessageKind::DispatcherConnected)
    } else {
        Err(DecodeError::UnknownAction(raw.action))
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
