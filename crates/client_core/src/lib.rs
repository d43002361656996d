//! Client side of the dispatcher feed: the session state machine and the live train list.

pub mod cancel;
pub mod columns;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod gazetteer;
pub mod permission;
pub mod roster;
pub mod session;
pub mod train_list;
pub mod transport;
pub mod view;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use columns::{Column, ColumnSet};
pub use crate::config::ClientSettings;
pub use error::{ErrorKind, SessionError};
pub use filter::TerritoryFilter;
pub use gazetteer::{Gazetteer, LocationDirectory, LocationTable, Run8Territories, TerritoryDirectory};
pub use roster::{RosterStore, TrainRecord, EVICTION_THRESHOLD};
pub use session::{CloseReason, SessionMessage, SessionState, TransportSession};
pub use train_list::{RowText, TrainList, ViewCommand};
pub use transport::{Connector, DuplexChannel, ServiceEndpoint, WsConnector};
pub use view::{NullObserver, SortDirection, SortKey, SortedViewController, ViewObserver};
