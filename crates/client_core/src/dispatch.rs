use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    error::{ErrorKind, SessionError},
    session::{SessionMessage, TransportSession},
    train_list::{TrainList, ViewCommand},
    transport::{Connector, ServiceEndpoint},
    view::ViewObserver,
};

/// Feeds every message from a streaming session into `list` until the session ends.
///
/// Always returns the error that closed the session. Cancellation comes back as
/// [`SessionError::Cancelled`] like any other terminal condition.
pub async fn run<C, O>(
    session: &mut TransportSession<C>,
    list: &mut TrainList,
    observer: &mut O,
) -> SessionError
where
    C: Connector,
    O: ViewObserver + ?Sized,
{
    drive(session, list, observer, None).await
}

/// Like [`run`], but also applies view commands as they arrive on `commands`.
///
/// Pending commands are handled before the next message. A closed command channel only
/// stops the commands; the session keeps streaming.
pub async fn run_with_commands<C, O>(
    session: &mut TransportSession<C>,
    list: &mut TrainList,
    observer: &mut O,
    commands: &mut mpsc::Receiver<ViewCommand>,
) -> SessionError
where
    C: Connector,
    O: ViewObserver + ?Sized,
{
    drive(session, list, observer, Some(commands)).await
}

enum Step {
    Message(Result<SessionMessage, SessionError>),
    Command(ViewCommand),
}

async fn drive<C, O>(
    session: &mut TransportSession<C>,
    list: &mut TrainList,
    observer: &mut O,
    mut commands: Option<&mut mpsc::Receiver<ViewCommand>>,
) -> SessionError
where
    C: Connector,
    O: ViewObserver + ?Sized,
{
    let mut dispatched: u64 = 0;
    loop {
        let step = match commands.as_deref_mut() {
            Some(commands) => tokio::select! {
                biased;
                Some(command) = commands.recv() => Step::Command(command),
                message = session.receive_message() => Step::Message(message),
            },
            None => Step::Message(session.receive_message().await),
        };

        match step {
            Step::Command(command) => {
                debug!(?command, "applying view command");
                list.execute(command, observer);
                observer.refresh(list);
            }
            Step::Message(Ok(message)) => {
                list.apply(&message, observer);
                observer.refresh(list);
                dispatched += 1;
            }
            Step::Message(Err(err)) => {
                match err.kind() {
                    ErrorKind::Cancelled => debug!(dispatched, "dispatch loop cancelled"),
                    _ => info!(dispatched, error = %err, "dispatch loop ended"),
                }
                return err;
            }
        }
    }
}

/// Connects `session` to `endpoint` and then runs the dispatch loop.
pub async fn connect_and_run<C, O>(
    session: &mut TransportSession<C>,
    endpoint: &ServiceEndpoint,
    list: &mut TrainList,
    observer: &mut O,
) -> SessionError
where
    C: Connector,
    O: ViewObserver + ?Sized,
{
    if let Err(err) = session.connect(endpoint).await {
        return err;
    }
    run(session, list, observer).await
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
