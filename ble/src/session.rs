use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::characteristic::{Characteristic, TransportError};
use crate::sender::{ChunkedSender, SendError, SendReport};

type NotificationHandler = Box<dyn FnMut(&str) + Send>;

/// The single notification subscription of a session.
///
/// Cloned handles share the subscription, so the task reading from the device can dispatch
/// while the session itself is busy sending.
#[derive(Clone, Default)]
pub struct Notifications {
    handler: Arc<Mutex<Option<NotificationHandler>>>,
}

impl Notifications {
    /// Registers `handler`, replacing any previously registered one.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        if let Ok(mut current) = self.handler.lock() {
            if current.replace(Box::new(handler)).is_some() {
                debug!("Replacing existing notification handler");
            }
        }
    }

    pub fn unsubscribe(&self) {
        if let Ok(mut current) = self.handler.lock() {
            current.take();
        }
    }

    /// Decodes and trims `data`, then hands it to the current handler. Returns whether a
    /// handler ran.
    pub fn dispatch(&self, data: &[u8]) -> bool {
        let decoded = String::from_utf8_lossy(data);
        let text = decoded.trim();
        let Ok(mut current) = self.handler.lock() else {
            warn!("Notification handler poisoned, dropping {:?}", text);
            return false;
        };
        match current.as_mut() {
            Some(handler) => {
                handler(text);
                true
            }
            None => {
                debug!("No notification handler, dropping {:?}", text);
                false
            }
        }
    }
}

/// Liveness of the link behind the attached characteristic, shared with whatever task watches
/// the device side.
#[derive(Clone, Default)]
pub struct LinkStatus {
    lost: Arc<AtomicBool>,
}

impl LinkStatus {
    pub fn mark_lost(&self) {
        self.lost.store(true, Ordering::Release);
    }

    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::Acquire)
    }
}

/// Reads newline delimited notifications from the device until it goes away, then marks the
/// link as lost.
pub async fn pump_notifications<R>(reader: R, notifications: Notifications, link: LinkStatus)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                notifications.dispatch(line.as_bytes());
            }
            Ok(None) => {
                info!("Device closed the connection");
                break;
            }
            Err(e) => {
                warn!("Lost the connection to the device: {}", e);
                break;
            }
        }
    }
    link.mark_lost();
}

pub struct BleSession<C> {
    tx: Option<C>,
    link: LinkStatus,
    sender: ChunkedSender,
    notifications: Notifications,
}

impl<C> Default for BleSession<C>
where
    C: Characteristic,
{
    fn default() -> Self {
        Self::new(ChunkedSender::default())
    }
}

impl<C> BleSession<C>
where
    C: Characteristic,
{
    pub fn new(sender: ChunkedSender) -> Self {
        Self {
            tx: None,
            link: LinkStatus::default(),
            sender,
            notifications: Notifications::default(),
        }
    }

    /// Attaches the device's write characteristic. Any previous one is dropped, along with its
    /// link status.
    pub fn connect(&mut self, tx: C) {
        self.link = LinkStatus::default();
        if self.tx.replace(tx).is_some() {
            info!("Replaced existing BLE connection");
        } else {
            info!("BLE connection established");
        }
    }

    /// Detaches the write characteristic, returning it if one was attached.
    pub fn disconnect(&mut self) -> Option<C> {
        let tx = self.tx.take();
        if tx.is_some() {
            info!("BLE connection closed");
        }
        tx
    }

    pub fn is_connected(&self) -> bool {
        self.tx.is_some() && !self.link.is_lost()
    }

    /// The status of the current link. Handles taken before a later `connect` keep tracking the
    /// old link.
    pub fn link(&self) -> LinkStatus {
        self.link.clone()
    }

    pub fn on_notification<F>(&self, handler: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.notifications.subscribe(handler);
    }

    /// A handle for dispatching incoming notifications from another task.
    pub fn notifications(&self) -> Notifications {
        self.notifications.clone()
    }

    pub fn notify(&self, data: &[u8]) -> bool {
        self.notifications.dispatch(data)
    }

    pub async fn send(&mut self, text: &str) -> Result<SendReport, SendError> {
        if self.link.is_lost() && self.tx.take().is_some() {
            warn!("BLE device disconnected");
        }
        let Some(tx) = self.tx.as_mut() else {
            return Err(SendError::NoConnection);
        };

        let result = self.sender.send(tx, text).await;
        if let Err(SendError::Transport {
            source: TransportError::Disconnected,
            ..
        }) = &result
        {
            warn!("BLE device disconnected during a send");
            self.link.mark_lost();
            self.tx = None;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristic::fake::RecordingCharacteristic;
    use crate::characteristic::StreamCharacteristic;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::{TcpListener, TcpStream};

    fn session() -> BleSession<RecordingCharacteristic> {
        BleSession::new(ChunkedSender::new(20, Duration::ZERO))
    }

    #[tokio::test]
    async fn send_without_connection_fails() {
        let mut session = session();
        assert!(!session.is_connected());
        assert!(matches!(
            session.send("sube el piano").await,
            Err(SendError::NoConnection)
        ));
    }

    #[tokio::test]
    async fn send_after_disconnect_writes_nothing() {
        let mut session = session();
        let characteristic = RecordingCharacteristic::default();
        session.connect(characteristic.clone());
        session.send("uno").await.unwrap();

        assert!(session.disconnect().is_some());
        assert!(matches!(
            session.send("dos").await,
            Err(SendError::NoConnection)
        ));
        assert_eq!(
            characteristic.writes(),
            vec![b"uno".to_vec(), b"\n".to_vec()]
        );
    }

    #[tokio::test]
    async fn lost_link_fails_without_writing() {
        let mut session = session();
        let characteristic = RecordingCharacteristic::default();
        session.connect(characteristic.clone());

        session.link().mark_lost();
        assert!(!session.is_connected());
        assert!(matches!(
            session.send("sube el piano").await,
            Err(SendError::NoConnection)
        ));
        assert!(characteristic.writes().is_empty());
    }

    #[tokio::test]
    async fn reconnecting_replaces_a_lost_link() {
        let mut session = session();
        session.connect(RecordingCharacteristic::default());
        let old_link = session.link();
        old_link.mark_lost();

        let characteristic = RecordingCharacteristic::default();
        session.connect(characteristic.clone());
        assert!(session.is_connected());
        session.send("hola").await.unwrap();
        assert_eq!(characteristic.writes().len(), 2);
    }

    #[tokio::test]
    async fn disconnect_during_send_drops_the_link() {
        let mut session = BleSession::new(ChunkedSender::new(4, Duration::ZERO));
        let characteristic = RecordingCharacteristic::failing_from(1);
        session.connect(characteristic.clone());

        assert!(matches!(
            session.send("abcdefgh").await,
            Err(SendError::Transport { chunk: 1, .. })
        ));
        assert!(!session.is_connected());
        assert!(matches!(
            session.send("ijkl").await,
            Err(SendError::NoConnection)
        ));
        assert_eq!(characteristic.writes(), vec![b"abcd".to_vec()]);
    }

    #[tokio::test]
    async fn peer_hangup_is_seen_by_the_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (client, accepted) = tokio::join!(TcpStream::connect(address), listener.accept());
        let (reader, writer) = client.unwrap().into_split();
        let (mut device, _) = accepted.unwrap();

        let mut session = BleSession::new(ChunkedSender::new(20, Duration::ZERO));
        session.connect(StreamCharacteristic::new(writer));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        session.on_notification(move |text| sink.lock().unwrap().push(text.to_string()));

        let pump = tokio::spawn(pump_notifications(
            reader,
            session.notifications(),
            session.link(),
        ));

        device.write_all(b"ready\n").await.unwrap();
        drop(device);
        pump.await.unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["ready"]);
        assert!(!session.is_connected());
        assert!(matches!(
            session.send("sube el piano").await,
            Err(SendError::NoConnection)
        ));
    }

    #[test]
    fn only_the_latest_handler_is_called() {
        let session = session();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let sink = first.clone();
        session.on_notification(move |text| sink.lock().unwrap().push(text.to_string()));
        assert!(session.notify(b"ok"));

        let sink = second.clone();
        session.on_notification(move |text| sink.lock().unwrap().push(text.to_string()));
        assert!(session.notify(b"piano 7\r\n"));

        assert_eq!(*first.lock().unwrap(), vec!["ok"]);
        assert_eq!(*second.lock().unwrap(), vec!["piano 7"]);
    }

    #[test]
    fn notifications_without_handler_are_dropped() {
        let session = session();
        assert!(!session.notify(b"ignored"));

        session.on_notification(|_| {});
        session.notifications().unsubscribe();
        assert!(!session.notify(b"ignored"));
    }

    #[test]
    fn shared_handle_dispatches_to_session_handler() {
        let session = session();
        let received = Arc::new(Mutex::new(String::new()));
        let sink = received.clone();
        session.on_notification(move |text| sink.lock().unwrap().push_str(text));

        let handle = session.notifications();
        std::thread::spawn(move || handle.dispatch(b"bateria muted"))
            .join()
            .unwrap();
        assert_eq!(*received.lock().unwrap(), "bateria muted");
    }
}
