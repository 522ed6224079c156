//! MIDI input: raw message classification and subscription to message sources.
//!
//! A source hands every received message to its subscribers as raw bytes
//! (status byte first). Only note-on messages carry meaning for the tutor;
//! everything else is classified as `Other` and ignored further up.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc::UnboundedSender;

use crate::error::MidiError;

/// Status byte of a note-on message on channel 1.
pub const NOTE_ON: u8 = 0x90;

/// A classified MIDI message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Key press. Velocity is not inspected, so velocity 0 still counts.
    NoteOn { pitch: u8 },
    /// Any other message (note-off, control change, other channels, ...).
    Other { status: u8 },
}

impl MidiMessage {
    /// Classify raw message bytes. Returns `None` for an empty buffer.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        match (status, data.first()) {
            (NOTE_ON, Some(&pitch)) => Some(MidiMessage::NoteOn { pitch }),
            _ => Some(MidiMessage::Other { status }),
        }
    }

    pub fn note_on_pitch(self) -> Option<u8> {
        match self {
            MidiMessage::NoteOn { pitch } => Some(pitch),
            MidiMessage::Other { .. } => None,
        }
    }
}

/// Callback receiving the raw bytes of each message.
pub type MidiHandler = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// A source of MIDI messages.
pub trait MidiInput {
    /// Register `handler` for every message received from now on.
    /// The subscription lasts until the returned handle is dropped.
    fn subscribe(&mut self, handler: MidiHandler) -> Result<SubscriptionHandle, MidiError>;
}

/// Keeps a subscription alive. Dropping it unsubscribes.
pub struct SubscriptionHandle {
    inner: HandleInner,
}

enum HandleInner {
    Virtual {
        id: u64,
        subscribers: Weak<Mutex<Subscribers>>,
    },
    #[cfg(feature = "device")]
    Device(#[allow(unused)] midir::MidiInputConnection<()>),
}

impl SubscriptionHandle {
    pub fn unsubscribe(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        match &self.inner {
            HandleInner::Virtual { id, subscribers } => {
                if let Some(subscribers) = subscribers.upgrade() {
                    lock(&subscribers).handlers.retain(|(handler_id, _)| handler_id != id);
                }
            }
            // midir closes the connection when it is dropped
            #[cfg(feature = "device")]
            HandleInner::Device(_) => {}
        }
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            HandleInner::Virtual { id, .. } => f.debug_struct("SubscriptionHandle").field("id", id).finish(),
            #[cfg(feature = "device")]
            HandleInner::Device(_) => f.debug_struct("SubscriptionHandle").field("device", &true).finish(),
        }
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(u64, Arc<Mutex<MidiHandler>>)>,
    pending: VecDeque<Vec<u8>>,
    delivering: bool,
}

fn lock(subscribers: &Mutex<Subscribers>) -> MutexGuard<'_, Subscribers> {
    subscribers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process MIDI source. Every message passed to [`VirtualMidiInput::send`]
/// reaches each live subscriber, in send order and subscription order.
///
/// Handlers run without the subscriber list locked, so a handler may send,
/// subscribe or unsubscribe on the same input. A message sent from inside a
/// handler is queued and delivered once the current message has reached every
/// subscriber; the same goes for messages sent from another thread while a
/// delivery is running.
#[derive(Clone, Default)]
pub struct VirtualMidiInput {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl VirtualMidiInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&self, bytes: &[u8]) {
        {
            let mut subscribers = lock(&self.subscribers);
            subscribers.pending.push_back(bytes.to_vec());
            if subscribers.delivering {
                return;
            }
            subscribers.delivering = true;
        }

        loop {
            let (message, handlers) = {
                let mut subscribers = lock(&self.subscribers);
                match subscribers.pending.pop_front() {
                    Some(message) => {
                        let handlers: Vec<_> = subscribers.handlers.iter().map(|(_, h)| h.clone()).collect();
                        (message, handlers)
                    }
                    None => {
                        subscribers.delivering = false;
                        return;
                    }
                }
            };
            for handler in handlers {
                let mut handler = handler.lock().unwrap_or_else(PoisonError::into_inner);
                (*handler)(&message);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.subscribers).handlers.len()
    }
}

impl MidiInput for VirtualMidiInput {
    fn subscribe(&mut self, handler: MidiHandler) -> Result<SubscriptionHandle, MidiError> {
        let mut subscribers = lock(&self.subscribers);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.handlers.push((id, Arc::new(Mutex::new(handler))));
        Ok(SubscriptionHandle {
            inner: HandleInner::Virtual {
                id,
                subscribers: Arc::downgrade(&self.subscribers),
            },
        })
    }
}

/// Handler that queues every message on `sender`, for consumption by
/// [`crate::PianoLearningProgram::run`].
pub fn forward_to(sender: UnboundedSender<Vec<u8>>) -> MidiHandler {
    Box::new(move |bytes: &[u8]| {
        if sender.send(bytes.to_vec()).is_err() {
            log::error!("failed to queue MIDI message; the event loop has stopped");
        }
    })
}

/// Hardware MIDI input through midir.
#[cfg(feature = "device")]
pub mod device {
    use super::{HandleInner, MidiHandler, MidiInput, SubscriptionHandle};
    use crate::error::MidiError;

    const CLIENT_NAME: &str = "piano-tutor";

    /// Names of the available input ports, by index.
    pub fn port_names() -> Result<Vec<(usize, String)>, MidiError> {
        let input = midir::MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::InitFailed(e.to_string()))?;
        Ok(input
            .ports()
            .iter()
            .enumerate()
            .filter_map(|(i, port)| input.port_name(port).ok().map(|name| (i, name)))
            .collect())
    }

    /// One hardware input port. midir allows a single connection per client,
    /// so the port can be subscribed to once.
    pub struct DeviceMidiInput {
        input: Option<midir::MidiInput>,
        port: midir::MidiInputPort,
        port_name: String,
    }

    impl DeviceMidiInput {
        pub fn open(index: usize) -> Result<Self, MidiError> {
            let input = midir::MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::InitFailed(e.to_string()))?;
            let port = input
                .ports()
                .get(index)
                .cloned()
                .ok_or_else(|| MidiError::PortNotFound(format!("no input port at index {index}")))?;
            let port_name = input
                .port_name(&port)
                .map_err(|e| MidiError::PortNotFound(e.to_string()))?;
            Ok(Self {
                input: Some(input),
                port,
                port_name,
            })
        }

        pub fn port_name(&self) -> &str {
            &self.port_name
        }
    }

    impl MidiInput for DeviceMidiInput {
        fn subscribe(&mut self, mut handler: MidiHandler) -> Result<SubscriptionHandle, MidiError> {
            let input = self
                .input
                .take()
                .ok_or_else(|| MidiError::ConnectionFailed(format!("{} is already connected", self.port_name)))?;
            let connection_name = format!("{CLIENT_NAME} {}", self.port_name);
            let connection = input
                .connect(
                    &self.port,
                    &connection_name,
                    move |_timestamp_us, message, &mut ()| handler(message),
                    (),
                )
                .map_err(|e| MidiError::ConnectionFailed(e.to_string()))?;
            log::info!("listening on MIDI port '{}'", self.port_name);
            Ok(SubscriptionHandle {
                inner: HandleInner::Device(connection),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_requires_the_exact_status_byte() {
        assert_eq!(MidiMessage::parse(&[0x90, 48, 100]), Some(MidiMessage::NoteOn { pitch: 48 }));
        assert_eq!(MidiMessage::parse(&[0x90, 48, 0]), Some(MidiMessage::NoteOn { pitch: 48 }));
        // note-on on channel 2
        assert_eq!(MidiMessage::parse(&[0x91, 48, 100]), Some(MidiMessage::Other { status: 0x91 }));
        // note-off, control change
        assert_eq!(MidiMessage::parse(&[0x80, 48, 0]), Some(MidiMessage::Other { status: 0x80 }));
        assert_eq!(MidiMessage::parse(&[0xB0, 64, 127]), Some(MidiMessage::Other { status: 0xB0 }));
    }

    #[test]
    fn truncated_and_empty_messages() {
        assert_eq!(MidiMessage::parse(&[]), None);
        assert_eq!(MidiMessage::parse(&[0x90]), Some(MidiMessage::Other { status: 0x90 }));
    }

    #[test]
    fn virtual_input_delivers_until_unsubscribed() {
        let mut input = VirtualMidiInput::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let handle = input
            .subscribe(Box::new(move |bytes: &[u8]| sink.lock().unwrap().push(bytes.to_vec())))
            .unwrap();

        input.send(&[0x90, 48, 100]);
        input.send(&[0x80, 48, 0]);
        assert_eq!(input.subscriber_count(), 1);

        handle.unsubscribe();
        input.send(&[0x90, 50, 100]);

        assert_eq!(input.subscriber_count(), 0);
        assert_eq!(*received.lock().unwrap(), vec![vec![0x90, 48, 100], vec![0x80, 48, 0]]);
    }

    #[test]
    fn forwarded_messages_keep_arrival_order() {
        let mut input = VirtualMidiInput::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _handle = input.subscribe(forward_to(tx)).unwrap();

        for pitch in [48, 50, 52] {
            input.send(&[NOTE_ON, pitch, 90]);
        }

        assert_eq!(rx.try_recv().unwrap(), vec![NOTE_ON, 48, 90]);
        assert_eq!(rx.try_recv().unwrap(), vec![NOTE_ON, 50, 90]);
        assert_eq!(rx.try_recv().unwrap(), vec![NOTE_ON, 52, 90]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn handlers_can_send_and_subscribe_on_their_own_input() {
        let mut input = VirtualMidiInput::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let late_handles = Arc::new(Mutex::new(Vec::new()));

        let (echo_input, sink) = (input.clone(), received.clone());
        let (mut subscribe_input, handles) = (input.clone(), late_handles.clone());
        let _handle = input
            .subscribe(Box::new(move |bytes: &[u8]| {
                sink.lock().unwrap().push(bytes.to_vec());
                if bytes[0] == NOTE_ON {
                    // echo a note-off for every note-on
                    echo_input.send(&[0x80, bytes[1], 0]);
                    let late = subscribe_input.subscribe(Box::new(|_: &[u8]| {})).unwrap();
                    handles.lock().unwrap().push(late);
                }
            }))
            .unwrap();

        input.send(&[NOTE_ON, 48, 100]);
        input.send(&[NOTE_ON, 50, 100]);

        assert_eq!(
            *received.lock().unwrap(),
            vec![vec![NOTE_ON, 48, 100], vec![0x80, 48, 0], vec![NOTE_ON, 50, 100], vec![0x80, 50, 0]]
        );
        assert_eq!(input.subscriber_count(), 3);

        late_handles.lock().unwrap().clear();
        assert_eq!(input.subscriber_count(), 1);
    }
}
