// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::PlatformMessage;

/// A cloneable handle used by the platform layer (or any thread) to post messages.
#[derive(Debug, Clone)]
pub struct MessageSender {
    sender: flume::Sender<PlatformMessage>,
}

impl MessageSender {
    /// Posts a message for the next message pump.
    ///
    /// Returns `false` if the bus has been dropped.
    pub fn post(&self, message: PlatformMessage) -> bool {
        log::trace!("Posting platform message {message:?}");
        match self.sender.send(message) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to post platform message: {e}. Bus likely dropped.");
                false
            }
        }
    }
}

/// The multi-producer, single-consumer queue between the platform layer and
/// the update pipeline's message pump.
#[derive(Debug)]
pub struct MessageBus {
    sender: flume::Sender<PlatformMessage>,
    receiver: flume::Receiver<PlatformMessage>,
}

impl MessageBus {
    /// Creates a bus with an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("Platform message bus initialized.");
        Self { sender, receiver }
    }

    /// Returns a new sender handle.
    pub fn sender(&self) -> MessageSender {
        MessageSender {
            sender: self.sender.clone(),
        }
    }

    /// Posts a message from the owner's side.
    pub fn publish(&self, message: PlatformMessage) {
        // The bus owns a receiver, so the channel cannot be disconnected here.
        let _ = self.sender.send(message);
    }

    /// Moves every message posted so far into `out`, in posting order.
    ///
    /// Returns the number of messages moved. Messages posted while draining
    /// may or may not be included.
    pub fn drain_into(&self, out: &mut Vec<PlatformMessage>) -> usize {
        let before = out.len();
        out.extend(self.receiver.try_iter());
        out.len() - before
    }

    /// Number of messages waiting.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no message is waiting.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InputEvent;
    use std::thread;

    fn key(code: u32) -> PlatformMessage {
        PlatformMessage::Input(InputEvent::KeyDown { code })
    }

    #[test]
    fn bus_creation() {
        let bus = MessageBus::new();
        let _sender = bus.sender();
        assert!(bus.is_empty());
    }

    #[test]
    fn drain_keeps_posting_order() {
        let bus = MessageBus::new();
        let sender = bus.sender();

        assert!(sender.post(key(1)));
        bus.publish(PlatformMessage::Resized {
            width: 800,
            height: 600,
        });
        assert!(sender.post(PlatformMessage::CloseRequested));
        assert_eq!(bus.len(), 3);

        let mut out = Vec::new();
        assert_eq!(bus.drain_into(&mut out), 3);
        assert_eq!(
            out,
            vec![
                key(1),
                PlatformMessage::Resized {
                    width: 800,
                    height: 600
                },
                PlatformMessage::CloseRequested,
            ]
        );
        assert_eq!(bus.drain_into(&mut out), 0);
    }

    #[test]
    fn post_from_thread() {
        let bus = MessageBus::new();
        let sender = bus.sender();

        let handle = thread::spawn(move || {
            for code in 0..10 {
                sender.post(key(code));
            }
        });
        handle.join().expect("Thread join failed");

        let mut out = Vec::new();
        bus.drain_into(&mut out);
        assert_eq!(out, (0..10).map(key).collect::<Vec<_>>());
    }

    #[test]
    fn post_fails_after_bus_drop() {
        let bus = MessageBus::new();
        let sender = bus.sender();
        drop(bus);
        assert!(!sender.post(PlatformMessage::CloseRequested));
    }
}
