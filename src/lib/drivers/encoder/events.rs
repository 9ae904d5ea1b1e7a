// Edge events travel from the encoder interrupt handlers to the control loop
// through a bounded single-producer/single-consumer queue, so the interrupt
// side never touches encoder state and never blocks.

use heapless::spsc::{Consumer, Producer};

use crate::error::QueueError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelId {
    Left,
    Right,
}

impl WheelId {
    pub fn name(&self) -> &'static str {
        match self {
            WheelId::Left => "left",
            WheelId::Right => "right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    Rising,
    Falling,
}

impl EdgeKind {
    /// Edge kind from the pin level read right after the transition.
    pub fn from_level(is_high: bool) -> Self {
        match is_high {
            true => EdgeKind::Rising,
            false => EdgeKind::Falling,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeEvent {
    pub wheel: WheelId,
    pub kind: EdgeKind,
    pub timestamp_ms: u32,
}

/// Interrupt-side handle of an edge queue.
pub struct EdgeSender<'a, const N: usize> {
    producer: Producer<'a, EdgeEvent, N>,
    dropped: u32,
}

impl<'a, const N: usize> EdgeSender<'a, N> {
    pub fn new(producer: Producer<'a, EdgeEvent, N>) -> Self {
        Self {
            producer,
            dropped: 0,
        }
    }

    pub fn send(&mut self, event: EdgeEvent) -> Result<(), QueueError> {
        self.producer.enqueue(event).map_err(|event| {
            self.dropped = self.dropped.wrapping_add(1);
            QueueError::Full(event)
        })
    }

    /// Number of events rejected because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Pops every queued event in arrival order, returning how many were handled.
pub fn drain<const N: usize, F>(consumer: &mut Consumer<'_, EdgeEvent, N>, mut f: F) -> usize
where
    F: FnMut(EdgeEvent),
{
    let mut handled = 0;
    while let Some(event) = consumer.dequeue() {
        f(event);
        handled += 1;
    }
    handled
}
