use linestream::ByteSource;
use std::collections::VecDeque;
use std::io::{Error, ErrorKind, Result};

/// A `ByteSource` that misbehaves on purpose.
pub struct FaultySource {
    queue: VecDeque<u8>,
    mode: FaultMode,
    counter: usize,
}

#[allow(dead_code)]
pub enum FaultMode {
    OneByteChunks,
    InterruptedEvery(usize),
    WouldBlockEvery(usize),
    FailAt(usize),
    ZeroReads,
}

impl FaultySource {
    pub fn new(data: &[u8], mode: FaultMode) -> Self {
        Self {
            queue: data.iter().copied().collect(),
            mode,
            counter: 0,
        }
    }

    #[allow(dead_code)]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn drain_into(&mut self, region: &mut [u8], limit: usize) -> usize {
        let n = region.len().min(limit).min(self.queue.len());
        for (dst, src) in region[..n].iter_mut().zip(self.queue.drain(..n)) {
            *dst = src;
        }
        n
    }
}

impl ByteSource for FaultySource {
    fn ready_count(&self) -> usize {
        self.queue.len()
    }

    fn read_into(&mut self, region: &mut [u8]) -> Result<usize> {
        self.counter += 1;
        match self.mode {
            FaultMode::OneByteChunks => Ok(self.drain_into(region, 1)),
            FaultMode::InterruptedEvery(n) if n != 0 && self.counter % n == 0 => {
                Err(Error::from(ErrorKind::Interrupted))
            }
            FaultMode::WouldBlockEvery(n) if n != 0 && self.counter % n == 0 => {
                Err(Error::from(ErrorKind::WouldBlock))
            }
            FaultMode::FailAt(n) if self.counter >= n => {
                Err(Error::new(ErrorKind::BrokenPipe, "simulated serial disconnect"))
            }
            FaultMode::ZeroReads => Ok(0),
            _ => Ok(self.drain_into(region, usize::MAX)),
        }
    }
}
