use linestream::{FrameHandler, Result};

/// Records every frame and overflow notification it receives.
#[derive(Debug, Default)]
pub struct Collector {
    pub frames: Vec<Vec<u8>>,
    pub overflows: Vec<usize>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn strings(&self) -> Vec<String> {
        self.frames
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    #[allow(dead_code)]
    pub fn payload_bytes(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }
}

impl FrameHandler for Collector {
    fn on_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.frames.push(frame.to_vec());
        Ok(())
    }

    fn on_overflow(&mut self, discarded: usize) {
        self.overflows.push(discarded);
    }
}
