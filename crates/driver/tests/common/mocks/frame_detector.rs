use std::sync::Arc;

use axis_transfer::bus::{SimDut, SimSignal};

/// Flags the first beat of every frame, like the start-of-frame output of a
/// stream capture block.
///
/// `sof` is combinational on the current bus values; the frame state only
/// advances on [`clock`](Self::clock), which samples the handshake.
#[derive(Debug)]
pub struct FrameStartDetector {
    valid: Arc<SimSignal>,
    ready: Arc<SimSignal>,
    last: Arc<SimSignal>,
    expecting_first: bool,
}

impl FrameStartDetector {
    pub fn new(dut: &SimDut, prefix: &str) -> Self {
        let signal = |suffix: &str| {
            dut.signal(&format!("{prefix}_{suffix}"))
                .unwrap_or_else(|| panic!("device has no {prefix}_{suffix}"))
        };
        Self {
            valid: signal("tvalid"),
            ready: signal("tready"),
            last: signal("tlast"),
            expecting_first: true,
        }
    }

    fn handshake(&self) -> bool {
        self.valid.get_bool() && self.ready.get_bool()
    }

    /// Start-of-frame output for the current cycle.
    pub fn sof(&self) -> bool {
        self.handshake() && self.expecting_first
    }

    /// Samples the bus at a rising edge.
    pub fn clock(&mut self) {
        if self.handshake() {
            self.expecting_first = self.last.get_bool();
        }
    }
}
