//! Input Capture
//!
//! The shell samples the keyboard once per tick and hands the core an
//! [`InputFrame`]: four held key levels plus an edge-triggered fire event.
//! [`InputSampler`] turns a held fire key into one event per press, and
//! [`InputRecording`] stores a delta-compressed input history for replay.

use serde::{Serialize, Deserialize};

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Input state for a single tick.
///
/// Action flags (packed bits):
/// - Bit 0: turn left (held)
/// - Bit 1: turn right (held)
/// - Bit 2: thrust (held)
/// - Bit 3: brake (held)
/// - Bit 4: fire (pressed this tick)
/// - Bit 5-7: Reserved
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Packed key flags
    pub flags: u8,
}

impl InputFrame {
    /// Turn left flag bit
    pub const FLAG_TURN_LEFT: u8 = 0x01;

    /// Turn right flag bit
    pub const FLAG_TURN_RIGHT: u8 = 0x02;

    /// Thrust flag bit
    pub const FLAG_THRUST: u8 = 0x04;

    /// Brake flag bit
    pub const FLAG_BRAKE: u8 = 0x08;

    /// Fire event bit
    pub const FLAG_FIRE: u8 = 0x10;

    /// Create an idle frame (no keys).
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Build a frame from individual key levels and the fire event.
    pub const fn from_keys(
        turn_left: bool,
        turn_right: bool,
        thrust: bool,
        brake: bool,
        fire: bool,
    ) -> Self {
        let mut flags = 0;
        if turn_left {
            flags |= Self::FLAG_TURN_LEFT;
        }
        if turn_right {
            flags |= Self::FLAG_TURN_RIGHT;
        }
        if thrust {
            flags |= Self::FLAG_THRUST;
        }
        if brake {
            flags |= Self::FLAG_BRAKE;
        }
        if fire {
            flags |= Self::FLAG_FIRE;
        }
        Self { flags }
    }

    /// Frame with only the given flags set.
    pub const fn with_flags(flags: u8) -> Self {
        Self { flags }
    }

    /// Is turn-left held?
    #[inline]
    pub fn turn_left(&self) -> bool {
        self.flags & Self::FLAG_TURN_LEFT != 0
    }

    /// Is turn-right held?
    #[inline]
    pub fn turn_right(&self) -> bool {
        self.flags & Self::FLAG_TURN_RIGHT != 0
    }

    /// Is thrust held?
    #[inline]
    pub fn thrust(&self) -> bool {
        self.flags & Self::FLAG_THRUST != 0
    }

    /// Is brake held?
    #[inline]
    pub fn brake(&self) -> bool {
        self.flags & Self::FLAG_BRAKE != 0
    }

    /// Was fire pressed this tick?
    #[inline]
    pub fn fire_pressed(&self) -> bool {
        self.flags & Self::FLAG_FIRE != 0
    }

    /// Check if this is an idle frame (no input).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }

    /// Set or clear the fire event.
    #[inline]
    pub fn set_fire(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_FIRE;
        } else {
            self.flags &= !Self::FLAG_FIRE;
        }
    }
}

// =============================================================================
// KEY SAMPLING
// =============================================================================

/// Raw key levels as polled by the shell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    /// Turn-left key held
    pub turn_left: bool,
    /// Turn-right key held
    pub turn_right: bool,
    /// Thrust key held
    pub thrust: bool,
    /// Brake key held
    pub brake: bool,
    /// Fire key held
    pub fire: bool,
}

/// Converts polled key levels into input frames.
///
/// Fire is reported only on the tick the key goes down, so holding it spawns
/// a single projectile.
#[derive(Clone, Debug, Default)]
pub struct InputSampler {
    fire_was_down: bool,
}

impl InputSampler {
    /// Create a sampler with the fire key released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample one tick of key state.
    pub fn sample(&mut self, keys: KeyState) -> InputFrame {
        let fire_edge = keys.fire && !self.fire_was_down;
        self.fire_was_down = keys.fire;
        InputFrame::from_keys(
            keys.turn_left,
            keys.turn_right,
            keys.thrust,
            keys.brake,
            fire_edge,
        )
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// Delta-compressed input entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input state began
    pub tick: u32,
    /// The new input state
    pub frame: InputFrame,
}

/// Complete input recording for one run.
///
/// Only ticks where the input changed are stored. `record` must be called
/// every tick so a fire event is always followed by its release.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputRecording {
    /// Last recorded tick (`None` until something is recorded)
    pub end_tick: Option<u32>,

    deltas: Vec<InputDelta>,

    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record input for a tick.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = Some(tick);

        if frame != self.last_frame {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Get input at a specific tick.
    pub fn get_input_at(&self, tick: u32) -> InputFrame {
        // Last delta at or before this tick
        let idx = self.deltas.partition_point(|d| d.tick <= tick);

        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Number of delta entries.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Iterate `(tick, frame)` for every tick from 0 through `end_tick`.
    ///
    /// Yields nothing for an empty recording.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: 0,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }
}

/// Iterator for replaying inputs tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl Iterator for ReplayIterator<'_> {
    type Item = (u32, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        match self.recording.end_tick {
            Some(end) if self.current_tick <= end => {}
            _ => return None,
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current_frame = delta.frame;
            self.delta_idx += 1;
        }

        let result = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_frame_flags() {
        let frame = InputFrame::from_keys(true, false, true, false, false);
        assert!(frame.turn_left());
        assert!(!frame.turn_right());
        assert!(frame.thrust());
        assert!(!frame.brake());
        assert!(!frame.fire_pressed());

        let mut frame = InputFrame::new();
        assert!(frame.is_idle());
        frame.set_fire(true);
        assert!(frame.fire_pressed());
        frame.set_fire(false);
        assert!(frame.is_idle());
    }

    #[test]
    fn test_fire_is_edge_triggered() {
        let mut sampler = InputSampler::new();
        let held = KeyState { fire: true, ..KeyState::default() };
        let released = KeyState::default();

        assert!(sampler.sample(held).fire_pressed());
        assert!(!sampler.sample(held).fire_pressed());
        assert!(!sampler.sample(held).fire_pressed());
        assert!(!sampler.sample(released).fire_pressed());
        assert!(sampler.sample(held).fire_pressed());
    }

    #[test]
    fn test_sampler_passes_levels_through() {
        let mut sampler = InputSampler::new();
        let keys = KeyState { thrust: true, turn_right: true, ..KeyState::default() };
        for _ in 0..3 {
            let frame = sampler.sample(keys);
            assert!(frame.thrust());
            assert!(frame.turn_right());
        }
    }

    #[test]
    fn test_recording_delta_compression() {
        let mut recording = InputRecording::new();
        let thrust = InputFrame::with_flags(InputFrame::FLAG_THRUST);

        for tick in 0..4 {
            recording.record(tick, thrust);
        }
        assert_eq!(recording.delta_count(), 1);

        recording.record(4, InputFrame::new());
        assert_eq!(recording.delta_count(), 2);
    }

    #[test]
    fn test_recording_get_at() {
        let mut recording = InputRecording::new();
        let left = InputFrame::with_flags(InputFrame::FLAG_TURN_LEFT);
        let right = InputFrame::with_flags(InputFrame::FLAG_TURN_RIGHT);

        for tick in 0..10 {
            recording.record(tick, InputFrame::new());
        }
        for tick in 10..20 {
            recording.record(tick, left);
        }
        for tick in 20..30 {
            recording.record(tick, right);
        }

        assert!(recording.get_input_at(5).is_idle());
        assert_eq!(recording.get_input_at(10), left);
        assert_eq!(recording.get_input_at(19), left);
        assert_eq!(recording.get_input_at(25), right);
    }

    #[test]
    fn test_empty_recording_replays_nothing() {
        let recording = InputRecording::new();
        assert_eq!(recording.end_tick, None);
        assert_eq!(recording.replay_iter().count(), 0);

        let mut recording = InputRecording::new();
        recording.record(0, InputFrame::new());
        assert_eq!(recording.end_tick, Some(0));
        assert_eq!(recording.replay_iter().count(), 1);
    }

    #[test]
    fn test_replay_iterator_restores_fire_events() {
        let mut recording = InputRecording::new();
        let fire = InputFrame::with_flags(InputFrame::FLAG_FIRE);

        recording.record(0, InputFrame::new());
        recording.record(1, fire);
        recording.record(2, InputFrame::new());
        recording.record(3, InputFrame::new());

        let frames: Vec<_> = recording.replay_iter().collect();
        assert_eq!(frames.len(), 4);
        assert!(!frames[0].1.fire_pressed());
        assert!(frames[1].1.fire_pressed());
        assert!(!frames[2].1.fire_pressed());
        assert!(!frames[3].1.fire_pressed());
    }
}
