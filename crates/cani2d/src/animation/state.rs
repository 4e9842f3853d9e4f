//! Playback state tracking for animation instances

/// Default playback rate in frames per second
pub const DEFAULT_FPS: f32 = 30.0;

/// Transport state of an animation instance
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Index of the selected clip (None draws the rest pose)
    pub animation_index: Option<usize>,
    /// Current position within the clip, in frames
    pub frame: f32,
    /// Playback rate in frames per second
    pub fps: f32,
    /// Wrap around at the end of the clip instead of stopping
    pub looping: bool,
    /// Whether time advances
    pub playing: bool,
}

impl PlaybackState {
    /// Create a stopped state with the given clip selected
    pub fn new(animation_index: Option<usize>) -> Self {
        Self {
            animation_index,
            frame: 0.0,
            fps: DEFAULT_FPS,
            looping: true,
            playing: false,
        }
    }

    /// Create a state with no clip selected
    pub fn none() -> Self {
        Self::new(None)
    }

    /// Check if a clip is selected
    pub fn is_active(&self) -> bool {
        self.animation_index.is_some()
    }

    /// Current position in seconds
    pub fn time(&self) -> f32 {
        if self.fps > 0.0 {
            self.frame / self.fps
        } else {
            0.0
        }
    }

    /// Advance the frame by `delta_ms` milliseconds of a clip `length` frames long
    ///
    /// Returns whether playback continues. A negative delta plays backwards.
    /// Leaving the clip at either end wraps a looping state around; otherwise
    /// the frame clamps to `0..=length` and playback pauses.
    /// A paused state, or one without a clip, does not move and returns false.
    pub fn step(&mut self, delta_ms: f32, length: f32) -> bool {
        if !self.playing || !self.is_active() {
            return false;
        }

        self.frame += self.fps / 1000.0 * delta_ms;

        if self.frame > length || self.frame < 0.0 {
            if self.looping && length > 0.0 {
                self.frame = self.frame.rem_euclid(length);
            } else {
                self.frame = self.frame.clamp(0.0, length.max(0.0));
                self.playing = false;
                return false;
            }
        }

        true
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::none()
    }
}
