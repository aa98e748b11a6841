use strum_macros::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SessionFlags {
    pub is_loading: bool,
    pub is_recording: bool,
    pub show_side_panel: bool,
    pub dark_mode: bool,
    pub is_fetching_insights: bool,
}

impl SessionFlags {
    pub fn new(dark_mode: bool) -> SessionFlags {
        return SessionFlags {
            show_side_panel: true,
            dark_mode,
            ..Default::default()
        };
    }
}

/// Simulated voice capture. `Submitting` is the completed-recording state in
/// which an empty input buffer may still be submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Display)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Submitting,
}
