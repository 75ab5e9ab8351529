use crate::{
    modes::ModeSpecification,
    raster::Channel,
    tone::{
        LEADER_BREAK_TIME,
        LEADER_TIME,
        LEADER_TONE,
        PORCH_TONE,
        SYNC_TONE,
        ToneEvent,
        VIS_BIT_TIME,
        VIS_HIGH_TONE,
        VIS_LOW_TONE,
        VOX_TIME,
        VOX_TONES,
    },
};

/// Position of the sequencer in a transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Vox { index: usize },
    Header { header_state: HeaderState },
    FirstSync,
    Line { y: usize, line_state: LineState },
}

impl State {
    pub fn initial(vox: bool) -> Self {
        if vox {
            State::Vox { index: 0 }
        }
        else {
            State::Header {
                header_state: HeaderState::Leader1,
            }
        }
    }

    pub fn next(&self, mode: &ModeSpecification) -> Option<Self> {
        let mut state = *self;
        match &mut state {
            Self::Vox { index } => {
                *index += 1;
                if *index == VOX_TONES.len() {
                    state = State::Header {
                        header_state: HeaderState::Leader1,
                    };
                }
            }
            Self::Header { header_state } => {
                match header_state {
                    HeaderState::Leader1 => *header_state = HeaderState::LeaderBreak,
                    HeaderState::LeaderBreak => *header_state = HeaderState::Leader2,
                    HeaderState::Leader2 => *header_state = HeaderState::VisStart,
                    HeaderState::VisStart => {
                        *header_state = HeaderState::VisBit { bit: 0 };
                    }
                    HeaderState::VisBit { bit } => {
                        *bit += 1;
                        if *bit == 8 {
                            *header_state = HeaderState::VisStop;
                        }
                    }
                    HeaderState::VisStop => state = State::FirstSync,
                }
            }
            Self::FirstSync => {
                state = State::Line {
                    y: 0,
                    line_state: LineState::Separator {
                        channel: mode.channel_order[0],
                    },
                };
            }
            Self::Line { y, line_state } => {
                match line_state {
                    LineState::Separator { channel } => {
                        *line_state = LineState::Scan { channel: *channel };
                    }
                    LineState::Scan { channel } => {
                        match mode.channel_order.get(mode.channel_position(*channel) + 1) {
                            Some(next) if *next == mode.last_channel() => {
                                *line_state = LineState::Sync;
                            }
                            Some(next) => {
                                *line_state = LineState::Separator { channel: *next };
                            }
                            None => {
                                *y += 1;
                                if *y == mode.num_lines {
                                    return None;
                                }
                                *line_state = LineState::Separator {
                                    channel: mode.channel_order[0],
                                };
                            }
                        }
                    }
                    LineState::Sync => *line_state = LineState::Porch,
                    LineState::Porch => {
                        *line_state = LineState::Scan {
                            channel: mode.last_channel(),
                        };
                    }
                }
            }
        }

        Some(state)
    }

    /// The fixed tone of this state, or `None` for a pixel scan.
    pub fn tone(&self, mode: &ModeSpecification) -> Option<ToneEvent> {
        let tone = match self {
            State::Vox { index } => ToneEvent::new(VOX_TONES[*index], VOX_TIME),
            State::Header { header_state } => header_state.tone(mode),
            State::FirstSync => ToneEvent::new(SYNC_TONE, mode.sync_time),
            State::Line { line_state, .. } => {
                match line_state {
                    LineState::Separator { .. } => ToneEvent::new(PORCH_TONE, mode.sep_time),
                    LineState::Scan { .. } => return None,
                    LineState::Sync => ToneEvent::new(SYNC_TONE, mode.sync_time),
                    LineState::Porch => ToneEvent::new(PORCH_TONE, mode.porch_time),
                }
            }
        };
        Some(tone)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderState {
    Leader1,
    LeaderBreak,
    Leader2,
    VisStart,
    /// Bits 0 to 6 are the VIS code, LSB first. Bit 7 is the parity bit.
    VisBit { bit: u8 },
    VisStop,
}

impl HeaderState {
    fn tone(&self, mode: &ModeSpecification) -> ToneEvent {
        match self {
            HeaderState::Leader1 | HeaderState::Leader2 => ToneEvent::new(LEADER_TONE, LEADER_TIME),
            HeaderState::LeaderBreak => ToneEvent::new(SYNC_TONE, LEADER_BREAK_TIME),
            HeaderState::VisStart | HeaderState::VisStop => ToneEvent::new(SYNC_TONE, VIS_BIT_TIME),
            HeaderState::VisBit { bit } => {
                let value = if *bit < 7 {
                    mode.vis_code.get_bit(*bit)
                }
                else {
                    mode.vis_code.parity()
                };
                let frequency = if value { VIS_HIGH_TONE } else { VIS_LOW_TONE };
                ToneEvent::new(frequency, VIS_BIT_TIME)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    Separator { channel: Channel },
    Scan { channel: Channel },
    Sync,
    Porch,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn states(vox: bool) -> Vec<State> {
        let mode = ModeSpecification::S1;
        std::iter::successors(Some(State::initial(vox)), |state| state.next(&mode)).collect()
    }

    #[test]
    fn header_is_thirteen_fixed_tones() {
        let mode = ModeSpecification::S1;
        let header = states(false)
            .into_iter()
            .take_while(|state| matches!(state, State::Header { .. }))
            .map(|state| state.tone(&mode).unwrap())
            .map(|tone| (tone.frequency as u32, tone.duration.as_millis() as u32))
            .collect::<Vec<_>>();

        assert_eq!(
            header,
            [
                (1900, 300),
                (1200, 10),
                (1900, 300),
                (1200, 30),
                (1300, 30),
                (1300, 30),
                (1100, 30),
                (1100, 30),
                (1100, 30),
                (1100, 30),
                (1300, 30),
                (1300, 30),
                (1200, 30),
            ]
        );
    }

    #[test]
    fn vox_precedes_header() {
        let mode = ModeSpecification::S1;
        let vox = states(true)
            .into_iter()
            .take_while(|state| matches!(state, State::Vox { .. }))
            .map(|state| state.tone(&mode).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(vox.len(), 8);
        assert!(vox.iter().all(|tone| tone.duration == Duration::from_millis(100)));
        assert_eq!(
            vox.iter().map(|tone| tone.frequency).collect::<Vec<_>>(),
            VOX_TONES
        );
    }

    #[test]
    fn line_order() {
        let states = states(false);
        let first_sync = states
            .iter()
            .position(|state| *state == State::FirstSync)
            .unwrap();
        assert_eq!(first_sync, 13);

        let line = states[first_sync + 1..first_sync + 8]
            .iter()
            .map(|state| {
                match state {
                    State::Line { y: 0, line_state } => *line_state,
                    _ => panic!("unexpected state {state:?}"),
                }
            })
            .collect::<Vec<_>>();
        assert_eq!(
            line,
            [
                LineState::Separator {
                    channel: Channel::Green
                },
                LineState::Scan {
                    channel: Channel::Green
                },
                LineState::Separator {
                    channel: Channel::Blue
                },
                LineState::Scan {
                    channel: Channel::Blue
                },
                LineState::Sync,
                LineState::Porch,
                LineState::Scan {
                    channel: Channel::Red
                },
            ]
        );

        // 256 lines of 7 states, then the sequence ends after the last red scan
        assert_eq!(states.len(), 14 + 256 * 7);
        assert_eq!(
            states.last(),
            Some(&State::Line {
                y: 255,
                line_state: LineState::Scan {
                    channel: Channel::Red
                }
            })
        );
    }

    #[test]
    fn scans_have_no_fixed_tone() {
        let mode = ModeSpecification::S1;
        let scan = State::Line {
            y: 3,
            line_state: LineState::Scan {
                channel: Channel::Blue,
            },
        };
        assert_eq!(scan.tone(&mode), None);
        assert_eq!(
            scan.next(&mode).and_then(|state| state.tone(&mode)),
            Some(ToneEvent::new(SYNC_TONE, Duration::from_millis(9)))
        );
    }
}
