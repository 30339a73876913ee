use serde::{Deserialize, Serialize};

/// Playback output route as named to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputRoute {
    /// Handset earpiece.
    Phone,
    #[serde(rename = "Phone Speaker")]
    PhoneSpeaker,
    Bluetooth,
    Headphones,
    /// Tear down any special routing and fall back to the handset.
    None,
}

impl OutputRoute {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::PhoneSpeaker => "Phone Speaker",
            Self::Bluetooth => "Bluetooth",
            Self::Headphones => "Headphones",
            Self::None => "None",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Phone" => Some(Self::Phone),
            "Phone Speaker" => Some(Self::PhoneSpeaker),
            "Bluetooth" => Some(Self::Bluetooth),
            "Headphones" => Some(Self::Headphones),
            "None" => Some(Self::None),
            _ => None,
        }
    }

    /// Routing primitives needed to reach this route given the current hardware.
    ///
    /// `None` means leave the platform's default routing untouched.
    pub fn plan(&self, hardware: &RouteState) -> Option<RoutePlan> {
        match self {
            Self::Bluetooth => Some(RoutePlan {
                mode: AudioMode::InCommunication,
                speakerphone: false,
                bluetooth_sco: true,
            }),
            Self::PhoneSpeaker => Some(RoutePlan {
                mode: if hardware.bluetooth_connected() {
                    AudioMode::InCall
                } else {
                    AudioMode::Normal
                },
                speakerphone: true,
                bluetooth_sco: false,
            }),
            Self::Phone | Self::None => Some(RoutePlan {
                mode: AudioMode::InCommunication,
                speakerphone: false,
                bluetooth_sco: false,
            }),
            Self::Headphones => None,
        }
    }
}

/// Snapshot of the output hardware currently attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteState {
    pub wired_headset: bool,
    pub bluetooth_a2dp: bool,
    pub bluetooth_sco: bool,
}

impl RouteState {
    pub fn bluetooth_connected(&self) -> bool {
        self.bluetooth_a2dp || self.bluetooth_sco
    }

    /// Routes the host may choose from. A wired headset pre-empts everything else.
    pub fn available_outputs(&self) -> Vec<OutputRoute> {
        if self.wired_headset {
            vec![OutputRoute::Headphones]
        } else if self.bluetooth_connected() {
            vec![OutputRoute::Phone, OutputRoute::PhoneSpeaker, OutputRoute::Bluetooth]
        } else {
            vec![OutputRoute::Phone, OutputRoute::PhoneSpeaker]
        }
    }
}

/// Platform audio mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMode {
    Normal,
    InCall,
    InCommunication,
}

/// Mode and toggles an [`AudioRouter`](crate::traits::audio_router::AudioRouter) applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePlan {
    pub mode: AudioMode,
    pub speakerphone: bool,
    pub bluetooth_sco: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_follow_hardware() {
        let none = RouteState::default();
        assert_eq!(
            none.available_outputs(),
            vec![OutputRoute::Phone, OutputRoute::PhoneSpeaker]
        );

        let bt = RouteState { bluetooth_a2dp: true, ..Default::default() };
        assert_eq!(bt.available_outputs().len(), 3);
        assert!(bt.available_outputs().contains(&OutputRoute::Bluetooth));

        let wired = RouteState { wired_headset: true, bluetooth_sco: true, ..Default::default() };
        assert_eq!(wired.available_outputs(), vec![OutputRoute::Headphones]);
    }

    #[test]
    fn speaker_mode_depends_on_bluetooth() {
        let plain = OutputRoute::PhoneSpeaker.plan(&RouteState::default()).unwrap();
        assert_eq!(plain.mode, AudioMode::Normal);
        assert!(plain.speakerphone);
        assert!(!plain.bluetooth_sco);

        let bt = RouteState { bluetooth_sco: true, ..Default::default() };
        let plan = OutputRoute::PhoneSpeaker.plan(&bt).unwrap();
        assert_eq!(plan.mode, AudioMode::InCall);
    }

    #[test]
    fn bluetooth_and_handset_plans() {
        let hw = RouteState::default();
        let plan = OutputRoute::Bluetooth.plan(&hw).unwrap();
        assert!(plan.bluetooth_sco);
        assert_eq!(plan.mode, AudioMode::InCommunication);

        assert_eq!(OutputRoute::Phone.plan(&hw), OutputRoute::None.plan(&hw));
        assert!(OutputRoute::Headphones.plan(&hw).is_none());
    }

    #[test]
    fn names_round_trip_through_serde() {
        let json = serde_json::to_string(&OutputRoute::PhoneSpeaker).unwrap();
        assert_eq!(json, "\"Phone Speaker\"");
        assert_eq!(OutputRoute::from_name("Phone Speaker"), Some(OutputRoute::PhoneSpeaker));
        assert_eq!(OutputRoute::from_name("Car"), None);
    }
}
