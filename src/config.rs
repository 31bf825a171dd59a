use crate::prelude::*;

/// Sample rate used when none is configured, in Hz
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.;

#[doc = r#"
Settings a [`Document`] is created from.

With the `serde` feature enabled this can be loaded from any serde format. Missing
fields take their defaults:

```yaml
frame_rate: "29.97 drop"
sample_rate: 48000.0
start: "01:00:00;00"
```
"#]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DocumentConfig {
    /// Frame rate every timecode in the document counts in
    pub frame_rate: FrameRate,
    /// Sample rate used for sample/tick conversions
    pub sample_rate: f64,
    /// Clock string of the first frame of the timeline
    pub start: String,
}

impl DocumentConfig {
    /// Defaults at the given frame rate.
    pub fn with_frame_rate(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            ..Self::default()
        }
    }

    /// The time base described by this config
    pub fn time_base(&self) -> TimeBase {
        TimeBase::new(self.frame_rate, self.sample_rate)
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::TwentyThree,
            sample_rate: DEFAULT_SAMPLE_RATE,
            start: "00:00:00:00".to_owned(),
        }
    }
}

#[cfg(feature = "serde")]
#[test]
fn loads_from_json() {
    use pretty_assertions::assert_eq;

    let config = DocumentConfig {
        frame_rate: FrameRate::TwentyNineDrop,
        sample_rate: 44_100.,
        start: "01:00:00;00".to_owned(),
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains(r#""frame_rate":"29.97 drop""#), "{json}");
    assert_eq!(serde_json::from_str::<DocumentConfig>(&json).unwrap(), config);

    // missing fields take their defaults
    let partial: DocumentConfig = serde_json::from_str(r#"{"frame_rate":"25"}"#).unwrap();
    assert_eq!(partial, DocumentConfig::with_frame_rate(FrameRate::TwentyFive));

    assert!(serde_json::from_str::<DocumentConfig>(r#"{"frame_rate":"59.94"}"#).is_err());
}

#[cfg(feature = "serde")]
#[test]
fn notes_load_from_values() {
    use pretty_assertions::assert_eq;

    let note: WipeNote = serde_json::from_str("64").unwrap();
    assert_eq!(note, WipeNote::DEFAULT);
    assert_eq!(serde_json::to_string(&note).unwrap(), "64");
    assert!(serde_json::from_str::<WipeNote>("200").is_err());
    assert!(serde_json::from_str::<WipeNote>("23").is_err());
}
