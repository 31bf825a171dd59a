use tracing::trace;

use crate::{Error, Result, prelude::*};

/// A named point on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    at: Timecode,
    text: MidiText,
}

impl Marker {
    /// A marker at `at` named `text`.
    ///
    /// # Errors
    /// [`TextError`] if `text` is empty, longer than 32 characters or not printable
    /// ASCII.
    pub fn new(at: Timecode, text: &str) -> Result<Self, TextError> {
        Ok(Self {
            at,
            text: MidiText::non_empty(text)?,
        })
    }

    /// Where the marker sits
    pub const fn at(&self) -> Timecode {
        self.at
    }

    /// The marker name
    pub fn text(&self) -> &MidiText {
        &self.text
    }
}

/// The first track of a cue file: timing information and markers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkerTrack {
    markers: Vec<Marker>,
}

impl MarkerTrack {
    /// Add a marker. Order does not matter.
    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// Markers in insertion order
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of markers
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// True if the track has no markers
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Markers sorted by timecode. Markers at the same timecode keep insertion order.
    pub fn sorted(&self) -> Vec<&Marker> {
        let mut sorted: Vec<&Marker> = self.markers.iter().collect();
        sorted.sort_by_key(|marker| marker.at);
        sorted
    }

    /// Render the track.
    ///
    /// The SMPTE offset and tempo come first, at tick 0. Each marker then follows
    /// with the tick distance from the previous marker, the first measured from
    /// `start`.
    ///
    /// # Errors
    /// - [`Error::BeforeStart`] if a marker precedes `start`
    /// - [`TimecodeError::FrameRateMismatch`] if a marker is at a different rate
    /// - [`VlqError::OutOfRange`] if a gap does not fit in a delta time
    pub fn render(
        &self,
        start: &Timecode,
        time_base: &TimeBase,
        smpte: &SmpteOffset,
    ) -> Result<TrackChunk> {
        let sorted = self.sorted();
        if let Some(first) = sorted.first().filter(|m| m.at < *start) {
            return Err(Error::BeforeStart {
                kind: "Marker",
                at: first.at,
                start: *start,
            });
        }

        let mut track = TrackChunk::default();
        track.push(TrackEvent::now(MetaEvent::SmpteOffset(*smpte)));
        track.push(TrackEvent::now(MetaEvent::Tempo(time_base.tempo())));

        let mut previous = time_base.timecode_to_ticks(start)?;
        for marker in sorted {
            let tick = time_base.timecode_to_ticks(&marker.at)?;
            let delta = Vlq::encode(tick - previous)?;
            track.push(TrackEvent::new(
                delta,
                MetaEvent::Marker(marker.text.clone()),
            ));
            previous = tick;
        }
        track.push(TrackEvent::now(MetaEvent::EndOfTrack));

        trace!(markers = self.len(), "rendered marker track");
        Ok(track)
    }
}

#[cfg(test)]
fn marker_deltas(track: &TrackChunk) -> Vec<(u32, String)> {
    track
        .events()
        .iter()
        .filter_map(|event| match event.kind() {
            EventKind::Meta(MetaEvent::Marker(text)) => Some((event.delta(), text.to_string())),
            _ => None,
        })
        .collect()
}

#[test]
fn sorts_markers_before_computing_deltas() {
    use pretty_assertions::assert_eq;

    let rate = FrameRate::TwentyFour;
    let base = TimeBase::new(rate, 48_000.);
    let start = Timecode::zero(rate);
    let smpte = base.smpte_offset(&start).unwrap();

    let mut track = MarkerTrack::default();
    track.push(Marker::new(Timecode::parse("00:00:01:00", rate).unwrap(), "Late").unwrap());
    track.push(Marker::new(Timecode::parse("00:00:00:12", rate).unwrap(), "Early").unwrap());

    let chunk = track.render(&start, &base, &smpte).unwrap();
    let deltas = marker_deltas(&chunk);
    assert_eq!(
        deltas,
        vec![(12 * 800, "Early".to_owned()), (12 * 800, "Late".to_owned())]
    );

    // running sums land on each marker's absolute tick
    let absolute: Vec<u32> = deltas
        .iter()
        .scan(0, |sum, (delta, _)| {
            *sum += delta;
            Some(*sum)
        })
        .collect();
    assert_eq!(absolute, vec![9_600, 19_200]);
}

#[test]
fn ties_keep_insertion_order() {
    use pretty_assertions::assert_eq;

    let rate = FrameRate::TwentyFive;
    let base = TimeBase::new(rate, 48_000.);
    let start = Timecode::zero(rate);
    let smpte = base.smpte_offset(&start).unwrap();
    let at = Timecode::from_frames(5, rate);

    let mut track = MarkerTrack::default();
    for name in ["b", "a", "c"] {
        track.push(Marker::new(at, name).unwrap());
    }
    let names: Vec<String> = marker_deltas(&track.render(&start, &base, &smpte).unwrap())
        .into_iter()
        .map(|(_, name)| name)
        .collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn first_delta_is_measured_from_start() {
    use pretty_assertions::assert_eq;

    let rate = FrameRate::TwentyFour;
    let base = TimeBase::new(rate, 48_000.);
    let start = Timecode::parse("01:00:00:00", rate).unwrap();
    let smpte = base.smpte_offset(&start).unwrap();

    let mut track = MarkerTrack::default();
    track.push(Marker::new(Timecode::parse("01:00:00:02", rate).unwrap(), "Go").unwrap());
    let chunk = track.render(&start, &base, &smpte).unwrap();

    assert_eq!(marker_deltas(&chunk), vec![(1_600, "Go".to_owned())]);
    assert_eq!(
        &chunk.body()[..8],
        &[0x00, 0xFF, 0x54, 0x05, 0b000_00001, 0, 0, 0]
    );
}

#[test]
fn rejects_markers_before_start() {
    let rate = FrameRate::TwentyFour;
    let base = TimeBase::new(rate, 48_000.);
    let start = Timecode::parse("00:00:10:00", rate).unwrap();
    let smpte = base.smpte_offset(&start).unwrap();

    let mut track = MarkerTrack::default();
    track.push(Marker::new(Timecode::parse("00:00:09:23", rate).unwrap(), "Early").unwrap());

    let err = track.render(&start, &base, &smpte).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ordering);
}

#[test]
fn empty_track_has_timing_and_end() {
    use pretty_assertions::assert_eq;

    let rate = FrameRate::TwentyFive;
    let base = TimeBase::new(rate, 48_000.);
    let start = Timecode::parse("01:02:03:04", rate).unwrap();
    let smpte = base.smpte_offset(&start).unwrap();

    let chunk = MarkerTrack::default().render(&start, &base, &smpte).unwrap();
    assert_eq!(
        chunk.body(),
        [
            0x00, 0xFF, 0x54, 0x05, 0b001_00001, 2, 3, 4, 0, //
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, //
            0x00, 0xFF, 0x2F, 0x00,
        ]
    );
}
