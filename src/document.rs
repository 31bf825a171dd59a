#![doc = r#"
Building and rendering a cue file

A [`Document`] collects markers and wipe tracks. [`Document::finalize`] locks the
time base and the SMPTE offset into a [`FinalizedDocument`], which can only be
rendered. Rendering consumes it.

```rust
# use cuewipe::prelude::*;
let mut doc = Document::new(&DocumentConfig::with_frame_rate(FrameRate::TwentyFour)).unwrap();
doc.add_marker("00:00:01:00", "Cue1").unwrap();
doc.add_wipe_track("Wipes")
    .unwrap()
    .add_wipe("00:00:02:00", 64u8, 9600)
    .unwrap();

let bytes = doc.finalize().unwrap().render().unwrap();
assert_eq!(&bytes[..4], b"MThd");
```
"#]

use core::fmt;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::debug;

use crate::{Error, Result, prelude::*};

/// A cue file under construction.
#[derive(Debug, Clone)]
pub struct Document {
    time_base: TimeBase,
    start: Timecode,
    markers: MarkerTrack,
    wipe_tracks: Vec<WipeTrack>,
}

impl Document {
    /// An empty document.
    ///
    /// # Errors
    /// - [`Error::SampleRate`] if `config.sample_rate` is not finite and positive
    /// - [`TimecodeError`] if `config.start` is not a valid clock string at
    ///   `config.frame_rate`
    pub fn new(config: &DocumentConfig) -> Result<Self> {
        if !(config.sample_rate.is_finite() && config.sample_rate > 0.) {
            return Err(Error::SampleRate(config.sample_rate));
        }
        let time_base = config.time_base();
        let start = Timecode::parse(&config.start, config.frame_rate)?;
        Ok(Self {
            time_base,
            start,
            markers: MarkerTrack::default(),
            wipe_tracks: Vec::new(),
        })
    }

    /// The time base every event is placed on
    pub fn time_base(&self) -> &TimeBase {
        &self.time_base
    }

    /// The first frame of the timeline
    pub fn start(&self) -> Timecode {
        self.start
    }

    /// Move the start of the timeline.
    pub fn set_start(&mut self, at: impl Into<TimeSpec>) -> Result<()> {
        self.start = self.time_base.resolve(at.into())?;
        Ok(())
    }

    /// Add a marker named `text` at `at`.
    ///
    /// # Errors
    /// - [`TextError`] if `text` is empty, longer than 32 characters or not printable
    ///   ASCII
    /// - [`TimecodeError`] if `at` does not resolve at the document rate
    pub fn add_marker(&mut self, at: impl Into<TimeSpec>, text: &str) -> Result<()> {
        let at = self.time_base.resolve(at.into())?;
        self.markers.push(Marker::new(at, text)?);
        Ok(())
    }

    /// The marker track
    pub fn markers(&self) -> &MarkerTrack {
        &self.markers
    }

    /// Append an empty wipe track and return a handle to fill it.
    ///
    /// # Errors
    /// [`TextError`] if `name` is longer than 32 characters or not printable ASCII.
    pub fn add_wipe_track(&mut self, name: &str) -> Result<WipeTrackMut<'_>> {
        let index = self.wipe_tracks.len();
        self.wipe_tracks.push(WipeTrack::new(name)?);
        Ok(WipeTrackMut {
            track: &mut self.wipe_tracks[index],
            time_base: &self.time_base,
        })
    }

    /// A handle to the wipe track at `index`, in insertion order.
    pub fn wipe_track_mut(&mut self, index: usize) -> Option<WipeTrackMut<'_>> {
        let time_base = &self.time_base;
        self.wipe_tracks
            .get_mut(index)
            .map(|track| WipeTrackMut { track, time_base })
    }

    /// Wipe tracks in insertion order
    pub fn wipe_tracks(&self) -> &[WipeTrack] {
        &self.wipe_tracks
    }

    /// See [`TimeBase::ticks_to_samples`]
    pub fn ticks_to_samples(&self, ticks: u64) -> u64 {
        self.time_base.ticks_to_samples(ticks)
    }

    /// See [`TimeBase::samples_to_ticks`]
    pub fn samples_to_ticks(&self, samples: u64) -> u64 {
        self.time_base.samples_to_ticks(samples)
    }

    /// See [`TimeBase::timecode_to_ticks`]
    pub fn timecode_to_ticks(&self, tc: &Timecode) -> Result<u64> {
        Ok(self.time_base.timecode_to_ticks(tc)?)
    }

    /// See [`TimeBase::ticks_to_timecode`]
    pub fn ticks_to_timecode(&self, ticks: u64) -> Result<Timecode> {
        Ok(self.time_base.ticks_to_timecode(ticks)?)
    }

    /// Lock the document for rendering.
    ///
    /// The SMPTE offset is computed from the start timecode here, before any track
    /// is rendered.
    ///
    /// # Errors
    /// [`SmpteError`] if the start timecode cannot be written as a SMPTE offset.
    pub fn finalize(self) -> Result<FinalizedDocument> {
        let smpte = self.time_base.smpte_offset(&self.start)?;
        debug!(
            start = %self.start,
            markers = self.markers.len(),
            wipe_tracks = self.wipe_tracks.len(),
            "finalized cue document"
        );
        Ok(FinalizedDocument {
            time_base: self.time_base,
            start: self.start,
            smpte,
            markers: self.markers,
            wipe_tracks: self.wipe_tracks,
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        let config = DocumentConfig::default();
        Self {
            time_base: config.time_base(),
            start: Timecode::zero(config.frame_rate),
            markers: MarkerTrack::default(),
            wipe_tracks: Vec::new(),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A midi file with {} marker(s) and {} wipe track(s)",
            self.markers.len(),
            self.wipe_tracks.len()
        )
    }
}

/// A wipe track borrowed from its document, with the document's time base at hand
/// to place wipes.
#[derive(Debug)]
pub struct WipeTrackMut<'a> {
    track: &'a mut WipeTrack,
    time_base: &'a TimeBase,
}

impl WipeTrackMut<'_> {
    /// Add a wipe at `at` on `note`, held for `duration` ticks.
    ///
    /// `note` may be a note value (`64u8`) or a name (`"E3"`).
    ///
    /// # Errors
    /// - [`NoteError`] if `note` is not in the note table
    /// - [`TimecodeError`] if `at` does not resolve at the document rate
    pub fn add_wipe<N>(
        &mut self,
        at: impl Into<TimeSpec>,
        note: N,
        duration: u32,
    ) -> Result<&mut Self>
    where
        N: TryInto<WipeNote, Error = NoteError>,
    {
        let note = WipeNote::new(note)?;
        let at = self.time_base.resolve(at.into())?;
        self.track.push(Wipe::new(at, note, duration));
        Ok(self)
    }

    /// Add a wipe on [`WipeNote::DEFAULT`] held for [`DEFAULT_WIPE_DURATION`].
    pub fn add_wipe_default(&mut self, at: impl Into<TimeSpec>) -> Result<&mut Self> {
        let at = self.time_base.resolve(at.into())?;
        self.track
            .push(Wipe::new(at, WipeNote::DEFAULT, DEFAULT_WIPE_DURATION));
        Ok(self)
    }

    /// Rename the track.
    pub fn change_name(&mut self, name: &str) -> Result<&mut Self> {
        self.track.change_name(name)?;
        Ok(self)
    }

    /// The track being edited
    pub fn track(&self) -> &WipeTrack {
        self.track
    }
}

/// A document whose time base and SMPTE offset are fixed. Ready to render.
#[derive(Debug, Clone)]
pub struct FinalizedDocument {
    time_base: TimeBase,
    start: Timecode,
    smpte: SmpteOffset,
    markers: MarkerTrack,
    wipe_tracks: Vec<WipeTrack>,
}

impl FinalizedDocument {
    /// The locked SMPTE offset
    pub fn smpte_offset(&self) -> &SmpteOffset {
        &self.smpte
    }

    /// The time base the document was laid out on
    pub fn time_base(&self) -> &TimeBase {
        &self.time_base
    }

    /// The header chunk the file will start with
    pub fn header(&self) -> Result<HeaderChunk> {
        let tracks = 1 + self.wipe_tracks.len();
        let track_count = u16::try_from(tracks).map_err(|_| Error::TooManyTracks(tracks))?;
        Ok(HeaderChunk::new(track_count, self.time_base.ppq()))
    }

    /// Render the whole file into memory.
    ///
    /// The marker track comes first, then each wipe track in the order it was added.
    pub fn render(self) -> Result<Vec<u8>> {
        let header = self.header()?;
        let markers = self
            .markers
            .render(&self.start, &self.time_base, &self.smpte)?;

        let mut bytes = header.to_bytes();
        markers.write_bytes(&mut bytes);
        for track in &self.wipe_tracks {
            track
                .render(&self.start, &self.time_base)?
                .write_bytes(&mut bytes);
        }

        debug!(
            tracks = header.track_count(),
            bytes = bytes.len(),
            "rendered cue document"
        );
        Ok(bytes)
    }

    /// Render the file and write it to `sink`.
    ///
    /// Nothing is written if rendering fails.
    pub fn write_to<W: Write>(self, mut sink: W) -> Result<()> {
        let bytes = self.render()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Render the file and save it at `path`, replacing any existing file.
    ///
    /// The file is only created once rendering has succeeded.
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.render()?;
        let mut file = BufWriter::new(File::create(path.as_ref())?);
        file.write_all(&bytes)?;
        file.flush()?;
        debug!(path = %path.as_ref().display(), "saved cue document");
        Ok(())
    }
}

#[cfg(test)]
fn chunk_lengths(bytes: &[u8]) -> Vec<(String, usize)> {
    let mut chunks = Vec::new();
    let mut rest = bytes;
    while rest.len() >= 8 {
        let kind = String::from_utf8_lossy(&rest[..4]).into_owned();
        let len = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
        chunks.push((kind, len));
        rest = &rest[(8 + len).min(rest.len())..];
    }
    assert!(rest.is_empty(), "trailing bytes after last chunk");
    chunks
}

#[test]
fn renders_header_then_tracks() {
    use pretty_assertions::assert_eq;

    let mut doc = Document::new(&DocumentConfig::with_frame_rate(FrameRate::TwentyFour)).unwrap();
    doc.add_marker("00:00:01:00", "Cue1").unwrap();
    doc.add_wipe_track("Wipes")
        .unwrap()
        .add_wipe("00:00:02:00", 64u8, 9600)
        .unwrap();
    assert_eq!(doc.to_string(), "A midi file with 1 marker(s) and 1 wipe track(s)");

    let bytes = doc.finalize().unwrap().render().unwrap();
    assert_eq!(
        &bytes[..14],
        &[b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 2, 0x25, 0x80]
    );
    assert_eq!(
        chunk_lengths(&bytes),
        vec![
            ("MThd".to_owned(), 6),
            // smpte 9 + tempo 7 + marker (3 + 3 + 4) + end 4
            ("MTrk".to_owned(), 30),
            // name 9 + note on (3 + 3) + note off (2 + 3) + tail 5
            ("MTrk".to_owned(), 25),
        ]
    );
}

#[test]
fn wipe_tracks_keep_insertion_order() {
    use pretty_assertions::assert_eq;

    let mut doc = Document::default();
    doc.add_wipe_track("First").unwrap();
    doc.add_wipe_track("Second").unwrap();
    doc.wipe_track_mut(0)
        .unwrap()
        .change_name("Renamed")
        .unwrap();
    assert!(doc.wipe_track_mut(2).is_none());

    let names: Vec<&str> = doc.wipe_tracks().iter().map(|t| t.name().as_str()).collect();
    assert_eq!(names, vec!["Renamed", "Second"]);

    let finalized = doc.finalize().unwrap();
    assert_eq!(finalized.header().unwrap().track_count(), 3);
}

#[test]
fn wipes_accept_names_and_defaults() {
    use pretty_assertions::assert_eq;

    let mut doc = Document::new(&DocumentConfig::with_frame_rate(FrameRate::TwentyFive)).unwrap();
    let mut track = doc.add_wipe_track(DEFAULT_TRACK_NAME).unwrap();
    track.add_wipe(10u32, "C3", 100).unwrap();
    track.add_wipe_default("00:00:01:00").unwrap();

    let wipes = track.track().wipes();
    assert_eq!(wipes[0].note().value(), 60);
    assert_eq!(wipes[0].at(), Timecode::from_frames(10, FrameRate::TwentyFive));
    assert_eq!(wipes[1].note(), WipeNote::DEFAULT);
    assert_eq!(wipes[1].duration(), DEFAULT_WIPE_DURATION);

    let err = track.add_wipe("00:00:02:00", "H2", 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownNote);
    let err = track.add_wipe("00:00:02:00", 122u8, 100).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
}

#[test]
fn timecodes_must_match_the_document_rate() {
    use pretty_assertions::assert_eq;

    let mut doc = Document::new(&DocumentConfig::with_frame_rate(FrameRate::TwentyFour)).unwrap();
    let foreign = Timecode::from_frames(3, FrameRate::TwentyFive);

    let err = doc.add_marker(foreign, "Nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FrameRateMismatch);
    assert_eq!(
        doc.timecode_to_ticks(&foreign).unwrap_err().kind(),
        ErrorKind::FrameRateMismatch
    );
    assert!(doc.markers().is_empty());
}

#[test]
fn start_can_move_and_is_locked_on_finalize() {
    use pretty_assertions::assert_eq;

    let mut doc = Document::new(&DocumentConfig::with_frame_rate(FrameRate::TwentyFive)).unwrap();
    doc.set_start("01:02:03:04").unwrap();
    assert_eq!(doc.start().to_string(), "01:02:03:04");

    let finalized = doc.finalize().unwrap();
    assert_eq!(
        finalized.smpte_offset().to_bytes(),
        [0b001_00001, 2, 3, 4, 0]
    );
}

#[test]
fn render_errors_reach_the_caller_before_any_write() {
    use pretty_assertions::assert_eq;

    let mut doc = Document::new(&DocumentConfig::with_frame_rate(FrameRate::TwentyFour)).unwrap();
    doc.set_start("00:00:10:00").unwrap();
    doc.add_marker("00:00:05:00", "Early").unwrap();

    let mut sink = Vec::new();
    let err = doc.finalize().unwrap().write_to(&mut sink).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ordering);
    assert!(sink.is_empty());
}

#[test]
fn sample_conversions_follow_the_time_base() {
    use pretty_assertions::assert_eq;

    let doc = Document::default();
    assert_eq!(doc.ticks_to_samples(19_200), 48_000);
    assert_eq!(doc.samples_to_ticks(48_000), 19_200);
    assert_eq!(
        doc.ticks_to_timecode(0).unwrap(),
        Timecode::zero(FrameRate::TwentyThree)
    );
}

#[test]
fn sample_rate_must_be_positive() {
    use pretty_assertions::assert_eq;

    for sample_rate in [0., -48_000., f64::NAN, f64::INFINITY] {
        let config = DocumentConfig {
            sample_rate,
            ..DocumentConfig::default()
        };
        let err = Document::new(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range, "{sample_rate}");
    }

    let config = DocumentConfig {
        sample_rate: 44_100.,
        ..DocumentConfig::default()
    };
    assert_eq!(Document::new(&config).unwrap().samples_to_ticks(44_100), 19_200);
}
