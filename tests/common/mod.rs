//! Scripted stand-in for the external tools.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use dvdrip::{CancellationToken, Invocation, RipError, ToolOutput, ToolRunner};

/// Replays canned output per program and records every invocation.
///
/// Like the real tools, an `mplayer` invocation writes a few bytes to the
/// path following `-dumpfile`, and an `ffmpeg` invocation creates its output
/// file (the last argument) whether or not it then fails.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: RefCell<HashMap<String, VecDeque<ToolOutput>>>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `output` as the next result for `program`.
    pub fn respond(self, program: &str, output: ToolOutput) -> Self {
        self.responses
            .borrow_mut()
            .entry(program.to_string())
            .or_default()
            .push_back(output);
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.program == program)
            .cloned()
            .collect()
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(
        &self,
        invocation: &Invocation,
        _cancellation: Option<&CancellationToken>,
    ) -> Result<ToolOutput, RipError> {
        self.calls.borrow_mut().push(invocation.clone());

        if invocation.program == "mplayer" {
            if let Some(position) = invocation.args.iter().position(|arg| arg == "-dumpfile") {
                std::fs::write(&invocation.args[position + 1], b"MPEG-PS")?;
            }
        }
        if invocation.program == "ffmpeg" {
            if let Some(output) = invocation.args.last() {
                std::fs::write(output, b"ftyp")?;
            }
        }

        self.responses
            .borrow_mut()
            .get_mut(&invocation.program)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| RipError::ToolLaunch {
                program: invocation.program.clone(),
                reason: "no scripted response left".to_string(),
            })
    }
}

pub fn ok(stdout: &str) -> ToolOutput {
    ToolOutput {
        status: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn failed(stderr: &str) -> ToolOutput {
    ToolOutput {
        status: Some(1),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Input section of an ffmpeg run over a typical episode dump.
pub const FFMPEG_LISTING: &str = "\
Input #0, mpeg, from 'dvdrip.abcdef.vob':
  Duration: 00:22:31.12, start: 0.280633, bitrate: 6110 kb/s
  Stream #0:0[0x1e0]: Video: mpeg2video (Main), yuv420p(tv, top first), 720x480
  Stream #0:1[0x80]: Audio: ac3, 48000 Hz, 5.1(side), fltp, 448 kb/s
  Stream #0:2[0x81]: Audio: ac3, 48000 Hz, stereo, fltp, 192 kb/s
  Stream #0:3[0x20]: Subtitle: dvd_subtitle
  Stream #0:4[0x21]: Subtitle: dvd_subtitle
";

pub const DTS_FAILURE: &str =
    "[mp4 @ 0x5581] Application provided invalid, non monotonically increasing dts to muxer in stream 3: 2 >= 2";

pub fn codec_failure(stream: usize) -> String {
    format!(
        "[mpeg @ 0x5581] Could not find codec parameters for stream {stream} (Subtitle: dvd_subtitle): unspecified size\n\
         Consider increasing the value for the 'analyzeduration' and 'probesize' options\n\
         {FFMPEG_LISTING}\
         Output #0, mp4, to 'Pilot.mp4':\n\
           Stream #0:0: Video: mpeg2video\n"
    )
}

/// `mplayer` console output for a dump with two audio and two subtitle streams.
pub const MPLAYER_LOG: &str = "\
MPlayer 1.4 (C) 2000-2019 MPlayer Team
Playing dvd://2.
audio stream: 0 format: ac3 (5.1) language: en aid: 128.
subtitle ( sid ): 0 language: en
audio stream: 1 format: ac3 (stereo) language: fr aid: 129.
subtitle ( sid ): 1 language: es
number of audio channels on disk: 2.
Core dumped ;)
";
